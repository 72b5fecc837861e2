//! Stipple - selective dithering and halftoning server
//!
//! Host around the `stipple-dither` core: YAML presets, a worker pool that
//! keeps dithering off the async runtime, a PNG codec and the HTTP API.
//! This library exposes modules for the binary and integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
