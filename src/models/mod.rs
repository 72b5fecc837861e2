pub mod config;

pub use config::{AppConfig, DetectionConfig, LimitsConfig, Preset, ServerConfig};
