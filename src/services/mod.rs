pub mod worker;

pub use worker::{DitherWorker, WorkerPool};
