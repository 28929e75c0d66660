//! Back-end services.

pub mod pool;
pub mod processor;

pub use pool::{PoolStats, WorkerPool};
pub use processor::WorkerProcessor;
