pub mod concurrency;
pub mod error;
pub mod executor;
mod macros;
pub mod pipeline;
pub mod queue;
pub mod sink;
pub mod types;
pub mod workers;
