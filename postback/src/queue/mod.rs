//! Work queue clients.
//!
//! The queue is an external FIFO the agent only ever pops from. [`base`]
//! defines the seam, [`redis`] the production client, and [`memory`] an
//! in-process queue for tests and development.

pub mod base;
pub mod memory;
pub mod redis;

pub use base::JobQueue;
pub use memory::MemoryQueue;
pub use redis::RedisQueue;
