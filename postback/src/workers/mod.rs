//! Pipeline worker tasks.
//!
//! Two pools cooperate through one bounded channel: [`consumer`] tasks pop
//! and decode queue messages and only ever send, [`deliver`] tasks execute
//! deliveries and only ever receive. [`pool`] owns the spawned tasks and
//! aggregates their results on shutdown.

pub mod consumer;
pub mod deliver;
pub mod pool;

pub use consumer::ConsumerWorker;
pub use deliver::{DeliveryWorker, SharedJobRx};
pub use pool::{WorkerKind, WorkerPool};
