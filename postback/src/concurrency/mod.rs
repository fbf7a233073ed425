//! Concurrency primitives coordinating the delivery pipeline.
//!
//! The pipeline uses two coordination mechanisms:
//!
//! - The [`shutdown`] module implements a broadcast shutdown signal: one
//!   sender notifies every consumer simultaneously, and consumers finish
//!   their current iteration before terminating.
//! - Workers are not signalled directly; they exit when the job channel
//!   closes, which happens once every consumer has stopped sending. This
//!   ordering is what turns shutdown into a drain rather than a drop.

pub mod shutdown;
