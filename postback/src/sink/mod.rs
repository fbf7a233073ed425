//! Delivery record sinks.
//!
//! Every delivery attempt ends as one structured record handed to a sink.
//! [`base`] defines the seam and the record format, [`file`] the append-only
//! JSON-lines production sink, and [`memory`] an accumulating sink for tests.

pub mod base;
pub mod file;
pub mod memory;

pub use base::{DeliveryRecord, RecordSink};
pub use file::FileSink;
pub use memory::MemorySink;
