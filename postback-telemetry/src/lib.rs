//! Telemetry initialization for the postback delivery agent.

pub mod tracing;
