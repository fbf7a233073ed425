//! Shared configuration types for the postback delivery agent.

mod agent;
mod base;
mod http;
mod pipeline;
mod queue;
mod sink;

pub use agent::AgentConfig;
pub use base::ValidationError;
pub use http::HttpClientConfig;
pub use pipeline::PipelineConfig;
pub use queue::{QueueConfig, QueueConfigWithoutSecrets};
pub use sink::DeliveryLogConfig;
