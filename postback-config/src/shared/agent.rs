use serde::Deserialize;

use crate::shared::{
    DeliveryLogConfig, HttpClientConfig, PipelineConfig, QueueConfig, ValidationError,
};

/// Complete configuration for the postback delivery agent.
///
/// Aggregates everything required to run the agent: queue connection,
/// pipeline tunables, outbound HTTP client settings, and the delivery log
/// destination. Loaded once at startup and immutable afterwards.
///
/// This intentionally does not implement [`Serialize`] to avoid accidentally
/// leaking secrets in the config into serialized forms.
#[derive(Clone, Debug, Deserialize)]
pub struct AgentConfig {
    /// Connection settings for the Redis work queue.
    pub queue: QueueConfig,
    /// Tunables for the delivery pipeline.
    pub pipeline: PipelineConfig,
    /// Outbound HTTP client settings.
    #[serde(default)]
    pub http: HttpClientConfig,
    /// Delivery record log destination.
    pub delivery_log: DeliveryLogConfig,
}

impl AgentConfig {
    /// Validates the complete agent configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pipeline.validate()?;
        self.http.validate()?;
        self.delivery_log.validate()?;

        Ok(())
    }
}
