use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration for the delivery pipeline.
///
/// Contains the tunables that shape the concurrent pipeline: how many
/// consumers drain the queue, how many workers deliver postbacks, how much
/// buffering sits between them, and how consumers back off when the queue
/// runs dry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Name of the queue (Redis list) to pop delivery jobs from.
    pub queue_name: String,
    /// Number of consumer tasks draining the queue.
    #[serde(default = "default_consumer_count")]
    pub consumer_count: u16,
    /// Number of worker tasks performing deliveries.
    #[serde(default = "default_worker_count")]
    pub worker_count: u16,
    /// Capacity of the bounded job channel between consumers and workers.
    ///
    /// This is the pipeline's single backpressure point: once full, consumers
    /// block on send and stop draining the queue.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Initial sleep, in milliseconds, after an empty pop or a transient
    /// queue error.
    #[serde(default = "default_empty_queue_backoff_ms")]
    pub empty_queue_backoff_ms: u64,
    /// Cap, in milliseconds, for the exponential empty-queue backoff.
    #[serde(default = "default_empty_queue_backoff_max_ms")]
    pub empty_queue_backoff_max_ms: u64,
}

impl PipelineConfig {
    /// Default number of consumer tasks.
    pub const DEFAULT_CONSUMER_COUNT: u16 = 1;

    /// Default number of worker tasks.
    pub const DEFAULT_WORKER_COUNT: u16 = 4;

    /// Default job channel capacity.
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

    /// Default initial empty-queue backoff in milliseconds.
    pub const DEFAULT_EMPTY_QUEUE_BACKOFF_MS: u64 = 5000;

    /// Default empty-queue backoff cap in milliseconds.
    pub const DEFAULT_EMPTY_QUEUE_BACKOFF_MAX_MS: u64 = 60_000;

    /// Validates pipeline configuration settings.
    ///
    /// Ensures both pools have at least one task, the channel has at least
    /// one slot, and the backoff range is coherent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_name.is_empty() {
            return Err(ValidationError::QueueNameEmpty);
        }

        if self.consumer_count == 0 {
            return Err(ValidationError::ConsumerCountZero);
        }

        if self.worker_count == 0 {
            return Err(ValidationError::WorkerCountZero);
        }

        if self.channel_capacity == 0 {
            return Err(ValidationError::ChannelCapacityZero);
        }

        if self.empty_queue_backoff_max_ms < self.empty_queue_backoff_ms {
            return Err(ValidationError::BackoffCapBelowInitial);
        }

        Ok(())
    }
}

fn default_consumer_count() -> u16 {
    PipelineConfig::DEFAULT_CONSUMER_COUNT
}

fn default_worker_count() -> u16 {
    PipelineConfig::DEFAULT_WORKER_COUNT
}

fn default_channel_capacity() -> usize {
    PipelineConfig::DEFAULT_CHANNEL_CAPACITY
}

fn default_empty_queue_backoff_ms() -> u64 {
    PipelineConfig::DEFAULT_EMPTY_QUEUE_BACKOFF_MS
}

fn default_empty_queue_backoff_max_ms() -> u64 {
    PipelineConfig::DEFAULT_EMPTY_QUEUE_BACKOFF_MAX_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PipelineConfig {
        PipelineConfig {
            queue_name: "postbacks".to_string(),
            consumer_count: 2,
            worker_count: 8,
            channel_capacity: 32,
            empty_queue_backoff_ms: 1000,
            empty_queue_backoff_max_ms: 30_000,
        }
    }

    #[test]
    fn accepts_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn rejects_zero_worker_count() {
        let mut config = valid_config();
        config.worker_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::WorkerCountZero)
        ));
    }

    #[test]
    fn rejects_zero_channel_capacity() {
        let mut config = valid_config();
        config.channel_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ChannelCapacityZero)
        ));
    }

    #[test]
    fn rejects_inverted_backoff_range() {
        let mut config = valid_config();
        config.empty_queue_backoff_max_ms = config.empty_queue_backoff_ms - 1;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::BackoffCapBelowInitial)
        ));
    }
}
