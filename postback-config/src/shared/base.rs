use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Consumer pool size cannot be zero.
    #[error("`consumer_count` cannot be zero")]
    ConsumerCountZero,
    /// Worker pool size cannot be zero.
    #[error("`worker_count` cannot be zero")]
    WorkerCountZero,
    /// The job channel needs at least one slot.
    #[error("`channel_capacity` cannot be zero")]
    ChannelCapacityZero,
    /// The queue name must be set.
    #[error("`queue_name` cannot be empty")]
    QueueNameEmpty,
    /// The empty-queue backoff cap must not undercut the initial interval.
    #[error("`empty_queue_backoff_max_ms` cannot be lower than `empty_queue_backoff_ms`")]
    BackoffCapBelowInitial,
    /// HTTP requests need a non-zero timeout to bound worker suspension.
    #[error("`request_timeout_ms` cannot be zero")]
    RequestTimeoutZero,
    /// Response bodies need a non-zero read bound.
    #[error("`max_response_body_bytes` cannot be zero")]
    MaxResponseBodyBytesZero,
    /// The delivery log needs a destination path.
    #[error("`delivery_log.path` cannot be empty")]
    DeliveryLogPathEmpty,
}
