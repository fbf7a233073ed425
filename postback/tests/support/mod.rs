use std::future::Future;
use std::time::Duration;

use postback::sink::MemorySink;
use postback_config::shared::{HttpClientConfig, PipelineConfig};

/// How long polling helpers wait before failing the test.
const WAIT_DEADLINE: Duration = Duration::from_secs(10);

/// Pipeline configuration with short backoffs, suitable for tests.
pub fn test_pipeline_config(consumer_count: u16, worker_count: u16) -> PipelineConfig {
    PipelineConfig {
        queue_name: "postbacks".to_string(),
        consumer_count,
        worker_count,
        channel_capacity: 16,
        empty_queue_backoff_ms: 10,
        empty_queue_backoff_max_ms: 50,
    }
}

/// HTTP client configuration with a short timeout, suitable for tests.
pub fn test_http_config(request_timeout_ms: u64) -> HttpClientConfig {
    HttpClientConfig {
        request_timeout_ms,
        ..HttpClientConfig::default()
    }
}

/// Waits until the sink holds at least `expected` outcomes.
///
/// # Panics
///
/// Panics when the deadline elapses first, so tests fail fast instead of
/// hanging on a stuck pipeline.
pub async fn wait_for_outcomes(sink: &MemorySink, expected: usize) {
    let deadline = tokio::time::Instant::now() + WAIT_DEADLINE;

    while sink.len().await < expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {expected} outcomes, sink holds {}",
            sink.len().await
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Waits until `condition` returns true.
///
/// # Panics
///
/// Panics when the deadline elapses first.
pub async fn wait_until<F, Fut>(description: &str, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT_DEADLINE;

    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting until {description}"
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
