use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::PostbackResult;
use crate::sink::base::RecordSink;
use crate::types::DeliveryOutcome;

/// In-memory record sink for testing and development purposes.
///
/// [`MemorySink`] accumulates every outcome it is handed, so tests can
/// inspect exactly what the pipeline produced.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Vec<DeliveryOutcome>>>,
}

impl MemorySink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded outcomes.
    pub async fn outcomes(&self) -> Vec<DeliveryOutcome> {
        let inner = self.inner.lock().await;
        inner.clone()
    }

    /// Returns the number of recorded outcomes.
    pub async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.len()
    }

    /// Returns whether nothing has been recorded yet.
    pub async fn is_empty(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.is_empty()
    }

    /// Clears all recorded outcomes.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.clear();
    }
}

impl RecordSink for MemorySink {
    async fn record(&self, outcome: DeliveryOutcome) -> PostbackResult<()> {
        let mut inner = self.inner.lock().await;
        inner.push(outcome);

        Ok(())
    }
}
