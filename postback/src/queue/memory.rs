use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::PostbackResult;
use crate::queue::base::JobQueue;

/// In-memory work queue for testing and development purposes.
///
/// [`MemoryQueue`] holds raw messages in a FIFO buffer. Clones share the
/// same buffer, matching the production setup where all consumers pop from
/// one queue.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    inner: Arc<Mutex<VecDeque<String>>>,
}

impl MemoryQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw message to the back of the queue.
    pub async fn push(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.push_back(message.into());
    }

    /// Returns the number of messages currently buffered.
    pub async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.len()
    }

    /// Returns whether the queue is currently empty.
    pub async fn is_empty(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.is_empty()
    }
}

impl JobQueue for MemoryQueue {
    async fn pop(&self) -> PostbackResult<Option<String>> {
        let mut inner = self.inner.lock().await;

        Ok(inner.pop_front())
    }
}
