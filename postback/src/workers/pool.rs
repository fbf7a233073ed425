use std::future::Future;

use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info_span};

use crate::error::{ErrorKind, PostbackResult};
use crate::postback_error;

/// Role of the tasks owned by a [`WorkerPool`].
///
/// Used for tracing spans and to classify join failures, so a panicking
/// consumer and a panicking delivery worker are distinguishable in the
/// aggregated shutdown error.
#[derive(Debug, Copy, Clone)]
pub enum WorkerKind {
    /// Tasks popping from the queue and sending into the job channel.
    Consumer,
    /// Tasks receiving from the job channel and delivering postbacks.
    Delivery,
}

/// Pool owning one kind of pipeline task.
///
/// [`WorkerPool`] collects the spawned tasks in a [`JoinSet`] so the
/// pipeline can wait for all of them at once and aggregate any failures
/// into a single error value.
#[derive(Debug)]
pub struct WorkerPool {
    kind: WorkerKind,
    join_set: JoinSet<PostbackResult<()>>,
}

impl WorkerPool {
    /// Creates a new empty pool for the given worker kind.
    pub fn new(kind: WorkerKind) -> Self {
        Self {
            kind,
            join_set: JoinSet::new(),
        }
    }

    /// Spawns a worker task into the pool.
    ///
    /// The task runs inside a tracing span identifying its role and id.
    pub fn spawn<F>(&mut self, worker_id: u16, future: F)
    where
        F: Future<Output = PostbackResult<()>> + Send + 'static,
    {
        let span = match self.kind {
            WorkerKind::Consumer => info_span!("consumer_worker", worker_id),
            WorkerKind::Delivery => info_span!("delivery_worker", worker_id),
        };

        self.join_set.spawn(future.instrument(span));

        debug!(worker_id, kind = ?self.kind, "spawned worker in pool");
    }

    /// Returns the number of tasks still owned by the pool.
    pub fn len(&self) -> usize {
        self.join_set.len()
    }

    /// Returns whether the pool owns no tasks.
    pub fn is_empty(&self) -> bool {
        self.join_set.is_empty()
    }

    /// Waits for every task in the pool to complete.
    ///
    /// Worker errors and panics are collected and returned as one aggregated
    /// error; a single failing worker does not hide the results of its
    /// siblings.
    pub async fn wait_all(mut self) -> PostbackResult<()> {
        let mut errors = Vec::new();

        while let Some(result) = self.join_set.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(kind = ?self.kind, error = %err, "worker completed with an error");
                    errors.push(err);
                }
                Err(join_err) => {
                    if join_err.is_cancelled() {
                        debug!(kind = ?self.kind, "worker task was cancelled");
                    } else {
                        let panic_error = match self.kind {
                            WorkerKind::Consumer => postback_error!(
                                ErrorKind::ConsumerWorkerPanic,
                                "Consumer worker panicked",
                                source: join_err
                            ),
                            WorkerKind::Delivery => postback_error!(
                                ErrorKind::DeliveryWorkerPanic,
                                "Delivery worker panicked",
                                source: join_err
                            ),
                        };
                        errors.push(panic_error);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn waits_for_all_workers() {
        let mut pool = WorkerPool::new(WorkerKind::Delivery);
        for id in 0..4 {
            pool.spawn(id, async { Ok(()) });
        }

        assert_eq!(pool.len(), 4);
        assert!(pool.wait_all().await.is_ok());
    }

    #[tokio::test]
    async fn aggregates_worker_panics() {
        let mut pool = WorkerPool::new(WorkerKind::Consumer);
        pool.spawn(0, async { Ok(()) });
        pool.spawn(1, async { panic!("boom") });

        let err = pool.wait_all().await.unwrap_err();

        assert_eq!(err.kinds(), vec![ErrorKind::ConsumerWorkerPanic]);
    }
}
