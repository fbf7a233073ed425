use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{error, info};

use crate::error::PostbackResult;
use crate::executor::HttpExecutor;
use crate::sink::RecordSink;
use crate::types::Job;

/// Receiving half of the job channel, shared by all delivery workers.
///
/// Tokio's mpsc receiver is single-consumer, so workers take turns on it
/// through an async mutex. The lock is held only for the duration of one
/// `recv`, never across a delivery.
pub type SharedJobRx = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Worker that executes deliveries and records their outcomes.
///
/// [`DeliveryWorker`] runs a receive-deliver-record loop. It holds no
/// shutdown receiver: the channel closing (all consumers gone, buffer
/// drained) is its exit signal, which is what guarantees buffered jobs are
/// delivered before the pipeline reports terminated. Each outcome is owned
/// by this worker alone and moved into the sink.
#[derive(Debug)]
pub struct DeliveryWorker<S> {
    worker_id: u16,
    executor: HttpExecutor,
    sink: S,
    job_rx: SharedJobRx,
}

impl<S> DeliveryWorker<S>
where
    S: RecordSink + Send + Sync + 'static,
{
    /// Creates a new delivery worker.
    pub fn new(worker_id: u16, executor: HttpExecutor, sink: S, job_rx: SharedJobRx) -> Self {
        Self {
            worker_id,
            executor,
            sink,
            job_rx,
        }
    }

    /// Runs the delivery loop until the job channel closes.
    pub async fn run(self) -> PostbackResult<()> {
        loop {
            let job = {
                let mut job_rx = self.job_rx.lock().await;
                job_rx.recv().await
            };

            let Some(job) = job else {
                break;
            };

            let outcome = self.executor.deliver(job).await;

            // Sink failures degrade observability, not delivery: the worker
            // stays alive and takes the next job.
            if let Err(err) = self.sink.record(outcome).await {
                error!(error = %err, "failed to record delivery outcome");
            }
        }

        info!(worker_id = self.worker_id, "delivery worker stopped");

        Ok(())
    }
}
