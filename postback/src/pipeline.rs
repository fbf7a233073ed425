use std::sync::Arc;
use std::time::Duration;

use postback_config::shared::PipelineConfig;
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info};

use crate::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use crate::error::PostbackResult;
use crate::executor::HttpExecutor;
use crate::queue::JobQueue;
use crate::sink::RecordSink;
use crate::workers::{ConsumerWorker, DeliveryWorker, WorkerKind, WorkerPool};

#[derive(Debug)]
enum PipelineState {
    NotStarted,
    Started {
        consumers: WorkerPool,
        workers: WorkerPool,
    },
}

/// Supervisor for the postback delivery pipeline.
///
/// Owns the configuration, the shutdown channel, and (once started) the
/// consumer and delivery worker pools joined by one bounded job channel.
/// Collaborators are injected by the caller: the queue client, the HTTP
/// executor, and the record sink. There is no shared mutable state besides
/// the channel itself; each pool task gets its own clone of its
/// collaborators.
#[derive(Debug)]
pub struct Pipeline<Q, S> {
    config: Arc<PipelineConfig>,
    queue: Q,
    executor: HttpExecutor,
    sink: S,
    state: PipelineState,
    shutdown_tx: ShutdownTx,
}

impl<Q, S> Pipeline<Q, S>
where
    Q: JobQueue + Clone + Send + Sync + 'static,
    S: RecordSink + Clone + Send + Sync + 'static,
{
    /// Creates a new pipeline from its configuration and collaborators.
    pub fn new(config: PipelineConfig, queue: Q, executor: HttpExecutor, sink: S) -> Self {
        // Watch channel of unit type: subscribers only care that a shutdown
        // happened, not about any payload.
        let (shutdown_tx, _) = create_shutdown_channel();

        Self {
            config: Arc::new(config),
            queue,
            executor,
            sink,
            state: PipelineState::NotStarted,
            shutdown_tx,
        }
    }

    /// Returns a clonable handle that can trigger shutdown from outside.
    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    /// Starts the pipeline: creates the job channel and spawns both pools.
    pub async fn start(&mut self) -> PostbackResult<()> {
        info!(
            queue_name = %self.config.queue_name,
            consumer_count = self.config.consumer_count,
            worker_count = self.config.worker_count,
            channel_capacity = self.config.channel_capacity,
            "starting delivery pipeline"
        );

        let (job_tx, job_rx) = mpsc::channel(self.config.channel_capacity);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let backoff_initial = Duration::from_millis(self.config.empty_queue_backoff_ms);
        let backoff_max = Duration::from_millis(self.config.empty_queue_backoff_max_ms);

        let mut consumers = WorkerPool::new(WorkerKind::Consumer);
        for worker_id in 0..self.config.consumer_count {
            let consumer = ConsumerWorker::new(
                worker_id,
                self.queue.clone(),
                job_tx.clone(),
                backoff_initial,
                backoff_max,
                self.shutdown_tx.subscribe(),
            );
            consumers.spawn(worker_id, consumer.run());
        }

        // The consumers now hold the only senders. Dropping this one makes
        // channel closure equivalent to "all consumers stopped", which is
        // the drain signal the delivery workers exit on.
        drop(job_tx);

        let mut workers = WorkerPool::new(WorkerKind::Delivery);
        for worker_id in 0..self.config.worker_count {
            let worker = DeliveryWorker::new(
                worker_id,
                self.executor.clone(),
                self.sink.clone(),
                job_rx.clone(),
            );
            workers.spawn(worker_id, worker.run());
        }

        self.state = PipelineState::Started { consumers, workers };

        Ok(())
    }

    /// Waits for the pipeline to terminate.
    ///
    /// Consumers are awaited first: once they are done, every sender is
    /// dropped and the channel closes. The delivery workers then drain
    /// whatever is still buffered and exit on channel closure, so no
    /// accepted job is discarded. Errors from both pools aggregate into one
    /// error value.
    pub async fn wait(self) -> PostbackResult<()> {
        let PipelineState::Started { consumers, workers } = self.state else {
            info!("pipeline was not started, nothing to wait for");

            return Ok(());
        };

        info!("waiting for consumer workers to complete");

        let mut errors = vec![];

        if let Err(err) = consumers.wait_all().await {
            errors.push(err);
        }

        info!("waiting for delivery workers to drain and complete");

        if let Err(err) = workers.wait_all().await {
            errors.push(err);
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        info!("pipeline terminated");

        Ok(())
    }

    /// Signals every consumer to stop accepting new work.
    ///
    /// In-flight deliveries are not cancelled; their per-request timeout
    /// bounds how long the subsequent drain can take.
    pub fn shutdown(&self) {
        info!("shutting down the pipeline");

        if let Err(err) = self.shutdown_tx.shutdown() {
            error!("failed to send shutdown signal to the pipeline: {}", err);
            return;
        }

        info!("shutdown signal sent to all consumers");
    }

    /// Signals shutdown and waits for the drain to complete.
    pub async fn shutdown_and_wait(self) -> PostbackResult<()> {
        self.shutdown();
        self.wait().await
    }
}
