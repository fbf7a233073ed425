use postback::executor::HttpExecutor;
use postback::pipeline::Pipeline;
use postback::queue::{JobQueue, RedisQueue};
use postback::sink::{FileSink, RecordSink};
use postback_config::shared::AgentConfig;
use tracing::{error, info, warn};

use crate::error::AgentResult;

/// Connects all collaborators and runs the pipeline until it terminates.
///
/// Any error returned from here happened before the pipeline was healthy or
/// while tearing it down; steady-state delivery failures are recorded by the
/// pipeline itself and never bubble up.
pub async fn start_agent_with_config(config: AgentConfig) -> AgentResult<()> {
    let queue_name = config.pipeline.queue_name.clone();

    // Both external collaborators must be reachable before any worker
    // spawns; a failure here exits the process.
    let queue = RedisQueue::connect(config.queue, queue_name).await?;
    let sink = FileSink::create(&config.delivery_log.path).await?;
    let executor = HttpExecutor::new(&config.http)?;

    let pipeline = Pipeline::new(config.pipeline, queue, executor, sink);

    run_pipeline(pipeline).await
}

/// Starts the pipeline and couples it to the process lifecycle.
async fn run_pipeline<Q, S>(mut pipeline: Pipeline<Q, S>) -> AgentResult<()>
where
    Q: JobQueue + Clone + Send + Sync + 'static,
    S: RecordSink + Clone + Send + Sync + 'static,
{
    pipeline.start().await?;

    // Listen for Ctrl+C and trigger the cooperative shutdown drain.
    let shutdown_tx = pipeline.shutdown_tx();
    let shutdown_handle = tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {err}");
            return;
        }

        info!("Ctrl+C received, shutting down pipeline");
        if let Err(err) = shutdown_tx.shutdown() {
            warn!("failed to send shutdown signal: {err}");
        }
    });

    let result = pipeline.wait().await;

    // If the pipeline finished before Ctrl+C, the signal task is still
    // pending; abort it so the process can exit.
    shutdown_handle.abort();
    let _ = shutdown_handle.await;

    result?;

    Ok(())
}
