use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::concurrency::shutdown::{ShutdownRx, is_shutdown_signaled};
use crate::error::PostbackResult;
use crate::queue::JobQueue;
use crate::types::Job;

/// Exponential backoff for an empty or erroring queue.
///
/// Doubles from the initial interval up to the cap; a successful pop resets
/// it. Keeps an idle agent from hammering the queue while still reacting
/// quickly once messages arrive again.
#[derive(Debug, Clone)]
struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Returns the delay to sleep now and advances to the next interval.
    fn next(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Worker that drains the queue into the job channel.
///
/// [`ConsumerWorker`] runs a pop-decode-send loop until shutdown is
/// signalled. Decode failures are logged and the message dropped; the loop
/// itself only ends on shutdown or when the job channel has no receivers
/// left. Sending on the bounded channel is the pipeline's backpressure
/// point: while workers are saturated the send blocks, which stops queue
/// draining.
#[derive(Debug)]
pub struct ConsumerWorker<Q> {
    worker_id: u16,
    queue: Q,
    job_tx: mpsc::Sender<Job>,
    backoff_initial: Duration,
    backoff_max: Duration,
    shutdown_rx: ShutdownRx,
}

impl<Q> ConsumerWorker<Q>
where
    Q: JobQueue + Send + Sync + 'static,
{
    /// Creates a new consumer worker.
    pub fn new(
        worker_id: u16,
        queue: Q,
        job_tx: mpsc::Sender<Job>,
        backoff_initial: Duration,
        backoff_max: Duration,
        shutdown_rx: ShutdownRx,
    ) -> Self {
        Self {
            worker_id,
            queue,
            job_tx,
            backoff_initial,
            backoff_max,
            shutdown_rx,
        }
    }

    /// Runs the consumer loop until shutdown.
    ///
    /// Shutdown is observed between iterations and during the backoff sleep,
    /// never by cancelling an in-flight pop: a popped message is always
    /// decoded and sent before the loop re-checks the signal, so no message
    /// is dropped between queue and channel.
    pub async fn run(mut self) -> PostbackResult<()> {
        let mut backoff = Backoff::new(self.backoff_initial, self.backoff_max);

        loop {
            if is_shutdown_signaled(&self.shutdown_rx) {
                break;
            }

            match self.queue.pop().await {
                Ok(Some(raw)) => {
                    backoff.reset();

                    match Job::decode(&raw) {
                        Ok(job) => {
                            if self.job_tx.send(job).await.is_err() {
                                warn!("job channel closed, stopping consumer");
                                break;
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "dropping undecodable queue message");
                        }
                    }
                }
                Ok(None) => {
                    debug!("queue empty, backing off");
                    if self.sleep(&mut backoff).await {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "queue pop failed, backing off");
                    if self.sleep(&mut backoff).await {
                        break;
                    }
                }
            }
        }

        info!(worker_id = self.worker_id, "consumer worker stopped");

        Ok(())
    }

    /// Sleeps the current backoff interval, waking early on shutdown.
    ///
    /// Returns whether shutdown was signalled. Awaiting `changed` marks the
    /// signal as seen, so the caller must act on the return value rather
    /// than re-checking the receiver.
    async fn sleep(&mut self, backoff: &mut Backoff) -> bool {
        let delay = backoff.next();

        tokio::select! {
            () = tokio::time::sleep(delay) => false,
            _ = self.shutdown_rx.changed() => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(350));

        assert_eq!(backoff.next(), Duration::from_millis(100));
        assert_eq!(backoff.next(), Duration::from_millis(200));
        assert_eq!(backoff.next(), Duration::from_millis(350));
        assert_eq!(backoff.next(), Duration::from_millis(350));
    }

    #[test]
    fn backoff_resets_to_the_initial_interval() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));

        backoff.next();
        backoff.next();
        backoff.reset();

        assert_eq!(backoff.next(), Duration::from_millis(100));
    }
}
