//! Broadcast shutdown signalling for pipeline tasks.
//!
//! Wraps a tokio watch channel into a dedicated shutdown handle. The signal
//! carries no payload; observing a change (or the sender going away) means
//! "stop accepting new work".

use tokio::sync::watch;

/// Receiver side of the shutdown channel.
///
/// Tasks hold a clone each and observe it at their suspension points via
/// [`watch::Receiver::changed`] or [`watch::Receiver::has_changed`].
pub type ShutdownRx = watch::Receiver<()>;

/// Transmitter side of the shutdown channel.
///
/// Held by the pipeline; cloned handles can be handed to external callers
/// (e.g. a Ctrl+C handler) to trigger shutdown from outside.
#[derive(Debug, Clone)]
pub struct ShutdownTx(watch::Sender<()>);

impl ShutdownTx {
    /// Broadcasts the shutdown signal to all subscribed receivers.
    ///
    /// Fails only when every receiver is already gone, which callers can
    /// safely ignore: there is nothing left to stop.
    pub fn shutdown(&self) -> Result<(), watch::error::SendError<()>> {
        self.0.send(())
    }

    /// Creates a new receiver subscribed to this shutdown signal.
    pub fn subscribe(&self) -> ShutdownRx {
        self.0.subscribe()
    }
}

/// Creates a new shutdown channel.
///
/// The initial value does not count as a signal: receivers only observe
/// shutdowns broadcast after their subscription.
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(());
    (ShutdownTx(tx), rx)
}

/// Returns whether shutdown has been signalled on this receiver.
///
/// A dropped sender counts as a shutdown so that orphaned tasks terminate
/// instead of spinning forever.
pub fn is_shutdown_signaled(rx: &ShutdownRx) -> bool {
    rx.has_changed().unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_is_observed_by_all_subscribers() {
        let (tx, rx) = create_shutdown_channel();
        let other_rx = tx.subscribe();

        assert!(!is_shutdown_signaled(&rx));
        assert!(!is_shutdown_signaled(&other_rx));

        tx.shutdown().unwrap();

        assert!(is_shutdown_signaled(&rx));
        assert!(is_shutdown_signaled(&other_rx));
    }

    #[tokio::test]
    async fn dropped_sender_counts_as_shutdown() {
        let (tx, rx) = create_shutdown_channel();
        drop(tx);

        assert!(is_shutdown_signaled(&rx));
    }
}
