//! Shutdown coordination.
//!
//! A single producer ([`Shutdown`]) flips a watch channel; any number of
//! [`ShutdownSignal`] receivers observe it. Receivers created after the
//! trigger still see it.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown notification.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown notification. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
        tracing::debug!("Shutdown signal sent");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to tasks that must stop on shutdown.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait for the shutdown notification.
    ///
    /// A dropped [`Shutdown`] counts as a notification.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }

    /// Non-blocking check.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn initially_not_shutdown() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        assert!(!signal.is_shutdown());
    }

    #[tokio::test]
    async fn wait_completes_on_trigger() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown.trigger();
            // keep the sender alive past the trigger
            tokio::time::sleep(Duration::from_millis(50)).await;
        });

        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .expect("wait() should complete when shutdown is triggered");
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn late_subscribers_see_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut late = shutdown.subscribe();
        assert!(late.is_shutdown());
        tokio::time::timeout(Duration::from_millis(100), late.wait())
            .await
            .expect("late subscriber should not block");
    }

    #[tokio::test]
    async fn dropped_coordinator_releases_waiters() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        drop(shutdown);

        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .expect("wait() should return once the sender is gone");
    }

    #[test]
    fn clones_share_state() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = a.clone();

        shutdown.trigger();
        assert!(a.is_shutdown());
        assert!(b.is_shutdown());
    }
}
