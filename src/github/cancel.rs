//! Cooperative cancellation for in-progress searches.
//!
//! A [`CancellationHandle`] is kept by whoever may abort the search (the CLI
//! wires it to Ctrl-C); the matching [`CancellationSignal`] is passed into the
//! pipeline, which races every remote call and delay against it.

use tokio::sync::watch;

/// Creates a connected handle and signal.
#[must_use]
pub fn cancellation() -> (CancellationHandle, CancellationSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        CancellationHandle { sender },
        CancellationSignal { receiver },
    )
}

/// Requests cancellation.
#[derive(Debug)]
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

impl CancellationHandle {
    /// Marks every connected signal as cancelled. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Observes cancellation requests.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    receiver: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// A signal that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        let (_, receiver) = watch::channel(false);
        Self { receiver }
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Completes once cancellation is requested.
    ///
    /// Never completes when the handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::{CancellationSignal, cancellation};

    #[rstest]
    #[tokio::test]
    async fn cancel_wakes_waiting_signal() {
        let (handle, signal) = cancellation();
        let waiter = tokio::spawn({
            let observed = signal.clone();
            async move { observed.cancelled().await }
        });

        handle.cancel();

        waiter.await.expect("waiter should finish");
        assert!(signal.is_cancelled());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn never_signal_does_not_complete() {
        let signal = CancellationSignal::never();
        let outcome = tokio::time::timeout(Duration::from_secs(3600), signal.cancelled()).await;
        assert!(outcome.is_err());
        assert!(!signal.is_cancelled());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn dropped_handle_does_not_cancel() {
        let (handle, signal) = cancellation();
        drop(handle);
        let outcome = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(outcome.is_err());
    }
}
