//! Cooperative cancellation flag shared between the sweep and the client.

use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation flag flipped by the signal listener and polled by the sweep.
///
/// Cloning is cheap; all clones observe the same flag. The flag only ever
/// transitions from not-cancelled to cancelled.
#[derive(Debug, Clone)]
pub struct CancelFlag {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelFlag {
    /// Creates a new, un-cancelled flag.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Requests cancellation.
    pub fn request(&self) {
        self.sender.send_replace(true);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}
