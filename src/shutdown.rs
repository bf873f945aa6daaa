//! Cooperative shutdown signalling.
//!
//! The server owns a `watch::Sender<bool>`; every background task and every
//! connection task holds a [`Shutdown`] built from a receiver. Tasks only check
//! for shutdown at their await points, so a store operation is never interrupted.

use tokio::sync::watch;

/// Listens for the server shutdown signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// `true` once the signal has been observed
    is_shutdown: bool,

    notify: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new(notify: watch::Receiver<bool>) -> Self {
        Self {
            is_shutdown: false,
            notify,
        }
    }

    /// Returns `true` if the shutdown signal has been received.
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown || *self.notify.borrow()
    }

    /// Waits for the shutdown signal.
    ///
    /// A dropped sender counts as a shutdown.
    pub async fn recv(&mut self) {
        if self.is_shutdown {
            return;
        }

        let _ = self.notify.wait_for(|stop| *stop).await;
        self.is_shutdown = true;
    }
}
