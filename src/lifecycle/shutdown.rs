//! Shutdown coordination.

use tokio::sync::broadcast;

/// Broadcasts a single "stop now" signal to the server and anything else that
/// should wind down with it.
///
/// Clones share one channel. Subscribe before moving the coordinator into the
/// task that triggers it.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a coordinator with no subscribers yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// A receiver for [`HttpServer::run`](crate::HttpServer::run).
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Calling it with no subscribers is harmless.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
