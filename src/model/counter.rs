//! Shared play-count store

use std::sync::Arc;
use tokio::sync::watch;

/// Process-wide count of track starts.
///
/// Cloning hands out another reference to the same store. Every mutation is a
/// single `watch` update, so subscribers never see a partial change.
#[derive(Clone, Debug)]
pub struct ClickCounter {
    tx: Arc<watch::Sender<u64>>,
}

impl ClickCounter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn increment(&self) {
        self.tx.send_modify(|count| *count += 1);
    }

    pub fn reset(&self) {
        self.tx.send_replace(0);
    }

    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for ClickCounter {
    fn default() -> Self {
        Self::new()
    }
}
