//! Watcher registry with coalescing notification channels.
//!
//! Every watcher owns a channel with room for exactly one pending signal.
//! Broadcasting never blocks: a full channel already has a wakeup pending,
//! which is enough because watchers re-read the whole configuration.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::observability::metrics;

#[derive(Default)]
pub struct WatcherRegistry {
    watchers: Mutex<Vec<mpsc::Sender<()>>>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new watcher and return its receiving end.
    pub fn register(&self) -> mpsc::Receiver<()> {
        let (tx, rx) = mpsc::channel(1);
        let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        watchers.push(tx);
        metrics::record_watchers(watchers.len());
        rx
    }

    /// Signal every watcher without blocking.
    ///
    /// Returns how many watchers received a new signal; watchers that already
    /// had one pending are skipped. Watchers whose receiver is gone are pruned.
    pub fn notify_all(&self) -> usize {
        let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        watchers.retain(|tx| match tx.try_send(()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(())) => true,
            Err(TrySendError::Closed(())) => false,
        });
        metrics::record_watchers(watchers.len());
        delivered
    }

    pub fn len(&self) -> usize {
        self.watchers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_coalesce() {
        let registry = WatcherRegistry::new();
        let mut rx = registry.register();

        assert_eq!(registry.notify_all(), 1);
        assert_eq!(registry.notify_all(), 0);
        assert_eq!(registry.notify_all(), 0);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        assert_eq!(registry.notify_all(), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_undrained_watcher_does_not_block_others() {
        let registry = WatcherRegistry::new();
        let _stalled = registry.register();
        let mut active = registry.register();

        for _ in 0..1000 {
            registry.notify_all();
            let _ = active.try_recv();
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_closed_watchers_pruned() {
        let registry = WatcherRegistry::new();
        let rx = registry.register();
        let _kept = registry.register();
        drop(rx);

        registry.notify_all();
        assert_eq!(registry.len(), 1);
    }
}
