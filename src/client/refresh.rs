//! Background refresh loop.
//!
//! # Per-category cycle
//! ```text
//! Fetching → Validating → Applied(changed) | Rejected | FetchFailed
//!     → jitter sleep → Fetching
//! ```
//!
//! # Design Decisions
//! - Failures are logged and retried next iteration; they never stop the loop
//! - Categories are notified independently; a core failure does not hold
//!   back a basic change from the same iteration
//! - The sleep between iterations is random in `[0, jitter)` so a fleet of
//!   processes does not poll the authority in lockstep

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use crate::client::{Client, ConfError, RefreshErrors};
use crate::config::{Category, ConfigChange};
use crate::observability::metrics;

/// Default upper bound of the delay between refresh iterations.
pub const REFRESH_JITTER: Duration = Duration::from_secs(5);

/// Uniformly random delay in `[0, max)`.
pub fn jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
}

impl Client {
    /// Spawn the refresh loop. It runs until [`Client::shutdown`].
    pub fn spawn_refresher(self: &Arc<Self>) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move { client.run_refresher().await })
    }

    async fn run_refresher(&self) {
        let mut shutdown = self.shutdown_signal();
        tracing::info!(
            basic = self.basic_fetcher.strategy(),
            core = self.core_fetcher.strategy(),
            "Configuration refresher starting"
        );

        loop {
            if let Err(errors) = self.refresh_once().await {
                tracing::warn!(error = %errors, "Received errors during background config updates");
            }

            tokio::select! {
                _ = tokio::time::sleep(jitter(self.refresh_jitter)) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Configuration refresher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one refresh iteration over both categories.
    pub async fn refresh_once(&self) -> Result<(), RefreshErrors> {
        let mut errors = Vec::new();

        for category in Category::ALL {
            if let Err(e) = self.fetch_and_update(category).await {
                match &e {
                    ConfError::Fetch { .. } => metrics::record_fetch_error(category),
                    ConfError::Update { .. } => metrics::record_rejected(category),
                }
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RefreshErrors(errors))
        }
    }

    async fn fetch_and_update(&self, category: Category) -> Result<ConfigChange, ConfError> {
        let fetcher = match category {
            Category::Basic => &self.basic_fetcher,
            Category::Core => &self.core_fetcher,
        };

        let raw = fetcher
            .fetch(category)
            .await
            .map_err(|source| ConfError::Fetch { category, source })?;

        let change = match category {
            Category::Basic => self.basic_store.maybe_update(&raw),
            Category::Core => self.core_store.maybe_update(&raw),
        }
        .map_err(|source| ConfError::Update { category, source })?;

        if change.changed {
            tracing::info!(category = %category, "Configuration changed");
            metrics::record_update(category);
            self.notify_watchers();
        } else {
            tracing::debug!(category = %category, "Configuration unchanged");
        }
        Ok(change)
    }
}
