//! Configuration client: the process-wide view of the site configuration.
//!
//! # Data Flow
//! ```text
//! refresh loop (refresh.rs)
//!     → Fetcher::fetch (per category)
//!     → ConfigStore::maybe_update
//!     → on change: WatcherRegistry::notify_all (watchers.rs)
//!     → each watcher task wakes and calls its callback
//!     → callback re-reads via Client::get
//! ```
//!
//! # Design Decisions
//! - Reads never touch the fetchers or the refresh loop
//! - Basic and core are independent: no cross-category atomicity
//! - Notifications carry no payload; watchers always re-read full state

pub mod error;
pub mod refresh;
pub mod watchers;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{BasicSiteConfiguration, Category, ConfigStore, CoreSiteConfiguration};
use crate::fetch::Fetcher;
use crate::lifecycle::{Shutdown, ShutdownSignal};

pub use error::{ConfError, RefreshErrors};
pub use refresh::REFRESH_JITTER;
pub use watchers::WatcherRegistry;

/// Composite view of the current basic and core snapshots.
///
/// The two halves may have been accepted at different times.
#[derive(Debug, Clone)]
pub struct SiteConfiguration {
    pub basic: Arc<BasicSiteConfiguration>,
    pub core: Arc<CoreSiteConfiguration>,
}

/// Orchestrates fetching, validation and change notification.
pub struct Client {
    basic_store: ConfigStore<BasicSiteConfiguration>,
    basic_fetcher: Fetcher,

    core_store: ConfigStore<CoreSiteConfiguration>,
    core_fetcher: Fetcher,

    watchers: WatcherRegistry,
    refresh_jitter: Duration,
    shutdown: Shutdown,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(basic_fetcher: Fetcher, core_fetcher: Fetcher) -> Self {
        Self {
            basic_store: ConfigStore::new(Category::Basic),
            basic_fetcher,
            core_store: ConfigStore::new(Category::Core),
            core_fetcher,
            watchers: WatcherRegistry::new(),
            refresh_jitter: REFRESH_JITTER,
            shutdown: Shutdown::new(),
        }
    }

    /// Override the upper bound of the random delay between refreshes.
    pub fn with_refresh_jitter(mut self, jitter: Duration) -> Self {
        self.refresh_jitter = jitter;
        self
    }

    /// Return the current configuration. The snapshots never change after
    /// being returned; call `get` again to observe updates.
    ///
    /// Configuration can change while the process runs. Call this from a
    /// [`watch`](Self::watch) callback, or per user action (e.g. per request),
    /// so that changes take effect without a restart.
    pub fn get(&self) -> SiteConfiguration {
        SiteConfiguration {
            basic: self.basic_store.last_valid(),
            core: self.core_store.last_valid(),
        }
    }

    /// Same as [`get`](Self::get), for call sites not yet audited for whether
    /// they should use [`watch`](Self::watch) instead.
    pub fn get_todo(&self) -> SiteConfiguration {
        self.get()
    }

    /// Force the basic configuration. `None` removes the override.
    pub fn mock_basic(&self, value: Option<BasicSiteConfiguration>) {
        self.basic_store.mock(value);
    }

    /// Force the core configuration. `None` removes the override.
    pub fn mock_core(&self, value: Option<CoreSiteConfiguration>) {
        self.core_store.mock(value);
    }

    /// Call `f` now and again whenever the configuration changes.
    ///
    /// Waits until both categories are initialized, invokes `f` once before
    /// returning, then spawns a task that invokes `f` after each change. A
    /// burst of changes may produce a single invocation; `f` should read the
    /// new state with [`get`](Self::get). Invocations of one `f` never overlap.
    ///
    /// Later invocations run on the blocking pool, so a slow `f` holds no
    /// runtime worker and never delays the refresher.
    pub async fn watch<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        // Register before the first call so a change during it is not lost.
        let mut notify = self.watchers.register();

        self.basic_store.wait_until_initialized().await;
        self.core_store.wait_until_initialized().await;
        f();

        let f = Arc::new(f);
        let mut shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    signal = notify.recv() => match signal {
                        Some(()) => {
                            let f = f.clone();
                            if let Err(e) = tokio::task::spawn_blocking(move || f()).await {
                                tracing::error!(error = %e, "Configuration watcher panicked");
                            }
                        }
                        None => break,
                    },
                    _ = shutdown.recv() => break,
                }
            }
        });
    }

    pub fn basic_store(&self) -> &ConfigStore<BasicSiteConfiguration> {
        &self.basic_store
    }

    pub fn core_store(&self) -> &ConfigStore<CoreSiteConfiguration> {
        &self.core_store
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Stop the refresher and every watcher task.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.subscribe()
    }

    pub(crate) fn notify_watchers(&self) {
        let delivered = self.watchers.notify_all();
        tracing::debug!(delivered, "Notified configuration watchers");
    }
}
