//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the stores and fetchers for the process role
//! - In server mode, start the authority before wiring local fetchers
//! - In test mode, seed both stores synchronously
//! - Start the refresh loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The authority starts before anything reads configuration; reversing the
//!   order makes the authority wait on its own internal API

use std::sync::Arc;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::client::Client;
use crate::config::{Category, StoreError};
use crate::fetch::{FetchError, Fetcher, FixedFetcher, LocalFetcher, RemoteFetcher};
use crate::server::{ConfigServer, ServerError};
use crate::settings::{Mode, Settings};

/// Document both stores are seeded with in test mode.
pub const PLACEHOLDER_DOCUMENT: &str = "{\n  // This is an empty configuration to run test cases.\n}\n";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to start configuration server: {0}")]
    Server(#[from] ServerError),

    #[error("failed to create remote fetcher: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to seed {category} store for test mode: {source}")]
    Seed {
        category: Category,
        #[source]
        source: StoreError,
    },
}

/// Everything started for the process role.
pub struct Services {
    pub mode: Mode,
    pub client: Arc<Client>,
    /// Present in server mode.
    pub authority: Option<Arc<ConfigServer>>,
    /// Present in test mode; replace its documents to drive the refresher.
    pub fixed: Option<FixedFetcher>,
    pub refresher: JoinHandle<()>,
}

impl Services {
    /// Trigger shutdown and wait for the refresher to exit.
    pub async fn stop(self) -> Result<(), JoinError> {
        self.client.shutdown();
        self.refresher.await.inspect_err(|e| {
            tracing::error!(error = %e, "Configuration refresher task failed");
        })
    }
}

/// Build and start the configuration client for `settings.mode`.
///
/// Must be called from within a Tokio runtime.
pub fn start(settings: &Settings) -> Result<Services, StartupError> {
    let mut authority = None;
    let mut fixed = None;

    let client = match settings.mode {
        Mode::Test => {
            let documents = FixedFetcher::new(PLACEHOLDER_DOCUMENT, PLACEHOLDER_DOCUMENT);
            let client = Client::new(documents.clone().into(), documents.clone().into());
            seed(&client)?;
            fixed = Some(documents);
            client
        }
        Mode::Server => {
            let server = Arc::new(ConfigServer::new(settings.basic_file.clone(), settings.core_file.clone()));
            server.start()?;
            let local = LocalFetcher::new(server.clone());
            authority = Some(server);
            Client::new(local.clone().into(), local.into())
        }
        Mode::Client => {
            let remote = RemoteFetcher::new(&settings.internal_api)?;
            Client::new(Fetcher::from(remote.clone()), Fetcher::from(remote))
        }
    };

    let client = Arc::new(client);
    let refresher = client.spawn_refresher();
    tracing::info!(mode = %settings.mode, "Configuration client started");

    Ok(Services {
        mode: settings.mode,
        client,
        authority,
        fixed,
        refresher,
    })
}

fn seed(client: &Client) -> Result<(), StartupError> {
    client
        .basic_store()
        .maybe_update(PLACEHOLDER_DOCUMENT)
        .map_err(|source| StartupError::Seed {
            category: Category::Basic,
            source,
        })?;
    client
        .core_store()
        .maybe_update(PLACEHOLDER_DOCUMENT)
        .map_err(|source| StartupError::Seed {
            category: Category::Core,
            source,
        })?;
    Ok(())
}
