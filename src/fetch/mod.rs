//! Raw document fetching.
//!
//! # Strategies
//! ```text
//! Remote: GET {internal_api}/.internal/configuration/{category}/raw
//! Local:  read straight from the in-process ConfigServer (authority only)
//! Fixed:  in-memory documents (test role)
//! ```
//!
//! # Design Decisions
//! - The strategy is chosen once at startup from the process role
//! - The authority must read locally; calling its own not-yet-serving API
//!   during startup would deadlock
//! - Fetchers return opaque text; parsing belongs to the store

pub mod fixed;
pub mod local;
pub mod remote;

use thiserror::Error;

use crate::config::Category;

pub use fixed::FixedFetcher;
pub use local::LocalFetcher;
pub use remote::RemoteFetcher;

/// Errors that can occur while retrieving a raw document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The internal API answered with a non-success status.
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The internal API base URL is unusable.
    #[error("invalid internal API URL: {0}")]
    Url(#[from] url::ParseError),

    /// No document is available for the category.
    #[error("no {0} configuration document available")]
    Missing(Category),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// The source a client reads raw documents from.
#[derive(Clone)]
pub enum Fetcher {
    Remote(RemoteFetcher),
    Local(LocalFetcher),
    Fixed(FixedFetcher),
}

impl Fetcher {
    /// Retrieve the latest raw document for `category`.
    pub async fn fetch(&self, category: Category) -> FetchResult<String> {
        match self {
            Fetcher::Remote(remote) => remote.fetch(category).await,
            Fetcher::Local(local) => Ok(local.fetch(category)),
            Fetcher::Fixed(fixed) => fixed.fetch(category),
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Fetcher::Remote(_) => "remote",
            Fetcher::Local(_) => "local",
            Fetcher::Fixed(_) => "fixed",
        }
    }
}

impl From<RemoteFetcher> for Fetcher {
    fn from(remote: RemoteFetcher) -> Self {
        Fetcher::Remote(remote)
    }
}

impl From<LocalFetcher> for Fetcher {
    fn from(local: LocalFetcher) -> Self {
        Fetcher::Local(local)
    }
}

impl From<FixedFetcher> for Fetcher {
    fn from(fixed: FixedFetcher) -> Self {
        Fetcher::Fixed(fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_dispatch() {
        let fetcher = Fetcher::from(FixedFetcher::new("{}", r#"{"maintenanceMode": true}"#));
        assert_eq!(fetcher.strategy(), "fixed");
        assert_eq!(
            fetcher.fetch(Category::Core).await.unwrap(),
            r#"{"maintenanceMode": true}"#
        );
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::Missing(Category::Basic);
        assert_eq!(err.to_string(), "no basic configuration document available");
    }
}
