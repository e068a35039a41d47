//! Fetch raw documents from the authority's internal API.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::Category;
use crate::fetch::{FetchError, FetchResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of a category's raw document, relative to the internal API root.
pub fn raw_document_path(category: Category) -> String {
    format!(".internal/configuration/{}/raw", category)
}

/// HTTP client for the internal configuration API.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
    base: Url,
}

impl RemoteFetcher {
    /// Create a fetcher for the internal API rooted at `base_url`.
    pub fn new(base_url: &str) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|source| FetchError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> FetchResult<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    pub fn endpoint(&self, category: Category) -> FetchResult<Url> {
        Ok(self.base.join(&raw_document_path(category))?)
    }

    pub async fn fetch(&self, category: Category) -> FetchResult<String> {
        let url = self.endpoint(category)?;
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let fetcher = RemoteFetcher::new("http://127.0.0.1:3090").unwrap();
        assert_eq!(
            fetcher.endpoint(Category::Basic).unwrap().as_str(),
            "http://127.0.0.1:3090/.internal/configuration/basic/raw"
        );

        let fetcher = RemoteFetcher::new("http://frontend/api").unwrap();
        assert_eq!(
            fetcher.endpoint(Category::Core).unwrap().as_str(),
            "http://frontend/api/.internal/configuration/core/raw"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            RemoteFetcher::new("not a url"),
            Err(FetchError::Url(_))
        ));
    }
}
