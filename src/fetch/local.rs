//! Direct, in-process fetching from the authority.
//!
//! Only the process hosting the [`ConfigServer`] may use this strategy. The
//! authority cannot fetch over its own internal API at startup, because that
//! API does not serve until configuration has been read.

use std::sync::Arc;

use crate::config::Category;
use crate::server::ConfigServer;

#[derive(Clone)]
pub struct LocalFetcher {
    server: Arc<ConfigServer>,
}

impl LocalFetcher {
    pub fn new(server: Arc<ConfigServer>) -> Self {
        Self { server }
    }

    /// Read the current raw document from the authority.
    ///
    /// # Panics
    ///
    /// Panics if the authority has not been started. Wiring a local fetcher
    /// to an authority that is not serving is a startup ordering bug.
    pub fn fetch(&self, category: Category) -> String {
        assert!(
            self.server.is_serving(),
            "local {} configuration fetch issued before the configuration server started",
            category
        );
        match category {
            Category::Basic => self.server.raw_basic(),
            Category::Core => self.server.raw_core(),
        }
    }
}
