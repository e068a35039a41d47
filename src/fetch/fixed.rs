//! In-memory documents for the test role.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::config::Category;
use crate::fetch::{FetchError, FetchResult};

/// Serves documents held in memory. Clones share the same documents.
#[derive(Clone, Default)]
pub struct FixedFetcher {
    basic: Arc<ArcSwapOption<String>>,
    core: Arc<ArcSwapOption<String>>,
}

impl FixedFetcher {
    pub fn new(basic: impl Into<String>, core: impl Into<String>) -> Self {
        let fetcher = Self::default();
        fetcher.set(Category::Basic, basic);
        fetcher.set(Category::Core, core);
        fetcher
    }

    /// Replace the document served for `category`.
    pub fn set(&self, category: Category, raw: impl Into<String>) {
        self.slot(category).store(Some(Arc::new(raw.into())));
    }

    /// Remove the document for `category`; fetches fail until it is set again.
    pub fn clear(&self, category: Category) {
        self.slot(category).store(None);
    }

    pub fn fetch(&self, category: Category) -> FetchResult<String> {
        self.slot(category)
            .load_full()
            .map(|raw| raw.as_ref().clone())
            .ok_or(FetchError::Missing(category))
    }

    fn slot(&self, category: Category) -> &ArcSwapOption<String> {
        match category {
            Category::Basic => &self.basic,
            Category::Core => &self.core,
        }
    }
}
