//! Validating per-category configuration store.
//!
//! # Responsibilities
//! - Parse and validate raw documents
//! - Hold the last valid snapshot and hand it out without locking
//! - Report whether an accepted document changed the effective value
//! - Hold an optional mock override for tests
//!
//! # Design Decisions
//! - Snapshots are `Arc`s that are replaced, never mutated
//! - A rejected document leaves the snapshot and initialization state untouched
//! - Initialization is one-way: once a value exists the store never goes back

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::{ArcSwap, ArcSwapOption};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::watch;

use crate::config::jsonc;
use crate::config::schema::Category;
use crate::config::validation::{join_errors, Validate, ValidationError};

/// Errors returned when a raw document is rejected.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document is not well-formed or does not match the schema.
    #[error("malformed {category} configuration: {source}")]
    Parse {
        category: Category,
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but failed semantic validation.
    #[error("invalid {category} configuration: {}", join_errors(.errors))]
    Invalid {
        category: Category,
        errors: Vec<ValidationError>,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of an accepted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigChange {
    /// The effective (fetched) value differs from the previous one.
    pub changed: bool,
}

/// Holds the last valid configuration for one category.
pub struct ConfigStore<T> {
    category: Category,
    last_valid: ArcSwap<T>,
    mock: ArcSwapOption<T>,
    /// Serializes writers so compare-and-replace is atomic.
    update_lock: Mutex<()>,
    initialized: watch::Sender<bool>,
}

impl<T> ConfigStore<T>
where
    T: Default + DeserializeOwned + PartialEq + Validate,
{
    /// Create an empty, uninitialized store.
    ///
    /// Until the first accepted document (or mock) the store hands out
    /// `T::default()`, which is what an empty document parses to.
    pub fn new(category: Category) -> Self {
        let (initialized, _) = watch::channel(false);
        Self {
            category,
            last_valid: ArcSwap::from_pointee(T::default()),
            mock: ArcSwapOption::empty(),
            update_lock: Mutex::new(()),
            initialized,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Return the current snapshot. Never blocks.
    ///
    /// A mock override, when set, takes precedence over fetched values.
    pub fn last_valid(&self) -> Arc<T> {
        if let Some(mocked) = self.mock.load_full() {
            return mocked;
        }
        self.last_valid.load_full()
    }

    /// Parse, validate, and conditionally apply a raw document.
    pub fn maybe_update(&self, raw: &str) -> StoreResult<ConfigChange> {
        let parsed: T = jsonc::parse(raw).map_err(|source| StoreError::Parse {
            category: self.category,
            source,
        })?;

        parsed.validate().map_err(|errors| StoreError::Invalid {
            category: self.category,
            errors,
        })?;

        let _guard = self
            .update_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let was_initialized = self.is_initialized();
        if was_initialized && **self.last_valid.load() == parsed {
            return Ok(ConfigChange { changed: false });
        }

        self.last_valid.store(Arc::new(parsed));
        self.mark_initialized();
        Ok(ConfigChange { changed: true })
    }

    /// Force the effective value, bypassing fetch and validation.
    ///
    /// `None` clears the override and the store reverts to its last fetched
    /// value. Overrides are sticky: a test that sets one must clear it, or
    /// later tests sharing the client will observe it.
    pub fn mock(&self, value: Option<T>) {
        match value {
            Some(value) => {
                self.mock.store(Some(Arc::new(value)));
                self.mark_initialized();
            }
            None => self.mock.store(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        *self.initialized.borrow()
    }

    /// Wait until the store holds a fetched or mocked value.
    pub async fn wait_until_initialized(&self) {
        let mut rx = self.initialized.subscribe();
        // The sender lives as long as `self`, so this only returns once initialized.
        let _ = rx.wait_for(|initialized| *initialized).await;
    }

    fn mark_initialized(&self) {
        self.initialized.send_if_modified(|initialized| {
            if *initialized {
                false
            } else {
                *initialized = true;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BasicSiteConfiguration;
    use std::time::Duration;

    fn store() -> ConfigStore<BasicSiteConfiguration> {
        ConfigStore::new(Category::Basic)
    }

    #[test]
    fn test_first_update_initializes() {
        let store = store();
        assert!(!store.is_initialized());

        let change = store.maybe_update("{}").unwrap();
        assert!(change.changed);
        assert!(store.is_initialized());
    }

    #[test]
    fn test_rejection_isolation() {
        let store = store();
        store
            .maybe_update(r#"{"externalURL": "https://a.example.com"}"#)
            .unwrap();
        let before = store.last_valid();

        let err = store.maybe_update(r#"{"externalURL": "#).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));

        let err = store.maybe_update(r#"{"maxReposToSearch": 0}"#).unwrap_err();
        assert!(matches!(err, StoreError::Invalid { .. }));
        assert!(err.to_string().contains("maxReposToSearch"));

        assert_eq!(*store.last_valid(), *before);
        assert!(store.is_initialized());
    }

    #[test]
    fn test_rejection_before_init_keeps_uninitialized() {
        let store = store();
        assert!(store.maybe_update(r#"{"disableTelemetry": "yes"}"#).is_err());
        assert!(!store.is_initialized());
    }

    #[test]
    fn test_untyped_keys_are_changes() {
        let store = store();
        assert!(store.maybe_update("{}").unwrap().changed);

        let change = store.maybe_update(r#"{"a":1}"#).unwrap();
        assert!(change.changed);
        assert_eq!(store.last_valid().extra.get("a"), Some(&serde_json::json!(1)));

        assert!(!store.maybe_update(r#"{ "a": 1, }"#).unwrap().changed);
    }

    #[test]
    fn test_cosmetic_changes_not_reported() {
        let store = store();
        assert!(store
            .maybe_update(r#"{"externalURL": "https://a.example.com", "disableTelemetry": true}"#)
            .unwrap()
            .changed);

        let reformatted = r#"
        {
            // reordered and commented
            "disableTelemetry": true,
            "externalURL": "https://a.example.com",
        }"#;
        assert!(!store.maybe_update(reformatted).unwrap().changed);

        let different = r#"{"externalURL": "https://b.example.com", "disableTelemetry": true}"#;
        assert!(store.maybe_update(different).unwrap().changed);
        assert!(!store.maybe_update(different).unwrap().changed);
    }

    #[test]
    fn test_snapshot_immutable() {
        let store = store();
        store
            .maybe_update(r#"{"externalURL": "https://a.example.com"}"#)
            .unwrap();
        let snapshot = store.last_valid();

        for i in 0..5 {
            store
                .maybe_update(&format!(r#"{{"maxReposToSearch": {}}}"#, i + 1))
                .unwrap();
        }

        assert_eq!(snapshot.external_url.as_deref(), Some("https://a.example.com"));
        assert_eq!(snapshot.max_repos_to_search, None);
        assert_eq!(store.last_valid().max_repos_to_search, Some(5));
    }

    #[test]
    fn test_mock_precedence_and_reset() {
        let store = store();
        store
            .maybe_update(r#"{"externalURL": "https://fetched.example.com"}"#)
            .unwrap();

        let mocked = BasicSiteConfiguration {
            external_url: Some("https://mock.example.com".into()),
            ..Default::default()
        };
        store.mock(Some(mocked.clone()));
        assert_eq!(*store.last_valid(), mocked);

        // Fetched updates continue underneath without affecting reads.
        store
            .maybe_update(r#"{"externalURL": "https://fetched2.example.com"}"#)
            .unwrap();
        assert_eq!(*store.last_valid(), mocked);

        store.mock(None);
        assert_eq!(
            store.last_valid().external_url.as_deref(),
            Some("https://fetched2.example.com")
        );
    }

    #[test]
    fn test_mock_initializes() {
        let store = store();
        store.mock(Some(BasicSiteConfiguration::default()));
        assert!(store.is_initialized());
        store.mock(None);
        assert!(store.is_initialized());
    }

    #[tokio::test]
    async fn test_wait_until_initialized() {
        let store = Arc::new(store());
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_until_initialized().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        store.maybe_update("{}").unwrap();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake after initialization")
            .unwrap();
    }
}
