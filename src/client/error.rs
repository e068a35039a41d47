//! Errors produced by a refresh iteration.

use std::fmt;

use thiserror::Error;

use crate::config::{Category, StoreError};
use crate::fetch::FetchError;

/// A per-category refresh failure.
#[derive(Debug, Error)]
pub enum ConfError {
    #[error("unable to fetch new {category} configuration: {source}")]
    Fetch {
        category: Category,
        #[source]
        source: FetchError,
    },

    #[error("unable to update new {category} configuration: {source}")]
    Update {
        category: Category,
        #[source]
        source: StoreError,
    },
}

impl ConfError {
    pub fn category(&self) -> Category {
        match self {
            ConfError::Fetch { category, .. } | ConfError::Update { category, .. } => *category,
        }
    }
}

/// All failures from a single refresh iteration.
#[derive(Debug)]
pub struct RefreshErrors(pub Vec<ConfError>);

impl RefreshErrors {
    pub fn errors(&self) -> &[ConfError] {
        &self.0
    }
}

impl fmt::Display for RefreshErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) during configuration refresh: ", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for RefreshErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_display() {
        let errors = RefreshErrors(vec![
            ConfError::Fetch {
                category: Category::Basic,
                source: FetchError::Missing(Category::Basic),
            },
            ConfError::Fetch {
                category: Category::Core,
                source: FetchError::Missing(Category::Core),
            },
        ]);
        let rendered = errors.to_string();
        assert!(rendered.starts_with("2 error(s)"));
        assert!(rendered.contains("unable to fetch new basic configuration"));
        assert!(rendered.contains("; unable to fetch new core configuration"));
        assert_eq!(errors.errors()[1].category(), Category::Core);
    }
}
