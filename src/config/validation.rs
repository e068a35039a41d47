//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and enumerated strings
//! - Check that auth providers are distinguishable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function of the parsed document
//! - Runs before a document is accepted into a store

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::{BasicSiteConfiguration, CoreSiteConfiguration};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const UPDATE_CHANNELS: [&str; 2] = ["release", "none"];

/// A single semantic problem found in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Semantic checks applied to a parsed configuration document.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

impl Validate for BasicSiteConfiguration {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(raw) = &self.external_url {
            match Url::parse(raw) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
                Ok(url) => errors.push(ValidationError::new(
                    "externalURL",
                    format!("unsupported scheme {:?}", url.scheme()),
                )),
                Err(e) => errors.push(ValidationError::new("externalURL", e.to_string())),
            }
        }

        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                errors.push(ValidationError::new(
                    "logLevel",
                    format!("must be one of {}", LOG_LEVELS.join(", ")),
                ));
            }
        }

        if self.max_repos_to_search == Some(0) {
            errors.push(ValidationError::new("maxReposToSearch", "must be greater than 0"));
        }

        let mut seen = HashSet::new();
        for (i, provider) in self.auth_providers.iter().enumerate() {
            if !seen.insert((provider.kind, provider.config_id.as_deref())) {
                errors.push(ValidationError::new(
                    format!("authProviders[{}]", i),
                    "duplicate provider; set a distinct configID",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Validate for CoreSiteConfiguration {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(channel) = &self.update_channel {
            if !UPDATE_CHANNELS.contains(&channel.as_str()) {
                errors.push(ValidationError::new(
                    "updateChannel",
                    format!("must be one of {}", UPDATE_CHANNELS.join(", ")),
                ));
            }
        }

        if matches!(&self.license_key, Some(key) if key.trim().is_empty()) {
            errors.push(ValidationError::new("licenseKey", "must not be blank"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Render a list of validation errors as a single line.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{AuthProvider, AuthProviderKind};

    #[test]
    fn test_defaults_are_valid() {
        assert!(BasicSiteConfiguration::default().validate().is_ok());
        assert!(CoreSiteConfiguration::default().validate().is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = BasicSiteConfiguration {
            external_url: Some("ftp://example.com".into()),
            log_level: Some("loud".into()),
            max_repos_to_search: Some(0),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(join_errors(&errors).contains("externalURL"));
    }

    #[test]
    fn test_duplicate_auth_providers() {
        let provider = AuthProvider {
            kind: AuthProviderKind::Saml,
            config_id: None,
            display_name: None,
        };
        let config = BasicSiteConfiguration {
            auth_providers: vec![provider.clone(), provider],
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors[0].field, "authProviders[1]");
    }

    #[test]
    fn test_core_update_channel() {
        let config = CoreSiteConfiguration {
            update_channel: Some("nightly".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
