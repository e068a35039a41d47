//! Site configuration schema definitions.
//!
//! The site configuration is split into two independently fetched categories.
//! Each category deserializes into its own type. Keys without a typed field
//! are kept in `extra`, so they count toward change detection and stay
//! readable through the snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One of the two independently distributed configuration documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Basic,
    Core,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Basic, Category::Core];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::Core => "core",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown configuration category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Category::Basic),
            "core" => Ok(Category::Core),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Basic site configuration: settings that site admins edit day to day.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicSiteConfiguration {
    /// Externally reachable URL of the site (e.g. "https://example.com").
    #[serde(rename = "externalURL", skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,

    /// Minimum log level for services reading this configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Maximum number of repositories listed by a single search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_repos_to_search: Option<u32>,

    /// Disable anonymous usage statistics.
    pub disable_telemetry: bool,

    /// Enabled authentication providers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub auth_providers: Vec<AuthProvider>,

    /// Keys without a typed field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An authentication provider entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthProvider {
    #[serde(rename = "type")]
    pub kind: AuthProviderKind,

    /// Identifier that distinguishes providers of the same kind.
    #[serde(rename = "configID", default, skip_serializing_if = "Option::is_none")]
    pub config_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthProviderKind {
    Builtin,
    Openidconnect,
    Saml,
    HttpHeader,
}

/// Core site configuration: settings that change rarely and affect every service.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreSiteConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,

    /// Update check channel ("release" or "none").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_channel: Option<String>,

    /// HTML injected into the head of every page, before any other content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_head_critical: Option<String>,

    /// Reject mutating requests while an operator performs maintenance.
    pub maintenance_mode: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
