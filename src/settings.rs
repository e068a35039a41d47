//! Process bootstrap settings.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! | Variable                   | Field             |
//! |----------------------------|-------------------|
//! | `CONFIGURATION_MODE`       | `mode`            |
//! | `SITECONF_BASIC_FILE`      | `basic_file`      |
//! | `SITECONF_CORE_FILE`       | `core_file`       |
//! | `SITECONF_INTERNAL_API`    | `internal_api`    |
//! | `SITECONF_BIND_ADDRESS`    | `bind_address`    |
//! | `SITECONF_METRICS_ADDRESS` | `metrics_address` |

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of this process with respect to the configuration authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Hosts the authority and reads it directly.
    Server,
    /// Polls the authority's internal API.
    #[default]
    Client,
    /// Seeded with an empty document; no network access.
    Test,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Server => "server",
            Mode::Client => "client",
            Mode::Test => "test",
        })
    }
}

impl FromStr for Mode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" => Ok(Mode::Server),
            "client" => Ok(Mode::Client),
            "test" => Ok(Mode::Test),
            other => Err(SettingsError::Env {
                var: "CONFIGURATION_MODE",
                value: other.to_string(),
            }),
        }
    }
}

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub mode: Mode,

    /// Basic configuration file (server mode).
    pub basic_file: PathBuf,

    /// Core configuration file (server mode).
    pub core_file: PathBuf,

    /// Root URL of the authority's internal API (client mode).
    pub internal_api: String,

    /// Address the internal API binds to (server mode).
    pub bind_address: String,

    /// Prometheus exporter address; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Client,
            basic_file: PathBuf::from("site-basic.json"),
            core_file: PathBuf::from("site-core.json"),
            internal_api: "http://127.0.0.1:3090".to_string(),
            bind_address: "127.0.0.1:3090".to_string(),
            metrics_address: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from the process environment.
    pub fn with_env(self) -> Result<Self, SettingsError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("CONFIGURATION_MODE").filter(|v| !v.is_empty()) {
            self.mode = mode.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %mode, "Unrecognized CONFIGURATION_MODE, using client");
                Mode::Client
            });
        }
        if let Some(path) = lookup("SITECONF_BASIC_FILE") {
            self.basic_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("SITECONF_CORE_FILE") {
            self.core_file = PathBuf::from(path);
        }
        if let Some(url) = lookup("SITECONF_INTERNAL_API") {
            self.internal_api = url;
        }
        if let Some(addr) = lookup("SITECONF_BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Some(addr) = lookup("SITECONF_METRICS_ADDRESS") {
            self.metrics_address = Some(addr).filter(|a| !a.is_empty());
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_to_client() {
        let settings = Settings::default().with_overrides(|_| None).unwrap();
        assert_eq!(settings.mode, Mode::Client);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CONFIGURATION_MODE", "server"),
            ("SITECONF_BASIC_FILE", "/etc/siteconf/basic.json"),
            ("SITECONF_METRICS_ADDRESS", "0.0.0.0:9090"),
        ]);
        let settings = Settings::default()
            .with_overrides(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.mode, Mode::Server);
        assert_eq!(settings.basic_file, PathBuf::from("/etc/siteconf/basic.json"));
        assert_eq!(settings.metrics_address.as_deref(), Some("0.0.0.0:9090"));
    }

    #[test]
    fn test_unrecognized_mode_falls_back_to_client() {
        let settings = Settings {
            mode: Mode::Test,
            ..Default::default()
        }
        .with_overrides(|var| (var == "CONFIGURATION_MODE").then(|| "frontend".to_string()))
        .unwrap();
        assert_eq!(settings.mode, Mode::Client);

        assert!("frontend".parse::<Mode>().is_err());
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("siteconf.toml");
        fs::write(&path, "mode = \"test\"\ninternal_api = \"http://frontend:3090\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.mode, Mode::Test);
        assert_eq!(settings.internal_api, "http://frontend:3090");
        assert_eq!(settings.bind_address, Settings::default().bind_address);
    }
}
