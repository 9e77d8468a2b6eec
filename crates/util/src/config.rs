//! Plugin configuration.
//!
//! Settings are layered: built-in defaults, then an optional JSON file
//! (`~/.config/scs/config.json` on most platforms, or `$SCS_CONFIG_PATH`),
//! then environment overrides. Nothing here is ever written back; the
//! command-line flags that change behaviour (`--skip-ssl-validation`) are not
//! part of the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable allowing callers to override the configuration file path.
pub const CONFIG_PATH_ENV: &str = "SCS_CONFIG_PATH";

/// Environment variable overriding [`PluginConfig::broker_host_prefix`].
pub const BROKER_HOST_PREFIX_ENV: &str = "SCS_BROKER_HOST_PREFIX";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Hostname prefix of the platform-wide (v3) service broker.
pub const DEFAULT_BROKER_HOST_PREFIX: &str = "scs-service-broker.";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Error surfaced when the configuration file exists but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration file {path} is invalid: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings consumed by the endpoint resolver and the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PluginConfig {
    /// Replaces the first label of the platform API host to reach the v3
    /// broker, e.g. `api.sys.example` becomes `scs-service-broker.sys.example`.
    pub broker_host_prefix: String,
    pub connect_timeout_secs: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            broker_host_prefix: DEFAULT_BROKER_HOST_PREFIX.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl PluginConfig {
    /// Load from the default path and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = load_config_from_path(&default_config_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(prefix) = env::var(BROKER_HOST_PREFIX_ENV)
            && !prefix.trim().is_empty()
        {
            self.broker_host_prefix = prefix.trim().to_string();
        }
    }
}

/// Returns the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scs")
        .join(CONFIG_FILE_NAME)
}

/// Loads configuration from a specific path. A missing file yields defaults.
pub fn load_config_from_path(path: &Path) -> Result<PluginConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).map_err(|source| ConfigError::Serialization {
            path: path.to_path_buf(),
            source,
        }),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no configuration file; using defaults");
            Ok(PluginConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_from_path(&dir.path().join("absent.json")).expect("defaults");
        assert_eq!(config, PluginConfig::default());
        assert_eq!(config.broker_host_prefix, "scs-service-broker.");
    }

    #[test]
    fn file_values_override_defaults_field_by_field() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"brokerHostPrefix":"scs-broker."}}"#).expect("write config");
        let config = load_config_from_path(file.path()).expect("load config");
        assert_eq!(config.broker_host_prefix, "scs-broker.");
        assert_eq!(config.connect_timeout_secs, 30);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"brokerPrefix":"x."}}"#).expect("write config");
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Serialization { .. }));
    }

    #[test]
    fn default_path_honors_environment_override() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("~/custom/scs.json"), || {
            assert_eq!(default_config_path(), expand_tilde("~/custom/scs.json"));
        });
    }

    #[test]
    fn environment_overrides_broker_prefix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let path_str = path.to_string_lossy().to_string();
        temp_env::with_vars(
            [
                (CONFIG_PATH_ENV, Some(path_str.as_str())),
                (BROKER_HOST_PREFIX_ENV, Some("my-broker.")),
            ],
            || {
                let config = PluginConfig::load().expect("load config");
                assert_eq!(config.broker_host_prefix, "my-broker.");
            },
        );
    }
}
