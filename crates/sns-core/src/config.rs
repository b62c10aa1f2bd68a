//! Configuration loading and typed config structures for the SNS service.
//!
//! The configuration lives in `sns-config.yaml`. Every field has a default,
//! so an absent file or a partial file is valid. A few environment
//! variables override the file for container deployments.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sns_store::DEFAULT_REPLAY_LIMIT;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// `SNS_PORT` is not a valid port number.
    #[error("invalid value {value:?} for SNS_PORT: {source}")]
    Port {
        /// The rejected value.
        value: String,
        /// The underlying parse error.
        source: std::num::ParseIntError,
    },

    /// An environment flag could not be parsed.
    #[error("invalid value {value:?} for {name}")]
    Env {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `sns-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ServerSettings,

    /// Log directory and history reset.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Session replay and queue sizing.
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from the process environment.
    ///
    /// - `SNS_HOST` overrides `server.host`
    /// - `SNS_PORT` overrides `server.port`
    /// - `SNS_DATA_DIR` overrides `storage.data_dir`
    /// - `SNS_CLEAR_ON_START` overrides `storage.clear_on_start`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Port`] if the port does not parse, or
    /// [`ConfigError::Env`] if a boolean flag does not.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Port`] if the port does not parse, or
    /// [`ConfigError::Env`] if a boolean flag does not.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SNS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SNS_PORT") {
            self.server.port = port.parse().map_err(|source| ConfigError::Port {
                value: port.clone(),
                source,
            })?;
        }
        if let Some(dir) = lookup("SNS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("SNS_CLEAR_ON_START") {
            self.storage.clear_on_start = parse_flag(&flag).ok_or(ConfigError::Env {
                name: "SNS_CLEAR_ON_START",
                value: flag,
            })?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Listen address configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `<user>.txt` and `<user>_following.txt`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Delete every log once, on the first timeline opened after start.
    #[serde(default = "default_true")]
    pub clear_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            clear_on_start: true,
        }
    }
}

/// Timeline session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimelineConfig {
    /// Pending records replayed when a session opens.
    #[serde(default = "default_replay_limit")]
    pub replay_limit: usize,

    /// Frames buffered per session before live pushes are dropped.
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            replay_limit: default_replay_limit(),
            outbound_capacity: default_outbound_capacity(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    3010
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

const fn default_true() -> bool {
    true
}

const fn default_replay_limit() -> usize {
    DEFAULT_REPLAY_LIMIT
}

const fn default_outbound_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ServiceConfig::parse("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.server.port, 3010);
        assert_eq!(config.timeline.replay_limit, 20);
        assert!(config.storage.clear_on_start);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let yaml = "
server:
  port: 4000
storage:
  data_dir: /var/lib/sns
  clear_on_start: false
logging:
  format: json
";
        let config = ServiceConfig::parse(yaml).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/sns"));
        assert!(!config.storage.clear_on_start);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.timeline.outbound_capacity, 256);
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        assert!(matches!(
            ServiceConfig::parse("server: [unterminated"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SNS_HOST", "127.0.0.1"),
            ("SNS_PORT", "5050"),
            ("SNS_DATA_DIR", "/tmp/sns"),
            ("SNS_CLEAR_ON_START", "no"),
        ]);
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| (*v).to_owned()))
            .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 5050);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/sns"));
        assert!(!config.storage.clear_on_start);
    }

    #[test]
    fn unparsable_port_override_fails() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_overrides(|name| (name == "SNS_PORT").then(|| String::from("eighty")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Port { ref value, .. } if value == "eighty"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
