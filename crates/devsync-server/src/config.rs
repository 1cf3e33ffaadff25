//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Live event hub settings.
    #[serde(default)]
    pub hub: HubConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "devsync_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Subscriber hub configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Seconds between liveness sweeps. `0` disables the sweep.
    #[serde(default = "default_liveness_interval_secs")]
    pub liveness_interval_secs: u64,

    /// Frames buffered per subscriber before it counts as too slow.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Message sent in the greeting record.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

impl HubConfig {
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs)
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8081
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_liveness_interval_secs() -> u64 {
    devsync_hub::DEFAULT_SWEEP_INTERVAL.as_secs()
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_welcome_message() -> String {
    devsync_hub::WELCOME_MESSAGE.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            liveness_interval_secs: default_liveness_interval_secs(),
            outbound_buffer: default_outbound_buffer(),
            welcome_message: default_welcome_message(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is syntactically valid but unusable.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `DEVSYNC_HOST` overrides `server.host`
/// - `DEVSYNC_PORT` overrides `server.port`
/// - `DEVSYNC_LOG_LEVEL` overrides `logging.level`
/// - `DEVSYNC_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `DEVSYNC_LIVENESS_INTERVAL_SECS` overrides `hub.liveness_interval_secs`
/// - `DEVSYNC_OUTBOUND_BUFFER` overrides `hub.outbound_buffer`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, or
/// if `hub.outbound_buffer` is zero.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    if config.hub.outbound_buffer == 0 {
        return Err(ConfigError::Invalid(
            "hub.outbound_buffer must be at least 1".to_string(),
        ));
    }

    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("DEVSYNC_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("DEVSYNC_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = var("DEVSYNC_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("DEVSYNC_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(secs) = var("DEVSYNC_LIVENESS_INTERVAL_SECS") {
        if let Ok(parsed) = secs.parse() {
            config.hub.liveness_interval_secs = parsed;
        }
    }
    if let Some(buffer) = var("DEVSYNC_OUTBOUND_BUFFER") {
        if let Ok(parsed) = buffer.parse() {
            config.hub.outbound_buffer = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = Config::default();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.hub.liveness_interval_secs, 30);
        assert_eq!(config.hub.outbound_buffer, 256);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [hub]
            liveness_interval_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, default_host());
        assert_eq!(config.hub.liveness_interval(), Duration::from_secs(5));
        assert_eq!(config.hub.outbound_buffer, 256);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.hub.welcome_message, devsync_hub::WELCOME_MESSAGE);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            load_config(path.to_str()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        let vars: HashMap<&str, &str> = [
            ("DEVSYNC_PORT", "not-a-port"),
            ("DEVSYNC_LOG_JSON", "1"),
            ("DEVSYNC_LIVENESS_INTERVAL_SECS", "10"),
            ("DEVSYNC_OUTBOUND_BUFFER", "32"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 8081);
        assert!(config.logging.json);
        assert_eq!(config.hub.liveness_interval_secs, 10);
        assert_eq!(config.hub.outbound_buffer, 32);
    }
}
