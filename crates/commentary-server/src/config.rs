//! Configuration loading for the commentary server.
//!
//! Settings come from an optional `commentary-config.yaml` in the working
//! directory. Every field has a default, and a handful of environment
//! variables override the file so containers can be configured without
//! mounting one.

use std::path::Path;
use std::time::Duration;

use commentary_api::ServerConfig;
use commentary_api::notifier::DEFAULT_BROADCAST_CAPACITY;
use commentary_db::PostgresConfig;
use serde::Deserialize;

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

    /// An environment override held an unusable value.
    #[error("invalid value for {name}: {value}")]
    Env {
        /// Variable name.
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
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// HTTP bind settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// `PostgreSQL` settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Live commentary broadcast settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Env`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Env`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Defaults plus env overrides, for when no file is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if an override cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply overrides looked up through `lookup`.
    ///
    /// - `DATABASE_URL` overrides `database.url`
    /// - `COMMENTARY_HOST` overrides `server.host`
    /// - `COMMENTARY_PORT` overrides `server.port`
    /// - `COMMENTARY_BROADCAST` overrides `broadcast.enabled`
    /// - `COMMENTARY_LOG_FORMAT` overrides `logging.format`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = lookup("COMMENTARY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("COMMENTARY_PORT") {
            self.server.port = port.parse::<u16>().map_err(|e| ConfigError::Env {
                name: "COMMENTARY_PORT",
                value: format!("{port} ({e})"),
            })?;
        }
        if let Some(enabled) = lookup("COMMENTARY_BROADCAST") {
            self.broadcast.enabled = enabled.parse::<bool>().map_err(|e| ConfigError::Env {
                name: "COMMENTARY_BROADCAST",
                value: format!("{enabled} ({e})"),
            })?;
        }
        if let Some(format) = lookup("COMMENTARY_LOG_FORMAT") {
            self.logging.format = match format.as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => {
                    return Err(ConfigError::Env {
                        name: "COMMENTARY_LOG_FORMAT",
                        value: format,
                    });
                }
            };
        }
        Ok(())
    }
}

/// HTTP bind settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl From<&HttpConfig> for ServerConfig {
    fn from(config: &HttpConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// `PostgreSQL` settings.
///
/// With no `url` the server falls back to the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Seconds an idle connection is kept.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Apply pending migrations at startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            run_migrations: true,
        }
    }
}

impl DatabaseConfig {
    /// Pool settings for the configured URL, if any.
    pub fn postgres(&self) -> Option<PostgresConfig> {
        self.url.as_deref().map(|url| {
            PostgresConfig::new(url)
                .with_max_connections(self.max_connections)
                .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
                .with_idle_timeout(Duration::from_secs(self.idle_timeout_secs))
        })
    }
}

/// Live commentary broadcast settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Whether created entries are published to `WebSocket` subscribers.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Messages buffered per subscriber before it is marked lagged.
    #[serde(default = "default_broadcast_capacity")]
    pub capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_broadcast_capacity(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
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
#[serde(rename_all = "snake_case")]
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
    8000
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

const fn default_idle_timeout_secs() -> u64 {
    300
}

const fn default_true() -> bool {
    true
}

const fn default_broadcast_capacity() -> usize {
    DEFAULT_BROADCAST_CAPACITY
}

fn default_log_level() -> String {
    String::from("info,tower_http=debug")
}
