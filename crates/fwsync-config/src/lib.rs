//! Configuration for fwsync.
//!
//! Configuration is an explicit [`AppConfig`] value handed to the server at
//! construction - never ambient global state - so the reconciliation logic
//! stays testable without touching the environment. Values come from a TOML
//! file merged with `FWSYNC__SECTION__KEY` environment overrides (e.g.
//! `FWSYNC__AZURE__CLIENT_SECRET`), the usual place for credentials.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(String),

    #[error("config deserialize error: {0}")]
    Deserialize(String),

    #[error("config validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub azure: AzureSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        // Azure validations - every field is required to open a session
        if self.azure.tenant_id.is_empty() {
            return Err(ConfigError::validation("azure.tenant_id is required"));
        }
        if self.azure.subscription_id.is_empty() {
            return Err(ConfigError::validation("azure.subscription_id is required"));
        }
        if self.azure.client_id.is_empty() {
            return Err(ConfigError::validation("azure.client_id is required"));
        }
        if self.azure.client_secret.is_empty() {
            return Err(ConfigError::validation("azure.client_secret is required"));
        }
        if self.azure.resource_group.is_empty() {
            return Err(ConfigError::validation("azure.resource_group is required"));
        }
        // Server validations
        if self.server.port == 0 {
            return Err(ConfigError::validation("server.port must be > 0"));
        }
        // Scheduler validations
        if self.scheduler.enabled && self.scheduler.interval_secs == 0 {
            return Err(ConfigError::validation(
                "scheduler.interval_secs must be > 0 when the scheduler is enabled",
            ));
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::validation(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

/// Credentials and scope for the Azure session.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AzureSettings {
    /// Directory (tenant) id of the service principal.
    #[serde(default)]
    pub tenant_id: String,
    /// Subscription holding the resource group.
    #[serde(default)]
    pub subscription_id: String,
    /// Application (client) id of the service principal.
    #[serde(default)]
    pub client_id: String,
    /// Application key. Prefer the FWSYNC__AZURE__CLIENT_SECRET env var over
    /// putting this in the file.
    #[serde(default)]
    pub client_secret: String,
    /// Resource group scoping both the web apps and the SQL servers.
    #[serde(default)]
    pub resource_group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Periodic trigger settings. Disabled by default; when enabled, one
/// reconciliation runs every `interval_secs` (daily out of the box).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    86_400
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::{AppConfig, ConfigError};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads configuration from an optional TOML file merged with
    /// `FWSYNC__SECTION__KEY` environment overrides, then validates.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("fwsync.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g. FWSYNC__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("FWSYNC")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| ConfigError::Build(e.to_string()))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        merged.validate()?;
        Ok(merged)
    }
}
