//! # Configuration Settings
//!
//! Defines the configuration structure for the cachette service.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{CachetteError, Result};

/// Main application configuration, built once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Storage backend configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Logging configuration
    pub observability: ObservabilityConfig,
    /// Interval between background prune sweeps, in seconds
    pub prune_interval_seconds: u64,
    /// Hostname reported in metric labels
    pub hostname: String,
}

impl Settings {
    /// Load all settings from environment variables.
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
            prune_interval_seconds: env_parse("CACHETTE_PRUNE_INTERVAL_SECONDS", 60),
            hostname: hostname(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the entire configuration; failures are startup-fatal.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(CachetteError::config("server host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(CachetteError::config("server port cannot be 0"));
        }
        if self.prune_interval_seconds == 0 {
            return Err(CachetteError::config("prune interval must be at least 1 second"));
        }
        if self.auth.jwt_secret.len() < 32 {
            return Err(CachetteError::config(
                "JWT secret must be at least 32 characters long",
            ));
        }
        self.database.validate()
    }

    /// Interval between prune sweeps as a [`Duration`].
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_seconds)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 3000 }
    }
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: std::env::var("CACHETTE_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("CACHETTE_PORT", 3000),
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The storage backend driving the secret repository.
///
/// Backend selection is checked at startup: an unknown kind in the
/// environment is a fatal configuration error, not a runtime dispatch
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process map, lost on restart
    Memory,
    /// PostgreSQL relational table
    Postgres,
    /// Redis hashes with native key expiry
    Redis,
    /// SQLite rows holding one JSON document per secret
    Sqlite,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Postgres => "postgres",
            BackendKind::Redis => "redis",
            BackendKind::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = CachetteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "postgres" | "postgresql" => Ok(BackendKind::Postgres),
            "redis" => Ok(BackendKind::Redis),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(CachetteError::config(format!("unknown storage backend: {}", other))),
        }
    }
}

/// Storage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Which repository implementation to use
    pub backend: BackendKind,
    /// Backend connection URL; unused by the memory backend
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { backend: BackendKind::Memory, url: String::new() }
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self> {
        let backend = match std::env::var("CACHETTE_BACKEND") {
            Ok(raw) => raw.parse::<BackendKind>()?,
            Err(_) => BackendKind::Memory,
        };
        let url = std::env::var("DATABASE_URL").unwrap_or_default();
        Ok(Self { backend, url })
    }

    fn validate(&self) -> Result<()> {
        if self.backend != BackendKind::Memory && self.url.is_empty() {
            return Err(CachetteError::config(format!(
                "DATABASE_URL is required for the {} backend",
                self.backend
            )));
        }
        match self.backend {
            BackendKind::Postgres if !self.url.starts_with("postgres") => {
                Err(CachetteError::config("database URL must start with 'postgres'"))
            }
            BackendKind::Redis if !self.url.starts_with("redis") => {
                Err(CachetteError::config("database URL must start with 'redis'"))
            }
            BackendKind::Sqlite if !self.url.starts_with("sqlite") => {
                Err(CachetteError::config("database URL must start with 'sqlite'"))
            }
            _ => Ok(()),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to verify bearer JWT tokens
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: "change_me_super_secret_for_cachette_dev".to_string() }
    }
}

impl AuthConfig {
    fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("CACHETTE_JWT_SECRET")
                .unwrap_or_else(|_| AuthConfig::default().jwt_secret),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default log level filter (`trace`..`error`), overridable via RUST_LOG
    pub log_level: String,
    /// Emit logs as JSON instead of human-readable lines
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logs: false }
    }
}

impl ObservabilityConfig {
    fn from_env() -> Self {
        Self {
            log_level: std::env::var("CACHETTE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            json_logs: std::env::var("CACHETTE_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|raw| raw.parse::<T>().ok()).unwrap_or(default)
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}
