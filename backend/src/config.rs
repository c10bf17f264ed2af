//! Application settings loaded via OrthoConfig.
//!
//! Settings come from `IDEAS_*` environment variables, command-line flags or
//! a configuration file, and are read once at startup. Accessors apply the
//! defaults so callers never see an unset value.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{PasswordError, PasswordPolicy};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_JSON_PATH: &str = "ideas.json";
const DEFAULT_POOL_TIMEOUT_SECS: u64 = 30;

/// Which idea store backs the services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// Ideas, users and votes in PostgreSQL.
    #[default]
    Postgres,
    /// Ideas in a single JSON file; users and votes are unavailable.
    Json,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `storage` is not a known backend.
    #[error("unknown storage backend: {value} (expected postgres or json)")]
    UnknownStorage { value: String },
    /// The PostgreSQL backend was selected without a connection string.
    #[error("IDEAS_DATABASE_URL is required for the postgres backend")]
    MissingDatabaseUrl,
    /// Argon2 cost parameters are out of range.
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl FromStr for StorageBackend {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "json" => Ok(Self::Json),
            _ => Err(SettingsError::UnknownStorage {
                value: value.to_owned(),
            }),
        }
    }
}

/// Configuration values for the idea board services.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "IDEAS")]
pub struct AppSettings {
    /// Storage backend: `postgres` or `json`.
    pub storage: Option<String>,
    /// Path of the JSON idea file.
    pub json_path: Option<PathBuf>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Pool checkout timeout in seconds.
    pub pool_timeout_secs: Option<u64>,
    /// Argon2 memory cost in KiB.
    pub argon2_memory_kib: Option<u32>,
    /// Argon2 iteration count.
    pub argon2_iterations: Option<u32>,
    /// Argon2 lane count.
    pub argon2_parallelism: Option<u32>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("storage", &self.storage)
            .field("json_path", &self.json_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "<redacted>"),
            )
            .field("pool_max_size", &self.pool_max_size)
            .field("pool_timeout_secs", &self.pool_timeout_secs)
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .finish()
    }
}

impl AppSettings {
    /// Selected storage backend, defaulting to PostgreSQL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownStorage`] for unrecognised names.
    pub fn storage(&self) -> Result<StorageBackend, SettingsError> {
        self.storage
            .as_deref()
            .map_or(Ok(StorageBackend::default()), str::parse)
    }

    /// JSON idea file path, defaulting to `ideas.json`.
    pub fn json_path(&self) -> PathBuf {
        self.json_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JSON_PATH))
    }

    /// Pool settings for the configured database.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when no URL is set.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        Ok(PoolConfig::new(url)
            .with_max_size(self.pool_max_size)
            .with_connection_timeout(Duration::from_secs(
                self.pool_timeout_secs.unwrap_or(DEFAULT_POOL_TIMEOUT_SECS),
            )))
    }

    /// Argon2id cost parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Password`] when Argon2 rejects the values.
    pub fn password_policy(&self) -> Result<PasswordPolicy, SettingsError> {
        Ok(PasswordPolicy::new(
            self.argon2_memory_kib
                .unwrap_or(PasswordPolicy::DEFAULT_MEMORY_KIB),
            self.argon2_iterations
                .unwrap_or(PasswordPolicy::DEFAULT_ITERATIONS),
            self.argon2_parallelism
                .unwrap_or(PasswordPolicy::DEFAULT_PARALLELISM),
        )?)
    }
}
