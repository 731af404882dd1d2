//! # Runtime Configuration
//!
//! Layered, lowest precedence first:
//!
//! 1. Built-in defaults (in-memory backend, default Argon2 cost, `own` scope)
//! 2. TOML file from `--config` or `ROLLBOOK_CONFIG`
//! 3. `ROLLBOOK_*` environment variables (a `.env` file is loaded first)
//! 4. Command-line flags
//!
//! ```toml
//! [storage]
//! backend = "redb"
//! path = "rollbook.redb"
//!
//! [access]
//! student_report_scope = "own"
//!
//! [credentials]
//! memory_kib = 19456
//! iterations = 2
//! parallelism = 1
//! ```

use crate::error::{AppError, ConfigError};
use rollbook_core::{
    AccessPolicy, Argon2Credentials, HashCost, JsonFileStore, MemoryStore, RedbStore, ReportScope,
    SqliteStore, StorageBackend,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_CONFIG: &str = "ROLLBOOK_CONFIG";
pub const ENV_BACKEND: &str = "ROLLBOOK_BACKEND";
pub const ENV_DATABASE: &str = "ROLLBOOK_DATABASE";
pub const ENV_REPORT_SCOPE: &str = "ROLLBOOK_STUDENT_REPORT_SCOPE";
pub const ENV_ARGON2_MEMORY: &str = "ROLLBOOK_ARGON2_MEMORY_KIB";
pub const ENV_ARGON2_ITERATIONS: &str = "ROLLBOOK_ARGON2_ITERATIONS";
pub const ENV_ARGON2_PARALLELISM: &str = "ROLLBOOK_ARGON2_PARALLELISM";

// =============================================================================
// BACKEND KIND
// =============================================================================

/// Storage backend named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    File,
    Redb,
    Sqlite,
}

impl BackendKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Redb => "redb",
            Self::Sqlite => "sqlite",
        }
    }

    /// Whether the backend needs a path.
    #[must_use]
    pub const fn is_persistent(self) -> bool {
        !matches!(self, Self::Memory)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" | "json" => Ok(Self::File),
            "redb" => Ok(Self::Redb),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(ConfigError::Invalid {
                field: "storage.backend",
                value: s.to_string(),
                reason: "Expected one of: memory, file, redb, sqlite.".to_string(),
            }),
        }
    }
}

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: BackendKind,
    pub path: Option<PathBuf>,
}

/// Full runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub access: AccessPolicy,
    pub credentials: HashCost,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub backend: Option<String>,
    pub database: Option<PathBuf>,
}

fn parse_u32(field: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        field,
        value: value.to_string(),
        reason: format!("{e}."),
    })
}

impl AppConfig {
    /// Assemble the configuration from every layer and validate it.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = overrides
            .config
            .clone()
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));

        let mut config = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides)?;
        config.validate()?;

        tracing::debug!(
            backend = %config.storage.backend,
            report_scope = %config.access.student_report_scope,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Read a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `ROLLBOOK_*` variables found through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_BACKEND) {
            self.storage.backend = value.parse()?;
        }
        if let Some(value) = lookup(ENV_DATABASE) {
            self.storage.path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_REPORT_SCOPE) {
            let scope = value
                .parse::<ReportScope>()
                .map_err(|e| ConfigError::Invalid {
                    field: "access.student_report_scope",
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
            self.access.student_report_scope = scope;
        }
        if let Some(value) = lookup(ENV_ARGON2_MEMORY) {
            self.credentials.memory_kib = parse_u32("credentials.memory_kib", &value)?;
        }
        if let Some(value) = lookup(ENV_ARGON2_ITERATIONS) {
            self.credentials.iterations = parse_u32("credentials.iterations", &value)?;
        }
        if let Some(value) = lookup(ENV_ARGON2_PARALLELISM) {
            self.credentials.parallelism = parse_u32("credentials.parallelism", &value)?;
        }
        Ok(())
    }

    /// Apply command-line flags.
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<(), ConfigError> {
        if let Some(backend) = &overrides.backend {
            self.storage.backend = backend.parse()?;
        }
        if let Some(path) = &overrides.database {
            self.storage.path = Some(path.clone());
        }
        Ok(())
    }

    /// Reject combinations no store can be opened from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend.is_persistent() && self.storage.path.is_none() {
            return Err(ConfigError::Missing(format!(
                "storage.path (or {ENV_DATABASE} / --database) is required for the {} backend",
                self.storage.backend
            )));
        }
        Argon2Credentials::new(self.credentials).map_err(|e| ConfigError::Invalid {
            field: "credentials",
            value: format!(
                "m={},t={},p={}",
                self.credentials.memory_kib,
                self.credentials.iterations,
                self.credentials.parallelism
            ),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<StorageBackend, AppError> {
        let kind = self.storage.backend;
        let path = || {
            self.storage.path.as_deref().ok_or_else(|| {
                ConfigError::Missing(format!("storage.path for the {kind} backend"))
            })
        };

        let backend = match self.storage.backend {
            BackendKind::Memory => {
                tracing::warn!("Using the in-memory backend; records will not persist");
                StorageBackend::InMemory(MemoryStore::new())
            }
            BackendKind::File => StorageBackend::File(JsonFileStore::open(path()?)?),
            BackendKind::Redb => StorageBackend::Redb(RedbStore::open(path()?)?),
            BackendKind::Sqlite => StorageBackend::Sqlite(SqliteStore::open(path()?)?),
        };
        tracing::info!(backend = backend.kind(), "Store opened");
        Ok(backend)
    }

    /// Build the credential service from the configured cost.
    pub fn credential_service(&self) -> Result<Argon2Credentials, AppError> {
        Ok(Argon2Credentials::new(self.credentials)?)
    }
}
