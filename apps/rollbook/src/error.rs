//! # Application Errors

use crate::shell::PromptError;
use rollbook_core::RecordError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A required value was not supplied by any layer.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// A supplied value was rejected.
    #[error("Invalid value for '{field}': '{value}'. {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Top-level error of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
