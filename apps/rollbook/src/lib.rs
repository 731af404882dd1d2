//! # Rollbook Application Library
//!
//! CLI, configuration and the interactive shell. The binary in `main.rs`
//! only installs logging and hands the parsed arguments to [`cli::execute`].

pub mod cli;
pub mod config;
pub mod error;
pub mod shell;

pub use config::{AppConfig, BackendKind, Overrides};
pub use error::{AppError, ConfigError};
