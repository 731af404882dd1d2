//! # Rollbook CLI Module
//!
//! ## Available Commands
//!
//! - `shell` - Interactive menu (default)
//! - `init` - Create the configured store
//! - `bootstrap-admin` - Create the first administrator
//! - `status` - Show record counts

mod commands;

use crate::config::{AppConfig, Overrides};
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Rollbook - Student Record Manager
///
/// Keeps student marks, computes totals, percentages and GPA, and gates
/// every action behind an admin or student login.
#[derive(Parser, Debug)]
#[command(name = "rollbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend: memory, file, redb or sqlite
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Path to the record store
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive menu
    Shell,

    /// Open or create the store and report its counts
    Init,

    /// Create the first administrator (password read from stdin)
    BootstrapAdmin {
        /// Display name of the administrator
        #[arg(short, long)]
        name: String,

        /// Login username
        #[arg(short, long)]
        username: String,
    },

    /// Show student and admin counts
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Flags that override configuration layers.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            backend: self.backend.clone(),
            database: self.database.clone(),
        }
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::load(&cli.overrides())?;
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();

    match cli.command {
        Some(Commands::Shell) | None => cmd_shell(&config, cli.quiet, stdin, stdout),
        Some(Commands::Init) => cmd_init(&config, stdout),
        Some(Commands::BootstrapAdmin { name, username }) => {
            cmd_bootstrap_admin(&config, &name, &username, stdin, stdout)
        }
        Some(Commands::Status { json }) => cmd_status(&config, json, stdout),
    }
}
