//! # CLI Command Implementations
//!
//! Each command takes its input and output streams so it can be driven
//! from tests.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::shell::{Prompter, Shell};
use rollbook_core::{
    Argon2Credentials, AuthGate, NewAdmin, RecordManager, RecordStore, StorageBackend, StoreStatus,
};
use std::io::{BufRead, Write};

/// Open the configured store behind a manager.
pub fn open_manager(
    config: &AppConfig,
) -> Result<RecordManager<StorageBackend, Argon2Credentials>, AppError> {
    let store = config.open_store()?;
    let credentials = config.credential_service()?;
    Ok(RecordManager::new(store, credentials))
}

// =============================================================================
// SHELL COMMAND
// =============================================================================

/// Run the interactive menu until exit or end of input.
pub fn cmd_shell<R: BufRead, W: Write>(
    config: &AppConfig,
    quiet: bool,
    input: R,
    mut output: W,
) -> Result<(), AppError> {
    let manager = open_manager(config)?;
    if manager.store().admin_count()? == 0 {
        tracing::warn!("No administrator exists; run `rollbook bootstrap-admin` first");
    }

    if !quiet {
        print_banner(&mut output)?;
    }

    let mut shell = Shell::new(manager, AuthGate::new(config.access), input, output);
    shell.run()
}

fn print_banner<W: Write>(output: &mut W) -> Result<(), AppError> {
    writeln!(
        output,
        r"
  ┌─────────────────────────────────┐
  │  Rollbook v{:<21}│
  │  Student Record Manager         │
  └─────────────────────────────────┘",
        env!("CARGO_PKG_VERSION")
    )?;
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Open (creating if needed) the configured store and report its counts.
pub fn cmd_init<W: Write>(config: &AppConfig, mut output: W) -> Result<(), AppError> {
    let status = open_manager(config)?.status()?;

    match &config.storage.path {
        Some(path) => writeln!(
            output,
            "Initialized {} store at {}",
            config.storage.backend,
            path.display()
        )?,
        None => writeln!(output, "Initialized {} store", config.storage.backend)?,
    }
    writeln!(
        output,
        "Students: {}, admins: {}",
        status.students, status.admins
    )?;
    Ok(())
}

// =============================================================================
// BOOTSTRAP COMMAND
// =============================================================================

/// Create the first administrator.
///
/// Reads the password and its confirmation as two lines from `input`.
pub fn cmd_bootstrap_admin<R: BufRead, W: Write>(
    config: &AppConfig,
    name: &str,
    username: &str,
    input: R,
    output: W,
) -> Result<(), AppError> {
    let mut manager = open_manager(config)?;
    let mut prompt = Prompter::new(input, output);

    let password = prompt.ask("Enter new password: ")?;
    let confirmation = prompt.ask("Confirm password: ")?;
    let admin = manager.bootstrap_admin(NewAdmin {
        name: name.to_string(),
        username: username.to_string(),
        password,
        confirmation,
    })?;

    prompt.say(format_args!(
        "Created administrator '{}' (id {}).",
        admin.username, admin.id
    ))?;
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Print the backend and its record counts.
pub fn cmd_status<W: Write>(config: &AppConfig, json: bool, mut output: W) -> Result<(), AppError> {
    let manager = open_manager(config)?;
    let status: StoreStatus = manager.status()?;
    let backend = manager.store().kind();

    if json {
        let value = serde_json::json!({
            "backend": backend,
            "database": config.storage.path.as_ref().map(|p| p.to_string_lossy()),
            "students": status.students,
            "admins": status.admins,
        });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
        writeln!(output, "{text}")?;
        return Ok(());
    }

    writeln!(output, "Rollbook Status")?;
    writeln!(output, "===============")?;
    writeln!(output, "Backend:  {backend}")?;
    if let Some(path) = &config.storage.path {
        writeln!(output, "Database: {}", path.display())?;
    }
    writeln!(output)?;
    writeln!(output, "Students: {}", status.students)?;
    writeln!(output, "Admins:   {}", status.admins)?;
    Ok(())
}
