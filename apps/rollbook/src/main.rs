//! # Rollbook - Student Record Manager
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/rollbook (THE BINARY)            │
//! │                                                      │
//! │  ┌────────────┐   ┌──────────────┐   ┌───────────┐  │
//! │  │    CLI     │   │    Config    │   │   Shell   │  │
//! │  │   (clap)   │   │ (toml, .env) │   │  (menus)  │  │
//! │  └─────┬──────┘   └──────┬───────┘   └─────┬─────┘  │
//! │        └─────────────────┼─────────────────┘        │
//! │                          ▼                          │
//! │                 ┌─────────────────┐                 │
//! │                 │  rollbook-core  │                 │
//! │                 │   (THE LOGIC)   │                 │
//! │                 └─────────────────┘                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! rollbook --backend redb --database rollbook.redb init
//! rollbook --backend redb --database rollbook.redb bootstrap-admin -n "Head" -u head
//! rollbook --backend redb --database rollbook.redb
//! ```

use clap::Parser;
use rollbook::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    // ROLLBOOK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ROLLBOOK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rollbook=info,rollbook_core=info".into());

    // Logs go to stderr; stdout belongs to the menus.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
