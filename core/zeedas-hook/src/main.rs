//! zeedas-hook: hosts the heartbeat engine for an editor.
//!
//! The editor glue starts `zeedas-hook run`, writes one JSON editor message
//! per line to its stdin, and reads status updates back from stdout.
//!
//! ## Subcommands
//!
//! - `run`: Long-running host loop (stdin events, stdout status lines)
//! - `today`: Fetch and print today's coding activity once

mod logging;
mod run;
mod today;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use zeedas_core::{StorageConfig, TransportKind, ZeedasConfig};

#[derive(Parser)]
#[command(name = "zeedas-hook")]
#[command(about = "Zeedas coding activity tracker")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ~/.zeedas/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track editor activity (reads JSON lines from stdin)
    Run {
        /// Override the configured transport ("cli" or "http")
        #[arg(long)]
        transport: Option<TransportKind>,
    },

    /// Print today's coding activity as JSON
    Today,
}

fn main() {
    std::process::exit(dispatch(Cli::parse()));
}

/// Runs the command and returns the exit code. Keeps the logging guard alive
/// until buffered lines are flushed.
fn dispatch(cli: Cli) -> i32 {
    let storage = StorageConfig::default();

    let mut config = match ZeedasConfig::load(&storage, cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let _logging_guard = logging::init(&storage, false);
            tracing::error!(error = %e, "zeedas-hook could not load its config");
            return 1;
        }
    };
    let _logging_guard = logging::init(&storage, config.settings.debug);

    match cli.command {
        Commands::Run { transport } => {
            if let Some(kind) = transport {
                config.settings.transport = kind;
            }
            if let Err(e) = run::run(&storage, &config) {
                tracing::error!(error = %e, "zeedas-hook run failed");
                return 1;
            }
        }
        Commands::Today => {
            if let Err(e) = today::run(&storage, &config) {
                tracing::error!(error = %e, "zeedas-hook today failed");
                return 1;
            }
        }
    }
    0
}
