// SPDX-FileCopyrightText: 2026 Quorum Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quorum - multi-tenant messaging-session gateway.
//!
//! Binary entry point: subcommand dispatch, config loading, and tracing
//! initialization.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Quorum - multi-tenant messaging-session gateway.
#[derive(Parser, Debug)]
#[command(name = "quorum", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway.
    Serve,
    /// Show stored session states.
    Status,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match quorum_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            quorum_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run(&config).await,
        Some(Commands::Status) => status::run(&config).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("quorum: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("quorum: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_config(config: &quorum_config::QuorumConfig) -> Result<(), quorum_core::QuorumError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| quorum_core::QuorumError::Internal(format!("failed to render config: {e}")))?;
    println!("{rendered}");
    Ok(())
}
