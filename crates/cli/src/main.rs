// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clawbowld`: the orchestrator process entrypoint. A thin `clap` CLI over
//! the engine's library API — config loading, tracing setup, and dispatch
//! to one of the operator subcommands.

mod commands;
mod orchestrator;
mod settings;

use clap::{Parser, Subcommand};
use settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "clawbowld", version, about = "Per-user sandbox orchestrator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the orchestrator's background loops until terminated.
    Run {
        #[command(flatten)]
        settings: Settings,
    },
    /// Validate configuration and connectivity, then exit.
    CheckConfig {
        #[command(flatten)]
        settings: Settings,
    },
    /// Inspect and manage individual sandboxes.
    #[command(subcommand)]
    Sandbox(SandboxCommand),
}

#[derive(Debug, Subcommand)]
enum SandboxCommand {
    /// List every sandbox the catalog knows about.
    Ls {
        #[command(flatten)]
        settings: Settings,
    },
    /// Destroy a user's sandbox (container + catalog row).
    Destroy {
        #[command(flatten)]
        settings: Settings,
        user: String,
    },
    /// Create a manual workspace snapshot for a user.
    Snapshot {
        #[command(flatten)]
        settings: Settings,
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { settings } => commands::run(settings).await,
        Commands::CheckConfig { settings } => commands::check_config(settings).await,
        Commands::Sandbox(SandboxCommand::Ls { settings }) => commands::sandbox_ls(settings).await,
        Commands::Sandbox(SandboxCommand::Destroy { settings, user }) => {
            commands::sandbox_destroy(settings, user).await
        }
        Commands::Sandbox(SandboxCommand::Snapshot { settings, user }) => {
            commands::sandbox_snapshot(settings, user).await
        }
    }
}
