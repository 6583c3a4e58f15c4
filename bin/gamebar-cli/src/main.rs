// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # gamebar
//!
//! Command-line interface for the telemetry overlay.
//!
//! ## Usage
//! ```bash
//! # Show the overlay on stdout and capture until Ctrl-C
//! gamebar run --capture
//!
//! # Capture per application for two minutes
//! gamebar run --capture --mode per-app --duration 120
//!
//! # Enable automatic logging for one application
//! gamebar apps enable com.example.game
//!
//! # List written logs
//! gamebar logs --app com.example.game
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gamebar",
    about = "Live telemetry overlay with per-session CSV capture",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the overlay loop, printing each frame of stats to stdout.
    Run {
        /// Start capture as soon as the overlay is shown.
        #[arg(long)]
        capture: bool,

        /// Logging mode to switch to before capture starts.
        #[arg(short, long, value_enum)]
        mode: Option<commands::ModeArg>,

        /// Stop after this many seconds instead of waiting for Ctrl-C.
        #[arg(short, long)]
        duration: Option<u64>,

        /// Render the single-line minimal format.
        #[arg(long)]
        minimal: bool,
    },

    /// Take one sample and print it.
    Status {
        /// Print machine-readable JSON instead of overlay lines.
        #[arg(long)]
        json: bool,
    },

    /// List capture logs in the log directory.
    Logs {
        /// Only logs for this application.
        #[arg(short, long, conflicts_with = "global")]
        app: Option<String>,

        /// Only global logs.
        #[arg(short, long)]
        global: bool,

        /// Also read each file and report its row count.
        #[arg(long)]
        rows: bool,
    },

    /// Manage applications that log automatically in per-app mode.
    Apps {
        #[command(subcommand)]
        action: AppsAction,
    },

    /// Show or change the persisted logging mode.
    Mode {
        /// New mode; omit to print the current one.
        #[arg(value_enum)]
        mode: Option<commands::ModeArg>,
    },
}

#[derive(Subcommand)]
enum AppsAction {
    /// List enabled applications.
    List,
    /// Enable automatic logging for an application.
    Enable { app: String },
    /// Disable automatic logging for an application.
    Disable { app: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            capture,
            mode,
            duration,
            minimal,
        } => commands::run::execute(config, capture, mode, duration, minimal).await,
        Commands::Status { json } => commands::status::execute(config, json).await,
        Commands::Logs { app, global, rows } => commands::logs::execute(config, app, global, rows),
        Commands::Apps { action } => match action {
            AppsAction::List => commands::apps::list(config),
            AppsAction::Enable { app } => commands::apps::set(config, &app, true),
            AppsAction::Disable { app } => commands::apps::set(config, &app, false),
        },
        Commands::Mode { mode } => commands::mode::execute(config, mode),
    }
}
