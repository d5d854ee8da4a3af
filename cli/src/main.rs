// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # jobwizard CLI
//!
//! Drives the job request wizard core from the command line. Requests are
//! YAML files replayed through the same orchestrator the app mounts, with
//! offline stand-ins for the job API and the profile service.
//!
//! ## Commands
//!
//! - `jobwizard request validate|assemble|submit <FILE>` - Replay a job request
//! - `jobwizard draft show|clear` - Inspect the stored wizard draft
//! - `jobwizard config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use jobwizard_cli::commands::{self, ConfigCommand, DraftCommand, RequestCommand};
use jobwizard_core::domain::config::{WizardConfig, CONFIG_PATH_ENV, DATA_DIR_ENV};

/// Job request wizard - replay, inspect and submit job requests
#[derive(Parser)]
#[command(name = "jobwizard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = CONFIG_PATH_ENV, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding drafts and session records
    #[arg(long, global = true, env = DATA_DIR_ENV, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "JOBWIZARD_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Job request operations
    #[command(name = "request")]
    Request {
        #[command(subcommand)]
        command: RequestCommand,
    },

    /// Stored draft operations
    #[command(name = "draft")]
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Request { command }) => {
            let config = load_config(cli.config, cli.data_dir)?;
            commands::request::handle_command(command, config).await
        }
        Some(Commands::Draft { command }) => {
            let config = load_config(cli.config, cli.data_dir)?;
            commands::draft::handle_command(command, config).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config, cli.data_dir).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<WizardConfig> {
    let config = commands::config::load_with_overrides(path, data_dir)?;
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
