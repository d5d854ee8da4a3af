// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use jobwizard_core::domain::config::{WizardConfig, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file holding the defaults
    Generate {
        /// Output path (default: ./jobwizard-config.yaml)
        #[arg(short, long, default_value = "./jobwizard-config.yaml")]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, data_dir, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override), data_dir).await,
        ConfigCommand::Generate { output } => generate(output).await,
    }
}

/// Loads the configuration and applies the `--data-dir` flag on top.
pub fn load_with_overrides(path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<WizardConfig> {
    let mut config = WizardConfig::load_or_default(path).context("Failed to load configuration")?;
    if let Some(dir) = data_dir {
        config.storage.data_dir = Some(dir);
    }
    Ok(config)
}

async fn show(config_override: Option<PathBuf>, data_dir: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = load_with_overrides(config_override.clone(), data_dir)?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./jobwizard-config.yaml");
        println!("  4. ~/.jobwizard/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Uploads:".bold());
    println!("  Max files: {}", config.staging.max_files);
    println!(
        "  Max file size: {}MB",
        config.staging.max_file_size_bytes / (1024 * 1024)
    );
    println!("  Media types: {}", config.staging.supported_media_types.join(", "));
    println!();

    println!("{}", "Validation:".bold());
    println!(
        "  Min plausible address length: {}",
        config.validation.min_plausible_address_len
    );
    println!();

    println!("{}", "Payload defaults:".bold());
    println!("  Frequency: {}", config.defaults.frequency);
    println!("  Property type: {}", config.defaults.property_type);
    println!();

    println!("{}", "Storage:".bold());
    println!("  Data dir: {}", config.storage.resolve_data_dir().display());
    println!("  Draft key: {}", config.storage.keys.draft);
    println!("  Navigating key: {}", config.storage.keys.navigating);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = load_with_overrides(config_path, data_dir)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf) -> Result<()> {
    WizardConfig::default()
        .to_yaml_file(&output)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
