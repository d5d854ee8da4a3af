// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Draft management commands
//!
//! Commands: show, clear

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use jobwizard_core::application::DraftPersistence;
use jobwizard_core::domain::config::WizardConfig;
use jobwizard_core::infrastructure::storage::{create_key_value_store, StorageBackend};

#[derive(Subcommand)]
pub enum DraftCommand {
    /// Show the stored wizard draft
    Show {
        /// Print the raw snapshot JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the stored draft and navigating marker
    Clear,
}

pub async fn handle_command(command: DraftCommand, config: WizardConfig) -> Result<()> {
    let data_dir = config.storage.resolve_data_dir();
    let store = create_key_value_store(StorageBackend::Local {
        base_path: data_dir.clone(),
    })
    .with_context(|| format!("Failed to open draft storage at {}", data_dir.display()))?;
    let drafts = DraftPersistence::new(store, config.storage.keys.clone());

    match command {
        DraftCommand::Show { json } => {
            let Some(snapshot) = drafts.restore() else {
                println!("{}", "No stored draft".dimmed());
                return Ok(());
            };

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&snapshot).context("Failed to render draft")?
                );
                return Ok(());
            }

            println!("{}", "Stored draft:".bold());
            println!("  Saved at: {}", snapshot.saved_at);
            match snapshot.selected_category {
                Some(category) => println!("  Category: {} ({})", category.label(), category),
                None => println!("  Category: {}", "(none)".dimmed()),
            }
            match snapshot.scheduling.date {
                Some(date) => println!("  Date: {}", date),
                None => println!("  Date: {}", "(none)".dimmed()),
            }
            println!("  Urgent: {}", snapshot.scheduling.is_urgent);
            println!("  Files: {}", snapshot.files.len());
            for file in &snapshot.files {
                println!("    - {} ({})", file.name, file.media_type);
            }
            if drafts.is_navigating() {
                println!("  {}", "Location-picker trip in progress".yellow());
            }
            Ok(())
        }
        DraftCommand::Clear => {
            drafts.clear();
            println!("{}", "✓ Draft cleared".green());
            Ok(())
        }
    }
}
