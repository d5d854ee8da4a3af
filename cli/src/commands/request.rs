// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Job request commands
//!
//! Commands: validate, assemble, submit

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jobwizard_core::application::{DraftPersistence, WizardDependencies, WizardOrchestrator};
use jobwizard_core::domain::config::WizardConfig;
use jobwizard_core::domain::staging::StagingOutcome;
use jobwizard_core::domain::wizard::WizardStep;
use jobwizard_core::infrastructure::event_bus::{EventBus, EventReceiver};
use jobwizard_core::infrastructure::storage::{FileKeyValueStore, InMemoryKeyValueStore};

use crate::job_request::JobRequest;
use crate::offline::{LoggingNavigator, OfflineJobService, StaticProfileService};

#[derive(Subcommand)]
pub enum RequestCommand {
    /// Replay a request and report the first validation failure
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Save the replayed state as the stored draft
        #[arg(long)]
        save_draft: bool,

        /// Print wizard events as they were published
        #[arg(long)]
        events: bool,
    },

    /// Replay a request and print the assembled job payload
    Assemble {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        events: bool,
    },

    /// Replay a request and submit it to the offline job service
    Submit {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        events: bool,
    },
}

pub async fn handle_command(command: RequestCommand, config: WizardConfig) -> Result<()> {
    match command {
        RequestCommand::Validate { file, save_draft, events } => {
            validate(&file, config, save_draft, events).await
        }
        RequestCommand::Assemble { file, events } => assemble(&file, config, events).await,
        RequestCommand::Submit { file, events } => submit(&file, config, events).await,
    }
}

struct OfflineSession {
    wizard: Arc<WizardOrchestrator>,
    job_service: Arc<OfflineJobService>,
    events: EventReceiver,
}

/// Mounts a wizard with offline collaborators and replays `file` into it.
async fn replay(file: &Path, config: WizardConfig) -> Result<(OfflineSession, bool)> {
    let request = JobRequest::from_yaml_file(file)?;
    let base_dir = file.parent().unwrap_or_else(|| Path::new("."));
    let uploads = request.load_files(base_dir)?;

    let event_bus = EventBus::default();
    let events = event_bus.subscribe();
    let job_service = Arc::new(OfflineJobService::new());
    let deps = WizardDependencies {
        store: Arc::new(InMemoryKeyValueStore::new()),
        job_service: job_service.clone(),
        profile_service: Arc::new(StaticProfileService::new(request.location.clone())),
        navigator: Arc::new(LoggingNavigator),
        event_bus,
        config,
    };

    let wizard = Arc::new(WizardOrchestrator::mount(deps, request.context(), None));
    wizard.refresh_location().await;

    let replay = request.replay(&wizard, uploads);
    print_staging(&replay.staging);

    let reached_confirm = match replay.reached {
        Ok(step) => {
            println!("  Reached step {}", step);
            step == WizardStep::Confirm
        }
        Err(e) => {
            println!("{}", format!("✗ Stopped at step {}: {}", wizard.step(), e).red());
            false
        }
    };

    Ok((
        OfflineSession {
            wizard,
            job_service,
            events,
        },
        reached_confirm,
    ))
}

fn print_staging(outcome: &StagingOutcome) {
    if !outcome.accepted.is_empty() {
        println!("  Staged {} file(s)", outcome.accepted.len());
    }
    if let Some(message) = outcome.message() {
        println!("  {}", message.yellow());
    }
}

fn print_events(session: &mut OfflineSession) {
    println!();
    println!("{}", "Events:".bold());
    for event in session.events.drain() {
        println!("  {}", event.name().dimmed());
    }
}

async fn validate(file: &Path, config: WizardConfig, save_draft: bool, events: bool) -> Result<()> {
    println!("Validating job request {}...", file.display());
    let data_dir = config.storage.resolve_data_dir();
    let keys = config.storage.keys.clone();

    let (mut session, reached_confirm) = replay(file, config).await?;

    if save_draft {
        let store = FileKeyValueStore::new(&data_dir).context("Failed to open draft storage")?;
        let drafts = DraftPersistence::new(Arc::new(store), keys);
        if drafts.snapshot(&session.wizard.state()) {
            println!("  Draft saved to {}", data_dir.display());
        } else {
            println!("{}", "  Draft could not be saved".yellow());
        }
    }

    let result = if reached_confirm {
        session.wizard.validate(WizardStep::Confirm)
    } else {
        Ok(())
    };

    if events {
        print_events(&mut session);
    }

    if !reached_confirm {
        anyhow::bail!("Job request is incomplete");
    }
    match result {
        Ok(()) => {
            println!("{}", "✓ Job request is valid".green());
            Ok(())
        }
        Err(failure) => {
            println!("{}", format!("✗ {}", failure).red());
            anyhow::bail!("Job request is incomplete")
        }
    }
}

async fn assemble(file: &Path, config: WizardConfig, events: bool) -> Result<()> {
    let (mut session, reached_confirm) = replay(file, config).await?;
    if !reached_confirm {
        anyhow::bail!("Job request is incomplete");
    }

    let assembled = session.wizard.assemble();
    if events {
        print_events(&mut session);
    }
    let assembled = assembled.context("Failed to assemble job")?;

    println!();
    println!("{}", "Job payload:".bold());
    println!(
        "{}",
        serde_json::to_string_pretty(&assembled.submission).context("Failed to render payload")?
    );
    println!();
    println!("{}", "Files:".bold());
    if assembled.files.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for descriptor in assembled.files.descriptors() {
        println!("  {} ({}, {} bytes)", descriptor.name, descriptor.media_type, descriptor.size);
    }

    Ok(())
}

async fn submit(file: &Path, config: WizardConfig, events: bool) -> Result<()> {
    let (mut session, reached_confirm) = replay(file, config).await?;
    if !reached_confirm {
        anyhow::bail!("Job request is incomplete");
    }

    let result = session.wizard.submit().await;
    if events {
        print_events(&mut session);
    }
    let job_id = result.context("Failed to submit job")?;

    println!(
        "{}",
        format!(
            "✓ Job {} created ({} accepted offline)",
            job_id,
            session.job_service.submissions().len()
        )
        .green()
    );
    Ok(())
}
