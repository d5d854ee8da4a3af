// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::ServiceCategory;
use crate::domain::collaborators::JobId;
use crate::domain::wizard::WizardStep;

/// Wizard lifecycle events
///
/// Published by the orchestrator on every state change. `LocationUpdated` is
/// the one inbound event: the profile page emits it after the customer edits
/// their address, and the wizard re-runs its profile lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    WizardMounted {
        resumed: bool,
        step: WizardStep,
        mounted_at: DateTime<Utc>,
    },
    CategorySelected {
        category: ServiceCategory,
        selected_at: DateTime<Utc>,
    },
    StepChanged {
        from: WizardStep,
        to: WizardStep,
        changed_at: DateTime<Utc>,
    },
    FormUpdated {
        updated_at: DateTime<Utc>,
    },
    SchedulingUpdated {
        date: Option<NaiveDate>,
        is_urgent: bool,
        updated_at: DateTime<Utc>,
    },
    ValidationFailed {
        step: WizardStep,
        message: String,
        failed_at: DateTime<Utc>,
    },
    FilesStaged {
        accepted: usize,
        rejected: usize,
        total: usize,
        staged_at: DateTime<Utc>,
    },
    FileRemoved {
        index: usize,
        name: String,
        removed_at: DateTime<Utc>,
    },
    DraftSaved {
        navigating_away: bool,
        saved_at: DateTime<Utc>,
    },
    DraftCleared {
        cleared_at: DateTime<Utc>,
    },
    LocationUpdated {
        updated_at: DateTime<Utc>,
    },
    LocationResolved {
        found: bool,
        resolved_at: DateTime<Utc>,
    },
    JobSubmitted {
        job_id: JobId,
        category: ServiceCategory,
        submitted_at: DateTime<Utc>,
    },
    SubmissionFailed {
        message: String,
        failed_at: DateTime<Utc>,
    },
    WizardUnmounted {
        draft_preserved: bool,
        unmounted_at: DateTime<Utc>,
    },
}

impl WizardEvent {
    pub fn location_updated() -> Self {
        WizardEvent::LocationUpdated { updated_at: Utc::now() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WizardMounted { .. } => "wizard_mounted",
            Self::CategorySelected { .. } => "category_selected",
            Self::StepChanged { .. } => "step_changed",
            Self::FormUpdated { .. } => "form_updated",
            Self::SchedulingUpdated { .. } => "scheduling_updated",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::FilesStaged { .. } => "files_staged",
            Self::FileRemoved { .. } => "file_removed",
            Self::DraftSaved { .. } => "draft_saved",
            Self::DraftCleared { .. } => "draft_cleared",
            Self::LocationUpdated { .. } => "location_updated",
            Self::LocationResolved { .. } => "location_resolved",
            Self::JobSubmitted { .. } => "job_submitted",
            Self::SubmissionFailed { .. } => "submission_failed",
            Self::WizardUnmounted { .. } => "wizard_unmounted",
        }
    }
}
