// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! External Collaborator Contracts - Anti-Corruption Layer
//!
//! The wizard core never talks to the network, the router or the session
//! store directly. These traits isolate it from the job API client, the
//! profile lookup and the page navigation layer so the whole flow can be
//! driven by test doubles.
//!
//! Ambient session data (the signed-in customer and the last address they
//! used) is passed in explicitly as a `WizardContext` instead of being read
//! from global storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::payload::{FileBundle, JobSubmission};
use crate::domain::wizard::{Location, WizardStep};

/// Origin tag the location picker uses to route the customer back here.
pub const LOCATION_PICKER_ORIGIN: &str = "job_wizard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session inputs the wizard needs but does not own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardContext {
    pub session_user: Option<SessionUser>,
    pub last_known_address: Option<String>,
}

impl WizardContext {
    pub fn customer_id(&self) -> Option<&str> {
        self.session_user.as_ref().map(|u| u.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobCreationError {
    /// The server answered but refused the job.
    #[error("Job rejected: {}", rejection_summary(.message, .field_errors))]
    Rejected {
        message: Option<String>,
        field_errors: Vec<FieldError>,
    },

    #[error("Job service unavailable: {0}")]
    Transport(String),
}

fn rejection_summary(message: &Option<String>, field_errors: &[FieldError]) -> String {
    let mut parts: Vec<String> = message.iter().cloned().collect();
    parts.extend(field_errors.iter().map(|e| e.message.clone()));
    if parts.is_empty() {
        "Failed to create job".to_string()
    } else {
        parts.join(", ")
    }
}

impl JobCreationError {
    /// Single message shown to the customer. Field-level errors are
    /// concatenated.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, field_errors } => rejection_summary(message, field_errors),
            Self::Transport(_) => "Failed to create job. Please try again.".to_string(),
        }
    }
}

#[async_trait]
pub trait JobCreationService: Send + Sync {
    /// Creates the job. Payload and uploads travel as separate arguments.
    async fn create_job(&self, submission: &JobSubmission, files: &FileBundle) -> Result<JobId, JobCreationError>;
}

#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Stored location of the signed-in customer, if they have one.
    async fn current_location(&self) -> anyhow::Result<Option<Location>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPickerRequest {
    pub origin: String,
    pub return_step: WizardStep,
}

pub trait Navigator: Send + Sync {
    fn to_location_picker(&self, request: LocationPickerRequest);

    fn to_dashboard(&self);

    fn to_job(&self, job_id: &JobId);
}
