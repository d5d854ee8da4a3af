// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Job Payload Assembly
//!
//! Turns the heterogeneous per-category wizard input into one normalized
//! `JobSubmission` plus a separate `FileBundle`. The assembler only builds
//! values; handing them to the job API is the orchestrator's concern.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Detail/property resolution, defaults, schema extensions

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::category::ServiceCategory;
use crate::domain::collaborators::WizardContext;
use crate::domain::config::PayloadDefaults;
use crate::domain::form::non_blank;
use crate::domain::schema::{CategorySchemaRegistry, SchemaError};
use crate::domain::staging::{FileDescriptor, StagedFile};
use crate::domain::validation::{ValidationEngine, ValidationFailure};
use crate::domain::wizard::{Location, WizardState, WizardStep};

/// Normalized job object sent to the job API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub service_type: ServiceCategory,
    pub service_detail: String,
    pub property_type: String,
    pub frequency: String,
    pub preferred_days: BTreeMap<String, Vec<String>>,
    pub custom_dates: Vec<NaiveDate>,
    pub repeat_weeks: String,
    /// Local midnight of the chosen day.
    pub scheduled_date: DateTime<FixedOffset>,
    pub instructions: String,
    pub is_urgent: bool,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Category-specific keys, flattened into the top level.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// Uploads travelling next to the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileBundle {
    pub photos: Vec<StagedFile>,
    /// Reserved for raw video uploads; the wizard sends videos as photos.
    pub videos: Vec<StagedFile>,
}

impl FileBundle {
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty() && self.videos.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &FileDescriptor> {
        self.photos.iter().chain(self.videos.iter()).map(|f| &f.descriptor)
    }

    pub fn total_bytes(&self) -> u64 {
        self.descriptors().map(|d| d.size).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledJob {
    pub submission: JobSubmission,
    pub files: FileBundle,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("Wizard state is incomplete: {0}")]
    IncompleteState(ValidationFailure),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Midnight in the local timezone. On a DST gap at midnight the wall clock
/// skips ahead, so the earliest valid instant that day is used.
pub fn local_midnight(date: NaiveDate) -> DateTime<FixedOffset> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
        .fixed_offset()
}

pub struct PayloadAssembler {
    registry: Arc<CategorySchemaRegistry>,
    validator: Arc<ValidationEngine>,
    defaults: PayloadDefaults,
}

impl PayloadAssembler {
    pub fn new(
        registry: Arc<CategorySchemaRegistry>,
        validator: Arc<ValidationEngine>,
        defaults: PayloadDefaults,
    ) -> Self {
        Self {
            registry,
            validator,
            defaults,
        }
    }

    pub fn assemble(&self, state: &WizardState, context: &WizardContext) -> Result<AssembledJob, AssemblyError> {
        self.validator
            .validate(state, context, WizardStep::Confirm)
            .map_err(AssemblyError::IncompleteState)?;

        // all three are guaranteed by a passing confirm-step validation
        let incomplete = |msg: &str| AssemblyError::IncompleteState(ValidationFailure::UserInput(msg.to_string()));
        let category = state
            .selected_category
            .ok_or_else(|| incomplete(crate::domain::validation::MSG_SELECT_CATEGORY))?;
        let date = state
            .scheduling
            .date
            .ok_or_else(|| incomplete(crate::domain::validation::MSG_SCHEDULED_DATE))?;
        let location = self.validator.delivery_location(state, context).ok_or_else(|| {
            AssemblyError::IncompleteState(ValidationFailure::AddressMissing(
                crate::domain::validation::MSG_ADDRESS_MISSING.to_string(),
            ))
        })?;

        let schema = self.registry.schema(category)?;
        let form = &state.form_data;

        let property_type = match non_blank(&form.property_type) {
            Some(entered) => entered.to_string(),
            None => self.defaults.property_type.clone(),
        };
        let instructions = match state.scheduling.final_instructions.trim() {
            "" => non_blank(&form.instructions).unwrap_or_default().to_string(),
            final_step => final_step.to_string(),
        };

        let submission = JobSubmission {
            service_type: category,
            service_detail: schema.resolve_service_detail(form),
            property_type,
            frequency: non_blank(&form.frequency)
                .map(str::to_string)
                .unwrap_or_else(|| self.defaults.frequency.clone()),
            preferred_days: form.preferred_days.clone(),
            custom_dates: form.custom_dates.clone(),
            repeat_weeks: form.repeat_weeks.clone().unwrap_or_default(),
            scheduled_date: local_midnight(date),
            instructions,
            is_urgent: state.scheduling.is_urgent,
            location,
            customer_id: context.customer_id().map(str::to_string),
            extensions: schema.payload_extension(form),
        };

        let files = FileBundle {
            photos: state.staged_files.clone(),
            videos: Vec::new(),
        };

        tracing::debug!(
            category = %category,
            files = files.photos.len(),
            bytes = files.total_bytes(),
            "Assembled job submission"
        );

        Ok(AssembledJob { submission, files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collaborators::SessionUser;
    use crate::domain::config::ValidationConfig;
    use bytes::Bytes;
    use chrono::Timelike;
    use serde_json::json;

    fn assembler() -> PayloadAssembler {
        let registry = Arc::new(CategorySchemaRegistry::standard());
        let validator = Arc::new(ValidationEngine::new(registry.clone(), ValidationConfig::default()));
        PayloadAssembler::new(registry, validator, PayloadDefaults::default())
    }

    fn context() -> WizardContext {
        WizardContext {
            session_user: Some(SessionUser { id: "cust-42".to_string(), name: None, email: None }),
            last_known_address: None,
        }
    }

    fn state(category: ServiceCategory) -> WizardState {
        let mut state = WizardState::new();
        state.step = WizardStep::Confirm;
        state.selected_category = Some(category);
        state.form_data.service_type = Some(category);
        state.scheduling.date = NaiveDate::from_ymd_opt(2026, 12, 1);
        state.location = Location::new("42 Wallaby Way, Sydney", "Sydney", None);
        state
    }

    #[test]
    fn test_incomplete_state_is_rejected() {
        let mut state = state(ServiceCategory::Housekeeping);
        state.form_data.housekeeping_service_type = vec![];
        let err = assembler().assemble(&state, &context()).unwrap_err();
        assert!(matches!(err, AssemblyError::IncompleteState(ValidationFailure::UserInput(_))));
    }

    #[test]
    fn test_housekeeping_defaults() {
        let mut state = state(ServiceCategory::Housekeeping);
        state.form_data.housekeeping_service_type = vec!["Vacuuming".to_string()];
        state.form_data.instructions = Some("Key under the mat".to_string());

        let job = assembler().assemble(&state, &context()).unwrap();
        let submission = job.submission;
        assert_eq!(submission.service_detail, "Vacuuming");
        assert_eq!(submission.property_type, "house");
        assert_eq!(submission.frequency, "One-time");
        assert!(submission.preferred_days.is_empty());
        assert!(submission.custom_dates.is_empty());
        assert_eq!(submission.repeat_weeks, "");
        assert_eq!(submission.instructions, "Key under the mat");
        assert_eq!(submission.customer_id.as_deref(), Some("cust-42"));
        assert_eq!(submission.extensions["housekeepingServiceType"], json!(["Vacuuming"]));
        assert!(job.files.is_empty());
    }

    #[test]
    fn test_final_instructions_take_precedence() {
        let mut state = state(ServiceCategory::Handyman);
        state.form_data.handyman_service_type = Some("Painting".to_string());
        state.form_data.instructions = Some("detail step".to_string());
        state.scheduling.final_instructions = "final step".to_string();
        state.scheduling.is_urgent = true;

        let submission = assembler().assemble(&state, &context()).unwrap().submission;
        assert_eq!(submission.instructions, "final step");
        assert!(submission.is_urgent);
        assert_eq!(submission.service_detail, "Painting");
    }

    #[test]
    fn test_cleaning_uses_entered_values() {
        let mut state = state(ServiceCategory::Cleaning);
        state.form_data.property_type = Some("apartment".to_string());
        state.form_data.service_detail = Some("Oven and windows".to_string());
        state.form_data.is_bond_clean = Some(true);
        state.form_data.frequency = Some("Weekly".to_string());

        let submission = assembler().assemble(&state, &context()).unwrap().submission;
        assert_eq!(submission.property_type, "apartment");
        assert_eq!(submission.service_detail, "Oven and windows");
        assert_eq!(submission.frequency, "Weekly");
        assert_eq!(submission.extensions["isBondClean"], json!(true));
    }

    #[test]
    fn test_scheduled_date_is_local_midnight() {
        let mut state = state(ServiceCategory::Handyman);
        state.form_data.handyman_service_type = Some("Painting".to_string());

        let submission = assembler().assemble(&state, &context()).unwrap().submission;
        assert_eq!(submission.scheduled_date.date_naive(), NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(submission.scheduled_date.hour(), 0);
        assert_eq!(submission.scheduled_date.minute(), 0);
    }

    #[test]
    fn test_files_bundled_as_photos() {
        let mut state = state(ServiceCategory::Handyman);
        state.form_data.handyman_service_type = Some("Painting".to_string());
        state.staged_files.push(StagedFile::new("wall.jpg", "image/jpeg", Bytes::from_static(b"jpeg")));
        state.staged_files.push(StagedFile::new("crack.mp4", "video/mp4", Bytes::from_static(b"mp4!")));

        let files = assembler().assemble(&state, &context()).unwrap().files;
        assert_eq!(files.photos.len(), 2);
        assert!(files.videos.is_empty());
        assert_eq!(files.total_bytes(), 8);
    }

    #[test]
    fn test_submission_json_shape() {
        let mut state = state(ServiceCategory::SupportServices);
        state.form_data.ndis_number = Some("123456789".to_string());
        state.form_data.support_type = Some("Daily living".to_string());

        let submission = assembler().assemble(&state, &context()).unwrap().submission;
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["serviceType"], json!("supportServices"));
        assert_eq!(value["serviceDetail"], json!("supportServices"));
        assert_eq!(value["ndisNumber"], json!("123456789"));
        assert_eq!(value["supportType"], json!("Daily living"));
        assert_eq!(value["location"]["address"], json!("42 Wallaby Way, Sydney"));
        assert_eq!(value["customerId"], json!("cust-42"));
    }
}
