// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Job request files
//!
//! A `JobRequest` is a YAML description of what a customer would enter into
//! the wizard. `replay` drives a mounted wizard through the same calls the
//! page shell would make, so the CLI exercises the real validation and
//! assembly path.

use anyhow::{Context, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use jobwizard_core::application::{WizardError, WizardOrchestrator};
use jobwizard_core::domain::collaborators::{SessionUser, WizardContext};
use jobwizard_core::domain::form::FormData;
use jobwizard_core::domain::staging::{StagedFile, StagingOutcome};
use jobwizard_core::domain::wizard::{Location, Scheduling, WizardStep};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    /// Category id as sent on the wire (e.g. "petsitting")
    pub category: String,
    #[serde(default)]
    pub form: FormData,
    #[serde(default)]
    pub scheduling: Scheduling,
    /// What the profile service reports; absent means no stored address
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub files: Vec<RequestFile>,
    #[serde(default)]
    pub customer: Option<SessionUser>,
    #[serde(default)]
    pub last_known_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFile {
    /// Relative paths resolve against the request file's directory
    pub path: PathBuf,
    /// Overrides content sniffing
    #[serde(default)]
    pub media_type: Option<String>,
}

/// What happened while replaying a request.
#[derive(Debug)]
pub struct Replay {
    pub staging: StagingOutcome,
    /// Result of leaving each step in turn, stopping at the first failure
    pub reached: Result<WizardStep, WizardError>,
}

impl JobRequest {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job request {:?}", path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse job request {:?}", path))
    }

    pub fn context(&self) -> WizardContext {
        WizardContext {
            session_user: self.customer.clone(),
            last_known_address: self.last_known_address.clone(),
        }
    }

    /// Reads every listed file relative to `base_dir`.
    pub fn load_files(&self, base_dir: &Path) -> Result<Vec<StagedFile>> {
        self.files
            .iter()
            .map(|file| {
                let path = if file.path.is_absolute() {
                    file.path.clone()
                } else {
                    base_dir.join(&file.path)
                };
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Failed to read upload {:?}", path))?;
                let media_type = file
                    .media_type
                    .clone()
                    .or_else(|| infer::get(&bytes).map(|kind| kind.mime_type().to_string()))
                    .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string());
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                debug!(file = %name, media_type = %media_type, size = bytes.len(), "Loaded upload");
                Ok(StagedFile::new(name, media_type, Bytes::from(bytes)))
            })
            .collect()
    }

    /// Enters the request into `wizard` and walks it to the confirm step.
    /// The profile location is expected to have been refreshed already.
    pub fn replay(&self, wizard: &WizardOrchestrator, uploads: Vec<StagedFile>) -> Replay {
        let reached = wizard.select_category_id(&self.category).map(|_| wizard.step());
        if reached.is_err() {
            return Replay {
                staging: StagingOutcome::default(),
                reached,
            };
        }

        let form = self.form.clone();
        wizard.update_form(move |data| {
            let service_type = data.service_type;
            *data = form;
            data.service_type = service_type;
        });

        let staging = wizard.stage_files(uploads);
        wizard.set_scheduled_date(self.scheduling.date);
        wizard.set_urgent(self.scheduling.is_urgent);
        wizard.set_final_instructions(self.scheduling.final_instructions.clone());

        let reached = wizard.continue_to_confirm();
        Replay { staging, reached }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::{LoggingNavigator, OfflineJobService, StaticProfileService};
    use jobwizard_core::application::WizardDependencies;
    use jobwizard_core::domain::category::ServiceCategory;
    use jobwizard_core::domain::config::WizardConfig;
    use jobwizard_core::infrastructure::event_bus::EventBus;
    use jobwizard_core::infrastructure::storage::InMemoryKeyValueStore;
    use std::sync::Arc;

    const PET_REQUEST: &str = r#"
category: petsitting
form:
  petType: Cat
  numberOfPets: "1"
  petService: Feeding
scheduling:
  date: 2026-11-20
  isUrgent: true
location:
  address: 14 Hardy Street, South Perth
  city: Perth
files:
  - path: cat.png
    mediaType: image/png
customer:
  id: cust-1
"#;

    #[test]
    fn test_parse_request() {
        let request: JobRequest = serde_yaml::from_str(PET_REQUEST).unwrap();
        assert_eq!(request.category, "petsitting");
        assert_eq!(request.form.pet_type.as_deref(), Some("Cat"));
        assert!(request.scheduling.is_urgent);
        assert_eq!(request.files[0].media_type.as_deref(), Some("image/png"));
        assert_eq!(request.context().customer_id(), Some("cust-1"));
        assert_eq!(request.category.parse::<ServiceCategory>().unwrap(), ServiceCategory::Petsitting);
    }

    #[test]
    fn test_load_files_relative_to_request() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.png"), b"\x89PNG\r\n\x1a\nrest").unwrap();
        let request: JobRequest = serde_yaml::from_str(PET_REQUEST).unwrap();

        let files = request.load_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].descriptor.name, "cat.png");
        assert_eq!(files[0].descriptor.media_type, "image/png");
        assert_eq!(files[0].descriptor.size, 12);
    }

    #[test]
    fn test_sniffs_media_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("photo"), b"\xFF\xD8\xFF\xE0jpegdata").unwrap();
        let request = JobRequest {
            category: "handyman".to_string(),
            form: FormData::default(),
            scheduling: Scheduling::default(),
            location: None,
            files: vec![RequestFile { path: PathBuf::from("photo"), media_type: None }],
            customer: None,
            last_known_address: None,
        };
        let files = request.load_files(dir.path()).unwrap();
        assert_eq!(files[0].descriptor.media_type, "image/jpeg");
    }

    fn mount_offline(request: &JobRequest) -> WizardOrchestrator {
        let deps = WizardDependencies {
            store: Arc::new(InMemoryKeyValueStore::new()),
            job_service: Arc::new(OfflineJobService::new()),
            profile_service: Arc::new(StaticProfileService::new(request.location.clone())),
            navigator: Arc::new(LoggingNavigator),
            event_bus: EventBus::default(),
            config: WizardConfig::default(),
        };
        WizardOrchestrator::mount(deps, request.context(), None)
    }

    #[tokio::test]
    async fn test_replay_petsitting_demo_reaches_confirm() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/petsitting-request.yaml");
        let request = JobRequest::from_yaml_file(path).unwrap();
        let wizard = mount_offline(&request);
        assert!(wizard.refresh_location().await);

        let replay = request.replay(&wizard, Vec::new());
        assert_eq!(replay.reached.unwrap(), WizardStep::Confirm);
        assert!(replay.staging.rejected.is_empty());

        let state = wizard.state();
        assert_eq!(state.selected_category, Some(ServiceCategory::Petsitting));
        assert_eq!(state.form_data.service_type, Some(ServiceCategory::Petsitting));
        assert_eq!(state.scheduling.final_instructions, "Leads are on the hook by the door");

        let assembled = wizard.assemble().unwrap();
        assert_eq!(assembled.submission.service_type, ServiceCategory::Petsitting);
        assert_eq!(assembled.submission.frequency, "Weekly");
        assert_eq!(assembled.submission.customer_id.as_deref(), Some("cust-1042"));
    }

    #[tokio::test]
    async fn test_replay_stops_at_unknown_category() {
        let mut request: JobRequest = serde_yaml::from_str(PET_REQUEST).unwrap();
        request.category = "gardening".to_string();
        let wizard = mount_offline(&request);

        let replay = request.replay(&wizard, Vec::new());
        assert!(matches!(replay.reached, Err(WizardError::UnknownCategory(_))));
        assert_eq!(wizard.step(), WizardStep::Category);
        assert!(wizard.state().form_data.pet_type.is_none());
    }

    #[test]
    fn test_missing_upload_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let request: JobRequest = serde_yaml::from_str(PET_REQUEST).unwrap();
        assert!(request.load_files(dir.path()).is_err());
    }
}
