// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Offline collaborators
//!
//! Stand-ins for the job API, the profile service and the router so the
//! wizard can be driven from the command line without a backend.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use jobwizard_core::domain::collaborators::{
    JobCreationError, JobCreationService, JobId, LocationPickerRequest, Navigator, ProfileService,
};
use jobwizard_core::domain::payload::{FileBundle, JobSubmission};
use jobwizard_core::domain::wizard::Location;

/// Accepts every job and keeps it in memory.
#[derive(Default)]
pub struct OfflineJobService {
    submissions: Mutex<Vec<JobSubmission>>,
}

impl OfflineJobService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<JobSubmission> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl JobCreationService for OfflineJobService {
    async fn create_job(&self, submission: &JobSubmission, files: &FileBundle) -> Result<JobId, JobCreationError> {
        let job_id = JobId(format!("offline-{}", uuid::Uuid::new_v4()));
        info!(
            job_id = %job_id,
            category = %submission.service_type,
            files = files.photos.len(),
            bytes = files.total_bytes(),
            "Job accepted offline"
        );
        self.submissions.lock().push(submission.clone());
        Ok(job_id)
    }
}

/// Reports a fixed profile location.
pub struct StaticProfileService {
    location: Option<Location>,
}

impl StaticProfileService {
    pub fn new(location: Option<Location>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl ProfileService for StaticProfileService {
    async fn current_location(&self) -> anyhow::Result<Option<Location>> {
        Ok(self.location.clone())
    }
}

/// Logs navigation instead of performing it.
#[derive(Default)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn to_location_picker(&self, request: LocationPickerRequest) {
        info!(origin = %request.origin, return_step = %request.return_step, "Navigate: location picker");
    }

    fn to_dashboard(&self) {
        info!("Navigate: dashboard");
    }

    fn to_job(&self, job_id: &JobId) {
        info!(job_id = %job_id, "Navigate: job details");
    }
}
