// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for job submission.
//!
//! These tests verify:
//! 1. A valid wizard produces one job with the normalized payload and uploads
//! 2. Success clears the stored draft and navigates to the new job
//! 3. A rejected submission keeps every entered value and surfaces the message
//! 4. A second submit while one is in flight never creates a duplicate job
//! 5. The last-known address fills in for a partial profile address
//! 6. A completed submission resets the wizard so it cannot be sent twice

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{NaiveDate, Timelike};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use jobwizard_core::application::{WizardDependencies, WizardError, WizardOrchestrator};
use jobwizard_core::domain::category::ServiceCategory;
use jobwizard_core::domain::collaborators::{
    FieldError, JobCreationError, JobCreationService, JobId, LocationPickerRequest, Navigator, ProfileService,
    SessionUser, WizardContext,
};
use jobwizard_core::domain::config::WizardConfig;
use jobwizard_core::domain::events::WizardEvent;
use jobwizard_core::domain::payload::{FileBundle, JobSubmission};
use jobwizard_core::domain::staging::StagedFile;
use jobwizard_core::domain::validation::{MSG_ADDRESS_MISSING, MSG_SCHEDULED_DATE, MSG_SELECT_CATEGORY};
use jobwizard_core::domain::wizard::{Location, WizardStep};
use jobwizard_core::infrastructure::event_bus::EventBus;
use jobwizard_core::infrastructure::storage::InMemoryKeyValueStore;

struct MockJobService {
    calls: AtomicUsize,
    received: Mutex<Vec<(JobSubmission, usize)>>,
    rejection: Option<JobCreationError>,
    gate: Option<Arc<Notify>>,
}

impl MockJobService {
    fn accepting() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            rejection: None,
            gate: None,
        }
    }

    fn rejecting(error: JobCreationError) -> Self {
        Self {
            rejection: Some(error),
            ..Self::accepting()
        }
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::accepting()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobCreationService for MockJobService {
    async fn create_job(&self, submission: &JobSubmission, files: &FileBundle) -> Result<JobId, JobCreationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.received.lock().push((submission.clone(), files.photos.len()));
        match &self.rejection {
            Some(error) => Err(error.clone()),
            None => Ok(JobId(format!("job-{}", call))),
        }
    }
}

struct FixedProfile(Option<Location>);

#[async_trait]
impl ProfileService for FixedProfile {
    async fn current_location(&self) -> anyhow::Result<Option<Location>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct JobNavigator {
    jobs: Mutex<Vec<JobId>>,
}

impl Navigator for JobNavigator {
    fn to_location_picker(&self, _request: LocationPickerRequest) {}

    fn to_dashboard(&self) {}

    fn to_job(&self, job_id: &JobId) {
        self.jobs.lock().push(job_id.clone());
    }
}

struct Setup {
    wizard: Arc<WizardOrchestrator>,
    jobs: Arc<MockJobService>,
    navigator: Arc<JobNavigator>,
    store: Arc<InMemoryKeyValueStore>,
    event_bus: EventBus,
}

async fn setup(jobs: MockJobService, profile: Option<Location>, context: WizardContext) -> Setup {
    let jobs = Arc::new(jobs);
    let navigator = Arc::new(JobNavigator::default());
    let store = Arc::new(InMemoryKeyValueStore::new());
    let event_bus = EventBus::new(64);
    let deps = WizardDependencies {
        store: store.clone(),
        job_service: jobs.clone(),
        profile_service: Arc::new(FixedProfile(profile)),
        navigator: navigator.clone(),
        event_bus: event_bus.clone(),
        config: WizardConfig::default(),
    };
    let wizard = Arc::new(WizardOrchestrator::mount(deps, context, None));
    wizard.refresh_location().await;
    Setup {
        wizard,
        jobs,
        navigator,
        store,
        event_bus,
    }
}

fn home() -> Location {
    Location::new("7 Canning Highway, Como", "Perth", None)
}

fn customer() -> WizardContext {
    WizardContext {
        session_user: Some(SessionUser {
            id: "cust-1042".to_string(),
            name: Some("Alex".to_string()),
            email: None,
        }),
        last_known_address: None,
    }
}

fn fill_handyman(wizard: &WizardOrchestrator) {
    wizard.select_category(ServiceCategory::Handyman);
    wizard.update_form(|form| {
        form.handyman_service_type = Some("Repairs".to_string());
        form.handyman_repairs = vec!["Leaking tap".to_string()];
        form.property_type = Some("apartment".to_string());
    });
    wizard.stage_files(vec![
        StagedFile::new("tap.jpg", "image/jpeg", Bytes::from_static(b"jpeg bytes")),
        StagedFile::new("drip.mp4", "video/mp4", Bytes::from_static(b"mp4 bytes")),
    ]);
    wizard.continue_to_confirm().unwrap();
    wizard.set_scheduled_date(NaiveDate::from_ymd_opt(2026, 12, 2));
    wizard.set_urgent(true);
}

#[tokio::test]
async fn test_submit_creates_one_job() {
    let setup = setup(MockJobService::accepting(), Some(home()), customer()).await;
    let mut events = setup.event_bus.subscribe();
    fill_handyman(&setup.wizard);
    assert!(setup.wizard.save_draft());

    let job_id = setup.wizard.submit().await.unwrap();
    assert_eq!(job_id, JobId("job-1".to_string()));
    assert_eq!(setup.jobs.calls(), 1);

    let (submission, file_count) = setup.jobs.received.lock()[0].clone();
    assert_eq!(file_count, 2);
    assert_eq!(submission.service_type, ServiceCategory::Handyman);
    assert_eq!(submission.service_detail, "Repairs, Leaking tap");
    assert_eq!(submission.property_type, "apartment");
    assert_eq!(submission.frequency, "One-time");
    assert!(submission.is_urgent);
    assert_eq!(submission.location, home());
    assert_eq!(submission.customer_id.as_deref(), Some("cust-1042"));
    assert_eq!(submission.scheduled_date.date_naive(), NaiveDate::from_ymd_opt(2026, 12, 2).unwrap());
    assert_eq!(submission.scheduled_date.hour(), 0);
    assert_eq!(submission.extensions["handymanRepairs"][0], "Leaking tap");

    // draft gone, uploads released, customer sent to the job
    assert!(!setup.store.contains_key("job_wizard_draft"));
    assert!(setup.wizard.state().staged_files.is_empty());
    assert_eq!(setup.navigator.jobs.lock().as_slice(), &[job_id.clone()]);
    assert!(!setup.wizard.is_submitting());

    let submitted = events
        .drain()
        .into_iter()
        .any(|e| matches!(e, WizardEvent::JobSubmitted { job_id: ref id, .. } if *id == job_id));
    assert!(submitted);
}

#[tokio::test]
async fn test_rejected_submission_keeps_state() {
    let rejection = JobCreationError::Rejected {
        message: Some("Validation failed".to_string()),
        field_errors: vec![FieldError {
            field: "scheduledDate".to_string(),
            message: "Date is fully booked".to_string(),
        }],
    };
    let setup = setup(MockJobService::rejecting(rejection), Some(home()), customer()).await;
    fill_handyman(&setup.wizard);

    match setup.wizard.submit().await {
        Err(WizardError::Submission(msg)) => assert_eq!(msg, "Validation failed, Date is fully booked"),
        other => panic!("unexpected result {:?}", other),
    }

    let state = setup.wizard.state();
    assert_eq!(state.step, WizardStep::Confirm);
    assert_eq!(state.staged_files.len(), 2);
    assert_eq!(state.form_data.handyman_repairs, vec!["Leaking tap".to_string()]);
    assert_eq!(
        state.errors.validation_error.as_deref(),
        Some("Validation failed, Date is fully booked")
    );
    assert!(!setup.wizard.is_submitting());

    // the retry reaches the service again
    assert!(setup.wizard.submit().await.is_err());
    assert_eq!(setup.jobs.calls(), 2);
}

#[tokio::test]
async fn test_incomplete_wizard_never_calls_service() {
    let setup = setup(MockJobService::accepting(), Some(home()), customer()).await;
    setup.wizard.select_category(ServiceCategory::Handyman);
    setup
        .wizard
        .update_form(|form| form.handyman_service_type = Some("Assembly".to_string()));

    match setup.wizard.submit().await {
        Err(WizardError::UserInput(msg)) => assert_eq!(msg, MSG_SCHEDULED_DATE),
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(setup.jobs.calls(), 0);
    assert_eq!(setup.wizard.state().errors.validation_error.as_deref(), Some(MSG_SCHEDULED_DATE));
}

#[tokio::test]
async fn test_missing_address_blocks_submission() {
    let setup = setup(MockJobService::accepting(), None, customer()).await;
    fill_handyman(&setup.wizard);

    assert!(matches!(setup.wizard.submit().await, Err(WizardError::AddressMissing(_))));
    assert_eq!(setup.wizard.state().errors.address_error.as_deref(), Some(MSG_ADDRESS_MISSING));
    assert_eq!(setup.jobs.calls(), 0);
}

#[tokio::test]
async fn test_partial_profile_address_uses_last_known() {
    let context = WizardContext {
        last_known_address: Some("7 Canning Highway, Como".to_string()),
        ..customer()
    };
    let setup = setup(
        MockJobService::accepting(),
        Some(Location::new("Perth", "Perth", None)),
        context,
    )
    .await;
    fill_handyman(&setup.wizard);

    setup.wizard.submit().await.unwrap();
    let (submission, _) = setup.jobs.received.lock()[0].clone();
    assert_eq!(submission.location.address, "7 Canning Highway, Como");
    assert_eq!(submission.location.city, "Perth");
}

#[tokio::test]
async fn test_double_submit_creates_single_job() {
    let gate = Arc::new(Notify::new());
    let setup = setup(MockJobService::gated(gate.clone()), Some(home()), customer()).await;
    fill_handyman(&setup.wizard);

    let first = {
        let wizard = setup.wizard.clone();
        tokio::spawn(async move { wizard.submit().await })
    };
    while setup.jobs.calls() == 0 {
        tokio::task::yield_now().await;
    }

    assert!(setup.wizard.is_submitting());
    assert!(matches!(setup.wizard.submit().await, Err(WizardError::SubmissionInFlight)));

    gate.notify_one();
    let job_id = first.await.unwrap().unwrap();
    assert_eq!(job_id, JobId("job-1".to_string()));
    assert_eq!(setup.jobs.calls(), 1);
    assert!(!setup.wizard.is_submitting());
}

#[tokio::test]
async fn test_second_submit_after_success_creates_no_job() {
    let setup = setup(MockJobService::accepting(), Some(home()), customer()).await;
    fill_handyman(&setup.wizard);

    setup.wizard.submit().await.unwrap();
    let state = setup.wizard.state();
    assert_eq!(state.step, WizardStep::Category);
    assert!(state.selected_category.is_none());
    assert!(state.form_data.handyman_repairs.is_empty());
    assert!(state.scheduling.date.is_none());
    // the resolved location carries over to the next request
    assert_eq!(state.location, home());

    match setup.wizard.submit().await {
        Err(WizardError::UserInput(msg)) => assert_eq!(msg, MSG_SELECT_CATEGORY),
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(setup.jobs.calls(), 1);
    assert_eq!(setup.navigator.jobs.lock().len(), 1);
}
