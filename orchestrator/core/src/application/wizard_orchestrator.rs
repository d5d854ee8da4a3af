// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wizard Orchestrator Application Service
//!
//! Composition root of the job request wizard. Wires together:
//! - Domain layer: StepController, CategorySchemaRegistry, ValidationEngine,
//!   FileStagingManager, PayloadAssembler
//! - Application layer: DraftPersistence
//! - Collaborators: JobCreationService, ProfileService, Navigator
//! - Event bus: publishing WizardEvents for observers
//!
//! The page shell talks to this type only. State lives behind a mutex that
//! is never held across an `.await`; each handler runs to completion before
//! the next one observes the state.

use chrono::{NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::application::draft_persistence::{DraftPersistence, UnmountOutcome};
use crate::domain::category::{ServiceCategory, UnknownCategory};
use crate::domain::collaborators::{
    JobCreationService, JobId, LocationPickerRequest, Navigator, ProfileService, WizardContext,
    LOCATION_PICKER_ORIGIN,
};
use crate::domain::config::WizardConfig;
use crate::domain::events::WizardEvent;
use crate::domain::form::FormData;
use crate::domain::payload::{AssembledJob, AssemblyError, PayloadAssembler};
use crate::domain::repository::KeyValueStore;
use crate::domain::schema::CategorySchemaRegistry;
use crate::domain::staging::{FileDescriptor, FileStagingManager, StagedFile, StagingOutcome};
use crate::domain::step::{StepController, StepError};
use crate::domain::validation::{ValidationEngine, ValidationFailure, ValidationResult, MSG_ADDRESS_MISSING};
use crate::domain::wizard::{Location, Scheduling, WizardState, WizardStep};
use crate::infrastructure::context_loader;
use crate::infrastructure::event_bus::{EventBus, LocationUpdateReceiver};

#[derive(Debug, Error)]
pub enum WizardError {
    /// Blocks the step or submission until a field is edited.
    #[error("{0}")]
    UserInput(String),

    /// Blocks submission until the profile has an address.
    #[error("{0}")]
    AddressMissing(String),

    /// The job API refused or could not be reached. State is kept for retry.
    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    #[error(transparent)]
    InvalidTransition(#[from] StepError),

    #[error("Wizard state is incomplete: {0}")]
    IncompleteState(String),
}

impl From<ValidationFailure> for WizardError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::UserInput(msg) => WizardError::UserInput(msg),
            ValidationFailure::AddressMissing(msg) => WizardError::AddressMissing(msg),
        }
    }
}

impl From<AssemblyError> for WizardError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::IncompleteState(failure) => failure.into(),
            AssemblyError::Schema(e) => WizardError::IncompleteState(e.to_string()),
        }
    }
}

/// Everything the orchestrator needs from the outside world.
#[derive(Clone)]
pub struct WizardDependencies {
    pub store: Arc<dyn KeyValueStore>,
    pub job_service: Arc<dyn JobCreationService>,
    pub profile_service: Arc<dyn ProfileService>,
    pub navigator: Arc<dyn Navigator>,
    pub event_bus: EventBus,
    pub config: WizardConfig,
}

/// Resets the in-flight flag however `submit` exits.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct WizardOrchestrator {
    state: Mutex<WizardState>,
    context: RwLock<WizardContext>,
    config: WizardConfig,
    steps: StepController,
    staging: FileStagingManager,
    validator: Arc<ValidationEngine>,
    assembler: PayloadAssembler,
    drafts: DraftPersistence,
    store: Arc<dyn KeyValueStore>,
    job_service: Arc<dyn JobCreationService>,
    profile_service: Arc<dyn ProfileService>,
    navigator: Arc<dyn Navigator>,
    event_bus: EventBus,
    submitting: AtomicBool,
    /// Flips to true on unmount; location tracking stops when it does
    unmounted: watch::Sender<bool>,
}

impl WizardOrchestrator {
    /// Creates the wizard, hydrating from a stored draft when one exists.
    /// `resume_step` (from the location-picker return trip) is honored only
    /// together with a draft.
    pub fn mount(deps: WizardDependencies, context: WizardContext, resume_step: Option<WizardStep>) -> Self {
        let WizardDependencies {
            store,
            job_service,
            profile_service,
            navigator,
            event_bus,
            config,
        } = deps;

        let registry = Arc::new(CategorySchemaRegistry::standard());
        let validator = Arc::new(ValidationEngine::new(registry.clone(), config.validation.clone()));
        let assembler = PayloadAssembler::new(registry, validator.clone(), config.defaults.clone());
        let drafts = DraftPersistence::new(store.clone(), config.storage.keys.clone());
        let staging = FileStagingManager::new(config.staging.clone());
        let steps = StepController::new();

        let (state, resumed) = match drafts.restore() {
            Some(snapshot) => {
                let mut state = snapshot.into_state();
                match resume_step {
                    Some(step) if step == WizardStep::Category || state.selected_category.is_some() => {
                        steps.resume(&mut state, step);
                    }
                    Some(step) => {
                        warn!(step = %step, "Draft has no category, not resuming past step 1");
                    }
                    None => {}
                }
                (state, true)
            }
            None => {
                if let Some(step) = resume_step {
                    debug!(step = %step, "Resume step ignored without a draft");
                }
                (WizardState::new(), false)
            }
        };

        info!(resumed, step = %state.step, "Job wizard mounted");
        event_bus.publish(WizardEvent::WizardMounted {
            resumed,
            step: state.step,
            mounted_at: Utc::now(),
        });

        Self {
            state: Mutex::new(state),
            context: RwLock::new(context),
            config,
            steps,
            staging,
            validator,
            assembler,
            drafts,
            store,
            job_service,
            profile_service,
            navigator,
            event_bus,
            submitting: AtomicBool::new(false),
            unmounted: watch::channel(false).0,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// Copy of the current state. Staged file buffers are shared, not copied.
    pub fn state(&self) -> WizardState {
        self.state.lock().clone()
    }

    pub fn step(&self) -> WizardStep {
        self.state.lock().step
    }

    pub fn context(&self) -> WizardContext {
        self.context.read().clone()
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn is_mounted(&self) -> bool {
        !*self.unmounted.borrow()
    }

    // ========================================================================
    // Step 1 and field edits
    // ========================================================================

    pub fn select_category(&self, category: ServiceCategory) {
        let from = {
            let mut state = self.state.lock();
            let from = state.step;
            self.steps.select_category(&mut state, category);
            state.errors.clear_validation();
            from
        };
        self.event_bus.publish(WizardEvent::CategorySelected {
            category,
            selected_at: Utc::now(),
        });
        self.publish_step_change(from, WizardStep::Detail);
    }

    /// Selects a category by its wire id.
    pub fn select_category_id(&self, category_id: &str) -> Result<(), WizardError> {
        let category: ServiceCategory = category_id.parse()?;
        self.select_category(category);
        Ok(())
    }

    /// Applies a field edit. The form is a superset, so editing one
    /// category's fields never disturbs another's.
    pub fn update_form(&self, edit: impl FnOnce(&mut FormData)) {
        edit(&mut self.state.lock().form_data);
        self.event_bus.publish(WizardEvent::FormUpdated { updated_at: Utc::now() });
    }

    pub fn set_scheduled_date(&self, date: Option<NaiveDate>) {
        self.edit_scheduling(|scheduling| scheduling.date = date);
    }

    pub fn set_urgent(&self, is_urgent: bool) {
        self.edit_scheduling(|scheduling| scheduling.is_urgent = is_urgent);
    }

    pub fn set_final_instructions(&self, instructions: impl Into<String>) {
        let instructions = instructions.into();
        self.edit_scheduling(|scheduling| scheduling.final_instructions = instructions);
    }

    fn edit_scheduling(&self, edit: impl FnOnce(&mut Scheduling)) {
        let (date, is_urgent) = {
            let mut state = self.state.lock();
            edit(&mut state.scheduling);
            (state.scheduling.date, state.scheduling.is_urgent)
        };
        self.event_bus.publish(WizardEvent::SchedulingUpdated {
            date,
            is_urgent,
            updated_at: Utc::now(),
        });
    }

    // ========================================================================
    // Navigation between steps
    // ========================================================================

    /// Runs validation for `step` and records the outcome on the state.
    pub fn validate(&self, step: WizardStep) -> ValidationResult {
        let context = self.context.read().clone();
        let result = {
            let mut state = self.state.lock();
            let result = self.validator.validate(&state, &context, step);
            record_validation(&mut state, &result);
            result
        };
        if let Err(failure) = &result {
            self.event_bus.publish(WizardEvent::ValidationFailed {
                step,
                message: failure.message().to_string(),
                failed_at: Utc::now(),
            });
        }
        result
    }

    /// Leaves the current step forward, once it validates.
    pub fn continue_step(&self) -> Result<WizardStep, WizardError> {
        let current = self.step();
        if current == WizardStep::Confirm {
            return Err(StepError::AtFinalStep.into());
        }
        self.validate(current)?;

        let next = self.steps.advance(&mut self.state.lock())?;
        self.publish_step_change(current, next);
        Ok(next)
    }

    /// The detail form's continue action: validates the detail step and
    /// moves to confirm.
    pub fn continue_to_confirm(&self) -> Result<WizardStep, WizardError> {
        let current = self.step();
        if current != WizardStep::Detail {
            return Err(StepError::InvalidTransition {
                from: current,
                to: WizardStep::Confirm,
            }
            .into());
        }
        self.continue_step()
    }

    pub fn back(&self) -> WizardStep {
        let (from, to) = {
            let mut state = self.state.lock();
            let from = state.step;
            (from, self.steps.back(&mut state))
        };
        self.publish_step_change(from, to);
        to
    }

    /// Moves to an adjacent step. Moving forward validates like
    /// `continue_step`.
    pub fn go_to(&self, target: WizardStep) -> Result<WizardStep, WizardError> {
        let current = self.step();
        if current.next() == Some(target) {
            return self.continue_step();
        }
        let to = self.steps.go_to(&mut self.state.lock(), target)?;
        self.publish_step_change(current, to);
        Ok(to)
    }

    fn publish_step_change(&self, from: WizardStep, to: WizardStep) {
        if from != to {
            debug!(from = %from, to = %to, "Wizard step changed");
            self.event_bus.publish(WizardEvent::StepChanged {
                from,
                to,
                changed_at: Utc::now(),
            });
        }
    }

    // ========================================================================
    // Uploads
    // ========================================================================

    pub fn stage_files(&self, files: Vec<StagedFile>) -> StagingOutcome {
        let (outcome, total) = {
            let mut state = self.state.lock();
            let outcome = self.staging.add(&mut state.staged_files, files);
            state.errors.upload_error = outcome.message();
            (outcome, state.staged_files.len())
        };
        if !outcome.rejected.is_empty() {
            info!(rejected = outcome.rejected.len(), "Some uploads were rejected");
        }
        self.event_bus.publish(WizardEvent::FilesStaged {
            accepted: outcome.accepted.len(),
            rejected: outcome.rejected.len(),
            total,
            staged_at: Utc::now(),
        });
        outcome
    }

    /// Removes one staged upload and releases its buffer.
    pub fn remove_file(&self, index: usize) -> Option<FileDescriptor> {
        let removed = {
            let mut state = self.state.lock();
            self.staging.remove(&mut state.staged_files, index)
        }?;
        self.event_bus.publish(WizardEvent::FileRemoved {
            index,
            name: removed.descriptor.name.clone(),
            removed_at: Utc::now(),
        });
        Some(removed.descriptor)
    }

    // ========================================================================
    // Location
    // ========================================================================

    /// Looks up the customer's stored location. Returns whether one was
    /// found; lookup errors are logged and leave the current location alone.
    /// Does nothing once the wizard is unmounted.
    pub async fn refresh_location(&self) -> bool {
        if !self.is_mounted() {
            debug!("Wizard unmounted, skipping profile lookup");
            return false;
        }
        let lookup = self.profile_service.current_location().await;
        if !self.is_mounted() {
            debug!("Wizard unmounted during profile lookup, result dropped");
            return false;
        }

        let found = match lookup {
            Ok(Some(location)) if location.is_set() => {
                if location.is_plausible(self.config.validation.min_plausible_address_len) {
                    context_loader::remember_address(
                        self.store.as_ref(),
                        &self.config.storage.keys,
                        &location.address,
                    );
                    self.context.write().last_known_address = Some(location.address.clone());
                }
                let mut state = self.state.lock();
                state.location = location;
                state.errors.address_error = None;
                true
            }
            Ok(_) => {
                let fallback = self.context.read().last_known_address.is_some();
                let mut state = self.state.lock();
                state.location = Location::not_set();
                if !fallback {
                    state.errors.address_error = Some(MSG_ADDRESS_MISSING.to_string());
                }
                false
            }
            Err(e) => {
                warn!(error = %e, "Profile lookup failed");
                return false;
            }
        };

        self.event_bus.publish(WizardEvent::LocationResolved {
            found,
            resolved_at: Utc::now(),
        });
        found
    }

    /// Re-runs the profile lookup on every `LocationUpdated` event until the
    /// wizard is unmounted or dropped, or the bus closes. Only a weak
    /// reference is held between updates.
    pub async fn watch_location_updates(self: Arc<Self>, updates: LocationUpdateReceiver) {
        let unmounted = self.unmounted.subscribe();
        let wizard = Arc::downgrade(&self);
        drop(self);
        track_location(wizard, updates, unmounted).await;
    }

    /// Fire-and-forget initial lookup plus the update listener. The task
    /// ends on unmount.
    pub fn spawn_location_tracking(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let updates = self.event_bus.subscribe_location_updates();
        let unmounted = self.unmounted.subscribe();
        let wizard = Arc::downgrade(self);
        tokio::spawn(async move {
            if let Some(wizard) = wizard.upgrade() {
                wizard.refresh_location().await;
            }
            track_location(wizard, updates, unmounted).await;
        })
    }

    /// Saves the draft and leaves for the location picker. The next unmount
    /// keeps the draft so the customer returns to this step.
    pub fn go_to_location_picker(&self) {
        let return_step = {
            let state = self.state.lock();
            self.drafts.snapshot_for_location_picker(&state);
            state.step
        };
        self.event_bus.publish(WizardEvent::DraftSaved {
            navigating_away: true,
            saved_at: Utc::now(),
        });
        self.navigator.to_location_picker(LocationPickerRequest {
            origin: LOCATION_PICKER_ORIGIN.to_string(),
            return_step,
        });
    }

    /// Plain snapshot, without the navigating marker.
    pub fn save_draft(&self) -> bool {
        let saved = self.drafts.snapshot(&self.state.lock());
        if saved {
            self.event_bus.publish(WizardEvent::DraftSaved {
                navigating_away: false,
                saved_at: Utc::now(),
            });
        }
        saved
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Releases staged uploads and keeps or clears the draft depending on
    /// whether this is the location-picker round trip.
    pub fn unmount(&self) -> UnmountOutcome {
        self.unmounted.send_replace(true);
        let released = self.state.lock().release_staged_files();
        if !released.is_empty() {
            debug!(files = released.len(), "Released staged uploads");
        }

        let outcome = self.drafts.on_unmount();
        if outcome == UnmountOutcome::Cleared {
            self.event_bus.publish(WizardEvent::DraftCleared { cleared_at: Utc::now() });
        }
        self.event_bus.publish(WizardEvent::WizardUnmounted {
            draft_preserved: outcome == UnmountOutcome::Preserved,
            unmounted_at: Utc::now(),
        });
        info!(?outcome, "Job wizard unmounted");
        outcome
    }

    /// Abandons the wizard for the dashboard.
    pub fn exit_to_dashboard(&self) -> UnmountOutcome {
        self.navigator.to_dashboard();
        self.unmount()
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Builds the payload without sending it.
    pub fn assemble(&self) -> Result<AssembledJob, WizardError> {
        let context = self.context.read().clone();
        let mut state = self.state.lock();
        let assembled = self.assembler.assemble(&state, &context);
        match &assembled {
            Ok(_) => state.errors.clear_validation(),
            Err(AssemblyError::IncompleteState(failure)) => {
                record_validation(&mut state, &Err(failure.clone()));
            }
            Err(AssemblyError::Schema(_)) => {}
        }
        Ok(assembled?)
    }

    /// Validates, assembles and hands the job to the job API. A second call
    /// while one is in flight fails fast instead of creating a duplicate.
    pub async fn submit(&self) -> Result<JobId, WizardError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Submit ignored, a submission is already in flight");
            return Err(WizardError::SubmissionInFlight);
        }
        let _in_flight = InFlightGuard(&self.submitting);

        let assembled = match self.assemble() {
            Ok(assembled) => assembled,
            Err(e) => {
                self.event_bus.publish(WizardEvent::ValidationFailed {
                    step: WizardStep::Confirm,
                    message: e.to_string(),
                    failed_at: Utc::now(),
                });
                return Err(e);
            }
        };
        let category = assembled.submission.service_type;

        info!(
            category = %category,
            files = assembled.files.photos.len(),
            urgent = assembled.submission.is_urgent,
            "Submitting job"
        );

        match self
            .job_service
            .create_job(&assembled.submission, &assembled.files)
            .await
        {
            Ok(job_id) => {
                self.drafts.clear();
                // start over, keeping only the resolved location
                let from = {
                    let mut state = self.state.lock();
                    let from = state.step;
                    state.release_staged_files();
                    let location = std::mem::take(&mut state.location);
                    *state = WizardState::new();
                    state.location = location;
                    from
                };
                info!(job_id = %job_id, "Job created");
                self.event_bus.publish(WizardEvent::JobSubmitted {
                    job_id: job_id.clone(),
                    category,
                    submitted_at: Utc::now(),
                });
                self.publish_step_change(from, WizardStep::Category);
                self.navigator.to_job(&job_id);
                Ok(job_id)
            }
            Err(e) => {
                warn!(error = %e, "Job creation failed");
                let message = e.user_message();
                self.state.lock().errors.validation_error = Some(message.clone());
                self.event_bus.publish(WizardEvent::SubmissionFailed {
                    message: message.clone(),
                    failed_at: Utc::now(),
                });
                Err(WizardError::Submission(message))
            }
        }
    }
}

async fn track_location(
    wizard: Weak<WizardOrchestrator>,
    mut updates: LocationUpdateReceiver,
    mut unmounted: watch::Receiver<bool>,
) {
    loop {
        if *unmounted.borrow_and_update() {
            break;
        }
        tokio::select! {
            changed = unmounted.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            update = updates.recv() => {
                if update.is_err() {
                    debug!("Location update stream closed");
                    break;
                }
                let Some(wizard) = wizard.upgrade() else {
                    break;
                };
                debug!("Location update signalled, refreshing profile location");
                wizard.refresh_location().await;
            }
        }
    }
    debug!("Location tracking stopped");
}

fn record_validation(state: &mut WizardState, result: &ValidationResult) {
    state.errors.clear_validation();
    match result {
        Ok(()) => {}
        Err(ValidationFailure::UserInput(msg)) => state.errors.validation_error = Some(msg.clone()),
        Err(ValidationFailure::AddressMissing(msg)) => state.errors.address_error = Some(msg.clone()),
    }
}
