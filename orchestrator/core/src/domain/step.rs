// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Step Controller
//!
//! Owns wizard sequencing: Category (1) -> Detail (2) -> Confirm (3).
//! Forward moves go one step at a time; the only way to jump is `resume`,
//! used when hydrating from a draft after the location-picker round trip.
//! This layer never validates fields; the `ValidationEngine` gates exits.

use thiserror::Error;
use tracing::debug;

use crate::domain::category::ServiceCategory;
use crate::domain::wizard::{WizardState, WizardStep};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("Cannot move from step {from} to step {to}")]
    InvalidTransition { from: WizardStep, to: WizardStep },

    #[error("Select a service category before continuing")]
    NoCategorySelected,

    #[error("Already at the final step")]
    AtFinalStep,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StepController;

impl StepController {
    pub fn new() -> Self {
        Self
    }

    /// Records the category (on the state and in the form bag) and moves to
    /// the detail step.
    pub fn select_category(&self, state: &mut WizardState, category: ServiceCategory) {
        state.selected_category = Some(category);
        state.form_data.service_type = Some(category);
        state.step = WizardStep::Detail;
        debug!(category = %category, "Category selected");
    }

    pub fn advance(&self, state: &mut WizardState) -> Result<WizardStep, StepError> {
        let next = state.step.next().ok_or(StepError::AtFinalStep)?;
        if next == WizardStep::Detail && state.selected_category.is_none() {
            return Err(StepError::NoCategorySelected);
        }
        state.step = next;
        Ok(next)
    }

    /// Moves back one step, stopping at the first.
    pub fn back(&self, state: &mut WizardState) -> WizardStep {
        if let Some(previous) = state.step.previous() {
            state.step = previous;
        }
        state.step
    }

    pub fn go_to(&self, state: &mut WizardState, target: WizardStep) -> Result<WizardStep, StepError> {
        let current = state.step;
        if target == current {
            return Ok(current);
        }
        if current.next() == Some(target) {
            return self.advance(state);
        }
        if current.previous() == Some(target) {
            return Ok(self.back(state));
        }
        Err(StepError::InvalidTransition { from: current, to: target })
    }

    /// Jumps straight to `target`. Only for resuming a draft.
    pub fn resume(&self, state: &mut WizardState, target: WizardStep) {
        debug!(from = %state.step, to = %target, "Resuming wizard at step");
        state.step = target;
    }
}
