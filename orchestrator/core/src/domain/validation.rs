// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Wizard Validation
//!
//! Runs the common and category-specific rules against the current
//! `WizardState`. Validation is synchronous, re-run on demand (before leaving
//! the detail step and again right before submission) and short-circuits at
//! the first failing rule.
//!
//! ## Rule order
//!
//! | # | Rule | Steps |
//! |---|------|-------|
//! | 1 | A category is selected | all |
//! | 2 | Property type present (cleaning / commercial cleaning) | detail, confirm |
//! | 3 | A scheduled date is set | confirm |
//! | 4 | Service detail present (cleaning / commercial cleaning) | detail, confirm |
//! | 5 | Schema required fields, in declared order | detail, confirm |
//! | 6 | A delivery address resolves | confirm |

use std::sync::Arc;
use thiserror::Error;

use crate::domain::collaborators::WizardContext;
use crate::domain::config::ValidationConfig;
use crate::domain::form::non_blank;
use crate::domain::schema::CategorySchemaRegistry;
use crate::domain::wizard::{Location, WizardState, WizardStep};

pub const MSG_SELECT_CATEGORY: &str = "Please select a service category";
pub const MSG_PROPERTY_TYPE: &str = "Please select a property type";
pub const MSG_SCHEDULED_DATE: &str = "Please select a preferred date";
pub const MSG_SERVICE_DETAIL: &str = "Please describe the service you need";
pub const MSG_ADDRESS_MISSING: &str =
    "Please set your address in your profile before submitting a job";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// Recoverable by editing a field in the wizard.
    #[error("{0}")]
    UserInput(String),

    /// Only fixable on the profile page.
    #[error("{0}")]
    AddressMissing(String),
}

impl ValidationFailure {
    pub fn message(&self) -> &str {
        match self {
            Self::UserInput(msg) | Self::AddressMissing(msg) => msg,
        }
    }
}

pub type ValidationResult = Result<(), ValidationFailure>;

pub struct ValidationEngine {
    registry: Arc<CategorySchemaRegistry>,
    config: ValidationConfig,
}

impl ValidationEngine {
    pub fn new(registry: Arc<CategorySchemaRegistry>, config: ValidationConfig) -> Self {
        Self { registry, config }
    }

    /// Validates what the customer must have filled in to leave `step`.
    pub fn validate(&self, state: &WizardState, context: &WizardContext, step: WizardStep) -> ValidationResult {
        let user_input = |msg: &str| Err(ValidationFailure::UserInput(msg.to_string()));

        let Some(category) = state.selected_category else {
            return user_input(MSG_SELECT_CATEGORY);
        };
        if step == WizardStep::Category {
            return Ok(());
        }

        let confirming = step == WizardStep::Confirm;
        let form = &state.form_data;
        let requires_property = category.requires_property_details();

        if requires_property && non_blank(&form.property_type).is_none() {
            return user_input(MSG_PROPERTY_TYPE);
        }
        if confirming && state.scheduling.date.is_none() {
            return user_input(MSG_SCHEDULED_DATE);
        }
        if requires_property && non_blank(&form.service_detail).is_none() {
            return user_input(MSG_SERVICE_DETAIL);
        }

        let schema = self
            .registry
            .schema(category)
            .map_err(|e| ValidationFailure::UserInput(e.to_string()))?;
        if let Some(check) = schema.first_failure(form) {
            tracing::debug!(category = %category, field = check.field, "Required field check failed");
            return user_input(check.message);
        }

        if confirming && self.delivery_location(state, context).is_none() {
            return Err(ValidationFailure::AddressMissing(MSG_ADDRESS_MISSING.to_string()));
        }

        Ok(())
    }

    /// The location a job would be delivered to right now.
    pub fn delivery_location(&self, state: &WizardState, context: &WizardContext) -> Option<Location> {
        Location::resolve_delivery(
            &state.location,
            context.last_known_address.as_deref(),
            self.config.min_plausible_address_len,
        )
    }
}
