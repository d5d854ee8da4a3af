// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Wizard Domain Model
//!
//! Defines the `WizardState` aggregate and its value objects. The aggregate is
//! owned by the `WizardOrchestrator`; all mutation goes through the step
//! controller, the staging manager or the orchestrator's field setters.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Aggregate Root:** WizardState

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::category::ServiceCategory;
use crate::domain::form::FormData;
use crate::domain::staging::StagedFile;

// ============================================================================
// Value Objects
// ============================================================================

/// The three wizard screens, numbered as the navigation layer numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    Category = 1,
    Detail = 2,
    Confirm = 3,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            Self::Category => Some(Self::Detail),
            Self::Detail => Some(Self::Confirm),
            Self::Confirm => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            Self::Category => None,
            Self::Detail => Some(Self::Category),
            Self::Confirm => Some(Self::Detail),
        }
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Category),
            2 => Ok(Self::Detail),
            3 => Ok(Self::Confirm),
            other => Err(format!("Invalid wizard step: {}", other)),
        }
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Category => "category",
            Self::Detail => "detail",
            Self::Confirm => "confirm",
        };
        write!(f, "{} ({})", self.number(), name)
    }
}

/// Step 3 inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scheduling {
    pub date: Option<NaiveDate>,
    pub is_urgent: bool,
    pub final_instructions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Delivery location as stored on the customer's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub coordinates: Option<Coordinates>,
}

impl Location {
    pub const ADDRESS_NOT_SET: &'static str = "Address not set";

    pub fn new(address: impl Into<String>, city: impl Into<String>, coordinates: Option<Coordinates>) -> Self {
        Self {
            address: address.into(),
            city: city.into(),
            coordinates,
        }
    }

    /// Sentinel used until the profile lookup returns something usable.
    pub fn not_set() -> Self {
        Self::new(Self::ADDRESS_NOT_SET, "", None)
    }

    pub fn is_set(&self) -> bool {
        let address = self.address.trim();
        !address.is_empty() && address != Self::ADDRESS_NOT_SET
    }

    /// Weak heuristic: very short addresses are usually partial profile data.
    pub fn is_plausible(&self, min_len: usize) -> bool {
        self.is_set() && self.address.trim().chars().count() >= min_len
    }

    /// Resolves the address a job is delivered to. A held location that is
    /// missing or implausible is replaced by the last-known address, when one
    /// exists. Returns `None` when nothing usable remains.
    pub fn resolve_delivery(
        held: &Location,
        last_known_address: Option<&str>,
        min_plausible_len: usize,
    ) -> Option<Location> {
        let mut candidate = held.clone();
        if !held.is_plausible(min_plausible_len) {
            if let Some(fallback) = last_known_address.map(str::trim).filter(|a| !a.is_empty()) {
                tracing::debug!(
                    held = %held.address,
                    "Held location implausible, using last-known address"
                );
                candidate.address = fallback.to_string();
            }
        }
        candidate.is_set().then_some(candidate)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::not_set()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientErrors {
    pub validation_error: Option<String>,
    pub address_error: Option<String>,
    pub upload_error: Option<String>,
}

impl TransientErrors {
    pub fn clear_validation(&mut self) {
        self.validation_error = None;
        self.address_error = None;
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

#[derive(Debug, Clone)]
pub struct WizardState {
    pub step: WizardStep,
    pub selected_category: Option<ServiceCategory>,
    pub form_data: FormData,
    pub staged_files: Vec<StagedFile>,
    pub scheduling: Scheduling,
    pub location: Location,
    pub errors: TransientErrors,
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Category,
            selected_category: None,
            form_data: FormData::default(),
            staged_files: Vec::new(),
            scheduling: Scheduling::default(),
            location: Location::not_set(),
            errors: TransientErrors::default(),
        }
    }

    /// Total bytes currently held by staged uploads.
    pub fn staged_bytes(&self) -> u64 {
        self.staged_files.iter().map(|f| f.descriptor.size).sum()
    }

    /// Drops every staged upload along with its buffer.
    pub fn release_staged_files(&mut self) -> Vec<Bytes> {
        self.staged_files.drain(..).map(|f| f.bytes).collect()
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}
