// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Draft Snapshot
//!
//! Serializable projection of `WizardState` written to key-value storage when
//! the customer leaves the wizard, and merged back into a fresh state when
//! they return. Raw upload bytes are never persisted, only their metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::ServiceCategory;
use crate::domain::form::FormData;
use crate::domain::staging::FileDescriptor;
use crate::domain::wizard::{Scheduling, WizardState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    #[serde(default)]
    pub form_data: FormData,
    #[serde(default)]
    pub selected_category: Option<ServiceCategory>,
    #[serde(default)]
    pub scheduling: Scheduling,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
    pub saved_at: DateTime<Utc>,
}

impl DraftSnapshot {
    pub fn capture(state: &WizardState) -> Self {
        Self {
            form_data: state.form_data.clone(),
            selected_category: state.selected_category,
            scheduling: state.scheduling.clone(),
            files: state.staged_files.iter().map(|f| f.descriptor.clone()).collect(),
            saved_at: Utc::now(),
        }
    }

    /// Fresh state carrying the persisted fields. Staged files are not
    /// rehydrated since their bytes were never stored.
    pub fn into_state(self) -> WizardState {
        let mut state = WizardState::new();
        state.form_data = self.form_data;
        state.selected_category = self.selected_category;
        state.scheduling = self.scheduling;
        state
    }
}
