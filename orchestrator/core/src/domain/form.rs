// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Wizard Form Data
//!
//! `FormData` is the superset bag shared by every category: one optional slot
//! per field across all detail forms. Slots that the active category does not
//! read are left untouched, so switching category back and forth never loses
//! what the customer already typed for a sibling category.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::category::ServiceCategory;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormData {
    // ── Common ────────────────────────────────────────────────────────────
    /// Mirrors the category picked in step 1.
    pub service_type: Option<ServiceCategory>,
    /// Generic service label used by categories without a dedicated picker.
    pub service: Option<String>,
    pub service_detail: Option<String>,
    pub property_type: Option<String>,
    pub frequency: Option<String>,
    /// Weekday name -> preferred time slots.
    pub preferred_days: BTreeMap<String, Vec<String>>,
    pub custom_dates: Vec<NaiveDate>,
    pub repeat_weeks: Option<String>,
    /// Instructions captured on the detail step.
    pub instructions: Option<String>,

    // ── Cleaning / commercial cleaning ────────────────────────────────────
    pub is_bond_clean: Option<bool>,

    // ── Pet sitting ───────────────────────────────────────────────────────
    pub pet_type: Option<String>,
    /// Raw input; validated as a positive number.
    pub number_of_pets: Option<String>,
    pub pet_service: Option<String>,

    // ── Housekeeping ──────────────────────────────────────────────────────
    pub housekeeping_service_type: Vec<String>,

    // ── Handyman ──────────────────────────────────────────────────────────
    pub handyman_service_type: Option<String>,
    pub handyman_repairs: Vec<String>,
    pub handyman_custom_requests: Vec<String>,

    // ── Support services (NDIS) ───────────────────────────────────────────
    pub ndis_number: Option<String>,
    pub support_type: Option<String>,
}

/// Returns the trimmed value when it holds something other than whitespace.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl FormData {
    pub fn number_of_pets(&self) -> Option<f64> {
        non_blank(&self.number_of_pets).and_then(|raw| raw.parse::<f64>().ok())
    }

    /// Trimmed NDIS number. Characters are not filtered here, so the
    /// nine-digit check still sees whatever was entered.
    pub fn trimmed_ndis_number(&self) -> Option<&str> {
        non_blank(&self.ndis_number)
    }
}
