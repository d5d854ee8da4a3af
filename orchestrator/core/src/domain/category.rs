// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service Category
//!
//! The closed set of top-level service types a customer picks in the first
//! wizard step. Every per-category behavior is keyed on this enum through the
//! `CategorySchemaRegistry`; nothing else dispatches on raw category strings.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceCategory {
    Cleaning,
    Housekeeping,
    SupportServices,
    CommercialCleaning,
    Petsitting,
    Handyman,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 6] = [
        ServiceCategory::Cleaning,
        ServiceCategory::Housekeeping,
        ServiceCategory::SupportServices,
        ServiceCategory::CommercialCleaning,
        ServiceCategory::Petsitting,
        ServiceCategory::Handyman,
    ];

    /// Wire identifier, as sent in `serviceType`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Cleaning => "cleaning",
            Self::Housekeeping => "housekeeping",
            Self::SupportServices => "supportServices",
            Self::CommercialCleaning => "commercialCleaning",
            Self::Petsitting => "petsitting",
            Self::Handyman => "handyman",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cleaning => "Cleaning",
            Self::Housekeeping => "Housekeeping",
            Self::SupportServices => "Support Services",
            Self::CommercialCleaning => "Commercial Cleaning",
            Self::Petsitting => "Pet Sitting",
            Self::Handyman => "Handyman",
        }
    }

    /// Categories whose detail form must capture a property type and a
    /// free-text service description.
    pub fn requires_property_details(&self) -> bool {
        matches!(self, Self::Cleaning | Self::CommercialCleaning)
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown service category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ServiceCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.id() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
