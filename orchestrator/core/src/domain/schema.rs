// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Category Schema Registry
//!
//! Declares, per service category, which detail fields are required, how the
//! canonical `serviceDetail` is derived when the customer leaves it blank, and
//! which extra keys the category contributes to the job payload.
//!
//! Schemas are plain data plus function pointers: no hidden state, so each one
//! can be exercised in isolation. Adding a category means adding one
//! `ServiceCategory` variant and registering one schema; the validation
//! engine and payload assembler only ever talk to this interface.
//!
//! | Category | Required checks | Blank detail falls back to |
//! |----------|-----------------|----------------------------|
//! | `cleaning`, `commercialCleaning` | (property type + detail, enforced by the engine) | `service`, then the id |
//! | `petsitting` | pet type, number of pets, pet service | the pet service |
//! | `housekeeping` | at least one service | joined services, then `"Housekeeping"` |
//! | `handyman` | service type | service type + repairs + custom requests |
//! | `supportServices` | 9-digit NDIS number, support type | `service`, then the id |

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::category::{ServiceCategory, UnknownCategory};
use crate::domain::form::{non_blank, FormData};

pub type FormPredicate = fn(&FormData) -> bool;
pub type DetailResolver = fn(ServiceCategory, &FormData) -> String;
pub type PayloadExtension = fn(&FormData) -> Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Unknown service category: {0}")]
    UnknownCategory(String),
}

impl From<UnknownCategory> for SchemaError {
    fn from(err: UnknownCategory) -> Self {
        SchemaError::UnknownCategory(err.0)
    }
}

/// One required-field rule: a predicate over the form plus the message shown
/// when it does not hold.
#[derive(Debug, Clone, Copy)]
pub struct FieldCheck {
    pub field: &'static str,
    pub message: &'static str,
    pub is_satisfied: FormPredicate,
}

#[derive(Debug, Clone)]
pub struct CategorySchema {
    pub category: ServiceCategory,
    pub required_fields: Vec<FieldCheck>,
    detail_resolver: DetailResolver,
    payload_extension: PayloadExtension,
}

impl CategorySchema {
    pub fn new(
        category: ServiceCategory,
        required_fields: Vec<FieldCheck>,
        detail_resolver: DetailResolver,
        payload_extension: PayloadExtension,
    ) -> Self {
        Self {
            category,
            required_fields,
            detail_resolver,
            payload_extension,
        }
    }

    pub fn requires_property_details(&self) -> bool {
        self.category.requires_property_details()
    }

    /// First failing required-field check, in declared order.
    pub fn first_failure(&self, form: &FormData) -> Option<&FieldCheck> {
        self.required_fields.iter().find(|check| !(check.is_satisfied)(form))
    }

    /// The entered detail when present, otherwise the category's derived one.
    pub fn resolve_service_detail(&self, form: &FormData) -> String {
        match non_blank(&form.service_detail) {
            Some(detail) => detail.to_string(),
            None => (self.detail_resolver)(self.category, form),
        }
    }

    pub fn payload_extension(&self, form: &FormData) -> Map<String, Value> {
        (self.payload_extension)(form)
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CategorySchemaRegistry {
    schemas: HashMap<ServiceCategory, CategorySchema>,
}

impl CategorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in category.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(cleaning_schema(ServiceCategory::Cleaning));
        registry.register(cleaning_schema(ServiceCategory::CommercialCleaning));
        registry.register(housekeeping_schema());
        registry.register(petsitting_schema());
        registry.register(handyman_schema());
        registry.register(support_services_schema());
        registry
    }

    pub fn register(&mut self, schema: CategorySchema) {
        self.schemas.insert(schema.category, schema);
    }

    pub fn schema(&self, category: ServiceCategory) -> Result<&CategorySchema, SchemaError> {
        self.schemas
            .get(&category)
            .ok_or_else(|| SchemaError::UnknownCategory(category.id().to_string()))
    }

    /// Lookup by wire id, e.g. `"supportServices"`.
    pub fn get_schema(&self, category_id: &str) -> Result<&CategorySchema, SchemaError> {
        let category: ServiceCategory = category_id.parse()?;
        self.schema(category)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

// ============================================================================
// Built-in schemas
// ============================================================================

fn join_non_empty<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn generic_detail(category: ServiceCategory, form: &FormData) -> String {
    non_blank(&form.service)
        .map(str::to_string)
        .unwrap_or_else(|| category.id().to_string())
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn cleaning_schema(category: ServiceCategory) -> CategorySchema {
    fn extension(form: &FormData) -> Map<String, Value> {
        object(json!({ "isBondClean": form.is_bond_clean.unwrap_or(false) }))
    }
    fn no_extension(_: &FormData) -> Map<String, Value> {
        Map::new()
    }

    let payload_extension: PayloadExtension = match category {
        ServiceCategory::Cleaning => extension,
        _ => no_extension,
    };
    // property type and detail are enforced by the engine itself, ahead of
    // the scheduling check
    CategorySchema::new(category, Vec::new(), generic_detail, payload_extension)
}

fn housekeeping_schema() -> CategorySchema {
    fn detail(_: ServiceCategory, form: &FormData) -> String {
        let joined = join_non_empty(form.housekeeping_service_type.iter().map(String::as_str));
        if joined.is_empty() {
            "Housekeeping".to_string()
        } else {
            joined
        }
    }
    fn extension(form: &FormData) -> Map<String, Value> {
        object(json!({ "housekeepingServiceType": form.housekeeping_service_type }))
    }

    CategorySchema::new(
        ServiceCategory::Housekeeping,
        vec![FieldCheck {
            field: "housekeepingServiceType",
            message: "Please select at least one housekeeping service",
            is_satisfied: |form| form.housekeeping_service_type.iter().any(|s| !s.trim().is_empty()),
        }],
        detail,
        extension,
    )
}

fn petsitting_schema() -> CategorySchema {
    fn detail(category: ServiceCategory, form: &FormData) -> String {
        non_blank(&form.pet_service)
            .map(str::to_string)
            .unwrap_or_else(|| generic_detail(category, form))
    }
    fn extension(form: &FormData) -> Map<String, Value> {
        object(json!({
            "petType": non_blank(&form.pet_type),
            "numberOfPets": form.number_of_pets(),
            "petService": non_blank(&form.pet_service),
        }))
    }

    CategorySchema::new(
        ServiceCategory::Petsitting,
        vec![
            FieldCheck {
                field: "petType",
                message: "Please specify the type of pet",
                is_satisfied: |form| non_blank(&form.pet_type).is_some(),
            },
            FieldCheck {
                field: "numberOfPets",
                message: "Please enter a valid number of pets",
                is_satisfied: |form| form.number_of_pets().is_some_and(|n| n.is_finite() && n > 0.0),
            },
            FieldCheck {
                field: "petService",
                message: "Please select a pet sitting service",
                is_satisfied: |form| non_blank(&form.pet_service).is_some(),
            },
        ],
        detail,
        extension,
    )
}

fn handyman_schema() -> CategorySchema {
    fn detail(category: ServiceCategory, form: &FormData) -> String {
        let joined = join_non_empty(
            form.handyman_service_type
                .as_deref()
                .into_iter()
                .chain(form.handyman_repairs.iter().map(String::as_str))
                .chain(form.handyman_custom_requests.iter().map(String::as_str)),
        );
        if joined.is_empty() {
            generic_detail(category, form)
        } else {
            joined
        }
    }
    fn extension(form: &FormData) -> Map<String, Value> {
        object(json!({
            "handymanServiceType": non_blank(&form.handyman_service_type),
            "handymanRepairs": form.handyman_repairs,
            "handymanCustomRequests": form.handyman_custom_requests,
        }))
    }

    CategorySchema::new(
        ServiceCategory::Handyman,
        vec![FieldCheck {
            field: "handymanServiceType",
            message: "Please select a handyman service type",
            is_satisfied: |form| non_blank(&form.handyman_service_type).is_some(),
        }],
        detail,
        extension,
    )
}

fn support_services_schema() -> CategorySchema {
    fn extension(form: &FormData) -> Map<String, Value> {
        object(json!({
            "ndisNumber": form.trimmed_ndis_number(),
            "supportType": non_blank(&form.support_type),
        }))
    }

    CategorySchema::new(
        ServiceCategory::SupportServices,
        vec![
            FieldCheck {
                field: "ndisNumber",
                message: "NDIS number must be exactly 9 digits",
                is_satisfied: |form| {
                    form.trimmed_ndis_number()
                        .is_some_and(|n| n.len() == 9 && n.bytes().all(|b| b.is_ascii_digit()))
                },
            },
            FieldCheck {
                field: "supportType",
                message: "Please select a support type",
                is_satisfied: |form| non_blank(&form.support_type).is_some(),
            },
        ],
        generic_detail,
        extension,
    )
}
