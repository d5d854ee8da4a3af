// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Job Wizard Core
//!
//! Orchestration core of the multi-step job request wizard: step flow,
//! per-category schemas, validation, draft persistence, upload staging and
//! payload assembly.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Entry point:** [`application::WizardOrchestrator`]

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
