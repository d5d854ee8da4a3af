// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod draft_persistence;
pub mod wizard_orchestrator;

// Re-export services for convenience
pub use draft_persistence::{DraftPersistence, UnmountOutcome};
pub use wizard_orchestrator::{WizardDependencies, WizardError, WizardOrchestrator};
