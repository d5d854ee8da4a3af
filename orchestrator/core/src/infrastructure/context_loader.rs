// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Context Loader
//!
//! Builds the explicit `WizardContext` from the session records the rest of
//! the app keeps in key-value storage. Missing or malformed records degrade
//! to `None`; they never prevent the wizard from mounting.

use tracing::warn;

use crate::domain::collaborators::{SessionUser, WizardContext};
use crate::domain::config::StorageKeys;
use crate::domain::repository::KeyValueStore;

pub fn load_context(store: &dyn KeyValueStore, keys: &StorageKeys) -> WizardContext {
    let session_user = match store.get(&keys.session_user) {
        Ok(Some(raw)) => match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed session user record");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "Failed to read session user record");
            None
        }
    };

    let last_known_address = match store.get(&keys.last_known_address) {
        Ok(value) => value.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
        Err(e) => {
            warn!(error = %e, "Failed to read last-known address");
            None
        }
    };

    WizardContext {
        session_user,
        last_known_address,
    }
}

/// Remembers the address a job was last delivered to, best-effort.
pub fn remember_address(store: &dyn KeyValueStore, keys: &StorageKeys, address: &str) {
    if let Err(e) = store.set(&keys.last_known_address, address) {
        warn!(error = %e, "Failed to cache last-known address");
    }
}
