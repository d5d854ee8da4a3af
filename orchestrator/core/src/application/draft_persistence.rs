// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Draft Persistence Application Service
//!
//! Mirrors wizard state to key-value storage on navigation boundaries so the
//! customer can leave to pick a location and come back to a filled form.
//!
//! Two keys are involved:
//! - the draft key, holding a JSON `DraftSnapshot`
//! - the navigating key, a marker that tells the next unmount "this is the
//!   location-picker round trip, keep the draft"
//!
//! Every storage call is best-effort: failures are logged and never block
//! navigation.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::config::StorageKeys;
use crate::domain::draft::DraftSnapshot;
use crate::domain::repository::KeyValueStore;
use crate::domain::wizard::WizardState;

const MARKER_VALUE: &str = "true";

/// What `on_unmount` did with the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmountOutcome {
    Preserved,
    Cleared,
}

pub struct DraftPersistence {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl DraftPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Writes the snapshot. Returns whether it was stored.
    pub fn snapshot(&self, state: &WizardState) -> bool {
        let snapshot = DraftSnapshot::capture(state);
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize wizard draft");
                return false;
            }
        };
        match self.store.set(&self.keys.draft, &json) {
            Ok(()) => {
                debug!(bytes = json.len(), files = snapshot.files.len(), "Wizard draft saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to save wizard draft");
                false
            }
        }
    }

    /// Snapshot plus the navigating marker, taken right before leaving for
    /// the location picker.
    pub fn snapshot_for_location_picker(&self, state: &WizardState) -> bool {
        let saved = self.snapshot(state);
        if let Err(e) = self.store.set(&self.keys.navigating, MARKER_VALUE) {
            warn!(error = %e, "Failed to set navigating marker; draft may be cleared on unmount");
            return false;
        }
        saved
    }

    /// Reads the snapshot. A malformed value is logged, discarded and
    /// reported as absent.
    pub fn restore(&self) -> Option<DraftSnapshot> {
        let raw = match self.store.get(&self.keys.draft) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read wizard draft");
                return None;
            }
        };

        match serde_json::from_str::<DraftSnapshot>(&raw) {
            Ok(snapshot) => {
                info!(
                    category = ?snapshot.selected_category,
                    saved_at = %snapshot.saved_at,
                    "Restored wizard draft"
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "Discarding corrupt wizard draft");
                self.remove_key(&self.keys.draft);
                None
            }
        }
    }

    /// Removes the snapshot and any navigating marker.
    pub fn clear(&self) {
        self.remove_key(&self.keys.draft);
        self.remove_key(&self.keys.navigating);
        debug!("Wizard draft cleared");
    }

    pub fn is_navigating(&self) -> bool {
        matches!(self.store.get(&self.keys.navigating), Ok(Some(v)) if v == MARKER_VALUE)
    }

    /// Keeps the draft only if the marker is set, consuming the marker so a
    /// later unrelated unmount clears normally.
    pub fn on_unmount(&self) -> UnmountOutcome {
        if self.is_navigating() {
            self.remove_key(&self.keys.navigating);
            debug!("Unmount during location-picker trip, draft preserved");
            UnmountOutcome::Preserved
        } else {
            self.clear();
            UnmountOutcome::Cleared
        }
    }

    fn remove_key(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key = key, error = %e, "Failed to remove wizard storage key");
        }
    }
}
