// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Storage Infrastructure Module
//!
//! Provides concrete implementations of the `KeyValueStore` trait used for
//! wizard drafts and session records.

pub mod local;
pub mod memory;

pub use local::FileKeyValueStore;
pub use memory::InMemoryKeyValueStore;

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::repository::{KeyValueStore, RepositoryError};

/// Storage backend configuration
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// One file per key under a base directory
    Local { base_path: PathBuf },

    /// Process-local map for tests and embedding
    InMemory,
}

/// Factory function to create a key-value store from configuration
pub fn create_key_value_store(backend: StorageBackend) -> Result<Arc<dyn KeyValueStore>, RepositoryError> {
    match backend {
        StorageBackend::Local { base_path } => Ok(Arc::new(FileKeyValueStore::new(base_path)?)),
        StorageBackend::InMemory => Ok(Arc::new(InMemoryKeyValueStore::new())),
    }
}
