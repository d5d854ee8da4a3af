// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Storage Interfaces
//!
//! Persistence contract for wizard drafts and session records. The domain
//! layer only sees string keys and string values; implementations live in
//! `crate::infrastructure::storage`.
//!
//! | Trait | Used for | Implementations |
//! |-------|----------|-----------------|
//! | `KeyValueStore` | draft snapshot, navigating marker, last-known address, session user | `InMemoryKeyValueStore`, `FileKeyValueStore` |
//!
//! Calls are synchronous: draft writes happen on navigation boundaries and
//! must finish before the page is left.

/// Durable string-keyed storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Create or overwrite a value
    fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
