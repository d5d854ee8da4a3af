// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Local Filesystem Key-Value Store
//!
//! Stores each key as one file under a base directory. Used by the CLI to
//! keep drafts between runs, and by tests that need durability across
//! separately constructed stores.
//!
//! **Limitations:**
//! - Single-process use; there is no cross-process locking
//! - Keys are restricted to `[A-Za-z0-9_.-]` so they map to safe file names

use std::path::{Path, PathBuf};

use crate::domain::repository::{KeyValueStore, RepositoryError};

const VALUE_EXTENSION: &str = "kv";

pub struct FileKeyValueStore {
    /// Base directory for all keys (e.g., "~/.jobwizard/data")
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at `base_path`, creating the directory and
    /// checking that it is writable.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            RepositoryError::Io(format!(
                "Failed to create base directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let test_file = base_path.join(".jobwizard-storage-test");
        std::fs::write(&test_file, b"test").map_err(|e| {
            RepositoryError::Io(format!(
                "Base directory {} is not writable: {}",
                base_path.display(),
                e
            ))
        })?;
        std::fs::remove_file(&test_file)?;

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve_path(&self, key: &str) -> Result<PathBuf, RepositoryError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(RepositoryError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let path = self.resolve_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::Io(format!("Failed to read {}: {}", key, e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let path = self.resolve_path(key)?;
        // write-then-rename so readers never see a half-written value
        let tmp = path.with_extension(format!("{}.tmp", VALUE_EXTENSION));
        std::fs::write(&tmp, value)
            .map_err(|e| RepositoryError::Io(format!("Failed to write {}: {}", key, e)))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| RepositoryError::Io(format!("Failed to commit {}: {}", key, e)))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        let path = self.resolve_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepositoryError::Io(format!("Failed to remove {}: {}", key, e))),
        }
    }
}
