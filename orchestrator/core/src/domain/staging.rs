// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! File Staging Domain Service
//!
//! Validates and holds customer uploads (photos and short videos) until the
//! job is submitted. Each file in a batch is judged on its own, so one bad
//! file never blocks the valid ones next to it.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Per-file size/type gate and the staged-list cap

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::config::StagingConfig;

const MIB: u64 = 1024 * 1024;

/// File metadata. This is all that survives a draft snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub media_type: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileDescriptor {
    pub fn is_video(&self) -> bool {
        self.media_type.starts_with("video/")
    }
}

/// An upload candidate held in memory until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub descriptor: FileDescriptor,
    pub bytes: Bytes,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            descriptor: FileDescriptor {
                name: name.into(),
                size: bytes.len() as u64,
                media_type: media_type.into(),
                last_modified: None,
            },
            bytes,
        }
    }

    /// Builds a staged file whose declared size comes from the picker rather
    /// than the buffer, as browsers report it before the bytes are read.
    pub fn with_declared_size(descriptor: FileDescriptor, bytes: Bytes) -> Self {
        Self { descriptor, bytes }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    TooLarge { size: u64, limit: u64 },
    UnsupportedType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

impl std::fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            RejectionReason::TooLarge { limit, .. } => write!(
                f,
                "{} is too large. Maximum file size is {}MB",
                self.file_name,
                limit / MIB
            ),
            RejectionReason::UnsupportedType(media_type) => write!(
                f,
                "{} has an unsupported file type ({})",
                self.file_name, media_type
            ),
        }
    }
}

/// Result of one `add` batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagingOutcome {
    pub accepted: Vec<FileDescriptor>,
    pub rejected: Vec<UploadRejection>,
    /// Valid files that did not fit under the cap. Not reported to the user
    /// and not listed in `accepted`.
    pub dropped: usize,
}

impl StagingOutcome {
    /// Single banner message for the batch, `None` when nothing was rejected.
    pub fn message(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        Some(
            self.rejected
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(". "),
        )
    }
}

pub struct FileStagingManager {
    config: StagingConfig,
}

impl FileStagingManager {
    pub fn new(config: StagingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StagingConfig {
        &self.config
    }

    pub fn check(&self, descriptor: &FileDescriptor) -> Result<(), RejectionReason> {
        if descriptor.size > self.config.max_file_size_bytes {
            return Err(RejectionReason::TooLarge {
                size: descriptor.size,
                limit: self.config.max_file_size_bytes,
            });
        }
        if !self
            .config
            .supported_media_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&descriptor.media_type))
        {
            return Err(RejectionReason::UnsupportedType(descriptor.media_type.clone()));
        }
        Ok(())
    }

    /// Appends the valid files of `files` to `staged`, oldest first, then
    /// truncates to the configured cap.
    pub fn add(&self, staged: &mut Vec<StagedFile>, files: Vec<StagedFile>) -> StagingOutcome {
        let mut outcome = StagingOutcome::default();

        for file in files {
            match self.check(&file.descriptor) {
                Ok(()) => {
                    outcome.accepted.push(file.descriptor.clone());
                    staged.push(file);
                }
                Err(reason) => outcome.rejected.push(UploadRejection {
                    file_name: file.descriptor.name,
                    reason,
                }),
            }
        }

        if staged.len() > self.config.max_files {
            outcome.dropped = staged.len() - self.config.max_files;
            staged.truncate(self.config.max_files);
            // the newest entries are the ones cut
            let kept = outcome.accepted.len().saturating_sub(outcome.dropped);
            outcome.accepted.truncate(kept);
            debug!(dropped = outcome.dropped, "Staged files over cap dropped");
        }

        outcome
    }

    pub fn remove(&self, staged: &mut Vec<StagedFile>, index: usize) -> Option<StagedFile> {
        (index < staged.len()).then(|| staged.remove(index))
    }
}

impl Default for FileStagingManager {
    fn default() -> Self {
        Self::new(StagingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, media_type: &str, size: u64) -> StagedFile {
        StagedFile::with_declared_size(
            FileDescriptor {
                name: name.to_string(),
                size,
                media_type: media_type.to_string(),
                last_modified: None,
            },
            Bytes::new(),
        )
    }

    #[test]
    fn test_size_boundary() {
        let manager = FileStagingManager::default();
        let mut staged = Vec::new();

        let outcome = manager.add(
            &mut staged,
            vec![
                file("exact.jpg", "image/jpeg", 50 * MIB),
                file("over.jpg", "image/jpeg", 51 * MIB),
            ],
        );

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].name, "exact.jpg");
        assert_eq!(outcome.rejected.len(), 1);
        assert!(matches!(outcome.rejected[0].reason, RejectionReason::TooLarge { .. }));
        assert_eq!(staged.len(), 1);
    }

    #[test]
    fn test_supported_types() {
        let manager = FileStagingManager::default();
        for media_type in [
            "image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp",
            "video/mp4", "video/avi", "video/mov", "video/wmv", "video/flv", "video/webm",
        ] {
            assert!(manager.check(&file("f", media_type, 10).descriptor).is_ok(), "{}", media_type);
        }
        for media_type in ["application/pdf", "image/svg+xml", "video/quicktime", ""] {
            assert!(manager.check(&file("f", media_type, 10).descriptor).is_err(), "{}", media_type);
        }
    }

    #[test]
    fn test_cap_keeps_oldest_and_does_not_report_dropped() {
        let manager = FileStagingManager::default();
        let mut staged = Vec::new();

        let first: Vec<_> = (0..7).map(|i| file(&format!("a{}.png", i), "image/png", 1)).collect();
        manager.add(&mut staged, first);
        let second: Vec<_> = (0..7).map(|i| file(&format!("b{}.png", i), "image/png", 1)).collect();
        let outcome = manager.add(&mut staged, second);

        assert_eq!(staged.len(), 10);
        assert_eq!(staged[0].descriptor.name, "a0.png");
        assert_eq!(staged[9].descriptor.name, "b2.png");
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.dropped, 4);
        assert_eq!(outcome.accepted.len(), 3);
        assert_eq!(outcome.accepted.last().map(|d| d.name.as_str()), Some("b2.png"));
        assert_eq!(outcome.message(), None);
    }

    #[test]
    fn test_never_exceeds_cap_for_any_batching() {
        let manager = FileStagingManager::default();
        for batch in [1usize, 3, 10, 11, 25] {
            let mut staged = Vec::new();
            for round in 0..5 {
                let files = (0..batch)
                    .map(|i| file(&format!("{}-{}.gif", round, i), "image/gif", 1))
                    .collect();
                manager.add(&mut staged, files);
                assert!(staged.len() <= 10);
            }
        }
    }

    #[test]
    fn test_rejection_message_concatenates() {
        let manager = FileStagingManager::default();
        let mut staged = Vec::new();
        let outcome = manager.add(
            &mut staged,
            vec![
                file("doc.pdf", "application/pdf", 1),
                file("ok.png", "image/png", 1),
                file("huge.mp4", "video/mp4", 60 * MIB),
            ],
        );

        let message = outcome.message().unwrap();
        assert!(message.contains("doc.pdf has an unsupported file type"));
        assert!(message.contains("huge.mp4 is too large. Maximum file size is 50MB"));
        assert_eq!(staged.len(), 1);
    }

    #[test]
    fn test_remove_is_positional() {
        let manager = FileStagingManager::default();
        let mut staged = Vec::new();
        manager.add(
            &mut staged,
            vec![file("a.png", "image/png", 1), file("b.png", "image/png", 1), file("c.png", "image/png", 1)],
        );

        let removed = manager.remove(&mut staged, 1).unwrap();
        assert_eq!(removed.descriptor.name, "b.png");
        let names: Vec<_> = staged.iter().map(|f| f.descriptor.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.png"]);
        assert!(manager.remove(&mut staged, 5).is_none());
    }
}
