// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Wizard Configuration Types
//
// Defines the YAML configuration for the job request wizard:
// - Upload staging limits (file count, size, accepted media types)
// - Validation heuristics
// - Payload defaults for fields the customer may leave untouched
// - Storage keys used for drafts, the navigation marker and session records

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "JOBWIZARD_CONFIG_PATH";
pub const DATA_DIR_ENV: &str = "JOBWIZARD_DATA_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default)]
    pub staging: StagingConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub defaults: PayloadDefaults,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Maximum number of staged uploads
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Per-file size limit in bytes (default: 50 MiB)
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    #[serde(default = "default_supported_media_types")]
    pub supported_media_types: Vec<String>,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size_bytes: default_max_file_size_bytes(),
            supported_media_types: default_supported_media_types(),
        }
    }
}

fn default_max_files() -> usize {
    10
}

fn default_max_file_size_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_supported_media_types() -> Vec<String> {
    [
        "image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp",
        "video/mp4", "video/avi", "video/mov", "video/wmv", "video/flv", "video/webm",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Addresses shorter than this are treated as partial and replaced by the
    /// last-known address when one is available
    #[serde(default = "default_min_plausible_address_len")]
    pub min_plausible_address_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_plausible_address_len: default_min_plausible_address_len(),
        }
    }
}

fn default_min_plausible_address_len() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadDefaults {
    #[serde(default = "default_frequency")]
    pub frequency: String,

    #[serde(default = "default_property_type")]
    pub property_type: String,
}

impl Default for PayloadDefaults {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            property_type: default_property_type(),
        }
    }
}

fn default_frequency() -> String {
    "One-time".to_string()
}

fn default_property_type() -> String {
    "house".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the file-backed key-value store
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub keys: StorageKeys,
}

impl StorageConfig {
    /// Configured data directory, falling back to `~/.jobwizard/data`
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".jobwizard")
                .join("data")
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    #[serde(default = "default_draft_key")]
    pub draft: String,

    /// Ephemeral marker set while the customer is away picking a location
    #[serde(default = "default_navigating_key")]
    pub navigating: String,

    #[serde(default = "default_last_known_address_key")]
    pub last_known_address: String,

    #[serde(default = "default_session_user_key")]
    pub session_user: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            draft: default_draft_key(),
            navigating: default_navigating_key(),
            last_known_address: default_last_known_address_key(),
            session_user: default_session_user_key(),
        }
    }
}

fn default_draft_key() -> String {
    "job_wizard_draft".to_string()
}

fn default_navigating_key() -> String {
    "job_wizard_navigating".to_string()
}

fn default_last_known_address_key() -> String {
    "last_known_address".to_string()
}

fn default_session_user_key() -> String {
    "session_user".to_string()
}

impl WizardConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. JOBWIZARD_CONFIG_PATH environment variable
    /// 2. ./jobwizard-config.yaml (working directory)
    /// 3. ~/.jobwizard/config.yaml (user home)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./jobwizard-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".jobwizard").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    /// Load from an explicit path (failing if it is missing or invalid),
    /// else from discovery, else defaults.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.storage.data_dir = Some(PathBuf::from(dir));
            }
        }
    }

    /// Sanity checks that serde defaults cannot express
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.staging.max_files == 0 {
            anyhow::bail!("staging.max_files must be at least 1");
        }
        if self.staging.max_file_size_bytes == 0 {
            anyhow::bail!("staging.max_file_size_bytes must be greater than 0");
        }
        if self.staging.supported_media_types.is_empty() {
            anyhow::bail!("staging.supported_media_types must not be empty");
        }
        let keys = &self.storage.keys;
        let all = [&keys.draft, &keys.navigating, &keys.last_known_address, &keys.session_user];
        if all.iter().any(|k| k.trim().is_empty()) {
            anyhow::bail!("storage.keys entries must not be empty");
        }
        for (i, a) in all.iter().enumerate() {
            if all[i + 1..].contains(a) {
                anyhow::bail!("storage.keys entries must be distinct (duplicate: {})", a);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = WizardConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, WizardConfig::default());
        assert_eq!(config.staging.max_files, 10);
        assert_eq!(config.staging.max_file_size_bytes, 52_428_800);
        assert_eq!(config.defaults.frequency, "One-time");
        assert_eq!(config.storage.keys.draft, "job_wizard_draft");
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
staging:
  max_files: 4
validation:
  min_plausible_address_len: 6
storage:
  keys:
    draft: other_draft
"#;
        let config = WizardConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.staging.max_files, 4);
        assert_eq!(config.staging.supported_media_types.len(), 11);
        assert_eq!(config.validation.min_plausible_address_len, 6);
        assert_eq!(config.storage.keys.draft, "other_draft");
        assert_eq!(config.storage.keys.navigating, "job_wizard_navigating");
    }

    #[test]
    fn test_validate_rejects_duplicate_keys() {
        let mut config = WizardConfig::default();
        config.storage.keys.navigating = config.storage.keys.draft.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = WizardConfig::default();
        config.staging.max_files = 3;
        config.to_yaml_file(&path).unwrap();
        let loaded = WizardConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
