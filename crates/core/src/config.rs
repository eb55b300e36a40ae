//! Configuration via `strand.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Values are validated eagerly on load.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StrandError, StrandResult};
use crate::id::{Id, TASK_SYSTEM_BUCKET_ID};

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "strand.toml";

/// Largest run page the platform serves
pub const TASK_MAX_PAGE_SIZE: usize = 500;

/// Default range start of archive queries, in days before now
pub const DEFAULT_LOOKBACK_DAYS: u32 = 100_000;

/// What `finish_run` does when the archive write fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFailurePolicy {
    /// Return `ArchiveWrite` to the caller
    #[default]
    Fail,
    /// Log and return the finished run
    Warn,
}

/// `[archive]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Bucket that receives archived runs
    #[serde(default = "default_system_bucket")]
    pub system_bucket_id: Id,
    /// How far back archive queries look
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Platform maximum page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Policy for archive-write failures during run finalization
    #[serde(default)]
    pub on_write_failure: ArchiveFailurePolicy,
}

fn default_system_bucket() -> Id {
    TASK_SYSTEM_BUCKET_ID
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_max_page_size() -> usize {
    TASK_MAX_PAGE_SIZE
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            system_bucket_id: default_system_bucket(),
            lookback_days: default_lookback_days(),
            max_page_size: default_max_page_size(),
            on_write_failure: ArchiveFailurePolicy::default(),
        }
    }
}

/// `[migration]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Run the bucket migration check at startup
    #[serde(default = "default_true")]
    pub check_on_open: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            check_on_open: true,
        }
    }
}

/// Configuration loaded from `strand.toml`.
///
/// # Example
///
/// ```toml
/// [archive]
/// system_bucket_id = "000000000000000a"
/// on_write_failure = "warn"
///
/// [migration]
/// check_on_open = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrandConfig {
    /// Run archive settings
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Startup migration settings
    #[serde(default)]
    pub migration: MigrationConfig,
}

impl StrandConfig {
    /// Reject values that would make the services misbehave
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero page size or zero lookback.
    pub fn validate(&self) -> StrandResult<()> {
        if self.archive.max_page_size == 0 {
            return Err(StrandError::invalid_input(
                "archive.max_page_size must be greater than 0",
            ));
        }
        if self.archive.lookback_days == 0 {
            return Err(StrandError::invalid_input(
                "archive.lookback_days must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strand configuration

[archive]
# Bucket receiving archived task runs
system_bucket_id = "000000000000000a"
# Range start of archive queries, in days before now
lookback_days = 100000
# Largest page of runs returned by a single request
max_page_size = 500
# What finishing a run does when archiving it fails:
#   "fail" = return an archive-write error (the run is still finished)
#   "warn" = log the failure and return the finished run
on_write_failure = "fail"

[migration]
# Convert legacy bucket records at startup if not already done
check_on_open = true
"#
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> StrandResult<Self> {
        let config: StrandConfig = toml::from_str(content)
            .map_err(|e| StrandError::invalid_input(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> StrandResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StrandError::io(
                format!("Failed to read config file '{}'", path.display()),
                e,
            )
        })?;
        Self::from_toml(&content)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> StrandResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                StrandError::io(
                    format!("Failed to write default config file '{}'", path.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StrandResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StrandError::invalid_input(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            StrandError::io(
                format!("Failed to write config file '{}'", path.display()),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_toml_parses_to_default() {
        let config = StrandConfig::from_toml(StrandConfig::default_toml()).unwrap();
        assert_eq!(config, StrandConfig::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = StrandConfig::from_toml("").unwrap();
        assert_eq!(config.archive.max_page_size, TASK_MAX_PAGE_SIZE);
        assert_eq!(config.archive.system_bucket_id, TASK_SYSTEM_BUCKET_ID);
        assert_eq!(config.archive.on_write_failure, ArchiveFailurePolicy::Fail);
        assert!(config.migration.check_on_open);
    }

    #[test]
    fn parse_warn_policy() {
        let config = StrandConfig::from_toml("[archive]\non_write_failure = \"warn\"\n").unwrap();
        assert_eq!(config.archive.on_write_failure, ArchiveFailurePolicy::Warn);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = StrandConfig::from_toml("[archive]\nmax_page_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_page_size"));
    }

    #[test]
    fn bad_bucket_id_is_rejected() {
        assert!(StrandConfig::from_toml("[archive]\nsystem_bucket_id = \"xyz\"\n").is_err());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(StrandConfig::from_toml("[archive]\non_write_failure = \"ignore\"\n").is_err());
    }

    #[test]
    fn write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        std::fs::write(&path, "[migration]\ncheck_on_open = false\n").unwrap();
        StrandConfig::write_default_if_missing(&path).unwrap();

        let config = StrandConfig::from_file(&path).unwrap();
        assert!(!config.migration.check_on_open);
    }

    #[test]
    fn write_to_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = StrandConfig::default();
        config.archive.max_page_size = 50;
        config.archive.on_write_failure = ArchiveFailurePolicy::Warn;
        config.write_to_file(&path).unwrap();

        assert_eq!(StrandConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = StrandConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join(CONFIG_FILE_NAME);
        let err = StrandConfig::default().write_to_file(&path).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
