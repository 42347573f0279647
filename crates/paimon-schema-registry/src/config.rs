// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema processor configuration.
//!
//! ```toml
//! snapshot_conflict = "keep_first"
//! validate_key_references = true
//! verify_duplicate_schemas = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::snapshot::SnapshotConflictPolicy;

/// Processor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorConfig {
    /// Policy for snapshots registered again with another schema id.
    #[serde(default)]
    pub snapshot_conflict: SnapshotConflictPolicy,

    /// Require partition and primary keys to name declared fields.
    #[serde(default = "default_true")]
    pub validate_key_references: bool,

    /// Parse documents registered under an existing schema id and log a
    /// warning when they differ from the stored schema. The stored schema is
    /// kept either way.
    #[serde(default)]
    pub verify_duplicate_schemas: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            snapshot_conflict: SnapshotConflictPolicy::default(),
            validate_key_references: true,
            verify_duplicate_schemas: false,
        }
    }
}

impl ProcessorConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_snapshot_conflict(mut self, policy: SnapshotConflictPolicy) -> Self {
        self.snapshot_conflict = policy;
        self
    }

    pub fn with_key_validation(mut self, enabled: bool) -> Self {
        self.validate_key_references = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    #[test]
    fn empty_toml_is_default() {
        let config = ProcessorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProcessorConfig::default());
        assert_eq!(config.snapshot_conflict, SnapshotConflictPolicy::Reject);
        assert!(config.validate_key_references);
    }

    #[test]
    fn parse_policy() {
        let config = ProcessorConfig::from_toml_str(
            r#"
snapshot_conflict = "overwrite"
validate_key_references = false
"#,
        )
        .unwrap();
        assert_eq!(config.snapshot_conflict, SnapshotConflictPolicy::Overwrite);
        assert!(!config.validate_key_references);
        assert!(!config.verify_duplicate_schemas);
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = ProcessorConfig::from_toml_str("cache_size = 10").unwrap_err();
        assert!(matches!(err, SchemaError::Toml(_)));
    }

    #[test]
    fn builders() {
        let config = ProcessorConfig::default()
            .with_snapshot_conflict(SnapshotConflictPolicy::KeepFirst)
            .with_key_validation(false);
        assert_eq!(config.snapshot_conflict, SnapshotConflictPolicy::KeepFirst);
        assert!(!config.validate_key_references);
    }
}
