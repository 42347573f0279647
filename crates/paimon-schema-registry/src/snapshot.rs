// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// What to do when a snapshot is registered again with another schema id.
///
/// A conflicting rebind means the table metadata was misread or corrupted
/// upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotConflictPolicy {
    /// Return `SchemaError::SnapshotConflict` and keep the first binding.
    #[default]
    Reject,
    /// Log a warning and keep the first binding.
    KeepFirst,
    /// Log a warning and replace the binding.
    Overwrite,
}

/// Result of a successful [`SnapshotIndex::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// First binding for this snapshot.
    Bound,
    /// The same pair was already registered.
    Unchanged,
    /// A conflicting binding was kept (`KeepFirst`).
    KeptExisting { bound: i64 },
    /// A conflicting binding was replaced (`Overwrite`).
    Replaced { previous: i64 },
}

/// Snapshot id -> schema id.
///
/// Not synchronized; the processor guards it with its registry lock.
#[derive(Debug, Default)]
pub struct SnapshotIndex {
    bindings: HashMap<i64, i64>,
}

impl SnapshotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, snapshot_id: i64) -> Option<i64> {
        self.bindings.get(&snapshot_id).copied()
    }

    /// True when binding the pair would not change the index.
    pub fn is_bound_to(&self, snapshot_id: i64, schema_id: i64) -> bool {
        self.get(snapshot_id) == Some(schema_id)
    }

    pub fn bind(
        &mut self,
        snapshot_id: i64,
        schema_id: i64,
        policy: SnapshotConflictPolicy,
    ) -> Result<BindOutcome> {
        let Some(&bound) = self.bindings.get(&snapshot_id) else {
            self.bindings.insert(snapshot_id, schema_id);
            return Ok(BindOutcome::Bound);
        };
        if bound == schema_id {
            return Ok(BindOutcome::Unchanged);
        }

        match policy {
            SnapshotConflictPolicy::Reject => Err(SchemaError::SnapshotConflict {
                snapshot_id,
                bound,
                requested: schema_id,
            }),
            SnapshotConflictPolicy::KeepFirst => Ok(BindOutcome::KeptExisting { bound }),
            SnapshotConflictPolicy::Overwrite => {
                self.bindings.insert(snapshot_id, schema_id);
                Ok(BindOutcome::Replaced { previous: bound })
            }
        }
    }

    /// Snapshots bound to `schema_id`, ascending.
    pub fn snapshots_for_schema(&self, schema_id: i64) -> Vec<i64> {
        let mut snapshots: Vec<i64> = self
            .bindings
            .iter()
            .filter(|(_, &schema)| schema == schema_id)
            .map(|(&snapshot, _)| snapshot)
            .collect();
        snapshots.sort_unstable();
        snapshots
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
