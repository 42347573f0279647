// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thread-safe schema processor for one Paimon table.
//!
//! # Locking
//!
//! One `RwLock` guards the schema store, the column cache and the snapshot
//! index. Lookups take it shared. Registration and column derivation follow
//! the same three steps:
//!
//! 1. probe under the shared lock and return on a hit;
//! 2. on a miss, release it and do the pure work (parse the document or
//!    convert the schema) with no lock held;
//! 3. take the exclusive lock, re-check, and publish only if the entry is
//!    still absent. A thread that lost the race drops its value and returns
//!    the one already published.
//!
//! Every id therefore ends up with at most one stored schema and at most one
//! cached column list, and the exclusive lock is only held for a map insert.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::columns::{convert_schema, ColumnCache, ColumnListPtr};
use crate::config::ProcessorConfig;
use crate::engine::{DefaultTypeMapper, TypeMapper};
use crate::error::{Result, SchemaError};
use crate::evolution::{self, SchemaDiff};
use crate::schema::{TableSchema, TableSchemaPtr};
use crate::snapshot::{BindOutcome, SnapshotIndex};
use crate::store::{InsertOutcome, SchemaStore};

/// State guarded by the processor lock.
#[derive(Debug, Default)]
struct Inner {
    schemas: SchemaStore,
    columns: ColumnCache,
    snapshots: SnapshotIndex,
}

/// Counters describing what a processor currently holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub schemas: usize,
    pub cached_column_lists: usize,
    pub snapshots: usize,
}

/// Schema registry of one table handle.
///
/// Append-only: schemas, column lists and snapshot bindings live as long as
/// the processor. Values are handed out as `Arc`s and stay valid after the
/// processor is dropped.
pub struct SchemaProcessor {
    config: ProcessorConfig,
    mapper: Arc<dyn TypeMapper>,
    inner: RwLock<Inner>,
}

pub type SchemaProcessorPtr = Arc<SchemaProcessor>;

impl SchemaProcessor {
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self::with_mapper(config, Arc::new(DefaultTypeMapper))
    }

    /// Create a processor that derives column types with `mapper`.
    pub fn with_mapper(config: ProcessorConfig, mapper: Arc<dyn TypeMapper>) -> Self {
        SchemaProcessor {
            config,
            mapper,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Schema store
    // -----------------------------------------------------------------------

    /// Register the schema described by `document` and return the stored
    /// value.
    ///
    /// If the declared id is already registered the stored schema is
    /// returned as is and the document is not parsed, unless
    /// `verify_duplicate_schemas` is set. A different schema under an
    /// existing id never replaces the stored one.
    pub fn add_schema(&self, document: &Value) -> Result<TableSchemaPtr> {
        let schema_id = TableSchema::declared_id(document)?;

        if let Some(stored) = self.get_schema_by_id(schema_id) {
            if self.config.verify_duplicate_schemas {
                let candidate = self.parse(document)?;
                self.note_duplicate(&stored, *stored != candidate);
            } else {
                log::trace!("Schema processor: schema {} already registered", schema_id);
            }
            return Ok(stored);
        }

        let schema = self.parse(document)?;
        let outcome = self.inner.write().schemas.insert(schema);
        match &outcome {
            InsertOutcome::Inserted(schema) => log::debug!(
                "Schema processor: registered schema {} ({} fields, {} partition keys, {} primary keys)",
                schema.id,
                schema.fields.len(),
                schema.partition_keys.len(),
                schema.primary_keys.len()
            ),
            InsertOutcome::Existing { stored, diverged } => self.note_duplicate(stored, *diverged),
        }
        Ok(outcome.into_schema())
    }

    pub fn get_schema_by_id(&self, schema_id: i64) -> Option<TableSchemaPtr> {
        self.inner.read().schemas.get(schema_id)
    }

    /// Look up `schema_id`, registering `document` first when one is given.
    ///
    /// Without a document this is a pure lookup and an unknown id yields
    /// `Ok(None)`.
    pub fn get_or_add_schema(
        &self,
        schema_id: i64,
        document: Option<&Value>,
    ) -> Result<Option<TableSchemaPtr>> {
        let Some(document) = document else {
            return Ok(self.get_schema_by_id(schema_id));
        };

        let declared = TableSchema::declared_id(document)?;
        if declared != schema_id {
            return Err(SchemaError::IdMismatch {
                requested: schema_id,
                declared,
            });
        }
        self.add_schema(document).map(Some)
    }

    pub fn has_schema(&self, schema_id: i64) -> bool {
        self.inner.read().schemas.contains(schema_id)
    }

    /// Registered schema ids, ascending.
    pub fn schema_ids(&self) -> Vec<i64> {
        self.inner.read().schemas.ids()
    }

    pub fn latest_schema_id(&self) -> Option<i64> {
        self.inner.read().schemas.latest_id()
    }

    pub fn latest_schema(&self) -> Option<TableSchemaPtr> {
        let inner = self.inner.read();
        inner.schemas.latest_id().and_then(|id| inner.schemas.get(id))
    }

    fn parse(&self, document: &Value) -> Result<TableSchema> {
        TableSchema::from_json(document, self.config.validate_key_references)
    }

    fn note_duplicate(&self, stored: &TableSchema, diverged: bool) {
        if diverged {
            log::warn!(
                "Schema processor: schema {} registered again with different content, keeping the first version",
                stored.id
            );
        } else {
            log::trace!("Schema processor: schema {} already registered", stored.id);
        }
    }

    // -----------------------------------------------------------------------
    // Column cache
    // -----------------------------------------------------------------------

    /// Engine columns of `schema_id`, derived on first use and cached.
    ///
    /// Returns `None` for an unknown id, without caching anything.
    pub fn get_columns(&self, schema_id: i64) -> Option<ColumnListPtr> {
        let schema = {
            let inner = self.inner.read();
            if let Some(columns) = inner.columns.get(schema_id) {
                return Some(columns);
            }
            inner.schemas.get(schema_id)?
        };

        let converted = convert_schema(&schema, self.mapper.as_ref());

        let (columns, stored) = self.inner.write().columns.publish(schema_id, converted);
        if stored {
            log::debug!(
                "Schema processor: cached {} columns for schema {}",
                columns.len(),
                schema_id
            );
        } else {
            log::trace!(
                "Schema processor: columns for schema {} were cached concurrently",
                schema_id
            );
        }
        Some(columns)
    }

    pub fn has_cached_columns(&self, schema_id: i64) -> bool {
        self.inner.read().columns.contains(schema_id)
    }

    // -----------------------------------------------------------------------
    // Snapshot index
    // -----------------------------------------------------------------------

    /// Record that `snapshot_id` was written with `schema_id`.
    ///
    /// Registering the same pair again is a no-op. A different schema id for
    /// a bound snapshot is handled by the configured
    /// [`SnapshotConflictPolicy`](crate::SnapshotConflictPolicy).
    pub fn register_snapshot_schema(&self, snapshot_id: i64, schema_id: i64) -> Result<()> {
        if self.inner.read().snapshots.is_bound_to(snapshot_id, schema_id) {
            return Ok(());
        }

        let outcome =
            self.inner
                .write()
                .snapshots
                .bind(snapshot_id, schema_id, self.config.snapshot_conflict)?;
        match outcome {
            BindOutcome::Bound => log::debug!(
                "Schema processor: snapshot {} uses schema {}",
                snapshot_id,
                schema_id
            ),
            BindOutcome::Unchanged => {}
            BindOutcome::KeptExisting { bound } => log::warn!(
                "Schema processor: snapshot {} already uses schema {}, ignoring schema {}",
                snapshot_id,
                bound,
                schema_id
            ),
            BindOutcome::Replaced { previous } => log::warn!(
                "Schema processor: snapshot {} moved from schema {} to schema {}",
                snapshot_id,
                previous,
                schema_id
            ),
        }
        Ok(())
    }

    pub fn get_schema_id_for_snapshot(&self, snapshot_id: i64) -> Option<i64> {
        self.inner.read().snapshots.get(snapshot_id)
    }

    /// Schema bound to `snapshot_id`, if both the binding and the schema are
    /// known.
    pub fn get_schema_for_snapshot(&self, snapshot_id: i64) -> Option<TableSchemaPtr> {
        let inner = self.inner.read();
        inner
            .snapshots
            .get(snapshot_id)
            .and_then(|schema_id| inner.schemas.get(schema_id))
    }

    pub fn get_columns_for_snapshot(&self, snapshot_id: i64) -> Option<ColumnListPtr> {
        let schema_id = self.get_schema_id_for_snapshot(snapshot_id)?;
        self.get_columns(schema_id)
    }

    pub fn snapshots_for_schema(&self, schema_id: i64) -> Vec<i64> {
        self.inner.read().snapshots.snapshots_for_schema(schema_id)
    }

    // -----------------------------------------------------------------------
    // Projections
    // -----------------------------------------------------------------------

    pub fn get_partition_keys(&self, schema_id: i64) -> Vec<String> {
        self.get_schema_by_id(schema_id)
            .map(|schema| schema.partition_keys.clone())
            .unwrap_or_default()
    }

    pub fn get_primary_keys(&self, schema_id: i64) -> Vec<String> {
        self.get_schema_by_id(schema_id)
            .map(|schema| schema.primary_keys.clone())
            .unwrap_or_default()
    }

    pub fn get_options(&self, schema_id: i64) -> HashMap<String, String> {
        self.get_schema_by_id(schema_id)
            .map(|schema| schema.options.clone())
            .unwrap_or_default()
    }

    /// Compare two registered schema versions.
    pub fn diff_schemas(&self, old_id: i64, new_id: i64) -> Result<SchemaDiff> {
        let (old, new) = {
            let inner = self.inner.read();
            (inner.schemas.get(old_id), inner.schemas.get(new_id))
        };
        let old = old.ok_or(SchemaError::UnknownSchema(old_id))?;
        let new = new.ok_or(SchemaError::UnknownSchema(new_id))?;
        Ok(evolution::diff(&old, &new))
    }

    pub fn stats(&self) -> ProcessorStats {
        let inner = self.inner.read();
        ProcessorStats {
            schemas: inner.schemas.len(),
            cached_column_lists: inner.columns.len(),
            snapshots: inner.snapshots.len(),
        }
    }
}

impl Default for SchemaProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaProcessor")
            .field("config", &self.config)
            .field("mapper", &"Arc<dyn TypeMapper>")
            .field("stats", &self.stats())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
