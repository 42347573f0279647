// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::{TableSchema, TableSchemaPtr};

// ---------------------------------------------------------------------------
// InsertOutcome
// ---------------------------------------------------------------------------

/// Result of [`SchemaStore::insert`].
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The schema was new and is now stored.
    Inserted(TableSchemaPtr),
    /// A schema with this id was already stored; it is returned unchanged.
    Existing {
        stored: TableSchemaPtr,
        /// Whether the rejected schema differs from the stored one.
        diverged: bool,
    },
}

impl InsertOutcome {
    pub fn schema(&self) -> &TableSchemaPtr {
        match self {
            InsertOutcome::Inserted(schema) => schema,
            InsertOutcome::Existing { stored, .. } => stored,
        }
    }

    pub fn into_schema(self) -> TableSchemaPtr {
        match self {
            InsertOutcome::Inserted(schema) => schema,
            InsertOutcome::Existing { stored, .. } => stored,
        }
    }
}

// ---------------------------------------------------------------------------
// SchemaStore
// ---------------------------------------------------------------------------

/// Append-only map from schema id to schema.
///
/// Not synchronized; the processor guards it with its registry lock.
#[derive(Debug, Default)]
pub struct SchemaStore {
    schemas: HashMap<i64, TableSchemaPtr>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `schema` under its own id, first writer wins.
    pub fn insert(&mut self, schema: TableSchema) -> InsertOutcome {
        if let Some(stored) = self.schemas.get(&schema.id) {
            let diverged = **stored != schema;
            return InsertOutcome::Existing {
                stored: Arc::clone(stored),
                diverged,
            };
        }
        let schema = Arc::new(schema);
        self.schemas.insert(schema.id, Arc::clone(&schema));
        InsertOutcome::Inserted(schema)
    }

    pub fn get(&self, schema_id: i64) -> Option<TableSchemaPtr> {
        self.schemas.get(&schema_id).map(Arc::clone)
    }

    pub fn contains(&self, schema_id: i64) -> bool {
        self.schemas.contains_key(&schema_id)
    }

    /// All stored ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.schemas.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Highest stored id. Paimon assigns schema ids in increasing order, so
    /// this is the newest schema version the registry has seen.
    pub fn latest_id(&self) -> Option<i64> {
        self.schemas.keys().copied().max()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
