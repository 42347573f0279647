// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Converted column lists and their per-schema cache.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::{EngineType, TypeMapper};
use crate::schema::TableSchema;

/// A column name with its engine type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameAndType {
    pub name: String,
    pub engine_type: EngineType,
}

impl NameAndType {
    pub fn new(name: impl Into<String>, engine_type: EngineType) -> Self {
        NameAndType {
            name: name.into(),
            engine_type,
        }
    }
}

impl fmt::Display for NameAndType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.engine_type)
    }
}

/// Engine view of one schema, in field declaration order.
pub type ColumnList = Vec<NameAndType>;

pub type ColumnListPtr = Arc<ColumnList>;

/// Derive the column list of `schema`, one column per field.
pub fn convert_schema(schema: &TableSchema, mapper: &dyn TypeMapper) -> ColumnList {
    schema
        .fields
        .iter()
        .map(|field| NameAndType::new(field.name.clone(), mapper.engine_type(&field.data_type)))
        .collect()
}

// ---------------------------------------------------------------------------
// ColumnCache
// ---------------------------------------------------------------------------

/// Schema id -> converted column list, populated at most once per id.
///
/// An id without an entry has not been computed yet. Not synchronized; the
/// processor guards it with its registry lock.
#[derive(Debug, Default)]
pub struct ColumnCache {
    slots: HashMap<i64, ColumnListPtr>,
}

impl ColumnCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, schema_id: i64) -> Option<ColumnListPtr> {
        self.slots.get(&schema_id).map(Arc::clone)
    }

    pub fn contains(&self, schema_id: i64) -> bool {
        self.slots.contains_key(&schema_id)
    }

    /// Publish `columns` unless another value is already cached.
    ///
    /// Returns the cached value and whether `columns` became it.
    pub fn publish(&mut self, schema_id: i64, columns: ColumnList) -> (ColumnListPtr, bool) {
        if let Some(existing) = self.get(schema_id) {
            return (existing, false);
        }
        let columns = Arc::new(columns);
        self.slots.insert(schema_id, Arc::clone(&columns));
        (columns, true)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DefaultTypeMapper;
    use crate::types::{DataField, DataType, TypeKind};

    fn schema() -> TableSchema {
        TableSchema {
            id: 1,
            version: 3,
            fields: vec![
                DataField::new(0, "z", DataType::not_null(TypeKind::Int)),
                DataField::new(1, "a", DataType::nullable(TypeKind::Double)),
                DataField::new(2, "m", DataType::nullable(TypeKind::Boolean)),
            ],
            highest_field_id: 2,
            partition_keys: Vec::new(),
            primary_keys: Vec::new(),
            options: HashMap::new(),
            comment: None,
            time_millis: None,
        }
    }

    #[test]
    fn conversion_keeps_declaration_order() {
        let columns = convert_schema(&schema(), &DefaultTypeMapper);
        let rendered: Vec<String> = columns.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["z Int32", "a Nullable(Float64)", "m Nullable(Bool)"]
        );
    }

    #[test]
    fn conversion_is_deterministic() {
        let s = schema();
        assert_eq!(
            convert_schema(&s, &DefaultTypeMapper),
            convert_schema(&s, &DefaultTypeMapper)
        );
    }

    #[test]
    fn first_publish_wins() {
        let mut cache = ColumnCache::new();
        assert!(cache.get(1).is_none());

        let (first, stored) = cache.publish(1, vec![NameAndType::new("a", EngineType::Int32)]);
        assert!(stored);

        let (second, stored) = cache.publish(1, vec![NameAndType::new("b", EngineType::String)]);
        assert!(!stored);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second[0].name, "a");
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(1));
        assert!(!cache.contains(2));
    }
}
