// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field-level diff between two versions of a table schema.
//!
//! Paimon field ids survive renames, so fields are matched by id rather
//! than by name.

use std::collections::HashMap;

use crate::schema::TableSchema;
use crate::types::{DataField, DataType};

// ---------------------------------------------------------------------------
// Compatibility level
// ---------------------------------------------------------------------------

/// How data written under one schema version reads under the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// No field-level change that affects readers (renames included).
    Full,
    /// The new schema can read data written with the old one.
    Backward,
    /// The old schema can read data written with the new one.
    Forward,
    Breaking,
}

// ---------------------------------------------------------------------------
// FieldChange
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Added(DataField),
    Dropped(DataField),
    Renamed {
        id: i32,
        from: String,
        to: String,
    },
    TypeChanged {
        id: i32,
        name: String,
        from: DataType,
        to: DataType,
    },
    NullabilityChanged {
        id: i32,
        name: String,
        nullable: bool,
    },
}

impl FieldChange {
    pub fn describe(&self) -> String {
        match self {
            FieldChange::Added(f) => format!("added field: {} {}", f.name, f.data_type),
            FieldChange::Dropped(f) => format!("dropped field: {} {}", f.name, f.data_type),
            FieldChange::Renamed { from, to, .. } => format!("renamed field: {} -> {}", from, to),
            FieldChange::TypeChanged { name, from, to, .. } => {
                format!("changed type of {}: {} -> {}", name, from, to)
            }
            FieldChange::NullabilityChanged { name, nullable, .. } => {
                if *nullable {
                    format!("{} became nullable", name)
                } else {
                    format!("{} became NOT NULL", name)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SchemaDiff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDiff {
    pub old_id: i64,
    pub new_id: i64,
    /// Field changes: additions in new declaration order first, then
    /// per-field changes and drops in old declaration order.
    pub changes: Vec<FieldChange>,
    pub partition_keys_changed: bool,
    pub primary_keys_changed: bool,
    pub compatibility: Compatibility,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && !self.partition_keys_changed && !self.primary_keys_changed
    }

    /// Human-readable lines, one per change.
    pub fn details(&self) -> Vec<String> {
        let mut details: Vec<String> = self.changes.iter().map(FieldChange::describe).collect();
        if self.partition_keys_changed {
            details.push("partition keys changed".to_string());
        }
        if self.primary_keys_changed {
            details.push("primary keys changed".to_string());
        }
        details
    }
}

/// Compare two schema versions.
pub fn diff(old: &TableSchema, new: &TableSchema) -> SchemaDiff {
    let old_by_id: HashMap<i32, &DataField> = old.fields.iter().map(|f| (f.id, f)).collect();
    let new_by_id: HashMap<i32, &DataField> = new.fields.iter().map(|f| (f.id, f)).collect();

    let mut changes = Vec::new();
    let mut has_added = false;
    let mut has_dropped = false;
    let mut has_breaking = false;
    let mut has_relaxed = false;

    for nf in &new.fields {
        if !old_by_id.contains_key(&nf.id) {
            // A NOT NULL column cannot be read from files that lack it.
            if !nf.data_type.nullable {
                has_breaking = true;
            }
            changes.push(FieldChange::Added(nf.clone()));
            has_added = true;
        }
    }

    for of in &old.fields {
        let Some(nf) = new_by_id.get(&of.id) else {
            changes.push(FieldChange::Dropped(of.clone()));
            has_dropped = true;
            continue;
        };

        if of.name != nf.name {
            changes.push(FieldChange::Renamed {
                id: of.id,
                from: of.name.clone(),
                to: nf.name.clone(),
            });
        }

        if of.data_type.as_not_null() != nf.data_type.as_not_null() {
            changes.push(FieldChange::TypeChanged {
                id: of.id,
                name: nf.name.clone(),
                from: of.data_type.clone(),
                to: nf.data_type.clone(),
            });
            has_breaking = true;
        } else if of.data_type.nullable != nf.data_type.nullable {
            changes.push(FieldChange::NullabilityChanged {
                id: of.id,
                name: nf.name.clone(),
                nullable: nf.data_type.nullable,
            });
            if nf.data_type.nullable {
                has_relaxed = true;
            } else {
                has_breaking = true;
            }
        }
    }

    let partition_keys_changed = old.partition_keys != new.partition_keys;
    let primary_keys_changed = old.primary_keys != new.primary_keys;

    let compatibility = if has_breaking
        || partition_keys_changed
        || primary_keys_changed
        || (has_added && has_dropped)
    {
        Compatibility::Breaking
    } else if has_added || has_relaxed {
        if has_dropped {
            Compatibility::Breaking
        } else {
            Compatibility::Backward
        }
    } else if has_dropped {
        Compatibility::Forward
    } else {
        Compatibility::Full
    };

    SchemaDiff {
        old_id: old.id,
        new_id: new.id,
        changes,
        partition_keys_changed,
        primary_keys_changed,
        compatibility,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeKind;

    fn schema(id: i64, fields: Vec<DataField>) -> TableSchema {
        TableSchema {
            id,
            version: 3,
            highest_field_id: fields.iter().map(|f| f.id).max().unwrap_or(-1),
            fields,
            partition_keys: Vec::new(),
            primary_keys: Vec::new(),
            options: HashMap::new(),
            comment: None,
            time_millis: None,
        }
    }

    fn int(id: i32, name: &str) -> DataField {
        DataField::new(id, name, DataType::nullable(TypeKind::Int))
    }

    #[test]
    fn identical_schemas_are_full() {
        let s = schema(0, vec![int(0, "a"), int(1, "b")]);
        let d = diff(&s, &s);
        assert!(d.is_empty());
        assert_eq!(d.compatibility, Compatibility::Full);
    }

    #[test]
    fn rename_keeps_full_compatibility() {
        let old = schema(0, vec![int(0, "a")]);
        let new = schema(1, vec![int(0, "alpha")]);
        let d = diff(&old, &new);
        assert_eq!(d.compatibility, Compatibility::Full);
        assert_eq!(d.details(), vec!["renamed field: a -> alpha"]);
    }

    #[test]
    fn adding_nullable_field_is_backward() {
        let old = schema(0, vec![int(0, "a")]);
        let new = schema(1, vec![int(0, "a"), int(1, "b")]);
        let d = diff(&old, &new);
        assert_eq!(d.compatibility, Compatibility::Backward);
        assert_eq!(d.details(), vec!["added field: b INT"]);
    }

    #[test]
    fn adding_not_null_field_is_breaking() {
        let old = schema(0, vec![int(0, "a")]);
        let new = schema(
            1,
            vec![int(0, "a"), DataField::new(1, "b", DataType::not_null(TypeKind::Int))],
        );
        assert_eq!(diff(&old, &new).compatibility, Compatibility::Breaking);
    }

    #[test]
    fn dropping_field_is_forward() {
        let old = schema(0, vec![int(0, "a"), int(1, "b")]);
        let new = schema(1, vec![int(0, "a")]);
        let d = diff(&old, &new);
        assert_eq!(d.compatibility, Compatibility::Forward);
        assert!(matches!(&d.changes[0], FieldChange::Dropped(f) if f.name == "b"));
    }

    #[test]
    fn type_change_is_breaking() {
        let old = schema(0, vec![int(0, "a")]);
        let new = schema(1, vec![DataField::new(0, "a", DataType::nullable(TypeKind::BigInt))]);
        let d = diff(&old, &new);
        assert_eq!(d.compatibility, Compatibility::Breaking);
        assert_eq!(d.details(), vec!["changed type of a: INT -> BIGINT"]);
    }

    #[test]
    fn nullability_changes() {
        let strict = schema(0, vec![DataField::new(0, "a", DataType::not_null(TypeKind::Int))]);
        let relaxed = schema(1, vec![int(0, "a")]);
        assert_eq!(diff(&strict, &relaxed).compatibility, Compatibility::Backward);
        assert_eq!(diff(&relaxed, &strict).compatibility, Compatibility::Breaking);
    }

    #[test]
    fn key_change_is_breaking() {
        let old = schema(0, vec![int(0, "a")]);
        let mut new = schema(1, vec![int(0, "a")]);
        new.primary_keys = vec!["a".to_string()];
        let d = diff(&old, &new);
        assert!(d.primary_keys_changed);
        assert!(!d.partition_keys_changed);
        assert_eq!(d.compatibility, Compatibility::Breaking);
    }
}
