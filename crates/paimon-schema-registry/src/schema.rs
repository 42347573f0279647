// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::types::{as_object, optional_str, parse_fields, required, DataField};

/// Schema file format version assumed when a document omits `version`.
pub const DEFAULT_SCHEMA_VERSION: i32 = 1;

// ---------------------------------------------------------------------------
// TableSchema
// ---------------------------------------------------------------------------

/// One immutable version of a Paimon table schema.
///
/// Built once from a schema document and then only shared as
/// [`TableSchemaPtr`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Schema id assigned by the table format.
    pub id: i64,
    /// Schema file format version.
    pub version: i32,
    /// Top-level fields in declaration order.
    pub fields: Vec<DataField>,
    pub highest_field_id: i32,
    pub partition_keys: Vec<String>,
    pub primary_keys: Vec<String>,
    pub options: HashMap<String, String>,
    pub comment: Option<String>,
    /// Creation time of the schema file, in epoch milliseconds.
    pub time_millis: Option<i64>,
}

pub type TableSchemaPtr = Arc<TableSchema>;

impl TableSchema {
    /// Read only the declared schema id of a document.
    ///
    /// Used to probe the registry before paying for a full parse.
    pub fn declared_id(document: &Value) -> Result<i64> {
        let obj = as_object(document, "schema document")?;
        required(obj, "id")?
            .as_i64()
            .ok_or_else(|| SchemaError::malformed("`id` must be an integer"))
    }

    /// Build a schema from a Paimon schema document.
    ///
    /// When `validate_keys` is set, every partition and primary key must name
    /// a declared field.
    pub fn from_json(document: &Value, validate_keys: bool) -> Result<Self> {
        let obj = as_object(document, "schema document")?;
        let id = Self::declared_id(document)?;

        let version = match obj.get("version") {
            None | Some(Value::Null) => DEFAULT_SCHEMA_VERSION,
            Some(v) => v
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| SchemaError::malformed("`version` must be a 32-bit integer"))?,
        };

        let fields = parse_fields(required(obj, "fields")?)?;

        let max_field_id = fields.iter().map(|f| f.id).max().unwrap_or(-1);
        let highest_field_id = match obj.get("highestFieldId") {
            None | Some(Value::Null) => max_field_id,
            Some(v) => v
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| {
                    SchemaError::malformed("`highestFieldId` must be a 32-bit integer")
                })?,
        };
        if highest_field_id < max_field_id {
            return Err(SchemaError::malformed(format!(
                "highestFieldId {} is lower than field id {}",
                highest_field_id, max_field_id
            )));
        }

        let partition_keys = string_list(obj.get("partitionKeys"), "partitionKeys")?;
        let primary_keys = string_list(obj.get("primaryKeys"), "primaryKeys")?;
        if let Some(dup) = first_duplicate(&primary_keys) {
            return Err(SchemaError::malformed(format!(
                "primary key '{}' listed twice",
                dup
            )));
        }
        if validate_keys {
            check_keys(&fields, &partition_keys, "partition")?;
            check_keys(&fields, &primary_keys, "primary")?;
        }

        let options = string_map(obj.get("options"))?;
        let comment = optional_str(obj, "comment")?.map(str::to_string);
        let time_millis = match obj.get("timeMillis") {
            None | Some(Value::Null) => None,
            Some(v) => Some(
                v.as_i64()
                    .ok_or_else(|| SchemaError::malformed("`timeMillis` must be an integer"))?,
            ),
        };

        Ok(TableSchema {
            id,
            version,
            fields,
            highest_field_id,
            partition_keys,
            primary_keys,
            options,
            comment,
            time_millis,
        })
    }

    pub fn field(&self, name: &str) -> Option<&DataField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_id(&self, id: i32) -> Option<&DataField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn string_list(value: Option<&Value>, key: &str) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    SchemaError::malformed(format!("`{}` must contain only strings", key))
                })
            })
            .collect(),
        Some(_) => Err(SchemaError::malformed(format!("`{}` must be an array", key))),
    }
}

fn string_map(value: Option<&Value>) -> Result<HashMap<String, String>> {
    match value {
        None | Some(Value::Null) => Ok(HashMap::new()),
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                _ => Err(SchemaError::malformed(format!(
                    "option '{}' must be a string",
                    k
                ))),
            })
            .collect(),
        Some(_) => Err(SchemaError::malformed("`options` must be an object")),
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].contains(*name))
        .map(|(_, name)| name.as_str())
}

fn check_keys(fields: &[DataField], keys: &[String], kind: &str) -> Result<()> {
    for key in keys {
        if !fields.iter().any(|f| &f.name == key) {
            return Err(SchemaError::malformed(format!(
                "{} key '{}' is not a field of the schema",
                kind, key
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
