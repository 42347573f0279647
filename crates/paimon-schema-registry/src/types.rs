// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Paimon field type descriptors.
//!
//! Schema files describe atomic types as strings (`"INT NOT NULL"`,
//! `"DECIMAL(10, 2)"`, `"TIMESTAMP(3) WITH LOCAL TIME ZONE"`) and nested
//! types as objects:
//!
//! ```text
//! {"type": "ARRAY",    "element": <type>}
//! {"type": "MULTISET", "element": <type>}
//! {"type": "MAP",      "key": <type>, "value": <type>}
//! {"type": "ROW",      "fields": [{"id": 0, "name": "x", "type": <type>}, ...]}
//! ```
//!
//! Every descriptor may carry a trailing `NOT NULL`.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};

/// Length used by Paimon for `STRING` and `BYTES`.
pub const MAX_LENGTH: u32 = i32::MAX as u32;

const DEFAULT_DECIMAL_PRECISION: u32 = 10;
const MAX_DECIMAL_PRECISION: u32 = 38;
const DEFAULT_TIMESTAMP_PRECISION: u32 = 6;
const MAX_TIME_PRECISION: u32 = 9;

// ---------------------------------------------------------------------------
// DataType
// ---------------------------------------------------------------------------

/// A Paimon type descriptor together with its nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    pub kind: TypeKind,
    pub nullable: bool,
}

/// The logical kind of a [`DataType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal { precision: u32, scale: u32 },
    Char(u32),
    VarChar(u32),
    Binary(u32),
    VarBinary(u32),
    Date,
    /// Time of day with fractional-second precision.
    Time(u32),
    /// Timestamp without time zone.
    Timestamp(u32),
    /// Timestamp with local time zone (`TIMESTAMP_LTZ`).
    LocalZonedTimestamp(u32),
    Array(Box<DataType>),
    Multiset(Box<DataType>),
    Map {
        key: Box<DataType>,
        value: Box<DataType>,
    },
    Row(Vec<DataField>),
}

impl DataType {
    pub fn new(kind: TypeKind, nullable: bool) -> Self {
        DataType { kind, nullable }
    }

    pub fn nullable(kind: TypeKind) -> Self {
        Self::new(kind, true)
    }

    pub fn not_null(kind: TypeKind) -> Self {
        Self::new(kind, false)
    }

    /// Parse a descriptor as found under a field's `type` key.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(raw) => parse_atomic(raw),
            Value::Object(obj) => parse_nested(obj),
            other => Err(SchemaError::malformed(format!(
                "unsupported type descriptor: {}",
                other
            ))),
        }
    }

    /// Same type with nullability removed.
    pub fn as_not_null(&self) -> DataType {
        DataType {
            kind: self.kind.clone(),
            nullable: false,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Array(_) | TypeKind::Multiset(_) | TypeKind::Map { .. } | TypeKind::Row(_)
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Boolean => write!(f, "BOOLEAN")?,
            TypeKind::TinyInt => write!(f, "TINYINT")?,
            TypeKind::SmallInt => write!(f, "SMALLINT")?,
            TypeKind::Int => write!(f, "INT")?,
            TypeKind::BigInt => write!(f, "BIGINT")?,
            TypeKind::Float => write!(f, "FLOAT")?,
            TypeKind::Double => write!(f, "DOUBLE")?,
            TypeKind::Decimal { precision, scale } => write!(f, "DECIMAL({}, {})", precision, scale)?,
            TypeKind::Char(len) => write!(f, "CHAR({})", len)?,
            TypeKind::VarChar(MAX_LENGTH) => write!(f, "STRING")?,
            TypeKind::VarChar(len) => write!(f, "VARCHAR({})", len)?,
            TypeKind::Binary(len) => write!(f, "BINARY({})", len)?,
            TypeKind::VarBinary(MAX_LENGTH) => write!(f, "BYTES")?,
            TypeKind::VarBinary(len) => write!(f, "VARBINARY({})", len)?,
            TypeKind::Date => write!(f, "DATE")?,
            TypeKind::Time(p) => write!(f, "TIME({})", p)?,
            TypeKind::Timestamp(p) => write!(f, "TIMESTAMP({})", p)?,
            TypeKind::LocalZonedTimestamp(p) => {
                write!(f, "TIMESTAMP({}) WITH LOCAL TIME ZONE", p)?
            }
            TypeKind::Array(element) => write!(f, "ARRAY<{}>", element)?,
            TypeKind::Multiset(element) => write!(f, "MULTISET<{}>", element)?,
            TypeKind::Map { key, value } => write!(f, "MAP<{}, {}>", key, value)?,
            TypeKind::Row(fields) => {
                write!(f, "ROW<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", field.name, field.data_type)?;
                }
                write!(f, ">")?;
            }
        }
        if !self.nullable {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DataField
// ---------------------------------------------------------------------------

/// A named, typed field of a schema or of a `ROW` type.
///
/// Field ids are stable across schema versions; names are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataField {
    pub id: i32,
    pub name: String,
    pub data_type: DataType,
    pub description: Option<String>,
}

impl DataField {
    pub fn new(id: i32, name: impl Into<String>, data_type: DataType) -> Self {
        DataField {
            id,
            name: name.into(),
            data_type,
            description: None,
        }
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = as_object(value, "field")?;
        let id = required_i64(obj, "id")?;
        let id = i32::try_from(id)
            .map_err(|_| SchemaError::malformed(format!("field id {} out of range", id)))?;
        let name = required_str(obj, "name")?.to_string();
        let data_type = DataType::from_json(required(obj, "type")?)
            .map_err(|e| SchemaError::malformed(format!("field '{}': {}", name, strip(e))))?;
        let description = optional_str(obj, "description")?.map(str::to_string);

        Ok(DataField {
            id,
            name,
            data_type,
            description,
        })
    }
}

/// Parse a JSON array of fields, rejecting duplicate names.
pub(crate) fn parse_fields(value: &Value) -> Result<Vec<DataField>> {
    let items = value
        .as_array()
        .ok_or_else(|| SchemaError::malformed("`fields` must be an array"))?;
    let mut fields: Vec<DataField> = Vec::with_capacity(items.len());
    for item in items {
        let field = DataField::from_json(item)?;
        if fields.iter().any(|f| f.name == field.name) {
            return Err(SchemaError::malformed(format!(
                "duplicate field name '{}'",
                field.name
            )));
        }
        fields.push(field);
    }
    Ok(fields)
}

// ---------------------------------------------------------------------------
// Atomic type parser
// ---------------------------------------------------------------------------

/// Split off a trailing `NOT NULL` / `NULL` marker.
fn split_nullability(upper: &str) -> (&str, bool) {
    let trimmed = upper.trim_end();
    if let Some(body) = trimmed.strip_suffix("NOT NULL") {
        (body.trim_end(), false)
    } else if let Some(body) = trimmed.strip_suffix(" NULL") {
        (body.trim_end(), true)
    } else {
        (trimmed, true)
    }
}

/// Split `NAME(a, b) SUFFIX` into its three parts.
fn split_params(body: &str) -> Result<(&str, Vec<u32>, &str)> {
    let Some(open) = body.find('(') else {
        return match body.split_once(' ') {
            Some((name, suffix)) => Ok((name, Vec::new(), suffix.trim())),
            None => Ok((body, Vec::new(), "")),
        };
    };
    let close = body[open..]
        .find(')')
        .map(|idx| open + idx)
        .ok_or_else(|| SchemaError::malformed(format!("unbalanced parentheses in '{}'", body)))?;

    let params = body[open + 1..close]
        .split(',')
        .map(|p| {
            p.trim().parse::<u32>().map_err(|_| {
                SchemaError::malformed(format!("invalid type parameter '{}' in '{}'", p.trim(), body))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((body[..open].trim(), params, body[close + 1..].trim()))
}

fn param(params: &[u32], idx: usize, default: u32) -> u32 {
    params.get(idx).copied().unwrap_or(default)
}

fn check_arity(name: &str, params: &[u32], max: usize) -> Result<()> {
    if params.len() > max {
        return Err(SchemaError::malformed(format!(
            "{} takes at most {} parameter(s), got {}",
            name,
            max,
            params.len()
        )));
    }
    Ok(())
}

fn length(name: &str, params: &[u32], default: u32) -> Result<u32> {
    check_arity(name, params, 1)?;
    let len = param(params, 0, default);
    if len == 0 {
        return Err(SchemaError::malformed(format!("{} length must be positive", name)));
    }
    Ok(len)
}

fn precision(name: &str, params: &[u32], default: u32) -> Result<u32> {
    check_arity(name, params, 1)?;
    let p = param(params, 0, default);
    if p > MAX_TIME_PRECISION {
        return Err(SchemaError::malformed(format!(
            "{} precision must be between 0 and {}, got {}",
            name, MAX_TIME_PRECISION, p
        )));
    }
    Ok(p)
}

fn parse_atomic(raw: &str) -> Result<DataType> {
    let upper = raw.trim().to_ascii_uppercase();
    let (body, nullable) = split_nullability(&upper);
    let (name, params, suffix) = split_params(body)?;

    let kind = match (name, suffix) {
        ("BOOLEAN", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::Boolean
        }
        ("TINYINT", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::TinyInt
        }
        ("SMALLINT", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::SmallInt
        }
        ("INT" | "INTEGER", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::Int
        }
        ("BIGINT", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::BigInt
        }
        ("FLOAT", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::Float
        }
        ("DOUBLE", "") | ("DOUBLE", "PRECISION") => {
            check_arity(name, &params, 0)?;
            TypeKind::Double
        }
        ("DECIMAL", "") => {
            check_arity(name, &params, 2)?;
            let precision = param(&params, 0, DEFAULT_DECIMAL_PRECISION);
            let scale = param(&params, 1, 0);
            if precision == 0 || precision > MAX_DECIMAL_PRECISION {
                return Err(SchemaError::malformed(format!(
                    "DECIMAL precision must be between 1 and {}, got {}",
                    MAX_DECIMAL_PRECISION, precision
                )));
            }
            if scale > precision {
                return Err(SchemaError::malformed(format!(
                    "DECIMAL scale {} exceeds precision {}",
                    scale, precision
                )));
            }
            TypeKind::Decimal { precision, scale }
        }
        ("CHAR", "") => TypeKind::Char(length(name, &params, 1)?),
        ("VARCHAR", "") => TypeKind::VarChar(length(name, &params, 1)?),
        ("STRING", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::VarChar(MAX_LENGTH)
        }
        ("BINARY", "") => TypeKind::Binary(length(name, &params, 1)?),
        ("VARBINARY", "") => TypeKind::VarBinary(length(name, &params, 1)?),
        ("BYTES", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::VarBinary(MAX_LENGTH)
        }
        ("DATE", "") => {
            check_arity(name, &params, 0)?;
            TypeKind::Date
        }
        ("TIME", "") | ("TIME", "WITHOUT TIME ZONE") => TypeKind::Time(precision(name, &params, 0)?),
        ("TIMESTAMP", "") | ("TIMESTAMP", "WITHOUT TIME ZONE") => {
            TypeKind::Timestamp(precision(name, &params, DEFAULT_TIMESTAMP_PRECISION)?)
        }
        ("TIMESTAMP", "WITH LOCAL TIME ZONE") | ("TIMESTAMP_LTZ", "") => TypeKind::LocalZonedTimestamp(
            precision(name, &params, DEFAULT_TIMESTAMP_PRECISION)?,
        ),
        _ => {
            return Err(SchemaError::malformed(format!(
                "unknown type '{}'",
                raw.trim()
            )))
        }
    };

    Ok(DataType { kind, nullable })
}

// ---------------------------------------------------------------------------
// Nested type parser
// ---------------------------------------------------------------------------

fn parse_nested(obj: &Map<String, Value>) -> Result<DataType> {
    let raw = required_str(obj, "type")?;
    let upper = raw.trim().to_ascii_uppercase();
    let (name, nullable) = split_nullability(&upper);

    let kind = match name {
        "ARRAY" => TypeKind::Array(Box::new(DataType::from_json(required(obj, "element")?)?)),
        "MULTISET" => TypeKind::Multiset(Box::new(DataType::from_json(required(obj, "element")?)?)),
        "MAP" => TypeKind::Map {
            key: Box::new(DataType::from_json(required(obj, "key")?)?),
            value: Box::new(DataType::from_json(required(obj, "value")?)?),
        },
        "ROW" => TypeKind::Row(parse_fields(required(obj, "fields")?)?),
        _ => {
            return Err(SchemaError::malformed(format!(
                "unknown nested type '{}'",
                raw.trim()
            )))
        }
    };

    Ok(DataType { kind, nullable })
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::malformed(format!("{} must be a JSON object", what)))
}

pub(crate) fn required<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    obj.get(key)
        .ok_or_else(|| SchemaError::malformed(format!("missing `{}`", key)))
}

pub(crate) fn required_i64(obj: &Map<String, Value>, key: &str) -> Result<i64> {
    required(obj, key)?
        .as_i64()
        .ok_or_else(|| SchemaError::malformed(format!("`{}` must be an integer", key)))
}

pub(crate) fn required_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    required(obj, key)?
        .as_str()
        .ok_or_else(|| SchemaError::malformed(format!("`{}` must be a string", key)))
}

pub(crate) fn optional_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(SchemaError::malformed(format!("`{}` must be a string", key))),
    }
}

/// Message of a `Malformed` error without its prefix, for nesting context.
fn strip(err: SchemaError) -> String {
    match err {
        SchemaError::Malformed(msg) => msg,
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> DataType {
        DataType::from_json(&json!(raw)).unwrap()
    }

    #[test]
    fn atomic_types() {
        assert_eq!(parse("INT"), DataType::nullable(TypeKind::Int));
        assert_eq!(parse("integer"), DataType::nullable(TypeKind::Int));
        assert_eq!(parse("BIGINT NOT NULL"), DataType::not_null(TypeKind::BigInt));
        assert_eq!(parse("STRING"), DataType::nullable(TypeKind::VarChar(MAX_LENGTH)));
        assert_eq!(parse("BYTES"), DataType::nullable(TypeKind::VarBinary(MAX_LENGTH)));
        assert_eq!(parse("VARCHAR(20) NULL"), DataType::nullable(TypeKind::VarChar(20)));
        assert_eq!(parse("DATE"), DataType::nullable(TypeKind::Date));
        assert_eq!(parse("DOUBLE PRECISION"), DataType::nullable(TypeKind::Double));
    }

    #[test]
    fn parameterised_types() {
        assert_eq!(
            parse("DECIMAL(10, 2)").kind,
            TypeKind::Decimal {
                precision: 10,
                scale: 2
            }
        );
        assert_eq!(
            parse("DECIMAL").kind,
            TypeKind::Decimal {
                precision: 10,
                scale: 0
            }
        );
        assert_eq!(parse("TIMESTAMP").kind, TypeKind::Timestamp(6));
        assert_eq!(parse("TIMESTAMP(3)").kind, TypeKind::Timestamp(3));
        assert_eq!(
            parse("TIMESTAMP(3) WITH LOCAL TIME ZONE NOT NULL"),
            DataType::not_null(TypeKind::LocalZonedTimestamp(3))
        );
        assert_eq!(parse("TIMESTAMP_LTZ(9)").kind, TypeKind::LocalZonedTimestamp(9));
        assert_eq!(parse("TIME").kind, TypeKind::Time(0));
        assert_eq!(parse("CHAR(4)").kind, TypeKind::Char(4));
    }

    #[test]
    fn nested_types() {
        let ty = DataType::from_json(&json!({
            "type": "MAP NOT NULL",
            "key": "STRING NOT NULL",
            "value": {"type": "ARRAY", "element": "INT"}
        }))
        .unwrap();
        assert!(!ty.nullable);
        assert_eq!(ty.to_string(), "MAP<STRING NOT NULL, ARRAY<INT>> NOT NULL");

        let row = DataType::from_json(&json!({
            "type": "ROW",
            "fields": [
                {"id": 5, "name": "x", "type": "DOUBLE"},
                {"id": 6, "name": "y", "type": "DOUBLE", "description": "latitude"}
            ]
        }))
        .unwrap();
        match &row.kind {
            TypeKind::Row(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[1].description.as_deref(), Some("latitude"));
            }
            other => panic!("expected ROW, got {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_descriptors() {
        for raw in ["BLOB", "DECIMAL(40, 2)", "DECIMAL(4, 6)", "VARCHAR(0)", "TIMESTAMP(12)", "INT(3)", "CHAR(x)"] {
            let err = DataType::from_json(&json!(raw)).unwrap_err();
            assert!(matches!(err, SchemaError::Malformed(_)), "{} should be rejected", raw);
        }
        assert!(DataType::from_json(&json!(42)).is_err());
        assert!(DataType::from_json(&json!({"type": "ARRAY"})).is_err());
        assert!(DataType::from_json(&json!({"type": "STRUCT", "fields": []})).is_err());
    }

    #[test]
    fn duplicate_row_fields_rejected() {
        let err = DataType::from_json(&json!({
            "type": "ROW",
            "fields": [
                {"id": 1, "name": "a", "type": "INT"},
                {"id": 2, "name": "a", "type": "INT"}
            ]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate field name 'a'"));
    }

    #[test]
    fn field_error_names_field() {
        let err = DataField::from_json(&json!({"id": 1, "name": "price", "type": "MONEY"})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed schema document: field 'price': unknown type 'MONEY'"
        );
    }

    #[test]
    fn display_round_trips_through_parser() {
        for raw in ["DECIMAL(12, 4) NOT NULL", "TIMESTAMP(3) WITH LOCAL TIME ZONE", "VARCHAR(8)", "STRING"] {
            assert_eq!(parse(raw).to_string(), raw);
        }
    }
}
