// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine-side column types and the mapping from Paimon descriptors.
//!
//! The registry never decides how a Paimon type is represented by the
//! query engine; it asks a [`TypeMapper`]. [`DefaultTypeMapper`] implements
//! a ClickHouse-style mapping and is what `SchemaProcessor::new` uses.

use std::fmt;

use crate::types::{DataType, TypeKind};

// ---------------------------------------------------------------------------
// EngineType
// ---------------------------------------------------------------------------

/// Column type as understood by the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngineType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal { precision: u32, scale: u32 },
    String,
    Date32,
    DateTime64 {
        precision: u32,
        timezone: Option<String>,
    },
    Array(Box<EngineType>),
    Map(Box<EngineType>, Box<EngineType>),
    /// Named tuple; element order follows the source `ROW` fields.
    Tuple(Vec<(String, EngineType)>),
    Nullable(Box<EngineType>),
}

impl EngineType {
    pub fn is_nullable(&self) -> bool {
        matches!(self, EngineType::Nullable(_))
    }

    /// Wrap in `Nullable` unless the engine forbids it for this type.
    pub fn into_nullable(self) -> EngineType {
        match self {
            EngineType::Nullable(_)
            | EngineType::Array(_)
            | EngineType::Map(..)
            | EngineType::Tuple(_) => self,
            other => EngineType::Nullable(Box::new(other)),
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineType::Bool => write!(f, "Bool"),
            EngineType::Int8 => write!(f, "Int8"),
            EngineType::Int16 => write!(f, "Int16"),
            EngineType::Int32 => write!(f, "Int32"),
            EngineType::Int64 => write!(f, "Int64"),
            EngineType::Float32 => write!(f, "Float32"),
            EngineType::Float64 => write!(f, "Float64"),
            EngineType::Decimal { precision, scale } => {
                write!(f, "Decimal({}, {})", precision, scale)
            }
            EngineType::String => write!(f, "String"),
            EngineType::Date32 => write!(f, "Date32"),
            EngineType::DateTime64 {
                precision,
                timezone: None,
            } => write!(f, "DateTime64({})", precision),
            EngineType::DateTime64 {
                precision,
                timezone: Some(tz),
            } => write!(f, "DateTime64({}, '{}')", precision, tz),
            EngineType::Array(element) => write!(f, "Array({})", element),
            EngineType::Map(key, value) => write!(f, "Map({}, {})", key, value),
            EngineType::Tuple(elements) => {
                write!(f, "Tuple(")?;
                for (i, (name, ty)) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", name, ty)?;
                }
                write!(f, ")")
            }
            EngineType::Nullable(inner) => write!(f, "Nullable({})", inner),
        }
    }
}

// ---------------------------------------------------------------------------
// TypeMapper
// ---------------------------------------------------------------------------

/// Maps a Paimon field descriptor to an engine type.
///
/// Implementations must be pure: the registry caches the result per schema
/// and never calls the mapper again for the same schema id.
pub trait TypeMapper: Send + Sync {
    fn engine_type(&self, data_type: &DataType) -> EngineType;
}

impl<F> TypeMapper for F
where
    F: Fn(&DataType) -> EngineType + Send + Sync,
{
    fn engine_type(&self, data_type: &DataType) -> EngineType {
        self(data_type)
    }
}

/// ClickHouse-style mapping.
///
/// Nullable scalars become `Nullable(T)`; arrays, maps and tuples are never
/// wrapped, and map keys are always non-nullable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeMapper;

/// Time zone attached to `TIMESTAMP WITH LOCAL TIME ZONE` columns.
const LOCAL_TIMESTAMP_TZ: &str = "UTC";

impl DefaultTypeMapper {
    fn base_type(&self, data_type: &DataType) -> EngineType {
        match &data_type.kind {
            TypeKind::Boolean => EngineType::Bool,
            TypeKind::TinyInt => EngineType::Int8,
            TypeKind::SmallInt => EngineType::Int16,
            TypeKind::Int => EngineType::Int32,
            TypeKind::BigInt => EngineType::Int64,
            TypeKind::Float => EngineType::Float32,
            TypeKind::Double => EngineType::Float64,
            TypeKind::Decimal { precision, scale } => EngineType::Decimal {
                precision: *precision,
                scale: *scale,
            },
            TypeKind::Char(_)
            | TypeKind::VarChar(_)
            | TypeKind::Binary(_)
            | TypeKind::VarBinary(_) => EngineType::String,
            TypeKind::Date => EngineType::Date32,
            // Paimon stores TIME as milliseconds of the day.
            TypeKind::Time(_) => EngineType::Int64,
            TypeKind::Timestamp(p) => EngineType::DateTime64 {
                precision: *p,
                timezone: None,
            },
            TypeKind::LocalZonedTimestamp(p) => EngineType::DateTime64 {
                precision: *p,
                timezone: Some(LOCAL_TIMESTAMP_TZ.to_string()),
            },
            TypeKind::Array(element) => EngineType::Array(Box::new(self.engine_type(element))),
            TypeKind::Multiset(element) => EngineType::Map(
                Box::new(self.engine_type(&element.as_not_null())),
                Box::new(EngineType::Int32),
            ),
            TypeKind::Map { key, value } => EngineType::Map(
                Box::new(self.engine_type(&key.as_not_null())),
                Box::new(self.engine_type(value)),
            ),
            TypeKind::Row(fields) => EngineType::Tuple(
                fields
                    .iter()
                    .map(|field| (field.name.clone(), self.engine_type(&field.data_type)))
                    .collect(),
            ),
        }
    }
}

impl TypeMapper for DefaultTypeMapper {
    fn engine_type(&self, data_type: &DataType) -> EngineType {
        let base = self.base_type(data_type);
        if data_type.nullable && !data_type.is_composite() {
            base.into_nullable()
        } else {
            base
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataField, MAX_LENGTH};

    fn map(kind: TypeKind, nullable: bool) -> EngineType {
        DefaultTypeMapper.engine_type(&DataType::new(kind, nullable))
    }

    #[test]
    fn scalar_mapping() {
        assert_eq!(map(TypeKind::Int, false), EngineType::Int32);
        assert_eq!(map(TypeKind::BigInt, false), EngineType::Int64);
        assert_eq!(map(TypeKind::VarChar(MAX_LENGTH), false), EngineType::String);
        assert_eq!(map(TypeKind::VarBinary(16), false), EngineType::String);
        assert_eq!(map(TypeKind::Date, false), EngineType::Date32);
        assert_eq!(
            map(TypeKind::Int, true),
            EngineType::Nullable(Box::new(EngineType::Int32))
        );
    }

    #[test]
    fn timestamps() {
        assert_eq!(map(TypeKind::Timestamp(3), false).to_string(), "DateTime64(3)");
        assert_eq!(
            map(TypeKind::LocalZonedTimestamp(6), true).to_string(),
            "Nullable(DateTime64(6, 'UTC'))"
        );
    }

    #[test]
    fn composites_are_never_nullable() {
        let array = map(
            TypeKind::Array(Box::new(DataType::nullable(TypeKind::Int))),
            true,
        );
        assert_eq!(array.to_string(), "Array(Nullable(Int32))");

        let map_ty = map(
            TypeKind::Map {
                key: Box::new(DataType::nullable(TypeKind::VarChar(MAX_LENGTH))),
                value: Box::new(DataType::nullable(TypeKind::Double)),
            },
            true,
        );
        assert_eq!(map_ty.to_string(), "Map(String, Nullable(Float64))");

        let row = map(
            TypeKind::Row(vec![
                DataField::new(1, "x", DataType::not_null(TypeKind::Float)),
                DataField::new(2, "tag", DataType::nullable(TypeKind::Char(2))),
            ]),
            true,
        );
        assert_eq!(row.to_string(), "Tuple(x Float32, tag Nullable(String))");
    }

    #[test]
    fn multiset_counts_elements() {
        let ty = map(
            TypeKind::Multiset(Box::new(DataType::nullable(TypeKind::VarChar(MAX_LENGTH)))),
            false,
        );
        assert_eq!(ty.to_string(), "Map(String, Int32)");
    }

    #[test]
    fn closures_are_mappers() {
        let everything_is_a_string = |_: &DataType| EngineType::String;
        assert_eq!(
            everything_is_a_string.engine_type(&DataType::nullable(TypeKind::Int)),
            EngineType::String
        );
    }
}
