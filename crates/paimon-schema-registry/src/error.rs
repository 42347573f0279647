// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use thiserror::Error;

/// Errors produced by the schema registry.
///
/// Looking up an unknown schema or snapshot id is never an error; those
/// operations return `None` or an empty collection instead.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema document could not be turned into a `TableSchema`.
    #[error("malformed schema document: {0}")]
    Malformed(String),

    /// `get_or_add_schema` was called with a document declaring another id.
    #[error("schema id mismatch: requested {requested}, document declares {declared}")]
    IdMismatch { requested: i64, declared: i64 },

    /// A snapshot is already bound to a different schema id.
    #[error("snapshot {snapshot_id} is bound to schema {bound}, refusing rebind to {requested}")]
    SnapshotConflict {
        snapshot_id: i64,
        bound: i64,
        requested: i64,
    },

    /// An operation that needs a registered schema was given an unknown id.
    #[error("schema not found: {0}")]
    UnknownSchema(i64),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        SchemaError::Malformed(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
