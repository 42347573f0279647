// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema registry for Apache Paimon table readers.
//!
//! Resolves schema ids to parsed table schemas, derives and caches the
//! engine column list of each schema, and remembers which schema every
//! snapshot was written with. One [`SchemaProcessor`] serves one table
//! handle and is shared between reader threads through an `Arc`.
//!
//! # Features
//!
//! - **Schema store**: idempotent, first-writer-wins registration of schema
//!   documents keyed by schema id
//! - **Column cache**: engine column lists derived at most once per schema
//!   through a pluggable [`TypeMapper`]
//! - **Snapshot index**: snapshot id to schema id bindings with a
//!   configurable conflict policy
//! - **Evolution diff**: field-level comparison of two schema versions
//!
//! # Architecture
//!
//! ```text
//!   metadata reader (parsed schema JSON, snapshot list)
//!        |
//!        v
//!   SchemaProcessor (one RwLock)
//!     |-- SchemaStore     schema id   -> Arc<TableSchema>
//!     |-- ColumnCache     schema id   -> Arc<ColumnList>
//!     `-- SnapshotIndex   snapshot id -> schema id
//! ```
//!
//! # Example
//!
//! ```
//! use paimon_schema_registry::SchemaProcessor;
//! use serde_json::json;
//!
//! let processor = SchemaProcessor::new();
//! processor.add_schema(&json!({
//!     "id": 0,
//!     "fields": [{"id": 0, "name": "k", "type": "BIGINT NOT NULL"}],
//!     "primaryKeys": ["k"]
//! }))?;
//! processor.register_snapshot_schema(1, 0)?;
//!
//! let columns = processor.get_columns_for_snapshot(1).unwrap();
//! assert_eq!(columns[0].to_string(), "k Int64");
//! # Ok::<(), paimon_schema_registry::SchemaError>(())
//! ```

pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod evolution;
pub mod processor;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod types;

pub use columns::{convert_schema, ColumnList, ColumnListPtr, NameAndType};
pub use config::ProcessorConfig;
pub use engine::{DefaultTypeMapper, EngineType, TypeMapper};
pub use error::{Result, SchemaError};
pub use evolution::{Compatibility, FieldChange, SchemaDiff};
pub use processor::{ProcessorStats, SchemaProcessor, SchemaProcessorPtr};
pub use schema::{TableSchema, TableSchemaPtr};
pub use snapshot::SnapshotConflictPolicy;
pub use types::{DataField, DataType, TypeKind};
