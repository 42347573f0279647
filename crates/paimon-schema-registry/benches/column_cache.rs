// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Column Cache Benchmark
//!
//! Measures:
//! - cached `get_columns()` (shared lock + Arc clone)
//! - first-time derivation for schemas of different widths
//! - schema registration from a parsed document

#![allow(clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use paimon_schema_registry::SchemaProcessor;
use serde_json::{json, Value};
use std::hint::black_box as bb;

fn schema_doc(id: i64, width: usize) -> Value {
    let fields: Vec<Value> = (0..width)
        .map(|i| {
            let ty = match i % 4 {
                0 => json!("BIGINT NOT NULL"),
                1 => json!("STRING"),
                2 => json!("DECIMAL(18, 4)"),
                _ => json!({"type": "ARRAY", "element": "TIMESTAMP(3)"}),
            };
            json!({"id": i, "name": format!("c{}", i), "type": ty})
        })
        .collect();
    json!({"version": 3, "id": id, "fields": fields, "primaryKeys": ["c0"]})
}

/// Hot path: column list already cached.
fn bench_cached_columns(c: &mut Criterion) {
    let processor = SchemaProcessor::new();
    processor.add_schema(&schema_doc(1, 64)).expect("schema registration");
    processor.get_columns(1).expect("columns");

    c.bench_function("get_columns_cached", |b| {
        b.iter(|| bb(processor.get_columns(bb(1))));
    });
}

/// Cold path: derive on first access.
fn bench_first_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_columns_first");

    for width in [8usize, 64, 512] {
        let doc = schema_doc(1, width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &doc, |b, doc| {
            b.iter_with_setup(
                || {
                    let processor = SchemaProcessor::new();
                    processor.add_schema(doc).expect("schema registration");
                    processor
                },
                |processor| bb(processor.get_columns(1)),
            );
        });
    }

    group.finish();
}

fn bench_add_schema(c: &mut Criterion) {
    let doc = schema_doc(1, 64);

    c.bench_function("add_schema_new", |b| {
        b.iter_with_setup(SchemaProcessor::new, |processor| {
            bb(processor.add_schema(&doc).expect("schema registration"))
        });
    });

    let processor = SchemaProcessor::new();
    processor.add_schema(&doc).expect("schema registration");
    c.bench_function("add_schema_existing", |b| {
        b.iter(|| bb(processor.add_schema(&doc).expect("schema registration")));
    });
}

criterion_group!(
    benches,
    bench_cached_columns,
    bench_first_derivation,
    bench_add_schema
);
criterion_main!(benches);
