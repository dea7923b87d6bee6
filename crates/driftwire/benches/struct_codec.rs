// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct Codec Benchmark
//!
//! Measures the metadata-driven field loop against a representative record:
//! - serialize / deserialize of a flat struct with strings and a list
//! - a nested struct with a map of child structs
//! - cached codec lookup through the registry

#![allow(clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use driftwire::{CodecManager, ThriftStruct};
use std::collections::HashMap;

#[derive(Debug, Clone, ThriftStruct)]
struct Reading {
    #[thrift(id = 1)]
    sensor: String,
    #[thrift(id = 2)]
    sequence: i64,
    #[thrift(id = 3)]
    value: f64,
    #[thrift(id = 4)]
    tags: Vec<String>,
    #[thrift(id = 5)]
    note: Option<String>,
}

#[derive(Debug, ThriftStruct)]
struct Batch {
    #[thrift(id = 1)]
    origin: String,
    #[thrift(id = 2)]
    readings: Vec<Reading>,
    #[thrift(id = 3)]
    by_sensor: HashMap<String, i32>,
}

fn reading(seq: i64) -> Reading {
    Reading {
        sensor: format!("sensor-{}", seq % 16),
        sequence: seq,
        value: seq as f64 * 0.5,
        tags: vec!["lab".into(), "rack-3".into()],
        note: (seq % 2 == 0).then(|| "calibrated".into()),
    }
}

fn batch(len: usize) -> Batch {
    let readings: Vec<Reading> = (0..len as i64).map(reading).collect();
    let by_sensor = readings
        .iter()
        .map(|r| (r.sensor.clone(), r.sequence as i32))
        .collect();
    Batch {
        origin: "bench".into(),
        readings,
        by_sensor,
    }
}

fn bench_flat(c: &mut Criterion) {
    let manager = CodecManager::new();
    let value = reading(7);
    let bytes = manager.serialize(&value).unwrap_or_default();

    let mut group = c.benchmark_group("struct_flat");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("serialize", |b| {
        b.iter(|| manager.serialize(black_box(&value)))
    });
    group.bench_function("deserialize", |b| {
        b.iter(|| manager.deserialize::<Reading>(black_box(&bytes)))
    });
    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    let manager = CodecManager::new();
    let mut group = c.benchmark_group("struct_nested");
    for len in [8usize, 64, 512] {
        let value = batch(len);
        let bytes = manager.serialize(&value).unwrap_or_default();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("serialize", len), &value, |b, value| {
            b.iter(|| manager.serialize(black_box(value)))
        });
        group.bench_with_input(BenchmarkId::new("deserialize", len), &bytes, |b, bytes| {
            b.iter(|| manager.deserialize::<Batch>(black_box(bytes)))
        });
    }
    group.finish();
}

fn bench_cached_lookup(c: &mut Criterion) {
    let manager = CodecManager::new();
    let _ = manager.struct_codec::<Batch>();
    c.bench_function("registry_cached_lookup", |b| {
        b.iter(|| manager.struct_codec::<Batch>())
    });
}

criterion_group!(benches, bench_flat, bench_nested, bench_cached_lookup);
criterion_main!(benches);
