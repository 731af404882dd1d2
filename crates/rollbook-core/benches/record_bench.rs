//! # Record Benchmarks
//!
//! Metrics computation and in-memory store writes.
//!
//! Run with: `cargo bench -p rollbook-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rollbook_core::metrics::compute;
use rollbook_core::{Marks, MemoryStore, NewStudent, RecordStore, RollNumber, StudentRecord};
use std::hint::black_box;

fn marks(subjects: u32) -> Marks {
    (0..subjects)
        .map(|i| (format!("Subject {i}"), (i * 7) % 101))
        .collect()
}

fn record(roll: u32, subjects: u32) -> StudentRecord {
    StudentRecord::new(NewStudent {
        roll_number: RollNumber(roll),
        name: format!("Student {roll}"),
        age: 20,
        dept: "Bench".to_string(),
        year: "I".to_string(),
        marks: marks(subjects),
    })
    .expect("valid")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics_compute");

    for subjects in [1, 8, 64].iter() {
        let input = marks(*subjects);
        group.bench_with_input(BenchmarkId::from_parameter(subjects), &input, |b, input| {
            b.iter(|| black_box(compute(black_box(input))));
        });
    }

    group.finish();
}

fn bench_memory_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_store_insert");

    for size in [100, 1000].iter() {
        let records: Vec<StudentRecord> = (0..*size).map(|roll| record(roll, 6)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let mut store = MemoryStore::new();
                for r in records {
                    let _ = store.create_student(r);
                }
                black_box(store)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_metrics, bench_memory_inserts);
criterion_main!(benches);
