//! Benchmarks for Janus indexing and usage scans.
//!
//! These benchmarks measure the performance of:
//! - Building the declaration index for growing libraries
//! - `find_usages` over growing corpora, for class and member queries
//! - Single-offset lookups with `declaration_at`

// Benchmark code - performance of the benchmark setup is not critical
#![allow(missing_docs)]

mod common;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use janus::{DeclKey, IndexBuilder};

use common::{create_engine, generate_corpus, generate_library};

fn key(text: &str) -> DeclKey {
    text.parse().expect("benchmark key should parse")
}

/// Benchmark index construction.
fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");

    for classes in &[10, 100, 1000] {
        let library = generate_library(*classes);
        group.throughput(Throughput::Elements(library.len() as u64));
        group.bench_with_input(BenchmarkId::new("classes", classes), &library, |b, library| {
            b.iter(|| {
                let result = IndexBuilder::new()
                    .build(&[], library)
                    .expect("build failed");
                black_box(result)
            });
        });
    }

    group.finish();
}

/// Benchmark class queries, which expand to every constructor.
fn bench_class_usages(c: &mut Criterion) {
    let mut group = c.benchmark_group("class_usages");
    let janus = create_engine(&generate_library(50));
    let foo = key("type:lib/Foo0");

    for files in &[10, 100, 500] {
        let corpus = generate_corpus(*files, 20);
        let tokens: usize = corpus.iter().map(|f| f.tokens.len()).sum();
        group.throughput(Throughput::Elements(tokens as u64));
        group.bench_with_input(BenchmarkId::new("files", files), &corpus, |b, corpus| {
            b.iter(|| {
                let report = janus.find_usages(&foo, corpus).expect("find_usages failed");
                black_box(report)
            });
        });
    }

    group.finish();
}

/// Benchmark member queries that go through synthetic spellings.
fn bench_member_usages(c: &mut Criterion) {
    let mut group = c.benchmark_group("member_usages");
    let janus = create_engine(&generate_library(50));
    let corpus = generate_corpus(100, 20);

    let queries = [
        ("field", "field:lib/Foo0.value"),
        ("getter", "method:lib/Foo0.getLabel#()Ljava/lang/String;"),
        ("companion", "method:lib/Bar.Companion.make#()Llib/Bar;"),
    ];
    for (label, text) in queries {
        let target = key(text);
        group.bench_function(label, |b| {
            b.iter(|| {
                let report = janus
                    .find_usages(&target, &corpus)
                    .expect("find_usages failed");
                black_box(report)
            });
        });
    }

    group.finish();
}

/// Benchmark resolving the token under a single offset.
fn bench_declaration_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("declaration_at");
    let janus = create_engine(&generate_library(50));
    let corpus = generate_corpus(1, 50);
    let file = &corpus[0];

    group.bench_function("constructor_call", |b| {
        b.iter(|| black_box(janus.declaration_at(file, black_box(2501))));
    });
    group.bench_function("property_read", |b| {
        b.iter(|| black_box(janus.declaration_at(file, black_box(2531))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_build_index,
    bench_class_usages,
    bench_member_usages,
    bench_declaration_at,
);
criterion_main!(benches);
