//! Queries running alongside rebuilds, and cancellation.
//!
//! A query works on the generation that was current when it started; a
//! rebuild never changes an answer halfway.

mod common;

use std::sync::Arc;

use common::{construct, file, hits, java, key, reference};
use janus::{
    Access, ArtifactKind, CancellationToken, Config, Error, Janus, Language, LibraryArtifact,
    SourceFile, UsageCategory,
};

/// `lib.Foo` with `ctors` constructors taking 1..=ctors ints.
fn library(ctors: usize) -> Vec<LibraryArtifact> {
    let mut artifacts = vec![java(ArtifactKind::Class, &[], "Foo", None)];
    for arity in 1..=ctors {
        let descriptor = format!("({})V", "I".repeat(arity));
        artifacts.push(java(ArtifactKind::Constructor, &["Foo"], "Foo", Some(&descriptor)));
    }
    artifacts
}

/// `files` Kotlin files, each with a type reference and one call per overload in `library(2)`.
fn corpus(files: usize) -> Vec<SourceFile> {
    (0..files)
        .map(|i| {
            file(
                &format!("src/Use{i}.kt"),
                Language::Kotlin,
                &["lib.Foo"],
                vec![
                    reference("Foo", 0, Access::TypeReference),
                    construct(&[], "Foo", 10, Some("(I)V")),
                    construct(&[], "Foo", 20, Some("(II)V")),
                ],
            )
        })
        .collect()
}

fn engine(config: Config) -> Janus {
    let janus = Janus::new(config).expect("should create engine");
    janus.build(&[], &library(2)).expect("should build");
    janus
}

#[test]
fn queries_during_rebuilds_see_whole_generations() {
    let janus = engine(Config::default());
    let files = corpus(8);
    let foo = key("type:lib/Foo");

    std::thread::scope(|s| {
        s.spawn(|| {
            for round in 0..20 {
                let ctors = if round % 2 == 0 { 1 } else { 2 };
                janus.build(&[], &library(ctors)).expect("should rebuild");
            }
        });
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..20 {
                    let report = janus.find_usages(&foo, &files).expect("should scan");
                    let calls = report.count(UsageCategory::Call);
                    // One overload: only `(I)V` calls resolve. Two: both do.
                    assert!(calls == 8 || calls == 16, "mixed generations: {calls} calls");
                    assert_eq!(report.count(UsageCategory::TypeReference), 8);
                }
            });
        }
    });

    assert_eq!(janus.snapshot().number, 21);
}

#[test]
fn held_snapshot_outlives_rebuild() {
    let janus = engine(Config::default());
    let before = janus.snapshot();

    janus.build(&[], &library(5)).expect("should rebuild");
    let after = janus.snapshot();

    assert_eq!(before.index.len(), 3);
    assert_eq!(after.index.len(), 6);
    assert_ne!(before.index.fingerprint(), after.index.fingerprint());
    assert!(!Arc::ptr_eq(&before, &after));
}

#[test]
fn dedicated_pool_gives_same_answer() {
    let files = corpus(16);
    let shared = engine(Config::default());
    let pooled = engine(Config {
        threads: Some(2),
        ..Config::default()
    });

    let a = shared
        .find_usages(&key("type:lib/Foo"), &files)
        .expect("should scan");
    let b = pooled
        .find_usages(&key("type:lib/Foo"), &files)
        .expect("should scan");

    assert_eq!(a, b);
    assert_eq!(hits(&a).len(), 48);
}

#[test]
fn cancelled_scan_returns_cancelled() {
    let janus = engine(Config::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = janus.find_usages_with(&key("type:lib/Foo"), &corpus(4), None, &cancel);

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn cancel_from_another_thread_stops_build() {
    let janus = engine(Config::default());
    let cancel = CancellationToken::new();
    let remote = cancel.clone();

    std::thread::scope(|s| {
        s.spawn(move || remote.cancel());
    });
    let result = janus.build_with_cancel(&[], &library(3), &cancel);

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(janus.snapshot().number, 1, "cancelled build publishes nothing");
    assert_eq!(janus.snapshot().index.len(), 3);
}
