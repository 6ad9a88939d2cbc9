//! Property-based tests for build determinism and scan counting.

mod common;

use common::{construct, file, java, key, kotlin, member, reference, statik};
use janus::{
    Access, ArtifactKind, Config, IndexBuilder, Janus, Language, LibraryArtifact, SourceFile,
    UsageCategory,
};
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// A small mixed library: Java `Foo`, Kotlin `Bar` with companion and object `Registry`.
fn library() -> Vec<LibraryArtifact> {
    let mut property = kotlin(ArtifactKind::Property, &["Bar"], "size", Some("I"));
    property.modifiers.is_mutable = true;
    vec![
        java(ArtifactKind::Class, &[], "Foo", None),
        java(ArtifactKind::Constructor, &["Foo"], "Foo", Some("(I)V")),
        java(ArtifactKind::Constructor, &["Foo"], "Foo", Some("(II)V")),
        statik(java(ArtifactKind::Field, &["Foo"], "COUNT", Some("I"))),
        java(ArtifactKind::Method, &["Foo"], "getName", Some("()Ljava/lang/String;")),
        kotlin(ArtifactKind::Class, &[], "Bar", None),
        kotlin(ArtifactKind::PrimaryConstructor, &["Bar"], "Bar", Some("()V")),
        kotlin(ArtifactKind::Companion, &["Bar"], "Companion", None),
        kotlin(ArtifactKind::Method, &["Bar", "Companion"], "make", Some("()Llib/Bar;")),
        property,
        kotlin(ArtifactKind::Object, &[], "Registry", None),
        kotlin(ArtifactKind::Method, &["Registry"], "register", Some("(Llib/Foo;)V")),
    ]
}

fn arb_shuffled_library() -> impl Strategy<Value = Vec<LibraryArtifact>> {
    Just(library()).prop_shuffle()
}

fn arb_access() -> impl Strategy<Value = Access> {
    prop_oneof![Just(Access::Read), Just(Access::Write), Just(Access::Call)]
}

/// Distinct constructor arities, 1 to 5 overloads.
fn arb_arities() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::btree_set(0usize..6, 1..=5).prop_map(|set| set.into_iter().collect())
}

fn descriptor(arity: usize) -> String {
    format!("({})V", "I".repeat(arity))
}

/// One Kotlin file per entry, calling `Foo.getName` or touching its `name` property.
fn arb_corpus() -> impl Strategy<Value = Vec<SourceFile>> {
    proptest::collection::vec(proptest::collection::vec(arb_access(), 0..6), 1..8).prop_map(
        |files| {
            files
                .into_iter()
                .enumerate()
                .map(|(i, accesses)| {
                    let tokens = accesses
                        .into_iter()
                        .enumerate()
                        .map(|(j, access)| {
                            let start = u32::try_from(j * 20).expect("small offset");
                            match access {
                                Access::Call => member("lib.Foo", "getName", start, access, None),
                                _ => member("lib.Foo", "name", start, access, None),
                            }
                        })
                        .collect();
                    file(&format!("src/F{i}.kt"), Language::Kotlin, &[], tokens)
                })
                .collect()
        },
    )
}

fn engine(libraries: &[LibraryArtifact]) -> Janus {
    let janus = Janus::new(Config::default()).expect("should create engine");
    janus.build(&[], libraries).expect("should build");
    janus
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn build_is_independent_of_artifact_order(shuffled in arb_shuffled_library()) {
        let baseline = IndexBuilder::new().build(&[], &library()).expect("should build");
        let shuffled = IndexBuilder::new().build(&[], &shuffled).expect("should build");

        prop_assert_eq!(baseline.index.fingerprint(), shuffled.index.fingerprint());
        prop_assert_eq!(baseline.index.len(), shuffled.index.len());
        for decl in baseline.index.declarations() {
            let twin = shuffled.index.lookup(&decl.key).expect("same keys");
            prop_assert_eq!(decl.id, twin.id);
            prop_assert_eq!(&decl.aliases, &twin.aliases);
        }
    }

    #[test]
    fn fingerprint_is_stable_across_rebuilds(shuffled in arb_shuffled_library()) {
        let janus = engine(&shuffled);
        let first = janus.snapshot().index.fingerprint();
        janus.build(&[], &shuffled).expect("should rebuild");

        prop_assert_eq!(janus.snapshot().index.fingerprint(), first);
        prop_assert_eq!(janus.snapshot().number, 2);
    }

    #[test]
    fn each_overload_is_distinct_and_each_call_counted(
        arities in arb_arities(),
        calls in proptest::collection::vec(0usize..5, 0..12),
    ) {
        let mut artifacts = vec![java(ArtifactKind::Class, &[], "Foo", None)];
        artifacts.extend(arities.iter().map(|&arity| {
            java(ArtifactKind::Constructor, &["Foo"], "Foo", Some(&descriptor(arity)))
        }));
        let janus = engine(&artifacts);
        let snapshot = janus.snapshot();
        let foo = snapshot.index.lookup(&key("type:lib/Foo")).expect("indexed");
        prop_assert_eq!(snapshot.index.constructors_of(foo.id).len(), arities.len());

        let tokens = calls
            .iter()
            .enumerate()
            .map(|(i, &pick)| {
                let arity = arities[pick % arities.len()];
                let start = u32::try_from(i * 10).expect("small offset");
                construct(&[], "Foo", start, Some(&descriptor(arity)))
            })
            .collect();
        let corpus = [file("src/Use.kt", Language::Kotlin, &["lib.Foo"], tokens)];

        let report = janus.find_usages(&key("type:lib/Foo"), &corpus).expect("should scan");
        prop_assert_eq!(report.count(UsageCategory::Call), calls.len());

        for &arity in &arities {
            let ctor = format!("constructor:lib/Foo.<init>#{}", descriptor(arity));
            let expected = calls
                .iter()
                .filter(|&&pick| arities[pick % arities.len()] == arity)
                .count();
            let report = janus.find_usages(&key(&ctor), &corpus).expect("should scan");
            prop_assert_eq!(report.total(), expected);
        }
    }

    #[test]
    fn scan_follows_corpus_order(corpus in arb_corpus()) {
        let janus = engine(&library());
        let getter = key("method:lib/Foo.getName#()Ljava/lang/String;");

        let forward = janus.find_usages(&getter, &corpus).expect("should scan");
        let mut reversed_corpus = corpus.clone();
        reversed_corpus.reverse();
        let backward = janus.find_usages(&getter, &reversed_corpus).expect("should scan");

        prop_assert_eq!(forward.total(), backward.total());
        prop_assert_eq!(&forward.counts, &backward.counts);
        let mut reversed_files = backward.files.clone();
        reversed_files.reverse();
        prop_assert_eq!(&forward.files, &reversed_files);
        for usages in &forward.files {
            let starts: Vec<u32> = usages.occurrences.iter().map(|o| o.range.start).collect();
            prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn getter_usages_split_property_reads_from_calls(corpus in arb_corpus()) {
        let janus = engine(&library());
        let getter = key("method:lib/Foo.getName#()Ljava/lang/String;");
        let report = janus.find_usages(&getter, &corpus).expect("should scan");

        let tokens = corpus.iter().flat_map(|f| &f.tokens);
        let reads = tokens.clone().filter(|t| t.access == Access::Read).count();
        let calls = tokens.clone().filter(|t| t.access == Access::Call).count();
        let writes = tokens.filter(|t| t.access == Access::Write).count();

        // No setter exists, so property writes never resolve to the getter.
        prop_assert_eq!(report.count(UsageCategory::Read), reads);
        prop_assert_eq!(report.count(UsageCategory::Call), calls);
        prop_assert_eq!(report.count(UsageCategory::Write), 0);
        prop_assert_eq!(report.misses.len(), writes);
    }
}

#[test]
fn type_reference_tokens_outside_the_library_are_ignored() {
    let janus = engine(&library());
    let corpus = [file(
        "src/Use.kt",
        Language::Kotlin,
        &[],
        vec![reference("Unrelated", 0, Access::TypeReference)],
    )];

    let report = janus.find_usages(&key("type:lib/Foo"), &corpus).expect("should scan");

    assert_eq!(report.total(), 0);
    assert!(report.misses.is_empty(), "a different spelling is not a miss");
}
