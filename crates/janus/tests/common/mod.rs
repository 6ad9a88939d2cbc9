//! Common test utilities shared across integration tests.
//!
//! Builders for front-end records so scenarios read like the code they stand
//! for. Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::PathBuf;

use janus::{
    Access, ArtifactKind, Config, DeclKey, Import, Janus, Language, LibraryArtifact, Modifiers,
    OccurrenceToken, SourceDeclaration, SourceFile, TextRange, TokenShape, UsageCategory,
    UsageReport,
};

// === Library artifacts ===

/// A library artifact with only the required fields set.
pub fn artifact(
    language: Language,
    kind: ArtifactKind,
    package: &str,
    container: &[&str],
    name: &str,
    descriptor: Option<&str>,
) -> LibraryArtifact {
    LibraryArtifact {
        language,
        kind,
        package: package.to_string(),
        container: container.iter().map(ToString::to_string).collect(),
        name: name.to_string(),
        descriptor: descriptor.map(ToString::to_string),
        modifiers: Modifiers::default(),
        supertypes: Vec::new(),
        jvm_name: None,
        facade: None,
        alias_target: None,
    }
}

/// Java artifact in package `lib`.
pub fn java(kind: ArtifactKind, container: &[&str], name: &str, descriptor: Option<&str>) -> LibraryArtifact {
    artifact(Language::Java, kind, "lib", container, name, descriptor)
}

/// Kotlin artifact in package `lib`.
pub fn kotlin(kind: ArtifactKind, container: &[&str], name: &str, descriptor: Option<&str>) -> LibraryArtifact {
    artifact(Language::Kotlin, kind, "lib", container, name, descriptor)
}

/// Mark an artifact static.
pub fn statik(mut artifact: LibraryArtifact) -> LibraryArtifact {
    artifact.modifiers.is_static = true;
    artifact
}

// === Source files ===

/// A source file in package `app` with the given imports (`a.b.*` for stars).
pub fn file(path: &str, language: Language, imports: &[&str], tokens: Vec<OccurrenceToken>) -> SourceFile {
    SourceFile {
        path: PathBuf::from(path),
        language,
        package: "app".into(),
        imports: imports
            .iter()
            .map(|path| match path.strip_suffix(".*") {
                Some(prefix) => Import {
                    path: prefix.to_string(),
                    alias: None,
                    star: true,
                },
                None => Import {
                    path: (*path).to_string(),
                    alias: None,
                    star: false,
                },
            })
            .collect(),
        declarations: Vec::new(),
        tokens,
        facade_name: None,
    }
}

/// Move a file into another package and give it declarations.
pub fn declaring(mut file: SourceFile, package: &str, declarations: Vec<SourceDeclaration>) -> SourceFile {
    file.package = package.to_string();
    file.declarations = declarations;
    file
}

/// A source declaration.
pub fn declaration(
    kind: ArtifactKind,
    container: &[&str],
    name: &str,
    signature: Option<&str>,
    name_start: u32,
) -> SourceDeclaration {
    let name_range = range(name_start, name);
    SourceDeclaration {
        kind,
        name: name.to_string(),
        container: container.iter().map(ToString::to_string).collect(),
        signature: signature.map(ToString::to_string),
        range: TextRange {
            start: name_start.saturating_sub(4),
            end: name_range.end + 10,
        },
        name_range,
        modifiers: Modifiers::default(),
        supertypes: Vec::new(),
        jvm_name: None,
        alias_target: None,
    }
}

fn range(start: u32, name: &str) -> TextRange {
    let len = u32::try_from(name.len()).expect("short name");
    TextRange {
        start,
        end: start + len,
    }
}

// === Tokens ===

/// Unqualified reference.
pub fn reference(name: &str, start: u32, access: Access) -> OccurrenceToken {
    OccurrenceToken::reference(name, range(start, name), access)
}

/// Reference behind a static qualifier such as `Foo.` or `lib.Foo.`.
pub fn qualified(qualifier: &[&str], name: &str, start: u32, access: Access) -> OccurrenceToken {
    let mut token = reference(name, start, access);
    token.qualifier = qualifier.iter().map(ToString::to_string).collect();
    token
}

/// Member access on an expression of type `receiver`.
pub fn member(receiver: &str, name: &str, start: u32, access: Access, signature: Option<&str>) -> OccurrenceToken {
    let mut token = reference(name, start, access);
    token.receiver = Some(receiver.to_string());
    token.signature = signature.map(ToString::to_string);
    token
}

/// `Foo(...)` / `new Foo(...)`.
pub fn construct(qualifier: &[&str], class: &str, start: u32, signature: Option<&str>) -> OccurrenceToken {
    let mut token = qualified(qualifier, class, start, Access::Call);
    token.shape = TokenShape::ConstructorCall;
    token.signature = signature.map(ToString::to_string);
    token
}

/// Enum case label.
pub fn case_label(subject: &str, name: &str, start: u32) -> OccurrenceToken {
    let mut token = reference(name, start, Access::Read);
    token.shape = TokenShape::EnumCase {
        subject: subject.split('.').map(ToString::to_string).collect(),
    };
    token
}

// === Engine ===

/// Build an engine over `files` and `libraries` with default config.
pub fn engine(files: &[SourceFile], libraries: &[LibraryArtifact]) -> Janus {
    let janus = Janus::new(Config::default()).expect("should create engine");
    let generation = janus.build(files, libraries).expect("should build");
    assert!(
        generation.warnings.is_empty(),
        "fixture should bridge cleanly: {:?}",
        generation.warnings
    );
    janus
}

/// Parse a key or panic.
pub fn key(text: &str) -> DeclKey {
    text.parse().expect("should parse key")
}

/// Usages of `key` over `corpus`.
pub fn usages(janus: &Janus, key_text: &str, corpus: &[SourceFile]) -> UsageReport {
    janus
        .find_usages(&key(key_text), corpus)
        .expect("should find usages")
}

/// `(start, category)` of every usage, in report order.
pub fn hits(report: &UsageReport) -> Vec<(u32, UsageCategory)> {
    report
        .occurrences()
        .map(|o| (o.range.start, o.category))
        .collect()
}

/// The single declaration each usage resolved to, in report order.
pub fn resolved_keys(janus: &Janus, report: &UsageReport) -> Vec<String> {
    let generation = janus.snapshot();
    report
        .occurrences()
        .map(|o| {
            let target = o.resolution.unique().expect("usage should be unique");
            generation
                .index
                .get(target.decl)
                .expect("target should be indexed")
                .key
                .to_string()
        })
        .collect()
}
