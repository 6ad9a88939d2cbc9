//! Shared generators for Janus benchmarks.

// Benchmark utilities - pedantic lints not critical here
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(dead_code)]

use std::path::PathBuf;

use janus::{
    Access, ArtifactKind, Config, Import, Janus, Language, LibraryArtifact, Modifiers,
    OccurrenceToken, SourceFile, TextRange, TokenShape,
};

fn artifact(
    language: Language,
    kind: ArtifactKind,
    container: &[&str],
    name: &str,
    descriptor: Option<&str>,
) -> LibraryArtifact {
    LibraryArtifact {
        language,
        kind,
        package: "lib".to_string(),
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

/// A library of `classes` Java classes, each with two constructors, a field
/// and getter/setter, plus one Kotlin class with a companion.
///
/// ```text
/// lib.Foo0 .. lib.Foo{classes-1}
///   <init>(I)V, <init>(II)V, value, getLabel(), setLabel(String)
/// lib.Bar
///   <init>(), companion { make() }, var size
/// ```
pub fn generate_library(classes: usize) -> Vec<LibraryArtifact> {
    let mut artifacts = Vec::new();
    for i in 0..classes {
        let class = format!("Foo{i}");
        let owner = [class.as_str()];
        artifacts.push(artifact(Language::Java, ArtifactKind::Class, &[], &class, None));
        for descriptor in ["(I)V", "(II)V"] {
            artifacts.push(artifact(
                Language::Java,
                ArtifactKind::Constructor,
                &owner,
                &class,
                Some(descriptor),
            ));
        }
        artifacts.push(artifact(Language::Java, ArtifactKind::Field, &owner, "value", Some("I")));
        artifacts.push(artifact(
            Language::Java,
            ArtifactKind::Method,
            &owner,
            "getLabel",
            Some("()Ljava/lang/String;"),
        ));
        artifacts.push(artifact(
            Language::Java,
            ArtifactKind::Method,
            &owner,
            "setLabel",
            Some("(Ljava/lang/String;)V"),
        ));
    }

    let mut size = artifact(Language::Kotlin, ArtifactKind::Property, &["Bar"], "size", Some("I"));
    size.modifiers.is_mutable = true;
    artifacts.extend([
        artifact(Language::Kotlin, ArtifactKind::Class, &[], "Bar", None),
        artifact(Language::Kotlin, ArtifactKind::PrimaryConstructor, &["Bar"], "Bar", Some("()V")),
        artifact(Language::Kotlin, ArtifactKind::Companion, &["Bar"], "Companion", None),
        artifact(
            Language::Kotlin,
            ArtifactKind::Method,
            &["Bar", "Companion"],
            "make",
            Some("()Llib/Bar;"),
        ),
        size,
    ]);
    artifacts
}

fn token(name: &str, start: u32, access: Access) -> OccurrenceToken {
    let len = u32::try_from(name.len()).expect("short name");
    OccurrenceToken::reference(
        name,
        TextRange {
            start,
            end: start + len,
        },
        access,
    )
}

/// `files` source files alternating Kotlin and Java, each using `Foo0` and
/// `Bar` in `uses` rounds of six tokens.
pub fn generate_corpus(files: usize, uses: usize) -> Vec<SourceFile> {
    (0..files)
        .map(|i| {
            let language = if i % 2 == 0 {
                Language::Kotlin
            } else {
                Language::Java
            };
            let mut tokens = Vec::with_capacity(uses * 6);
            for round in 0..uses {
                let base = u32::try_from(round * 100).expect("offset fits");

                let mut ctor = token("Foo0", base, Access::Call);
                ctor.shape = TokenShape::ConstructorCall;
                ctor.signature = Some(if round % 2 == 0 { "(I)V" } else { "(II)V" }.to_string());
                tokens.push(ctor);

                tokens.push(token("Foo0", base + 10, Access::TypeReference));

                let mut field = token("value", base + 20, Access::Read);
                field.receiver = Some("lib.Foo0".to_string());
                tokens.push(field);

                let accessor = match language {
                    Language::Kotlin => "label",
                    Language::Java => "getLabel",
                };
                let access = match language {
                    Language::Kotlin => Access::Read,
                    Language::Java => Access::Call,
                };
                let mut label = token(accessor, base + 30, access);
                label.receiver = Some("lib.Foo0".to_string());
                tokens.push(label);

                let mut make = token("make", base + 50, Access::Call);
                make.qualifier = vec!["Bar".to_string()];
                tokens.push(make);

                tokens.push(token("Unrelated", base + 70, Access::Read));
            }

            let extension = match language {
                Language::Kotlin => "kt",
                Language::Java => "java",
            };
            SourceFile {
                path: PathBuf::from(format!("src/Use{i}.{extension}")),
                language,
                package: "app".to_string(),
                imports: vec![
                    Import {
                        path: "lib.Foo0".to_string(),
                        alias: None,
                        star: false,
                    },
                    Import {
                        path: "lib.Bar".to_string(),
                        alias: None,
                        star: false,
                    },
                ],
                declarations: Vec::new(),
                tokens,
                facade_name: None,
            }
        })
        .collect()
}

/// An engine with `library` already built.
pub fn create_engine(library: &[LibraryArtifact]) -> Janus {
    let janus = Janus::new(Config::default()).expect("failed to create engine");
    janus.build(&[], library).expect("build failed");
    janus
}
