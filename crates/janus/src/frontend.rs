//! Input produced by the language front-ends.
//!
//! Janus does not parse Kotlin or Java. Front-ends hand over, per source file,
//! the declarations it contains and every identifier token at a use site, and
//! for compiled dependencies one [`LibraryArtifact`] per member. All types here
//! are plain serde records so fixtures can be written as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{Access, Language, TextRange};

/// Declaration kinds as the front-ends report them, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Class
    Class,
    /// Interface
    Interface,
    /// Enum class
    Enum,
    /// Kotlin `object`
    Object,
    /// Kotlin `companion object`
    Companion,
    /// Kotlin primary constructor
    PrimaryConstructor,
    /// Kotlin secondary constructor
    SecondaryConstructor,
    /// Java constructor
    Constructor,
    /// Member function
    Method,
    /// Kotlin top-level function
    Function,
    /// Java field
    Field,
    /// Kotlin property
    Property,
    /// Enum constant
    EnumEntry,
    /// Kotlin `typealias`
    TypeAlias,
}

impl ArtifactKind {
    /// Stable kebab-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Object => "object",
            Self::Companion => "companion",
            Self::PrimaryConstructor => "primary-constructor",
            Self::SecondaryConstructor => "secondary-constructor",
            Self::Constructor => "constructor",
            Self::Method => "method",
            Self::Function => "function",
            Self::Field => "field",
            Self::Property => "property",
            Self::EnumEntry => "enum-entry",
            Self::TypeAlias => "type-alias",
        }
    }
}

/// Modifiers relevant to interop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Java `static`
    pub is_static: bool,
    /// Kotlin `@JvmStatic`
    pub jvm_static: bool,
    /// Kotlin `@JvmField`
    pub jvm_field: bool,
    /// Kotlin `const`
    pub is_const: bool,
    /// Kotlin `var` (the property has a setter)
    pub is_mutable: bool,
}

// ============================================================================
// Source files
// ============================================================================

/// One import directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Dotted path without the trailing `.*`
    pub path: String,
    /// Kotlin `import a.B as C`
    #[serde(default)]
    pub alias: Option<String>,
    /// `import a.b.*`
    #[serde(default)]
    pub star: bool,
}

impl Import {
    /// The simple name this import binds, if it binds one.
    #[must_use]
    pub fn bound_name(&self) -> Option<&str> {
        if self.star {
            return None;
        }
        self.alias
            .as_deref()
            .or_else(|| self.path.rsplit('.').next())
    }

    /// Path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.').filter(|s| !s.is_empty())
    }
}

/// A declaration written in an analyzed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDeclaration {
    /// Reported kind
    pub kind: ArtifactKind,
    /// Declared name (the class name for constructors)
    pub name: String,
    /// Enclosing classifiers inside the file's package, outermost first
    #[serde(default)]
    pub container: Vec<String>,
    /// JVM descriptor for callables, field descriptor for properties
    #[serde(default)]
    pub signature: Option<String>,
    /// Whole declaration
    pub range: TextRange,
    /// The declared identifier
    pub name_range: TextRange,
    /// Interop modifiers
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Fully qualified supertypes as written after resolution by the front-end
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Kotlin `@JvmName`
    #[serde(default)]
    pub jvm_name: Option<String>,
    /// Fully qualified target of a `typealias`
    #[serde(default)]
    pub alias_target: Option<String>,
}

/// Syntactic form of a use-site token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "form")]
pub enum TokenShape {
    /// Plain or qualified name
    #[default]
    Reference,
    /// `Foo(...)` in Kotlin, `new Foo(...)` in Java
    ConstructorCall,
    /// Enum case label; `subject` is the switched-on enum type
    EnumCase {
        /// Dotted enum type as written or inferred; empty when unknown
        #[serde(default)]
        subject: Vec<String>,
    },
}

/// An identifier at a use site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceToken {
    /// The identifier's range
    pub range: TextRange,
    /// The identifier
    pub name: String,
    /// Static qualifier written before the name (`lib.Foo` in `lib.Foo.bar`)
    #[serde(default)]
    pub qualifier: Vec<String>,
    /// Fully qualified type of an instance receiver expression
    #[serde(default)]
    pub receiver: Option<String>,
    /// Syntactic form
    #[serde(default)]
    pub shape: TokenShape,
    /// Access context
    pub access: Access,
    /// Overload the front-end chose, as a JVM descriptor
    #[serde(default)]
    pub signature: Option<String>,
    /// Enclosing classifiers inside the file's package, outermost first
    #[serde(default)]
    pub scope: Vec<String>,
}

impl OccurrenceToken {
    /// A plain unqualified reference.
    #[must_use]
    pub fn reference(name: &str, range: TextRange, access: Access) -> Self {
        Self {
            range,
            name: name.to_string(),
            qualifier: Vec::new(),
            receiver: None,
            shape: TokenShape::Reference,
            access,
            signature: None,
            scope: Vec::new(),
        }
    }
}

/// Everything a front-end reports for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path as the project names it
    pub path: PathBuf,
    /// Source language
    pub language: Language,
    /// Dotted package; empty for the default package
    #[serde(default)]
    pub package: String,
    /// Import directives in file order
    #[serde(default)]
    pub imports: Vec<Import>,
    /// Declarations in file order
    #[serde(default)]
    pub declarations: Vec<SourceDeclaration>,
    /// Use-site tokens in file order
    #[serde(default)]
    pub tokens: Vec<OccurrenceToken>,
    /// Kotlin `@file:JvmName`
    #[serde(default)]
    pub facade_name: Option<String>,
}

impl SourceFile {
    /// Name of the JVM class holding this file's top-level declarations.
    ///
    /// `@file:JvmName` wins; otherwise the capitalized file stem plus `Kt`
    /// (`utils.kt` becomes `UtilsKt`).
    #[must_use]
    pub fn holder_class_name(&self) -> String {
        if let Some(name) = &self.facade_name {
            return name.clone();
        }
        holder_name_for(&self.path)
    }
}

/// Holder class name derived from a Kotlin file path.
#[must_use]
pub fn holder_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut chars = stem.chars();
    let mut name: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    name = name.replace(['-', '.', ' '], "_");
    name.push_str("Kt");
    name
}

// ============================================================================
// Libraries
// ============================================================================

/// One member of a compiled dependency.
///
/// Kotlin artifacts come from Kotlin metadata and keep Kotlin-level kinds;
/// Java artifacts come from plain class files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryArtifact {
    /// Language whose metadata described the artifact
    pub language: Language,
    /// Reported kind
    pub kind: ArtifactKind,
    /// Dotted package
    #[serde(default)]
    pub package: String,
    /// Enclosing classifiers, outermost first
    #[serde(default)]
    pub container: Vec<String>,
    /// Declared name (the class name for constructors)
    pub name: String,
    /// JVM descriptor for callables, field descriptor for fields and properties
    #[serde(default)]
    pub descriptor: Option<String>,
    /// Interop modifiers
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Fully qualified supertypes
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Kotlin `@JvmName`
    #[serde(default)]
    pub jvm_name: Option<String>,
    /// Holder class of a Kotlin top-level declaration
    #[serde(default)]
    pub facade: Option<String>,
    /// Fully qualified target of a `typealias`
    #[serde(default)]
    pub alias_target: Option<String>,
}
