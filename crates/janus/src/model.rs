//! Declaration model: canonical identities and the declarations they name.
//!
//! A [`DeclKey`] is structural (`package + owner chain + name + namespace +
//! signature`), never a display string, so two feeds describing the same JVM
//! construct land on one key. Every surface form that reaches a declaration
//! without sharing its key is recorded in the declaration's [`Alias`] set.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::types::{DeclId, DeclKind, Language, Namespace, Origin, SyntheticKind, TextRange};

/// Path segment used for constructors, as on the JVM.
pub const CONSTRUCTOR_NAME: &str = "<init>";

// ============================================================================
// Identity
// ============================================================================

/// Canonical identity of a declaration.
///
/// The textual form is `<namespace>:<package>/<Outer.Inner.name>[#<signature>]`,
/// for example `constructor:lib/Foo.<init>#(I)V`. The derived ordering is the
/// canonical iteration order of the index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclKey {
    package: Arc<str>,
    path: Vec<Arc<str>>,
    namespace: Namespace,
    signature: Option<Arc<str>>,
}

impl DeclKey {
    /// Create a key. `path` is the owner chain followed by the own name.
    #[must_use]
    pub fn new<S: AsRef<str>>(
        namespace: Namespace,
        package: &str,
        path: &[S],
        signature: Option<&str>,
    ) -> Self {
        Self {
            package: Arc::from(package),
            path: path.iter().map(|s| Arc::from(s.as_ref())).collect(),
            namespace,
            signature: signature.map(Arc::from),
        }
    }

    /// Key of a classifier.
    #[must_use]
    pub fn classifier<S: AsRef<str>>(package: &str, path: &[S]) -> Self {
        Self::new(Namespace::Type, package, path, None)
    }

    /// Dotted package name; empty for the default package.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Owner chain followed by the own name.
    #[must_use]
    pub fn path(&self) -> &[Arc<str>] {
        &self.path
    }

    /// Last path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.last().map_or("", |s| s)
    }

    /// Identity namespace.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Overload discriminator, usually a JVM descriptor.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Owner chain without the own name; empty for package members.
    #[must_use]
    pub fn container_path(&self) -> &[Arc<str>] {
        self.path.split_last().map_or(&[], |(_, rest)| rest)
    }

    /// Key of the classifier owning this declaration, if it has one.
    #[must_use]
    pub fn owner_key(&self) -> Option<DeclKey> {
        let container = self.container_path();
        (!container.is_empty()).then(|| DeclKey {
            package: Arc::clone(&self.package),
            path: container.to_vec(),
            namespace: Namespace::Type,
            signature: None,
        })
    }

    /// Dotted owner chain and name, e.g. `Outer.Inner.name`.
    #[must_use]
    pub fn qualified_path(&self) -> String {
        join(&self.path, ".")
    }

    /// Fully qualified dotted name, e.g. `lib.Outer.Inner`.
    #[must_use]
    pub fn fq_name(&self) -> String {
        if self.package.is_empty() {
            self.qualified_path()
        } else {
            format!("{}.{}", self.package, self.qualified_path())
        }
    }
}

fn join(segments: &[Arc<str>], sep: &str) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(segment);
    }
    out
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}",
            self.namespace.as_str(),
            self.package,
            self.qualified_path()
        )?;
        if let Some(signature) = &self.signature {
            write!(f, "#{signature}")?;
        }
        Ok(())
    }
}

/// Failure to parse the textual [`DeclKey`] form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{input:?}: {reason}")]
pub struct KeyParseError {
    /// The rejected text
    pub input: String,
    /// What is missing or malformed
    pub reason: &'static str,
}

impl FromStr for DeclKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| KeyParseError {
            input: s.to_string(),
            reason,
        };

        let (namespace, rest) = s.split_once(':').ok_or_else(|| fail("missing namespace"))?;
        let namespace = Namespace::parse(namespace).ok_or_else(|| fail("unknown namespace"))?;
        let (package, rest) = rest.split_once('/').ok_or_else(|| fail("missing '/'"))?;
        let (path, signature) = match rest.split_once('#') {
            Some((path, signature)) => (path, Some(signature)),
            None => (rest, None),
        };
        if path.is_empty() {
            return Err(fail("empty name"));
        }
        let path: Vec<&str> = path.split('.').collect();
        if path.iter().any(|segment| segment.is_empty()) {
            return Err(fail("empty path segment"));
        }

        Ok(DeclKey::new(namespace, package, &path, signature))
    }
}

impl Serialize for DeclKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeclKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Modifier bits the scanner and validator need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclFlags {
    /// Java `static`, or the JVM-static side of a Kotlin construct
    #[serde(default)]
    pub is_static: bool,
    /// Enum class
    #[serde(default)]
    pub is_enum: bool,
    /// Interface
    #[serde(default)]
    pub is_interface: bool,
    /// Kotlin `const`
    #[serde(default)]
    pub is_const: bool,
}

impl DeclFlags {
    /// Union of two flag sets.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            is_static: self.is_static || other.is_static,
            is_enum: self.is_enum || other.is_enum,
            is_interface: self.is_interface || other.is_interface,
            is_const: self.is_const || other.is_const,
        }
    }
}

/// Languages that can spell a declaration under its native name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Views {
    /// Visible to Kotlin code
    pub kotlin: bool,
    /// Visible to Java code
    pub java: bool,
}

impl Views {
    /// Visible from both languages.
    pub const BOTH: Views = Views {
        kotlin: true,
        java: true,
    };

    /// Visible only from `language`.
    #[must_use]
    pub fn only(language: Language) -> Self {
        Self {
            kotlin: language == Language::Kotlin,
            java: language == Language::Java,
        }
    }

    /// Whether code in `language` sees the native name.
    #[must_use]
    pub fn visible_from(&self, language: Language) -> bool {
        match language {
            Language::Kotlin => self.kotlin,
            Language::Java => self.java,
        }
    }

    /// Union of two view sets.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            kotlin: self.kotlin || other.kotlin,
            java: self.java || other.java,
        }
    }
}

/// A second identity that reaches a declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Alias {
    /// Identity of the alias
    pub key: DeclKey,
    /// Construct that produced it
    pub synthetic: SyntheticKind,
    /// Language that spells the alias
    pub view: Language,
}

/// Where a source declaration sits in its file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File as reported by the front-end
    pub file: PathBuf,
    /// Whole declaration
    pub range: TextRange,
    /// The declared identifier
    pub name_range: TextRange,
}

/// A canonical declaration.
///
/// Equality and hashing are by [`DeclKey`].
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    /// Position in the owning index
    pub id: DeclId,
    /// Canonical identity
    pub key: DeclKey,
    /// Source-level name (the class name for constructors)
    pub name: Arc<str>,
    /// Normalized kind
    pub kind: DeclKind,
    /// Enclosing declaration in the same index
    pub owner: Option<DeclId>,
    /// Source or library
    pub origin: Origin,
    /// Language the declaration was written in
    pub language: Language,
    /// Interop construct that produced the declaration itself
    pub synthetic: Option<SyntheticKind>,
    /// Present only for source declarations
    pub source: Option<SourceLocation>,
    /// Present only for library declarations
    pub external_signature: Option<String>,
    /// Modifier bits
    pub flags: DeclFlags,
    /// Languages that see the native name
    pub views: Views,
    /// Alternate identities, sorted by key
    pub aliases: Vec<Alias>,
    /// Resolved supertypes
    pub supertypes: Vec<DeclId>,
}

impl Declaration {
    /// Whether `key` is this declaration's key or one of its aliases.
    #[must_use]
    pub fn answers_to(&self, key: &DeclKey) -> bool {
        &self.key == key || self.aliases.iter().any(|alias| &alias.key == key)
    }

    /// Every name a use site may spell: the native name plus alias names.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&*self.name).chain(self.aliases.iter().map(|alias| alias.key.name()))
    }
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Declaration {}

impl std::hash::Hash for Declaration {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
