//! Domain enums and small value types shared by every layer.
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Language | Enum not String | Only two JVM languages take part in interop |
//! | Offsets | `u32` byte offsets | Front-ends report byte ranges; lines are a display concern |
//! | Static usages | Separate categories | Static field/method usages are reported apart from instance ones |

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Strongly-typed ID wrappers
// ============================================================================

/// Index of a declaration inside one index generation.
///
/// Ids are assigned in canonical key order, so the same input always yields
/// the same ids. They are only meaningful together with the generation that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclId(pub u32);

impl DeclId {
    /// Position of the declaration in the index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for DeclId {
    fn from(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// The two interoperating JVM languages.
///
/// Kotlin is the primary, source-compiled language; Java is the legacy interop
/// language whose declarations frequently exist only as class files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Kotlin sources (`.kt`, `.kts`) and Kotlin-compiled metadata
    Kotlin,
    /// Java sources (`.java`) and plain class files
    Java,
}

impl Language {
    /// Both languages, in canonical order.
    pub const ALL: [Language; 2] = [Language::Kotlin, Language::Java];

    /// File extensions handled by this language.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Kotlin => &["kt", "kts"],
            Self::Java => &["java"],
        }
    }

    /// Detect language from file extension.
    ///
    /// # Returns
    ///
    /// `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "kt" | "kts" => Some(Self::Kotlin),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kotlin => "kotlin",
            Self::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a declaration's defining artifact is available as source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Declared in an analyzed source file
    Source,
    /// Known only from compiled metadata
    Library,
}

impl Origin {
    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Library => "library",
        }
    }
}

/// Canonical declaration kinds, normalized across both languages.
///
/// Java constructors are modeled as secondary constructors: Java has no
/// notion of a primary constructor. Interfaces and enum classes are classes
/// carrying the matching [`DeclFlags`](crate::model::DeclFlags).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeclKind {
    /// Top-level class, interface or enum class
    Class,
    /// Kotlin `object` singleton
    Object,
    /// Kotlin `companion object`
    CompanionSingleton,
    /// Kotlin primary constructor
    PrimaryConstructor,
    /// Kotlin secondary constructor or any Java constructor
    SecondaryConstructor,
    /// Member function
    Method,
    /// Kotlin top-level function
    TopLevelFunction,
    /// Java field
    Field,
    /// Kotlin property (member or top-level)
    Property,
    /// Enum constant
    EnumEntry,
    /// Class nested in another classifier
    NestedClass,
}

impl DeclKind {
    /// Stable kebab-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Object => "object",
            Self::CompanionSingleton => "companion",
            Self::PrimaryConstructor => "primary-constructor",
            Self::SecondaryConstructor => "secondary-constructor",
            Self::Method => "method",
            Self::TopLevelFunction => "function",
            Self::Field => "field",
            Self::Property => "property",
            Self::EnumEntry => "enum-entry",
            Self::NestedClass => "nested-class",
        }
    }

    /// Kinds that own members and can appear as a qualifier.
    #[must_use]
    pub fn is_classifier(&self) -> bool {
        matches!(
            self,
            Self::Class | Self::NestedClass | Self::Object | Self::CompanionSingleton
        )
    }

    /// Singletons: classifiers that are also values and cannot be constructed.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        matches!(self, Self::Object | Self::CompanionSingleton)
    }

    /// Either constructor kind.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        matches!(self, Self::PrimaryConstructor | Self::SecondaryConstructor)
    }

    /// The identity namespace this kind lives in.
    ///
    /// Namespaces follow the JVM's view of a declaration, so a Kotlin `object`
    /// and the class file that implements it share one identity.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        match self {
            Self::Class | Self::NestedClass | Self::Object | Self::CompanionSingleton => {
                Namespace::Type
            }
            Self::PrimaryConstructor | Self::SecondaryConstructor => Namespace::Constructor,
            Self::Method => Namespace::Method,
            Self::TopLevelFunction => Namespace::Function,
            Self::Field | Self::EnumEntry => Namespace::Field,
            Self::Property => Namespace::Property,
        }
    }

    /// How much a kind refines the plain JVM view.
    ///
    /// When two feeds describe the same identity, the more specific kind wins:
    /// Kotlin metadata knows a class is an `object`, the class file does not.
    #[must_use]
    pub fn specificity(&self) -> u8 {
        match self {
            Self::Object | Self::CompanionSingleton | Self::EnumEntry | Self::PrimaryConstructor => 3,
            Self::Property | Self::TopLevelFunction | Self::NestedClass => 2,
            Self::Class | Self::SecondaryConstructor | Self::Method | Self::Field => 1,
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity namespaces of [`DeclKey`](crate::model::DeclKey).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Classes, interfaces, objects, companions
    Type,
    /// Constructors (`<init>`)
    Constructor,
    /// Member functions
    Method,
    /// Fields and enum constants
    Field,
    /// Kotlin properties
    Property,
    /// Kotlin top-level functions
    Function,
}

impl Namespace {
    /// Stable lowercase name, used in the textual key form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Constructor => "constructor",
            Self::Method => "method",
            Self::Field => "field",
            Self::Property => "property",
            Self::Function => "function",
        }
    }

    /// Parse the textual namespace name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "type" => Some(Self::Type),
            "constructor" => Some(Self::Constructor),
            "method" => Some(Self::Method),
            "field" => Some(Self::Field),
            "property" => Some(Self::Property),
            "function" => Some(Self::Function),
            _ => None,
        }
    }
}

/// Which interop construct produced a synthetic declaration or alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntheticKind {
    /// `Foo.Companion` static field standing in for a companion object
    CompanionAsStaticAccessor,
    /// `Bar.INSTANCE` static field standing in for an object
    ObjectInstanceAccessor,
    /// `UtilsKt` class holding a file's top-level declarations
    TopLevelHolderClass,
    /// Static member of the holder class for a top-level declaration
    TopLevelHolderMember,
    /// Static copy of an `@JvmStatic` companion member on the outer class
    JvmStaticMember,
    /// `getX()` accessor of a Kotlin property
    PropertyGetter,
    /// `setX()` accessor of a Kotlin `var` property
    PropertySetter,
    /// Java field exposing a `const` or `@JvmField` Kotlin property
    PropertyField,
    /// Kotlin property syntax for a Java getter
    JavaPropertyGetter,
    /// Kotlin property syntax for a Java setter
    JavaPropertySetter,
    /// Kotlin `typealias` naming a classifier
    TypeAlias,
}

impl SyntheticKind {
    /// Stable kebab-case tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompanionAsStaticAccessor => "companion-as-static-accessor",
            Self::ObjectInstanceAccessor => "object-instance-accessor",
            Self::TopLevelHolderClass => "top-level-holder-class",
            Self::TopLevelHolderMember => "top-level-holder-member",
            Self::JvmStaticMember => "jvm-static-member",
            Self::PropertyGetter => "property-getter",
            Self::PropertySetter => "property-setter",
            Self::PropertyField => "property-field",
            Self::JavaPropertyGetter => "java-property-getter",
            Self::JavaPropertySetter => "java-property-setter",
            Self::TypeAlias => "type-alias",
        }
    }

    /// Accessors that read the aliased declaration.
    #[must_use]
    pub fn is_getter(&self) -> bool {
        matches!(self, Self::PropertyGetter | Self::JavaPropertyGetter)
    }

    /// Accessors that write the aliased declaration.
    #[must_use]
    pub fn is_setter(&self) -> bool {
        matches!(self, Self::PropertySetter | Self::JavaPropertySetter)
    }

    /// Aliases reached through a static member of some class.
    #[must_use]
    pub fn is_static_style(&self) -> bool {
        matches!(self, Self::TopLevelHolderMember | Self::JvmStaticMember)
    }
}

impl fmt::Display for SyntheticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a use-site token touches what it names, as reported by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    /// Value read
    Read,
    /// Assignment target
    Write,
    /// Invocation
    Call,
    /// Type position (annotation, cast, supertype list, class literal)
    TypeReference,
    /// Import directive
    Import,
    /// Overriding declaration naming the member it overrides
    Override,
}

impl Access {
    /// Stable kebab-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Call => "call",
            Self::TypeReference => "type-reference",
            Self::Import => "import",
            Self::Override => "override",
        }
    }
}

/// Classification of a reported usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UsageCategory {
    /// Value read
    Read,
    /// Assignment
    Write,
    /// Invocation, including constructor calls
    Call,
    /// Type position
    TypeReference,
    /// Import directive
    Import,
    /// Overriding declaration
    Override,
    /// Read of a static field
    StaticRead,
    /// Write of a static field
    StaticWrite,
    /// Invocation of a static method
    StaticCall,
}

impl UsageCategory {
    /// All categories, in report order.
    pub const ALL: [UsageCategory; 9] = [
        Self::Read,
        Self::Write,
        Self::Call,
        Self::TypeReference,
        Self::Import,
        Self::Override,
        Self::StaticRead,
        Self::StaticWrite,
        Self::StaticCall,
    ];

    /// Stable kebab-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Call => "call",
            Self::TypeReference => "type-reference",
            Self::Import => "import",
            Self::Override => "override",
            Self::StaticRead => "static-read",
            Self::StaticWrite => "static-write",
            Self::StaticCall => "static-call",
        }
    }

    /// Whether this is one of the static refinements.
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, Self::StaticRead | Self::StaticWrite | Self::StaticCall)
    }

    /// The static refinement of a read, write or call.
    ///
    /// Other categories have no static counterpart and are returned unchanged.
    #[must_use]
    pub fn to_static(self) -> Self {
        match self {
            Self::Read => Self::StaticRead,
            Self::Write => Self::StaticWrite,
            Self::Call => Self::StaticCall,
            other => other,
        }
    }
}

impl From<Access> for UsageCategory {
    fn from(access: Access) -> Self {
        match access {
            Access::Read => Self::Read,
            Access::Write => Self::Write,
            Access::Call => Self::Call,
            Access::TypeReference => Self::TypeReference,
            Access::Import => Self::Import,
            Access::Override => Self::Override,
        }
    }
}

impl fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Positions
// ============================================================================

/// Half-open byte range `[start, end)` inside one file.
///
/// Deserialization goes through [`TextRange::new`], so an inverted range is
/// a decode error rather than a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct TextRange {
    /// First byte of the range
    pub start: u32,
    /// One past the last byte of the range
    pub end: u32,
}

impl TextRange {
    /// Create a new range with validation.
    ///
    /// Returns `None` if `end` is before `start`.
    #[must_use]
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    /// Number of bytes covered; zero for a hand-built inverted range.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether `end` is before `start`.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// Whether the range covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside the range.
    ///
    /// The end offset is accepted as well, so a caret placed right after an
    /// identifier still hits it.
    #[must_use]
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset <= self.end
    }
}

#[derive(Deserialize)]
struct RawRange {
    start: u32,
    end: u32,
}

impl TryFrom<RawRange> for TextRange {
    type Error = String;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
            .ok_or_else(|| format!("range end {} is before start {}", raw.end, raw.start))
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
