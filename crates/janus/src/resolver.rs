//! Name resolution for use-site tokens.
//!
//! Maps an [`OccurrenceToken`] to the canonical declaration(s) it names,
//! looking names up the way the referencing language does:
//!
//! 1. enclosing classifiers, innermost first (members, Kotlin companion
//!    members, then inherited members)
//! 2. explicit imports, including `as` aliases
//! 3. the file's own package
//! 4. star imports
//! 5. default imports from [`Config`]
//!
//! The first tier with a compatible candidate wins. Qualified names resolve
//! their qualifier to containers first (a declaration, or the longest known
//! package prefix), then look the name up inside them. The resolver never does
//! overload resolution: a signature chosen by the front-end narrows overloads,
//! and anything still plural is returned as [`Resolution::Ambiguous`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use crate::config::Config;
use crate::error::UnresolvedReason;
use crate::frontend::{OccurrenceToken, SourceFile, TokenShape};
use crate::index::{Container, DeclarationIndex, ScopeEntry, Via};
use crate::model::Declaration;
use crate::types::{Access, DeclId, DeclKind, Language, SyntheticKind};

/// A declaration reached by a token, and how the spelling reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Target {
    /// Canonical declaration
    pub decl: DeclId,
    /// Native name or alias
    pub via: Via,
}

impl Target {
    /// A target reached under its own name.
    #[must_use]
    pub fn native(decl: DeclId) -> Self {
        Self {
            decl,
            via: Via::Native,
        }
    }
}

impl From<ScopeEntry> for Target {
    fn from(entry: ScopeEntry) -> Self {
        Self {
            decl: entry.decl,
            via: entry.via,
        }
    }
}

/// Outcome of resolving one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "resolution", content = "targets")]
pub enum Resolution {
    /// Exactly one declaration
    Unique(Target),
    /// Several equally valid declarations, sorted by id
    Ambiguous(Vec<Target>),
    /// Nothing matched
    Unresolved(UnresolvedReason),
}

impl Resolution {
    /// Targets of a unique or ambiguous resolution.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        match self {
            Self::Unique(target) => std::slice::from_ref(target),
            Self::Ambiguous(targets) => targets,
            Self::Unresolved(_) => &[],
        }
    }

    /// The single target of a unique resolution.
    #[must_use]
    pub fn unique(&self) -> Option<Target> {
        match self {
            Self::Unique(target) => Some(*target),
            _ => None,
        }
    }

    /// Declaration ids, sorted and deduplicated.
    #[must_use]
    pub fn decls(&self) -> Vec<DeclId> {
        let mut ids: Vec<DeclId> = self.targets().iter().map(|t| t.decl).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn from_targets(mut targets: Vec<Target>) -> Self {
        targets.sort_unstable();
        targets.dedup_by_key(|t| t.decl);
        match targets.len() {
            0 => Self::Unresolved(UnresolvedReason::UnknownSymbol),
            1 => Self::Unique(targets[0]),
            _ => Self::Ambiguous(targets),
        }
    }
}

/// Names visible in one file before any enclosing scope is considered.
#[derive(Debug, Clone)]
pub struct FileScope {
    language: Language,
    package: Arc<str>,
    explicit: HashMap<String, Vec<Target>>,
    stars: Vec<Container>,
    defaults: Vec<Container>,
}

impl FileScope {
    /// Referencing language.
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// The file's package.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }
}

/// What a lookup is looking for.
#[derive(Debug, Clone, Copy)]
enum Want {
    /// A name used with this access
    Access(Access),
    /// Something that can qualify a further name
    Container,
    /// A class to construct
    Classifier,
    /// An enum case label
    EnumEntry,
}

/// Candidates of one lookup tier.
#[derive(Debug, Default)]
struct Lookup {
    found: Vec<Target>,
    /// Some binding existed but none was compatible
    seen: bool,
}

impl Lookup {
    fn absorb(&mut self, other: Lookup) {
        self.found.extend(other.found);
        self.seen |= other.seen;
    }
}

/// Resolves tokens against one index generation.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a DeclarationIndex,
}

impl<'a> Resolver<'a> {
    /// Create a resolver reading `index`.
    #[must_use]
    pub fn new(index: &'a DeclarationIndex) -> Self {
        Self { index }
    }

    /// Resolve a file's imports and default imports once.
    #[must_use]
    pub fn file_scope(&self, file: &SourceFile, config: &Config) -> FileScope {
        let view = file.language;
        let mut explicit: HashMap<String, Vec<Target>> = HashMap::new();
        let mut stars = Vec::new();

        for import in &file.imports {
            let segments: Vec<&str> = import.segments().collect();
            if import.star {
                stars.extend(self.absolute_containers(view, &segments));
                continue;
            }
            let (Some(bound), Some((name, prefix))) = (import.bound_name(), segments.split_last())
            else {
                continue;
            };
            let mut targets = Vec::new();
            for container in self.absolute_containers(view, prefix) {
                targets.extend(
                    self.index
                        .members(view, &container, name)
                        .iter()
                        .copied()
                        .map(Target::from),
                );
            }
            if targets.is_empty() {
                trace!(file = %file.path.display(), import = %import.path, "Import not indexed");
            }
            explicit.entry(bound.to_string()).or_default().extend(targets);
        }

        let defaults = config
            .default_imports
            .for_language(view)
            .iter()
            .flat_map(|import| {
                let path = import.strip_suffix(".*").unwrap_or(import);
                let segments: Vec<&str> = path.split('.').collect();
                self.absolute_containers(view, &segments)
            })
            .collect();

        FileScope {
            language: view,
            package: Arc::from(file.package.as_str()),
            explicit,
            stars,
            defaults,
        }
    }

    /// Resolve one token.
    #[must_use]
    pub fn resolve(&self, token: &OccurrenceToken, scope: &FileScope) -> Resolution {
        let resolution = match &token.shape {
            TokenShape::Reference => self.resolve_reference(token, scope),
            TokenShape::ConstructorCall => self.resolve_constructor(token, scope),
            TokenShape::EnumCase { subject } => self.resolve_enum_case(token, subject, scope),
        };
        trace!(
            name = %token.name,
            start = token.range.start,
            ?resolution,
            "Resolved token"
        );
        resolution
    }

    fn resolve_reference(&self, token: &OccurrenceToken, scope: &FileScope) -> Resolution {
        let want = Want::Access(token.access);
        let signature = token.signature.as_deref();

        if let Some(receiver) = &token.receiver {
            let Some(class) = self.receiver_type(receiver, &token.scope, scope) else {
                return Resolution::Unresolved(UnresolvedReason::MissingOwner);
            };
            let lookup = self.member_lookup(scope.language, class, &token.name, want);
            return self.finish(lookup, signature);
        }

        if token.qualifier.is_empty() {
            return self.resolve_name(&token.name, &token.scope, scope, want, signature);
        }

        let containers = self.resolve_qualifier(&token.qualifier, &token.scope, scope);
        if containers.is_empty() {
            return Resolution::Unresolved(UnresolvedReason::MissingOwner);
        }
        let lookup = self.lookup_in(scope.language, &containers, &token.name, want);
        self.finish(lookup, signature)
    }

    fn resolve_constructor(&self, token: &OccurrenceToken, scope: &FileScope) -> Resolution {
        let class = if token.qualifier.is_empty() {
            self.resolve_name(&token.name, &token.scope, scope, Want::Classifier, None)
        } else {
            let containers = self.resolve_qualifier(&token.qualifier, &token.scope, scope);
            if containers.is_empty() {
                return Resolution::Unresolved(UnresolvedReason::MissingOwner);
            }
            let lookup = self.lookup_in(scope.language, &containers, &token.name, Want::Classifier);
            self.finish(lookup, None)
        };

        let class = match class {
            Resolution::Unique(target) => target.decl,
            other => return other,
        };
        let Some(decl) = self.index.get(class) else {
            return Resolution::Unresolved(UnresolvedReason::UnknownSymbol);
        };
        if decl.kind.is_singleton() || decl.flags.is_enum {
            return Resolution::Unresolved(UnresolvedReason::UnsupportedConstruct);
        }

        let constructors = self.index.constructors_of(class);
        match (constructors, token.signature.as_deref()) {
            ([], _) => Resolution::Unique(Target::native(class)),
            (constructors, Some(signature)) => constructors
                .iter()
                .copied()
                .find(|&c| {
                    self.index
                        .get(c)
                        .and_then(|d| d.key.signature())
                        .is_some_and(|s| s == signature)
                })
                .map_or(
                    Resolution::Unresolved(UnresolvedReason::UnknownSymbol),
                    |c| Resolution::Unique(Target::native(c)),
                ),
            ([only], None) => Resolution::Unique(Target::native(*only)),
            (constructors, None) => {
                Resolution::Ambiguous(constructors.iter().copied().map(Target::native).collect())
            }
        }
    }

    fn resolve_enum_case(
        &self,
        token: &OccurrenceToken,
        subject: &[String],
        scope: &FileScope,
    ) -> Resolution {
        if subject.is_empty() {
            return self.resolve_name(&token.name, &token.scope, scope, Want::EnumEntry, None);
        }

        let enum_class = self.index.resolve_type_segments(subject).or_else(|| {
            self.resolve_qualifier(subject, &token.scope, scope)
                .into_iter()
                .find_map(|c| match c {
                    Container::Decl(id) => Some(id),
                    Container::Package(_) => None,
                })
        });
        let is_enum = |id: &DeclId| self.index.get(*id).is_some_and(|d| d.flags.is_enum);
        let Some(enum_class) = enum_class.filter(is_enum) else {
            return Resolution::Unresolved(UnresolvedReason::MissingOwner);
        };

        let lookup = self.entries(
            self.index
                .members(scope.language, &Container::Decl(enum_class), &token.name),
            Want::EnumEntry,
        );
        self.finish(lookup, None)
    }

    /// Simple-name lookup through every tier.
    fn resolve_name(
        &self,
        name: &str,
        enclosing: &[String],
        scope: &FileScope,
        want: Want,
        signature: Option<&str>,
    ) -> Resolution {
        let view = scope.language;
        let mut seen = false;

        for depth in (1..=enclosing.len()).rev() {
            if let Some(class) = self.index.classifier(&scope.package, &enclosing[..depth]) {
                let lookup = self.member_lookup(view, class, name, want);
                if !lookup.found.is_empty() {
                    return self.narrow(lookup.found, signature);
                }
                seen |= lookup.seen;
            }
        }

        if let Some(imported) = scope.explicit.get(name) {
            let lookup = self.accept(imported.iter().copied(), want);
            if !lookup.found.is_empty() {
                return self.narrow(lookup.found, signature);
            }
            seen |= lookup.seen;
        }

        let own_package = Container::Package(Arc::clone(&scope.package));
        let lookup = self.entries(self.index.members(view, &own_package, name), want);
        if !lookup.found.is_empty() {
            return self.narrow(lookup.found, signature);
        }
        seen |= lookup.seen;

        for tier in [&scope.stars, &scope.defaults] {
            let lookup = self.lookup_in(view, tier, name, want);
            if !lookup.found.is_empty() {
                return self.narrow(lookup.found, signature);
            }
            seen |= lookup.seen;
        }

        Resolution::Unresolved(if seen {
            UnresolvedReason::UnsupportedConstruct
        } else {
            UnresolvedReason::UnknownSymbol
        })
    }

    /// Containers named by a qualifier, scope-relative first, then absolute.
    fn resolve_qualifier(
        &self,
        qualifier: &[String],
        enclosing: &[String],
        scope: &FileScope,
    ) -> Vec<Container> {
        let Some((head, rest)) = qualifier.split_first() else {
            return Vec::new();
        };
        let view = scope.language;

        let heads: Vec<Container> = self
            .resolve_name(head, enclosing, scope, Want::Container, None)
            .decls()
            .into_iter()
            .map(Container::Decl)
            .collect();
        if !heads.is_empty() {
            let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
            let containers = self.walk(view, heads, &rest);
            if !containers.is_empty() {
                return containers;
            }
        }

        let segments: Vec<&str> = qualifier.iter().map(String::as_str).collect();
        self.absolute_containers(view, &segments)
    }

    /// Containers named by a fully qualified path, longest package first.
    fn absolute_containers(&self, view: Language, segments: &[&str]) -> Vec<Container> {
        for split in (0..=segments.len()).rev() {
            let package = segments[..split].join(".");
            if !self.index.has_package(&package) {
                continue;
            }
            let containers = self.walk(
                view,
                vec![Container::Package(Arc::from(package))],
                &segments[split..],
            );
            if !containers.is_empty() {
                return containers;
            }
        }
        Vec::new()
    }

    /// Follow `segments` from `start` through classifiers and subpackages.
    fn walk(&self, view: Language, start: Vec<Container>, segments: &[&str]) -> Vec<Container> {
        let mut current = start;
        for segment in segments {
            let mut next = Vec::new();
            for container in &current {
                if let Container::Package(package) = container {
                    let sub = if package.is_empty() {
                        (*segment).to_string()
                    } else {
                        format!("{package}.{segment}")
                    };
                    if self.index.has_package(&sub) {
                        next.push(Container::Package(Arc::from(sub)));
                    }
                }
                let lookup = self.lookup_in(view, std::slice::from_ref(container), segment, Want::Container);
                next.extend(lookup.found.into_iter().map(|t| Container::Decl(t.decl)));
            }
            next.sort();
            next.dedup();
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    fn receiver_type(&self, receiver: &str, enclosing: &[String], scope: &FileScope) -> Option<DeclId> {
        let segments: Vec<String> = receiver.split('.').map(str::to_string).collect();
        self.index.resolve_type_segments(&segments).or_else(|| {
            self.resolve_qualifier(&segments, enclosing, scope)
                .into_iter()
                .find_map(|c| match c {
                    Container::Decl(id) => Some(id),
                    Container::Package(_) => None,
                })
        })
    }

    /// Look `name` up in each container.
    fn lookup_in(&self, view: Language, containers: &[Container], name: &str, want: Want) -> Lookup {
        let mut lookup = Lookup::default();
        for container in containers {
            match container {
                Container::Package(_) => {
                    lookup.absorb(self.entries(self.index.members(view, container, name), want));
                }
                Container::Decl(class) => {
                    lookup.absorb(self.member_lookup(view, *class, name, want));
                }
            }
        }
        lookup
    }

    /// Members of a classifier, then its companion (Kotlin), then supertypes.
    ///
    /// Supertypes are searched level by level; the nearest level with a
    /// compatible binding wins.
    fn member_lookup(&self, view: Language, class: DeclId, name: &str, want: Want) -> Lookup {
        let mut result = Lookup::default();
        let mut visited = HashSet::new();
        let mut level = vec![class];

        while !level.is_empty() {
            let mut found = Lookup::default();
            let mut next = Vec::new();
            for owner in level {
                if !visited.insert(owner) {
                    continue;
                }
                found.absorb(self.entries(self.index.members(view, &Container::Decl(owner), name), want));
                if view == Language::Kotlin
                    && let Some(companion) = self.index.companion_of(owner)
                    && visited.insert(companion)
                {
                    found.absorb(self.entries(
                        self.index.members(view, &Container::Decl(companion), name),
                        want,
                    ));
                }
                if let Some(decl) = self.index.get(owner) {
                    next.extend(decl.supertypes.iter().copied());
                }
            }
            result.seen |= found.seen;
            if !found.found.is_empty() {
                result.found = found.found;
                return result;
            }
            level = next;
        }
        result
    }

    fn entries(&self, entries: &[ScopeEntry], want: Want) -> Lookup {
        self.accept(entries.iter().copied().map(Target::from), want)
    }

    fn accept(&self, targets: impl Iterator<Item = Target>, want: Want) -> Lookup {
        let mut lookup = Lookup::default();
        for target in targets {
            let Some(decl) = self.index.get(target.decl) else {
                continue;
            };
            if accepts(want, decl, target.via) {
                lookup.found.push(target);
            } else {
                lookup.seen = true;
            }
        }
        lookup
    }

    fn finish(&self, lookup: Lookup, signature: Option<&str>) -> Resolution {
        if lookup.found.is_empty() {
            Resolution::Unresolved(if lookup.seen {
                UnresolvedReason::UnsupportedConstruct
            } else {
                UnresolvedReason::UnknownSymbol
            })
        } else {
            self.narrow(lookup.found, signature)
        }
    }

    /// Narrow overloads by the front-end's chosen signature, if any matches.
    fn narrow(&self, mut targets: Vec<Target>, signature: Option<&str>) -> Resolution {
        targets.sort_unstable();
        targets.dedup_by_key(|t| t.decl);
        if let Some(signature) = signature
            && targets.len() > 1
        {
            let matching: Vec<Target> = targets
                .iter()
                .copied()
                .filter(|t| {
                    self.index
                        .get(t.decl)
                        .and_then(|d| d.key.signature())
                        .is_some_and(|s| s == signature)
                })
                .collect();
            if !matching.is_empty() {
                targets = matching;
            }
        }
        Resolution::from_targets(targets)
    }
}

fn accepts(want: Want, decl: &Declaration, via: Via) -> bool {
    match want {
        Want::Access(access) => access_compatible(access, decl, via),
        Want::Container => decl.kind.is_classifier(),
        Want::Classifier => {
            decl.kind.is_classifier()
                && matches!(via, Via::Native | Via::Alias(SyntheticKind::TypeAlias))
        }
        Want::EnumEntry => decl.kind == DeclKind::EnumEntry,
    }
}

/// Whether a binding can be used with `access`.
///
/// Accessor aliases are calls in the language that sees them and reads or
/// writes of the property they stand for.
fn access_compatible(access: Access, decl: &Declaration, via: Via) -> bool {
    use SyntheticKind as S;

    let writable = !decl.flags.is_const;
    match (via, access) {
        (_, Access::Import) => true,

        (Via::Native, Access::Read) => matches!(
            decl.kind,
            DeclKind::Field
                | DeclKind::Property
                | DeclKind::EnumEntry
                | DeclKind::Object
                | DeclKind::CompanionSingleton
                | DeclKind::Class
                | DeclKind::NestedClass
        ),
        (Via::Native, Access::Write) => {
            matches!(decl.kind, DeclKind::Field | DeclKind::Property) && writable
        }
        (Via::Native, Access::Call) => {
            matches!(decl.kind, DeclKind::Method | DeclKind::TopLevelFunction)
        }
        (Via::Native, Access::TypeReference) => decl.kind.is_classifier(),
        (Via::Native, Access::Override) => {
            matches!(decl.kind, DeclKind::Method | DeclKind::Property)
        }

        (Via::Alias(tag), Access::Read) => matches!(
            tag,
            S::ObjectInstanceAccessor
                | S::CompanionAsStaticAccessor
                | S::PropertyField
                | S::JavaPropertyGetter
                | S::TypeAlias
        ),
        (Via::Alias(tag), Access::Write) => {
            matches!(tag, S::PropertyField | S::JavaPropertySetter) && writable
        }
        (Via::Alias(tag), Access::Call) => matches!(
            tag,
            S::PropertyGetter | S::PropertySetter | S::TopLevelHolderMember | S::JvmStaticMember
        ),
        (Via::Alias(tag), Access::TypeReference) => tag == S::TypeAlias,
        (Via::Alias(tag), Access::Override) => matches!(
            tag,
            S::PropertyGetter | S::PropertySetter | S::JavaPropertyGetter | S::JavaPropertySetter
        ),
    }
}
