//! Declaration index: merges bridge drafts into canonical declarations.
//!
//! ## Build phases
//!
//! 1. Bridge every source declaration and library artifact (parallel).
//! 2. Sort drafts canonically, then union drafts whose keys meet through an
//!    alias. Each group becomes one declaration keyed by the group's only
//!    non-alias key.
//! 3. Drop declarations whose owner is missing, shortest paths first so a
//!    dropped classifier takes its members with it.
//! 4. Assign ids in key order, attach type aliases and `@JvmStatic` copies,
//!    resolve supertypes (dropping cycles) and fill the member tables.
//!
//! The result is immutable. Rebuilding from the same input in any order yields
//! the same declarations, ids and [`fingerprint`](DeclarationIndex::fingerprint).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use petgraph::unionfind::UnionFind;
use serde::Serialize;
use tracing::{debug, trace, warn};
use xxhash_rust::xxh3::Xxh3;

use crate::bridge::{self, AliasLink, BridgeOutput, DeclDraft};
use crate::cancel::CancellationToken;
use crate::error::{BridgeError, BridgeErrorKind, Result};
use crate::frontend::{LibraryArtifact, SourceFile};
use crate::model::{Alias, DeclKey, Declaration, Views};
use crate::types::{DeclId, DeclKind, Language, Origin, SyntheticKind, TextRange};

// ============================================================================
// Public types
// ============================================================================

/// Where a name is looked up: directly in a package or inside a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Container {
    /// Top level of a package
    Package(Arc<str>),
    /// Members of a classifier
    Decl(DeclId),
}

/// How a member-table entry reaches its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case", tag = "via", content = "synthetic")]
pub enum Via {
    /// Under the declaration's own name
    Native,
    /// Through one of its aliases
    Alias(SyntheticKind),
}

impl Via {
    /// The alias tag, if the entry is an alias.
    #[must_use]
    pub fn synthetic(&self) -> Option<SyntheticKind> {
        match self {
            Self::Native => None,
            Self::Alias(kind) => Some(*kind),
        }
    }
}

/// One name binding in a member table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeEntry {
    /// Bound declaration
    pub decl: DeclId,
    /// Native name or alias
    pub via: Via,
}

/// Size of one index generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Canonical declarations
    pub declarations: usize,
    /// Alias keys across all declarations
    pub aliases: usize,
    /// Declarations with source
    pub source_declarations: usize,
    /// Declarations known only from libraries
    pub library_declarations: usize,
    /// Distinct packages, including parent packages
    pub packages: usize,
}

/// Outcome of a build: the index plus everything that was skipped.
#[derive(Debug, Clone)]
pub struct IndexResult {
    /// The immutable index
    pub index: Arc<DeclarationIndex>,
    /// Artifacts that were skipped or repaired
    pub warnings: Vec<BridgeError>,
}

type MemberTable = HashMap<Arc<str>, Vec<ScopeEntry>>;

/// Immutable set of canonical declarations with lookup tables.
#[derive(Debug, Default)]
pub struct DeclarationIndex {
    decls: Vec<Declaration>,
    by_key: HashMap<DeclKey, DeclId>,
    members: HashMap<(Language, Container), MemberTable>,
    constructors: HashMap<DeclId, Vec<DeclId>>,
    companions: HashMap<DeclId, DeclId>,
    children: HashMap<DeclId, Vec<DeclId>>,
    packages: BTreeSet<Arc<str>>,
    source_names: HashMap<PathBuf, Vec<(TextRange, DeclId)>>,
    fingerprint: u64,
}

// ============================================================================
// Builder
// ============================================================================

/// Builds [`DeclarationIndex`] generations.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    cancel: CancellationToken,
}

impl IndexBuilder {
    /// A builder that is never cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder observing `cancel` between files and artifacts.
    #[must_use]
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Build an index from source files and library artifacts.
    ///
    /// Malformed artifacts do not fail the build; they are skipped and
    /// reported in [`IndexResult::warnings`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Cancelled` if the cancellation token fires first.
    pub fn build(&self, files: &[SourceFile], libraries: &[LibraryArtifact]) -> Result<IndexResult> {
        debug!(
            files = files.len(),
            libraries = libraries.len(),
            "Building declaration index"
        );
        let output = bridge::derive_all(files, libraries, &self.cancel)?;
        self.cancel.check()?;
        let result = Merger::new(output).finish();
        debug!(
            declarations = result.index.decls.len(),
            warnings = result.warnings.len(),
            fingerprint = %format!("{:016x}", result.index.fingerprint),
            "Declaration index built"
        );
        Ok(result)
    }
}

// ============================================================================
// Merge
// ============================================================================

struct Merger {
    drafts: Vec<DeclDraft>,
    links: Vec<AliasLink>,
    warnings: Vec<BridgeError>,
}

impl Merger {
    fn new(output: BridgeOutput) -> Self {
        let BridgeOutput {
            mut drafts,
            links,
            errors,
        } = output;
        drafts.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self {
            drafts,
            links,
            warnings: errors,
        }
    }

    fn finish(mut self) -> IndexResult {
        let merged = self.group_drafts();
        let kept = self.drop_orphans(merged);
        let index = self.assemble(kept);
        self.warnings
            .sort_by_cached_key(|w| (w.artifact.clone(), w.kind.to_string()));
        for warning in &self.warnings {
            warn!(artifact = %warning.artifact, "Skipped artifact: {}", warning.kind);
        }
        IndexResult {
            index: Arc::new(index),
            warnings: self.warnings,
        }
    }

    /// Union drafts through shared keys and merge each group.
    fn group_drafts(&mut self) -> Vec<DeclDraft> {
        let mut slots: HashMap<&DeclKey, usize> = HashMap::new();
        for draft in &self.drafts {
            for key in std::iter::once(&draft.key).chain(draft.aliases.iter().map(|a| &a.key)) {
                let next = slots.len();
                slots.entry(key).or_insert(next);
            }
        }

        let mut sets = UnionFind::<usize>::new(slots.len());
        for draft in &self.drafts {
            let Some(&own) = slots.get(&draft.key) else {
                continue;
            };
            for alias in &draft.aliases {
                if let Some(&other) = slots.get(&alias.key) {
                    sets.union(own, other);
                }
            }
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, draft) in self.drafts.iter().enumerate() {
            if let Some(&slot) = slots.get(&draft.key) {
                groups.entry(sets.find(slot)).or_default().push(i);
            }
        }

        let alias_keys: HashSet<&DeclKey> = self
            .drafts
            .iter()
            .flat_map(|d| d.aliases.iter().map(|a| &a.key))
            .collect();

        let mut conflicts = Vec::new();
        let mut merged: Vec<DeclDraft> = groups
            .into_values()
            .filter_map(|members| {
                let group: Vec<&DeclDraft> = members.iter().map(|&i| &self.drafts[i]).collect();
                let mut native: Vec<&DeclKey> = group
                    .iter()
                    .map(|d| &d.key)
                    .filter(|k| !alias_keys.contains(k))
                    .collect();
                native.dedup();
                let canonical = native
                    .first()
                    .copied()
                    .or_else(|| group.iter().map(|d| &d.key).min())?
                    .clone();
                for other in native.iter().skip(1) {
                    if let Some(draft) = group.iter().find(|d| &d.key == *other) {
                        conflicts.push(BridgeError::new(
                            draft.artifact.clone(),
                            BridgeErrorKind::ConflictingIdentity {
                                other: canonical.to_string(),
                            },
                        ));
                    }
                }
                Some(merge_group(&group, &canonical))
            })
            .collect();

        self.warnings.extend(conflicts);
        merged.sort_by(|a, b| a.key.cmp(&b.key));
        merged
    }

    /// Keep declarations whose owner chain exists, checking enum membership.
    fn drop_orphans(&mut self, merged: Vec<DeclDraft>) -> Vec<DeclDraft> {
        let mut order: Vec<usize> = (0..merged.len()).collect();
        order.sort_by(|&a, &b| {
            merged[a]
                .key
                .path()
                .len()
                .cmp(&merged[b].key.path().len())
                .then_with(|| merged[a].key.cmp(&merged[b].key))
        });

        let mut kept_classifiers: HashMap<&DeclKey, usize> = HashMap::new();
        let mut keep = vec![false; merged.len()];
        for i in order {
            let draft = &merged[i];
            if let Some(owner_key) = draft.key.owner_key() {
                let Some(&owner) = kept_classifiers.get(&owner_key) else {
                    self.warnings.push(BridgeError::missing_owner(
                        draft.artifact.clone(),
                        owner_key.fq_name(),
                    ));
                    continue;
                };
                if draft.kind == DeclKind::EnumEntry && !merged[owner].flags.is_enum {
                    self.warnings.push(BridgeError::malformed(
                        draft.artifact.clone(),
                        format!("enum entry outside an enum ({})", owner_key.fq_name()),
                    ));
                    continue;
                }
                if draft.kind == DeclKind::CompanionSingleton && merged[owner].kind.is_singleton() {
                    self.warnings.push(BridgeError::malformed(
                        draft.artifact.clone(),
                        "companion inside an object",
                    ));
                    continue;
                }
            }
            keep[i] = true;
            if draft.kind.is_classifier() {
                kept_classifiers.insert(&draft.key, i);
            }
        }

        merged
            .into_iter()
            .zip(keep)
            .filter_map(|(draft, keep)| keep.then_some(draft))
            .collect()
    }

    fn assemble(&mut self, kept: Vec<DeclDraft>) -> DeclarationIndex {
        let mut index = DeclarationIndex::default();
        let mut artifacts = Vec::with_capacity(kept.len());
        let mut supertype_names = Vec::with_capacity(kept.len());
        let mut jvm_static = Vec::new();

        for (i, draft) in kept.into_iter().enumerate() {
            let id = DeclId::from(i);
            index.by_key.insert(draft.key.clone(), id);
            for alias in &draft.aliases {
                index.by_key.entry(alias.key.clone()).or_insert(id);
            }
            if draft.jvm_static {
                jvm_static.push(id);
            }
            artifacts.push(draft.artifact);
            supertype_names.push(draft.supertypes);
            index.decls.push(Declaration {
                id,
                key: draft.key,
                name: draft.name,
                kind: draft.kind,
                owner: None,
                origin: draft.origin,
                language: draft.language,
                synthetic: draft.synthetic,
                source: draft.source,
                external_signature: draft.external_signature,
                flags: draft.flags,
                views: draft.views,
                aliases: draft.aliases,
                supertypes: Vec::new(),
            });
        }

        for decl in &mut index.decls {
            decl.owner = decl
                .key
                .owner_key()
                .and_then(|owner| index.by_key.get(&owner).copied());
        }

        self.attach_type_aliases(&mut index);
        attach_jvm_static_copies(&mut index, &jvm_static);
        self.resolve_supertypes(&mut index, &supertype_names, &artifacts);
        index.fill_tables();
        index.fingerprint = index.compute_fingerprint();
        index
    }

    fn attach_type_aliases(&mut self, index: &mut DeclarationIndex) {
        let mut links = std::mem::take(&mut self.links);
        links.sort_by(|a, b| a.alias.cmp(&b.alias).then_with(|| a.target.cmp(&b.target)));

        for link in links {
            let Some(target) = index.resolve_type_segments(&link.target) else {
                self.warnings.push(BridgeError::new(
                    link.artifact,
                    BridgeErrorKind::MissingAliasTarget {
                        target: link.target.join("."),
                    },
                ));
                continue;
            };
            if let Some(&existing) = index.by_key.get(&link.alias) {
                if existing != target {
                    self.warnings.push(BridgeError::new(
                        link.artifact,
                        BridgeErrorKind::ConflictingIdentity {
                            other: link.alias.to_string(),
                        },
                    ));
                }
                continue;
            }
            trace!(alias = %link.alias, target = target.0, "Attached type alias");
            index.by_key.insert(link.alias.clone(), target);
            let decl = &mut index.decls[target.index()];
            decl.aliases.push(Alias {
                key: link.alias,
                synthetic: SyntheticKind::TypeAlias,
                view: Language::Kotlin,
            });
            decl.aliases.sort();
        }
    }

    fn resolve_supertypes(
        &mut self,
        index: &mut DeclarationIndex,
        names: &[Vec<String>],
        artifacts: &[String],
    ) {
        let mut graph = DiGraphMap::<u32, ()>::new();
        for (i, supertypes) in names.iter().enumerate() {
            let id = DeclId::from(i);
            if !index.decls[i].kind.is_classifier() {
                continue;
            }
            graph.add_node(id.0);
            for name in supertypes {
                let segments: Vec<&str> = name.split('.').collect();
                match index.resolve_type_segments(&segments) {
                    Some(parent) => {
                        graph.add_edge(id.0, parent.0, ());
                    }
                    None => trace!(decl = %index.decls[i].key, supertype = %name, "Supertype not indexed"),
                }
            }
        }

        for component in tarjan_scc(&graph) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| graph.contains_edge(n, n));
            if !cyclic {
                continue;
            }
            let mut members: Vec<u32> = component.clone();
            members.sort_unstable();
            for &from in &members {
                for &to in &members {
                    graph.remove_edge(from, to);
                }
            }
            let names: Vec<String> = members
                .iter()
                .map(|&n| index.decls[n as usize].key.fq_name())
                .collect();
            let artifact = members
                .first()
                .map(|&n| artifacts[n as usize].clone())
                .unwrap_or_default();
            self.warnings.push(BridgeError::new(
                artifact,
                BridgeErrorKind::SupertypeCycle { members: names },
            ));
        }

        for decl in &mut index.decls {
            if graph.contains_node(decl.id.0) {
                let mut parents: Vec<DeclId> = graph
                    .neighbors(decl.id.0)
                    .map(DeclId)
                    .collect();
                parents.sort_unstable();
                parents.dedup();
                decl.supertypes = parents;
            }
        }
    }
}

/// Merge drafts of one identity group into a single draft keyed `canonical`.
fn merge_group(group: &[&DeclDraft], canonical: &DeclKey) -> DeclDraft {
    let own: Vec<&DeclDraft> = group
        .iter()
        .copied()
        .filter(|d| &d.key == canonical)
        .collect();
    let own = if own.is_empty() { group.to_vec() } else { own };

    let rank = |d: &DeclDraft| {
        (
            d.kind.specificity(),
            d.origin == Origin::Source,
            d.language == Language::Kotlin,
            d.synthetic.is_some(),
        )
    };
    let mut primary = own[0];
    for &candidate in &own[1..] {
        if rank(candidate) > rank(primary) {
            primary = candidate;
        }
    }

    let mut merged = primary.clone();
    merged.key = canonical.clone();
    merged.origin = if own.iter().any(|d| d.origin == Origin::Source) {
        Origin::Source
    } else {
        Origin::Library
    };
    merged.source = own.iter().find_map(|d| d.source.clone());
    merged.external_signature = own.iter().find_map(|d| d.external_signature.clone());
    merged.synthetic = own.iter().find_map(|d| d.synthetic);
    merged.flags = own.iter().fold(merged.flags, |acc, d| acc.union(d.flags));
    merged.views = own.iter().fold(merged.views, |acc, d| acc.union(d.views));
    if merged.synthetic == Some(SyntheticKind::TopLevelHolderClass) {
        merged.views = Views::only(Language::Java);
    }
    merged.jvm_static = own.iter().any(|d| d.jvm_static);

    let mut supertypes: Vec<String> = own.iter().flat_map(|d| d.supertypes.clone()).collect();
    supertypes.sort();
    supertypes.dedup();
    merged.supertypes = supertypes;

    let mut aliases: Vec<Alias> = group
        .iter()
        .flat_map(|d| d.aliases.iter().cloned())
        .filter(|a| &a.key != canonical)
        .collect();
    aliases.sort();
    aliases.dedup_by(|a, b| a.key == b.key);
    merged.aliases = aliases;

    if group.len() > 1 {
        trace!(key = %canonical, drafts = group.len(), "Merged drafts");
    }
    merged
}

/// Record `pkg` and every parent package.
fn insert_package(packages: &mut BTreeSet<Arc<str>>, pkg: &Arc<str>) {
    if packages.contains(pkg) {
        return;
    }
    let mut prefix = String::new();
    for segment in pkg.split('.') {
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(segment);
        packages.insert(Arc::from(prefix.as_str()));
    }
}

/// Give `@JvmStatic` companion members a static copy on the outer class.
fn attach_jvm_static_copies(index: &mut DeclarationIndex, members: &[DeclId]) {
    for &id in members {
        let decl = &index.decls[id.index()];
        let Some(owner) = decl.owner.map(|o| &index.decls[o.index()]) else {
            continue;
        };
        if owner.kind != DeclKind::CompanionSingleton {
            continue;
        }
        let outer = owner.key.container_path();
        let path: Vec<&str> = outer
            .iter()
            .map(|s| &**s)
            .chain(std::iter::once(decl.key.name()))
            .collect();
        let key = DeclKey::new(
            decl.key.namespace(),
            decl.key.package(),
            &path,
            decl.key.signature(),
        );
        if index.by_key.contains_key(&key) {
            debug!(key = %key, "@JvmStatic copy already declared");
            continue;
        }
        index.by_key.insert(key.clone(), id);
        let decl = &mut index.decls[id.index()];
        decl.aliases.push(Alias {
            key,
            synthetic: SyntheticKind::JvmStaticMember,
            view: Language::Java,
        });
        decl.aliases.sort();
    }
}

// ============================================================================
// Tables and queries
// ============================================================================

impl DeclarationIndex {
    fn fill_tables(&mut self) {
        for decl in &self.decls {
            let pkg: Arc<str> = Arc::from(decl.key.package());
            insert_package(&mut self.packages, &pkg);
            for alias in &decl.aliases {
                insert_package(&mut self.packages, &Arc::from(alias.key.package()));
            }
            if let Some(source) = &decl.source {
                self.source_names
                    .entry(source.file.clone())
                    .or_default()
                    .push((source.name_range, decl.id));
            }
            if let Some(owner) = decl.owner {
                self.children.entry(owner).or_default().push(decl.id);
            }

            if decl.kind.is_constructor() {
                if let Some(owner) = decl.owner {
                    self.constructors.entry(owner).or_default().push(decl.id);
                }
                continue;
            }
            if decl.kind == DeclKind::CompanionSingleton {
                if let Some(owner) = decl.owner {
                    self.companions.insert(owner, decl.id);
                }
            }

            let container = decl
                .owner
                .map_or_else(|| Container::Package(Arc::clone(&pkg)), Container::Decl);
            let name: Arc<str> = Arc::from(decl.key.name());
            for view in Language::ALL {
                if decl.views.visible_from(view) {
                    self.members
                        .entry((view, container.clone()))
                        .or_default()
                        .entry(Arc::clone(&name))
                        .or_default()
                        .push(ScopeEntry {
                            decl: decl.id,
                            via: Via::Native,
                        });
                }
            }

            for alias in &decl.aliases {
                let container = match alias.key.owner_key() {
                    Some(owner) => match self.by_key.get(&owner) {
                        Some(&owner) => Container::Decl(owner),
                        None => {
                            debug!(alias = %alias.key, "Alias owner not indexed");
                            continue;
                        }
                    },
                    None => Container::Package(Arc::from(alias.key.package())),
                };
                self.members
                    .entry((alias.view, container))
                    .or_default()
                    .entry(Arc::from(alias.key.name()))
                    .or_default()
                    .push(ScopeEntry {
                        decl: decl.id,
                        via: Via::Alias(alias.synthetic),
                    });
            }
        }

        for table in self.members.values_mut() {
            for entries in table.values_mut() {
                entries.sort_unstable();
                entries.dedup();
            }
        }
        for entries in self.source_names.values_mut() {
            entries.sort_unstable_by_key(|(range, id)| (range.start, range.len(), *id));
        }
    }

    fn compute_fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        let mut field = |bytes: &[u8]| {
            hasher.update(bytes);
            hasher.update(&[0xff]);
        };
        for decl in &self.decls {
            field(decl.key.to_string().as_bytes());
            field(decl.kind.as_str().as_bytes());
            field(decl.origin.as_str().as_bytes());
            field(decl.language.as_str().as_bytes());
            field(decl.synthetic.map_or("", |s| s.as_str()).as_bytes());
            field(&decl.owner.map_or(u32::MAX, |o| o.0).to_le_bytes());
            field(&[
                u8::from(decl.flags.is_static),
                u8::from(decl.flags.is_enum),
                u8::from(decl.flags.is_interface),
                u8::from(decl.flags.is_const),
                u8::from(decl.views.kotlin),
                u8::from(decl.views.java),
            ]);
            field(decl.external_signature.as_deref().unwrap_or("").as_bytes());
            if let Some(source) = &decl.source {
                field(source.file.to_string_lossy().as_bytes());
                field(&source.name_range.start.to_le_bytes());
                field(&source.name_range.end.to_le_bytes());
            }
            for alias in &decl.aliases {
                field(alias.key.to_string().as_bytes());
                field(alias.synthetic.as_str().as_bytes());
                field(alias.view.as_str().as_bytes());
            }
            for parent in &decl.supertypes {
                field(&parent.0.to_le_bytes());
            }
        }
        hasher.digest()
    }

    /// Canonical declaration for `key`, following alias keys.
    #[must_use]
    pub fn lookup(&self, key: &DeclKey) -> Option<&Declaration> {
        self.by_key.get(key).and_then(|&id| self.get(id))
    }

    /// Declaration by id.
    #[must_use]
    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.index())
    }

    /// All declarations in canonical key order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.decls
    }

    /// Number of canonical declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the index holds no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Constructors of a class, in key order.
    #[must_use]
    pub fn constructors_of(&self, class: DeclId) -> &[DeclId] {
        self.constructors.get(&class).map_or(&[], Vec::as_slice)
    }

    /// Companion object of a class.
    #[must_use]
    pub fn companion_of(&self, class: DeclId) -> Option<DeclId> {
        self.companions.get(&class).copied()
    }

    /// Declarations directly owned by `owner`.
    #[must_use]
    pub fn children_of(&self, owner: DeclId) -> &[DeclId] {
        self.children.get(&owner).map_or(&[], Vec::as_slice)
    }

    /// Bindings of `name` inside `container` as seen from `view`.
    #[must_use]
    pub fn members(&self, view: Language, container: &Container, name: &str) -> &[ScopeEntry] {
        self.members
            .get(&(view, container.clone()))
            .and_then(|table| table.get(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Classifier at `package` + `path`, following type aliases.
    #[must_use]
    pub fn classifier<S: AsRef<str>>(&self, package: &str, path: &[S]) -> Option<DeclId> {
        let id = *self.by_key.get(&DeclKey::classifier(package, path))?;
        self.get(id).filter(|d| d.kind.is_classifier()).map(|d| d.id)
    }

    /// Classifier named by dotted segments, preferring the longest package.
    #[must_use]
    pub fn resolve_type_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<DeclId> {
        (0..segments.len()).rev().find_map(|split| {
            let package = segments[..split]
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(".");
            self.classifier(&package, &segments[split..])
        })
    }

    /// Whether a package (or a parent of one) is known.
    #[must_use]
    pub fn has_package(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    /// Known packages, sorted.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| &**p)
    }

    /// Innermost source declaration whose name range contains `offset`.
    #[must_use]
    pub fn declared_at(&self, file: &Path, offset: u32) -> Option<DeclId> {
        self.source_names
            .get(file)?
            .iter()
            .filter(|(range, _)| range.contains(offset))
            .min_by_key(|(range, id)| (range.len(), *id))
            .map(|(_, id)| *id)
    }

    /// Content hash; equal for equal declarations.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Size summary.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            declarations: self.decls.len(),
            aliases: self.decls.iter().map(|d| d.aliases.len()).sum(),
            source_declarations: self
                .decls
                .iter()
                .filter(|d| d.origin == Origin::Source)
                .count(),
            library_declarations: self
                .decls
                .iter()
                .filter(|d| d.origin == Origin::Library)
                .count(),
            packages: self.packages.len(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::test_support::artifact;
    use crate::frontend::{ArtifactKind, SourceDeclaration};

    fn build(libraries: &[LibraryArtifact]) -> IndexResult {
        IndexBuilder::new()
            .build(&[], libraries)
            .expect("build should not be cancelled")
    }

    fn key(text: &str) -> DeclKey {
        text.parse().expect("test key should parse")
    }

    fn java(kind: ArtifactKind, container: &[&str], name: &str, descriptor: Option<&str>) -> LibraryArtifact {
        artifact(Language::Java, kind, "lib", container, name, descriptor)
    }

    fn kotlin(kind: ArtifactKind, container: &[&str], name: &str, descriptor: Option<&str>) -> LibraryArtifact {
        artifact(Language::Kotlin, kind, "lib", container, name, descriptor)
    }

    #[test]
    fn constructor_overloads_stay_distinct() {
        let result = build(&[
            java(ArtifactKind::Class, &[], "Foo", None),
            java(ArtifactKind::Constructor, &["Foo"], "Foo", Some("(I)V")),
            java(ArtifactKind::Constructor, &["Foo"], "Foo", Some("(II)V")),
        ]);
        let index = &result.index;
        let foo = index.lookup(&key("type:lib/Foo")).expect("Foo should be indexed");

        assert_eq!(index.constructors_of(foo.id).len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn object_from_both_feeds_merges_into_one_declaration() {
        let result = build(&[
            kotlin(ArtifactKind::Object, &[], "Bar", None),
            java(ArtifactKind::Class, &[], "Bar", None),
            java(ArtifactKind::Field, &["Bar"], "INSTANCE", Some("Llib/Bar;")),
        ]);
        let index = &result.index;

        let bar = index.lookup(&key("type:lib/Bar")).expect("Bar should be indexed");
        let instance = index
            .lookup(&key("field:lib/Bar.INSTANCE"))
            .expect("INSTANCE should be an alias");

        assert_eq!(bar.kind, DeclKind::Object);
        assert_eq!(bar.id, instance.id);
        assert_eq!(index.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn merge_is_independent_of_registration_order() {
        let artifacts = vec![
            kotlin(ArtifactKind::Object, &[], "Bar", None),
            java(ArtifactKind::Class, &[], "Bar", None),
            java(ArtifactKind::Field, &["Bar"], "INSTANCE", None),
            java(ArtifactKind::Class, &[], "Foo", None),
            java(ArtifactKind::Constructor, &["Foo"], "Foo", Some("()V")),
        ];
        let mut reversed = artifacts.clone();
        reversed.reverse();

        let forward = build(&artifacts);
        let backward = build(&reversed);

        assert_eq!(forward.index.fingerprint(), backward.index.fingerprint());
        assert_eq!(forward.index.len(), backward.index.len());
    }

    #[test]
    fn missing_owner_skips_member_and_its_children() {
        let result = build(&[
            java(ArtifactKind::Class, &["Ghost"], "Inner", None),
            java(ArtifactKind::Method, &["Ghost", "Inner"], "run", Some("()V")),
        ]);

        assert!(result.index.is_empty());
        assert_eq!(result.warnings.len(), 2);
        assert!(
            result
                .warnings
                .iter()
                .all(|w| matches!(w.kind, BridgeErrorKind::MissingOwner { .. }))
        );
        assert!(result.warnings[0].to_string().contains("lib.Ghost"));
    }

    #[test]
    fn enum_entry_outside_enum_is_rejected() {
        let result = build(&[
            kotlin(ArtifactKind::Class, &[], "Plain", None),
            kotlin(ArtifactKind::EnumEntry, &["Plain"], "RED", None),
        ]);

        assert_eq!(result.index.len(), 1);
        assert!(result.warnings[0].to_string().contains("enum entry outside an enum"));
    }

    #[test]
    fn type_alias_resolves_to_target() {
        let mut alias = kotlin(ArtifactKind::TypeAlias, &[], "Handle", None);
        alias.alias_target = Some("lib.Foo".into());
        let result = build(&[java(ArtifactKind::Class, &[], "Foo", None), alias]);

        let foo = result.index.lookup(&key("type:lib/Foo")).expect("Foo");
        let via_alias = result.index.lookup(&key("type:lib/Handle")).expect("alias");
        assert_eq!(foo.id, via_alias.id);
        assert_eq!(result.index.classifier("lib", &["Handle"]), Some(foo.id));
        assert_eq!(
            result.index.members(Language::Kotlin, &Container::Package("lib".into()), "Handle"),
            &[ScopeEntry {
                decl: foo.id,
                via: Via::Alias(SyntheticKind::TypeAlias)
            }]
        );
    }

    #[test]
    fn type_alias_to_unknown_target_warns() {
        let mut alias = kotlin(ArtifactKind::TypeAlias, &[], "Handle", None);
        alias.alias_target = Some("lib.Missing".into());
        let result = build(&[alias]);

        assert!(matches!(
            result.warnings[0].kind,
            BridgeErrorKind::MissingAliasTarget { .. }
        ));
    }

    #[test]
    fn jvm_static_companion_member_gets_outer_copy() {
        let mut create = kotlin(ArtifactKind::Method, &["Foo", "Companion"], "create", Some("()V"));
        create.modifiers.jvm_static = true;
        let result = build(&[
            kotlin(ArtifactKind::Class, &[], "Foo", None),
            kotlin(ArtifactKind::Companion, &["Foo"], "Companion", None),
            create,
        ]);
        let index = &result.index;

        let native = index
            .lookup(&key("method:lib/Foo.Companion.create#()V"))
            .expect("native key");
        let copy = index.lookup(&key("method:lib/Foo.create#()V")).expect("static copy");
        assert_eq!(native.id, copy.id);

        let foo = index.classifier("lib", &["Foo"]).expect("Foo");
        assert_eq!(index.companion_of(foo), index.classifier("lib", &["Foo", "Companion"]));
        let java_entries = index.members(Language::Java, &Container::Decl(foo), "create");
        assert_eq!(java_entries[0].via, Via::Alias(SyntheticKind::JvmStaticMember));
        assert!(index.members(Language::Kotlin, &Container::Decl(foo), "create").is_empty());
    }

    #[test]
    fn supertype_cycle_is_broken_and_reported() {
        let mut a = java(ArtifactKind::Class, &[], "A", None);
        a.supertypes = vec!["lib.B".into()];
        let mut b = java(ArtifactKind::Class, &[], "B", None);
        b.supertypes = vec!["lib.A".into()];
        let mut c = java(ArtifactKind::Class, &[], "C", None);
        c.supertypes = vec!["lib.A".into(), "java.lang.Object".into()];

        let result = build(&[a, b, c]);
        let index = &result.index;

        let a = index.classifier("lib", &["A"]).expect("A");
        let c = index.classifier("lib", &["C"]).expect("C");
        assert!(index.get(a).expect("A").supertypes.is_empty());
        assert_eq!(index.get(c).expect("C").supertypes, vec![a]);
        assert!(matches!(
            &result.warnings[0].kind,
            BridgeErrorKind::SupertypeCycle { members } if members == &["lib.A", "lib.B"]
        ));
    }

    #[test]
    fn top_level_function_is_java_visible_only_through_holder() {
        let mut function = kotlin(ArtifactKind::Function, &[], "greet", Some("()V"));
        function.facade = Some("UtilsKt".into());
        let result = build(&[function]);
        let index = &result.index;
        let lib = Container::Package("lib".into());

        assert_eq!(index.members(Language::Kotlin, &lib, "greet").len(), 1);
        assert!(index.members(Language::Java, &lib, "greet").is_empty());
        assert!(index.members(Language::Kotlin, &lib, "UtilsKt").is_empty());

        let holder = index.classifier("lib", &["UtilsKt"]).expect("holder");
        let entries = index.members(Language::Java, &Container::Decl(holder), "greet");
        assert_eq!(entries[0].via, Via::Alias(SyntheticKind::TopLevelHolderMember));
    }

    #[test]
    fn source_and_library_feeds_merge_with_source_location() {
        let file = SourceFile {
            path: PathBuf::from("src/Foo.kt"),
            language: Language::Kotlin,
            package: "lib".into(),
            imports: vec![],
            declarations: vec![SourceDeclaration {
                kind: ArtifactKind::Class,
                name: "Foo".into(),
                container: vec![],
                signature: None,
                range: TextRange { start: 0, end: 40 },
                name_range: TextRange { start: 6, end: 9 },
                modifiers: Default::default(),
                supertypes: vec![],
                jvm_name: None,
                alias_target: None,
            }],
            tokens: vec![],
            facade_name: None,
        };
        let result = IndexBuilder::new()
            .build(&[file], &[java(ArtifactKind::Class, &[], "Foo", None)])
            .expect("should build");
        let foo = result.index.lookup(&key("type:lib/Foo")).expect("Foo");

        assert_eq!(foo.origin, Origin::Source);
        assert!(foo.source.is_some());
        assert_eq!(
            result.index.declared_at(Path::new("src/Foo.kt"), 7),
            Some(foo.id)
        );
        assert_eq!(result.index.declared_at(Path::new("src/Foo.kt"), 20), None);
    }

    #[test]
    fn packages_include_parents() {
        let result = IndexBuilder::new()
            .build(
                &[],
                &[artifact(Language::Java, ArtifactKind::Class, "com.acme.util", &[], "X", None)],
            )
            .expect("should build");

        assert!(result.index.has_package("com"));
        assert!(result.index.has_package("com.acme"));
        assert!(result.index.has_package("com.acme.util"));
        assert!(!result.index.has_package("acme"));
    }

    #[test]
    fn cancelled_build_returns_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = IndexBuilder::with_cancellation(cancel)
            .build(&[], &[java(ArtifactKind::Class, &[], "Foo", None)]);
        assert!(matches!(result, Err(crate::Error::Cancelled)));
    }
}
