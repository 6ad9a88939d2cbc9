//! Usage scanning: resolve every token of a corpus and keep those that name
//! the queried declarations.
//!
//! Files are scanned in parallel and reassembled in corpus order; within a
//! file occurrences are ordered by range, so identical input always yields
//! identical output.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::config::{AmbiguityPolicy, Config};
use crate::error::{Error, Result, UnresolvedReason};
use crate::frontend::{OccurrenceToken, SourceFile, TokenShape};
use crate::index::DeclarationIndex;
use crate::parallel::par_map_checked;
use crate::resolver::{Resolution, Resolver, Target};
use crate::types::{Access, DeclId, DeclKind, Language, TextRange, UsageCategory};

/// One resolved reference to a queried declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageOccurrence {
    /// Referencing file
    pub file: PathBuf,
    /// The identifier's range
    pub range: TextRange,
    /// Referencing language
    pub language: Language,
    /// Every declaration the token resolved to
    pub resolution: Resolution,
    /// How the declaration is used
    pub category: UsageCategory,
}

/// Why a token spelled like a target was not reported as a usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "detail")]
pub enum MissReason {
    /// The token did not resolve
    Unresolved(UnresolvedReason),
    /// The token resolved to several declarations and policy excludes it
    Ambiguous(Vec<DeclId>),
}

/// A token that may refer to a target but was not counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Miss {
    /// Referencing file
    pub file: PathBuf,
    /// The identifier's range
    pub range: TextRange,
    /// The identifier
    pub name: String,
    /// Why it was not counted
    pub reason: MissReason,
}

/// Everything one scan found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    /// Usages in corpus order, by range within a file
    pub occurrences: Vec<UsageOccurrence>,
    /// Near misses in the same order
    pub misses: Vec<Miss>,
    /// Number of files scanned
    pub scanned_files: usize,
}

/// Class-mode details of a query.
#[derive(Debug, Clone)]
struct ClassQuery {
    class: DeclId,
    /// Enclosing classifier names of a nested class, outermost first
    owner_chain: Option<Vec<Arc<str>>>,
}

/// The set of declarations a find-usages query looks for.
///
/// Querying a class also queries each of its constructors. References that
/// resolve to the class itself are only counted in type, import, and
/// construction positions (plus owner-qualified paths for nested classes).
#[derive(Debug, Clone)]
pub struct UsageQuery {
    targets: BTreeSet<DeclId>,
    class: Option<ClassQuery>,
    spellings: HashSet<Arc<str>>,
}

impl UsageQuery {
    /// Build the query for one declaration.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDeclaration` if `id` is not in `index`.
    pub fn for_declaration(index: &DeclarationIndex, id: DeclId) -> Result<Self> {
        let decl = index
            .get(id)
            .ok_or_else(|| Error::UnknownDeclaration(id.to_string()))?;

        let mut targets = BTreeSet::from([id]);
        let mut class = None;
        if matches!(decl.kind, DeclKind::Class | DeclKind::NestedClass) {
            targets.extend(index.constructors_of(id).iter().copied());
            let owner_chain = (decl.kind == DeclKind::NestedClass)
                .then(|| decl.key.container_path().to_vec());
            class = Some(ClassQuery {
                class: id,
                owner_chain,
            });
        }

        let mut spellings = HashSet::new();
        for &target in &targets {
            let Some(target) = index.get(target) else {
                continue;
            };
            if target.kind.is_constructor() {
                // constructors are spelled like their class
                if let Some(owner) = target.key.container_path().last() {
                    spellings.insert(Arc::clone(owner));
                }
                continue;
            }
            spellings.extend(target.spellings().map(Arc::from));
        }

        Ok(Self {
            targets,
            class,
            spellings,
        })
    }

    /// Queried declarations, ascending.
    pub fn targets(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.targets.iter().copied()
    }

    /// Whether `name` is a spelling of some target.
    #[must_use]
    pub fn is_spelling(&self, name: &str) -> bool {
        self.spellings.contains(name)
    }

    /// Whether a token resolving to `target` counts as a usage.
    fn accepts(&self, token: &OccurrenceToken, target: Target) -> bool {
        if !self.targets.contains(&target.decl) {
            return false;
        }
        let Some(class) = self.class.as_ref().filter(|c| c.class == target.decl) else {
            return true;
        };
        if token.shape == TokenShape::ConstructorCall
            || matches!(token.access, Access::TypeReference | Access::Import)
        {
            return true;
        }
        class.owner_chain.as_ref().is_some_and(|chain| {
            !chain.is_empty()
                && token.qualifier.len() >= chain.len()
                && token.qualifier[token.qualifier.len() - chain.len()..]
                    .iter()
                    .zip(chain)
                    .all(|(written, owner)| written.as_str() == &**owner)
        })
    }
}

/// Scans a corpus against one index snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    index: &'a DeclarationIndex,
    config: &'a Config,
    cancel: &'a CancellationToken,
}

impl<'a> Scanner<'a> {
    /// Create a scanner.
    #[must_use]
    pub fn new(
        index: &'a DeclarationIndex,
        config: &'a Config,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            index,
            config,
            cancel,
        }
    }

    /// Find every usage of `query` in `corpus`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Cancelled` if cancelled; partial results are dropped.
    pub fn scan(&self, query: &UsageQuery, corpus: &[SourceFile]) -> Result<ScanOutput> {
        let per_file = par_map_checked(corpus, self.cancel, |_, file| {
            self.scan_file(query, file)
        })?;

        let mut output = ScanOutput {
            scanned_files: corpus.len(),
            ..ScanOutput::default()
        };
        for (occurrences, misses) in per_file {
            output.occurrences.extend(occurrences);
            output.misses.extend(misses);
        }

        debug!(
            files = output.scanned_files,
            occurrences = output.occurrences.len(),
            misses = output.misses.len(),
            "Scan complete"
        );
        Ok(output)
    }

    fn scan_file(
        &self,
        query: &UsageQuery,
        file: &SourceFile,
    ) -> (Vec<UsageOccurrence>, Vec<Miss>) {
        let resolver = Resolver::new(self.index);
        let scope = resolver.file_scope(file, self.config);
        let mut occurrences = Vec::new();
        let mut misses = Vec::new();

        for token in &file.tokens {
            let resolution = resolver.resolve(token, &scope);
            let miss = |reason| Miss {
                file: file.path.clone(),
                range: token.range,
                name: token.name.clone(),
                reason,
            };

            let hits: Vec<Target> = resolution
                .targets()
                .iter()
                .copied()
                .filter(|&t| query.accepts(token, t))
                .collect();

            if let Resolution::Unresolved(reason) = &resolution {
                if self.config.report_misses && query.is_spelling(&token.name) {
                    misses.push(miss(MissReason::Unresolved(*reason)));
                }
                continue;
            }
            let Some(&first) = hits.first() else {
                continue;
            };
            let ambiguous = matches!(resolution, Resolution::Ambiguous(_));
            if ambiguous && self.config.ambiguity == AmbiguityPolicy::ReportMiss {
                if self.config.report_misses {
                    misses.push(miss(MissReason::Ambiguous(resolution.decls())));
                }
                continue;
            }
            occurrences.push(UsageOccurrence {
                file: file.path.clone(),
                range: token.range,
                language: file.language,
                category: self.categorize(token, first),
                resolution,
            });
        }

        occurrences.sort_by_key(|o| o.range);
        misses.sort_by_key(|m| m.range);
        (occurrences, misses)
    }

    /// Usage category of a token that reached `target`.
    ///
    /// Accessor aliases report the property access they stand for; static
    /// members and static-style aliases report static categories.
    #[must_use]
    pub fn categorize(&self, token: &OccurrenceToken, target: Target) -> UsageCategory {
        if token.shape == TokenShape::ConstructorCall {
            return UsageCategory::Call;
        }

        let tag = target.via.synthetic();
        let accessor_use = matches!(token.access, Access::Read | Access::Write | Access::Call);
        let base = match tag {
            Some(tag) if accessor_use && tag.is_getter() => UsageCategory::Read,
            Some(tag) if accessor_use && tag.is_setter() => UsageCategory::Write,
            _ => UsageCategory::from(token.access),
        };

        let static_member = self.index.get(target.decl).is_some_and(|d| {
            d.flags.is_static && matches!(d.kind, DeclKind::Field | DeclKind::Method)
        });
        if static_member || tag.is_some_and(|t| t.is_static_style()) {
            base.to_static()
        } else {
            base
        }
    }
}
