//! # Janus: Cross-Language Find-Usages Core
//!
//! Janus answers "where is this used?" across a mixed Kotlin/Java codebase.
//! Language front-ends hand over per-file declarations and use-site tokens;
//! compiled dependencies are described by [`LibraryArtifact`]s. Janus
//! normalizes both into one set of canonical [`Declaration`]s, resolves every
//! token to them, and reports categorized usages.
//!
//! ## Design Philosophy
//!
//! - **One identity per construct** - a Kotlin `object` seen from Java through
//!   `INSTANCE` is the same declaration as the object itself
//! - **Ambiguity is data** - several equally valid targets are reported, never
//!   silently collapsed
//! - **Immutable generations** - a rebuild publishes a new index; scans read a
//!   snapshot and never block each other
//! - **No overload resolution** - the front-end's chosen signature is trusted
//!
//! ## Quick Start
//!
//! ```
//! use janus::{Config, Janus};
//!
//! let janus = Janus::new(Config::default())?;
//! let generation = janus.build(&[], &[])?;
//! assert!(generation.index.is_empty());
//! # Ok::<(), janus::Error>(())
//! ```

mod aggregate;
mod bridge;
mod cancel;
mod config;
mod error;
mod fixture;
mod frontend;
mod index;
mod model;
mod parallel;
mod resolver;
mod scanner;
mod types;

pub use aggregate::{Completeness, FileUsages, UsageReport, aggregate};
pub use cancel::CancellationToken;
pub use config::{AmbiguityPolicy, Config, DefaultImports};
pub use error::{BridgeError, BridgeErrorKind, Error, PositionError, Result, UnresolvedReason};
pub use fixture::Scenario;
pub use frontend::{
    ArtifactKind, Import, LibraryArtifact, Modifiers, OccurrenceToken, SourceDeclaration,
    SourceFile, TokenShape, holder_name_for,
};
pub use index::{Container, DeclarationIndex, IndexBuilder, IndexResult, IndexStats, ScopeEntry, Via};
pub use model::{
    Alias, CONSTRUCTOR_NAME, DeclFlags, DeclKey, Declaration, KeyParseError, SourceLocation, Views,
};
pub use resolver::{FileScope, Resolution, Resolver, Target};
pub use scanner::{Miss, MissReason, ScanOutput, Scanner, UsageOccurrence, UsageQuery};
pub use types::{
    Access, DeclId, DeclKind, Language, Namespace, Origin, SyntheticKind, TextRange, UsageCategory,
};

use std::sync::{Arc, PoisonError, RwLock};

use rayon::ThreadPool;
use tracing::{debug, info};

/// One published index together with what was skipped building it.
#[derive(Debug)]
pub struct Generation {
    /// Monotonic generation number; 0 is the empty index before any build
    pub number: u64,
    /// The index
    pub index: Arc<DeclarationIndex>,
    /// Bridge errors collected while building
    pub warnings: Vec<BridgeError>,
}

/// Find-usages engine.
///
/// `Janus` owns the configuration, an optional dedicated worker pool, and the
/// current index generation. Builds publish a new generation atomically; every
/// query runs against the generation current when it started.
pub struct Janus {
    config: Config,
    pool: Option<ThreadPool>,
    current: RwLock<Arc<Generation>>,
}

impl std::fmt::Debug for Janus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Janus")
            .field("config", &self.config)
            .field("generation", &self.snapshot().number)
            .finish_non_exhaustive()
    }
}

impl Janus {
    /// Create an engine with an empty index.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid or the worker
    /// pool cannot be started.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let pool = parallel::build_pool(config.threads)?;
        Ok(Self {
            config,
            pool,
            current: RwLock::new(Arc::new(Generation {
                number: 0,
                index: Arc::new(DeclarationIndex::default()),
                warnings: Vec::new(),
            })),
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build and publish a new index generation.
    ///
    /// # Errors
    ///
    /// Only cancellation aborts a build; malformed artifacts become warnings.
    pub fn build(&self, files: &[SourceFile], libraries: &[LibraryArtifact]) -> Result<Arc<Generation>> {
        self.build_with_cancel(files, libraries, &CancellationToken::new())
    }

    /// [`build`](Self::build) with a cancellation token.
    ///
    /// A cancelled build publishes nothing; the previous generation stays
    /// current.
    ///
    /// # Errors
    ///
    /// Returns `Error::Cancelled` if `cancel` fires during the build.
    pub fn build_with_cancel(
        &self,
        files: &[SourceFile],
        libraries: &[LibraryArtifact],
        cancel: &CancellationToken,
    ) -> Result<Arc<Generation>> {
        let result = parallel::install(self.pool.as_ref(), || {
            IndexBuilder::with_cancellation(cancel.clone()).build(files, libraries)
        })?;

        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = Arc::new(Generation {
            number: slot.number + 1,
            index: result.index,
            warnings: result.warnings,
        });
        *slot = Arc::clone(&generation);

        info!(
            generation = generation.number,
            declarations = generation.index.len(),
            warnings = generation.warnings.len(),
            "Published index generation"
        );
        Ok(generation)
    }

    /// The current generation.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Canonical declaration for `key` (native or alias) in the current generation.
    #[must_use]
    pub fn lookup(&self, key: &DeclKey) -> Option<DeclId> {
        self.snapshot().index.lookup(key).map(|d| d.id)
    }

    /// Every usage of the declaration named by `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDeclaration` if `key` is not indexed.
    pub fn find_usages(&self, key: &DeclKey, corpus: &[SourceFile]) -> Result<UsageReport> {
        self.find_usages_with(key, corpus, None, &CancellationToken::new())
    }

    /// [`find_usages`](Self::find_usages) with a declared file count for
    /// completeness reporting and a cancellation token.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDeclaration` if `key` is not indexed and
    /// `Error::Cancelled` if `cancel` fires during the scan.
    pub fn find_usages_with(
        &self,
        key: &DeclKey,
        corpus: &[SourceFile],
        declared_files: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<UsageReport> {
        let generation = self.snapshot();
        let index = &generation.index;
        let decl = index
            .lookup(key)
            .ok_or_else(|| Error::UnknownDeclaration(key.to_string()))?;
        let query = UsageQuery::for_declaration(index, decl.id)?;

        debug!(
            key = %decl.key,
            generation = generation.number,
            targets = query.targets().count(),
            files = corpus.len(),
            "Finding usages"
        );

        let output = parallel::install(self.pool.as_ref(), || {
            Scanner::new(index, &self.config, cancel).scan(&query, corpus)
        })?;
        Ok(aggregate(output, declared_files))
    }

    /// Resolution of the token covering `offset` in `file`.
    ///
    /// Declaration names win over use-site tokens; among tokens the narrowest
    /// covering one is used. `None` when nothing covers the offset.
    #[must_use]
    pub fn resolution_at(&self, file: &SourceFile, offset: u32) -> Option<Resolution> {
        let generation = self.snapshot();
        let index = &generation.index;
        if let Some(id) = index.declared_at(&file.path, offset) {
            return Some(Resolution::Unique(Target::native(id)));
        }

        let token = file
            .tokens
            .iter()
            .filter(|t| t.range.contains(offset))
            .min_by_key(|t| t.range.len())?;
        let resolver = Resolver::new(index);
        let scope = resolver.file_scope(file, &self.config);
        Some(resolver.resolve(token, &scope))
    }

    /// Declaration at a position, for "find usages of the thing under the caret".
    ///
    /// # Errors
    ///
    /// `PositionError::Unresolved(UnknownSymbol)` when nothing covers the
    /// offset, the token's own failure when it does not resolve, and
    /// `PositionError::Ambiguous` with every candidate when it resolves to
    /// more than one declaration.
    pub fn declaration_at(
        &self,
        file: &SourceFile,
        offset: u32,
    ) -> std::result::Result<DeclId, PositionError> {
        match self.resolution_at(file, offset) {
            Some(Resolution::Unique(target)) => Ok(target.decl),
            Some(resolution @ Resolution::Ambiguous(_)) => {
                Err(PositionError::Ambiguous(resolution.decls()))
            }
            Some(Resolution::Unresolved(reason)) => Err(reason.into()),
            None => Err(UnresolvedReason::UnknownSymbol.into()),
        }
    }
}
