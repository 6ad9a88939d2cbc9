//! Error types for Janus operations.
//!
//! Errors are categorized into three kinds:
//!
//! - **`Error`**: Top-level errors that halt an operation (cancellation, bad config)
//! - **`BridgeError`**: Per-artifact problems that are collected but don't halt indexing
//! - **`UnresolvedReason`**: Why one use-site token did not resolve; never aborts a scan
//!
//! ## Error Philosophy
//!
//! Janus follows a "best effort" approach for indexing:
//! - A single malformed artifact shouldn't prevent indexing the rest
//! - Skipped artifacts are reported as warnings, not thrown
//! - Only cancellation and infrastructure failures cause early termination
//!
//! Ambiguity is not an error at all: it is returned as data
//! ([`Resolution::Ambiguous`](crate::resolver::Resolution::Ambiguous)).
//!
//! Every `BridgeErrorKind` describes a problem in the input: metadata that
//! is malformed, names an owner or alias target that does not exist, forms a
//! supertype cycle, or claims an identity another artifact already holds.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::types::DeclId;

/// Result type for Janus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Janus operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation observed its cancellation token; partial results were discarded
    #[error("operation cancelled")]
    Cancelled,

    /// A query named a declaration the current index does not contain
    #[error("unknown declaration: {0}")]
    UnknownDeclaration(String),

    /// A declaration key could not be parsed
    #[error("invalid declaration key: {0}")]
    InvalidKey(#[from] crate::model::KeyParseError),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// A scenario fixture could not be decoded
    #[error("fixture error in {path}: {message}")]
    Fixture {
        /// Fixture file
        path: PathBuf,
        /// Decoder message
        message: String,
    },

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A report could not be encoded as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problem found while converting one artifact into declarations.
///
/// Collected during indexing; the artifact (and any declaration owned by it)
/// is skipped and indexing continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{artifact}: {kind}")]
pub struct BridgeError {
    /// Human-readable name of the offending artifact
    pub artifact: String,
    /// What went wrong
    pub kind: BridgeErrorKind,
}

/// Categorization of bridge errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BridgeErrorKind {
    /// Metadata is structurally unusable
    #[error("malformed metadata: {reason}")]
    Malformed {
        /// Which rule the artifact violates
        reason: String,
    },

    /// The owning classifier is not part of the index
    #[error("missing owner {owner}")]
    MissingOwner {
        /// Owner as written in the artifact
        owner: String,
    },

    /// A type alias names a classifier the index does not contain
    #[error("alias target {target} does not exist")]
    MissingAliasTarget {
        /// Target as written in the artifact
        target: String,
    },

    /// Supertype edges form a cycle; the cyclic edges were dropped
    #[error("supertype cycle through {}", members.join(", "))]
    SupertypeCycle {
        /// Classifiers on the cycle, in canonical order
        members: Vec<String>,
    },

    /// Two unrelated declarations claimed the same identity
    #[error("identity collides with {other}")]
    ConflictingIdentity {
        /// The declaration the artifact was merged into
        other: String,
    },
}

impl BridgeError {
    /// Create a new bridge error.
    #[must_use]
    pub fn new(artifact: impl Into<String>, kind: BridgeErrorKind) -> Self {
        Self {
            artifact: artifact.into(),
            kind,
        }
    }

    /// Create a malformed-metadata error.
    #[must_use]
    pub fn malformed(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            artifact,
            BridgeErrorKind::Malformed {
                reason: reason.into(),
            },
        )
    }

    /// Create a missing-owner error.
    #[must_use]
    pub fn missing_owner(artifact: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::new(
            artifact,
            BridgeErrorKind::MissingOwner {
                owner: owner.into(),
            },
        )
    }
}

/// Why a use-site token could not be mapped to a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Error)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedReason {
    /// No declaration with that name is visible from the use site
    #[error("unknown symbol")]
    UnknownSymbol,

    /// The name is visible but the construct cannot refer to it
    #[error("unsupported construct")]
    UnsupportedConstruct,

    /// The qualifier, receiver or enum subject did not resolve
    #[error("missing owner")]
    MissingOwner,
}

/// Why [`Janus::declaration_at`](crate::Janus::declaration_at) could not
/// name a single declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The token at the offset did not resolve, or nothing covers the offset
    #[error(transparent)]
    Unresolved(#[from] UnresolvedReason),

    /// The token resolved to several declarations, in ascending id order
    #[error("ambiguous between {} declarations", .0.len())]
    Ambiguous(Vec<DeclId>),
}

impl UnresolvedReason {
    /// Stable kebab-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownSymbol => "unknown-symbol",
            Self::UnsupportedConstruct => "unsupported-construct",
            Self::MissingOwner => "missing-owner",
        }
    }
}
