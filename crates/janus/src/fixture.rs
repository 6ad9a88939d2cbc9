//! Scenario fixtures: front-end output and library artifacts bundled as JSON.
//!
//! A scenario stands in for a real front-end. The CLI and the integration
//! tests both consume them.
//!
//! ```json
//! {
//!   "files": [{ "path": "src/Use.kt", "language": "kotlin", "package": "app",
//!               "tokens": [{ "name": "Foo", "range": { "start": 4, "end": 7 },
//!                            "access": "type-reference" }] }],
//!   "libraries": [{ "language": "java", "kind": "class", "package": "lib", "name": "Foo" }],
//!   "expected_files": 1
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::frontend::{LibraryArtifact, SourceFile};

/// A corpus plus the libraries it compiles against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Analyzed source files, in corpus order
    #[serde(default)]
    pub files: Vec<SourceFile>,
    /// Compiled-only declarations
    #[serde(default)]
    pub libraries: Vec<LibraryArtifact>,
    /// Number of files the project declares, for completeness reporting
    #[serde(default)]
    pub expected_files: Option<usize>,
}

impl Scenario {
    /// Decode a scenario from JSON text; `origin` names it in errors.
    ///
    /// # Errors
    ///
    /// Returns `Error::Fixture` if the text is not a valid scenario.
    pub fn from_json_str(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Fixture {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and decode a scenario file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Fixture` if
    /// it does not decode.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let scenario = Self::from_json_str(&text, path)?;
        debug!(
            path = %path.display(),
            files = scenario.files.len(),
            libraries = scenario.libraries.len(),
            "Loaded scenario"
        );
        Ok(scenario)
    }

    /// A source file by path.
    #[must_use]
    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Paths of all source files, in corpus order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}
