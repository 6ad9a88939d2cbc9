//! Engine configuration, loadable from YAML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```yaml
//! threads: 4
//! ambiguity: report-miss
//! report_misses: true
//! default_imports:
//!   kotlin: ["kotlin.*", "kotlin.collections.*"]
//!   java: ["java.lang.*"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Language;

/// What the scanner does with a token that resolves to several declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguityPolicy {
    /// Report the occurrence if any candidate is a target
    #[default]
    IncludeAll,
    /// Report the occurrence as a miss instead
    ReportMiss,
}

/// Imports every file of a language sees without writing them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultImports {
    /// Implicit imports of Kotlin files
    pub kotlin: Vec<String>,
    /// Implicit imports of Java files
    pub java: Vec<String>,
}

impl Default for DefaultImports {
    fn default() -> Self {
        Self {
            kotlin: vec!["kotlin.*".to_string()],
            java: vec!["java.lang.*".to_string()],
        }
    }
}

impl DefaultImports {
    /// Implicit imports for files written in `language`.
    #[must_use]
    pub fn for_language(&self, language: Language) -> &[String] {
        match language {
            Language::Kotlin => &self.kotlin,
            Language::Java => &self.java,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Size of the worker pool; `None` uses rayon's default
    pub threads: Option<usize>,
    /// Treatment of ambiguous hits
    pub ambiguity: AmbiguityPolicy,
    /// Whether unresolved tokens spelling a target's name are reported
    pub report_misses: bool,
    /// Implicit star imports per language
    pub default_imports: DefaultImports,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: None,
            ambiguity: AmbiguityPolicy::default(),
            report_misses: true,
            default_imports: DefaultImports::default(),
        }
    }
}

impl Config {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the text is not valid YAML for this schema
    /// or a value is out of range.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config =
            serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` if its
    /// content is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Check value ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(Error::Config("threads must be at least 1".to_string()));
        }
        for language in Language::ALL {
            for import in self.default_imports.for_language(language) {
                if import.is_empty() || import.split('.').any(str::is_empty) {
                    return Err(Error::Config(format!(
                        "invalid default import {import:?} for {language}"
                    )));
                }
            }
        }
        Ok(())
    }
}
