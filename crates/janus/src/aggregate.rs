//! Turns raw scan output into a [`UsageReport`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::{Miss, ScanOutput, UsageOccurrence};
use crate::types::{DeclId, Language, TextRange, UsageCategory};

/// Usages found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUsages {
    /// The file
    pub file: PathBuf,
    /// Its language
    pub language: Language,
    /// Usages by ascending range
    pub occurrences: Vec<UsageOccurrence>,
}

/// Scanned versus declared file counts.
///
/// The aggregator does not discover files; `declared` is whatever the caller
/// says the project contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Completeness {
    /// Files handed to the scan
    pub scanned: usize,
    /// Files the caller expected, if known
    pub declared: Option<usize>,
}

impl Completeness {
    /// Whether exactly the declared files were scanned; `None` when nothing
    /// was declared.
    #[must_use]
    pub fn is_complete(&self) -> Option<bool> {
        self.declared.map(|declared| self.scanned == declared)
    }
}

/// Result of one find-usages query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    /// Files with at least one usage, in corpus order
    pub files: Vec<FileUsages>,
    /// Usages per category
    pub counts: BTreeMap<UsageCategory, usize>,
    /// Scan coverage
    pub completeness: Completeness,
    /// Tokens that looked like usages but were not counted
    pub misses: Vec<Miss>,
}

impl UsageReport {
    /// Total number of usages.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Usages of one category.
    #[must_use]
    pub fn count(&self, category: UsageCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Every usage in report order.
    pub fn occurrences(&self) -> impl Iterator<Item = &UsageOccurrence> {
        self.files.iter().flat_map(|f| f.occurrences.iter())
    }
}

/// Deduplicate, group and count.
///
/// Two occurrences are duplicates when they share file, range and resolved
/// declarations.
#[must_use]
pub fn aggregate(output: ScanOutput, declared: Option<usize>) -> UsageReport {
    let mut seen: HashSet<(PathBuf, TextRange, Vec<DeclId>)> = HashSet::new();
    let mut slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut report = UsageReport {
        completeness: Completeness {
            scanned: output.scanned_files,
            declared,
        },
        misses: output.misses,
        ..UsageReport::default()
    };

    for occurrence in output.occurrences {
        let identity = (
            occurrence.file.clone(),
            occurrence.range,
            occurrence.resolution.decls(),
        );
        if !seen.insert(identity) {
            continue;
        }

        *report.counts.entry(occurrence.category).or_insert(0) += 1;
        let slot = *slots.entry(occurrence.file.clone()).or_insert_with(|| {
            report.files.push(FileUsages {
                file: occurrence.file.clone(),
                language: occurrence.language,
                occurrences: Vec::new(),
            });
            report.files.len() - 1
        });
        report.files[slot].occurrences.push(occurrence);
    }

    report
}
