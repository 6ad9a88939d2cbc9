//! Common display utilities for CLI commands.

use colored::Colorize;
use janus::{BridgeError, DeclarationIndex, Miss, MissReason, Resolution, UsageOccurrence};

const MAX_DISPLAY_ITEMS: usize = 10;

/// Display skipped artifacts with truncation.
pub fn print_warnings(warnings: &[BridgeError]) {
    if warnings.is_empty() {
        return;
    }

    println!();
    println!("{} ({}):", "Warnings".yellow().bold(), warnings.len());
    for warning in warnings.iter().take(MAX_DISPLAY_ITEMS) {
        println!("  {} {warning}", "•".yellow());
    }
    if warnings.len() > MAX_DISPLAY_ITEMS {
        println!("  ... and {} more", warnings.len() - MAX_DISPLAY_ITEMS);
    }
}

/// One report line: `{category} ({start}: {end}) {file}`.
pub fn print_occurrence(occurrence: &UsageOccurrence, index: &DeclarationIndex) {
    println!(
        "    {} ({}: {}) {}",
        occurrence.category.as_str().green(),
        occurrence.range.start,
        occurrence.range.end,
        occurrence.file.display()
    );
    if let Resolution::Ambiguous(_) = occurrence.resolution {
        println!(
            "      {} {}",
            "ambiguous:".yellow(),
            describe(&occurrence.resolution, index)
        );
    }
}

/// Misses with truncation.
pub fn print_misses(misses: &[Miss], index: &DeclarationIndex) {
    if misses.is_empty() {
        return;
    }

    println!();
    println!("{} ({}):", "Misses".yellow().bold(), misses.len());
    for miss in misses.iter().take(MAX_DISPLAY_ITEMS) {
        let reason = match &miss.reason {
            MissReason::Unresolved(reason) => reason.as_str().to_string(),
            MissReason::Ambiguous(ids) => {
                let keys: Vec<String> = ids
                    .iter()
                    .filter_map(|&id| index.get(id))
                    .map(|d| d.key.to_string())
                    .collect();
                format!("ambiguous between {}", keys.join(", "))
            }
        };
        println!(
            "  {} {} ({}: {}) {}: {}",
            "•".yellow(),
            miss.name,
            miss.range.start,
            miss.range.end,
            miss.file.display(),
            reason.dimmed()
        );
    }
    if misses.len() > MAX_DISPLAY_ITEMS {
        println!("  ... and {} more", misses.len() - MAX_DISPLAY_ITEMS);
    }
}

/// Keys of every target of a resolution.
pub fn describe(resolution: &Resolution, index: &DeclarationIndex) -> String {
    match resolution {
        Resolution::Unresolved(reason) => reason.as_str().to_string(),
        resolved => resolved
            .targets()
            .iter()
            .filter_map(|t| index.get(t.decl))
            .map(|d| d.key.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
