//! `janus usages` command implementation.

use std::path::Path;

use colored::Colorize;
use janus::{CancellationToken, DeclKey, UsageCategory};

use super::display::{print_misses, print_occurrence, print_warnings};

/// Run the usages command.
pub fn run(
    config: Option<&Path>,
    scenario: &Path,
    key: &str,
    expect_files: Option<usize>,
    json: bool,
) -> Result<(), janus::Error> {
    let key: DeclKey = key.parse()?;
    let session = super::open(config, scenario)?;
    let declared = expect_files.or(session.scenario.expected_files);

    let report = session.janus.find_usages_with(
        &key,
        &session.scenario.files,
        declared,
        &CancellationToken::new(),
    )?;

    if json {
        let text = serde_json::to_string_pretty(&report)?;
        println!("{text}");
        return Ok(());
    }

    let index = &session.generation.index;
    println!("{} {}", "Usages of".cyan().bold(), key.to_string().white().bold());

    if report.files.is_empty() {
        println!("  {}", "No usages found".dimmed());
    }
    for file in &report.files {
        println!();
        println!(
            "  {} ({})",
            file.file.display().to_string().white().bold(),
            file.language
        );
        for occurrence in &file.occurrences {
            print_occurrence(occurrence, index);
        }
    }

    println!();
    println!("{} {}", "Total:".bold(), report.total());
    for category in UsageCategory::ALL {
        let count = report.count(category);
        if count > 0 {
            println!("  {:<16} {count}", category.as_str());
        }
    }

    let completeness = report.completeness;
    match (completeness.declared, completeness.is_complete()) {
        (Some(declared), Some(true)) => println!(
            "{}: scanned {} of {declared} declared files",
            "Complete".green(),
            completeness.scanned
        ),
        (Some(declared), _) => println!(
            "{}: scanned {} of {declared} declared files",
            "Incomplete".yellow().bold(),
            completeness.scanned
        ),
        (None, _) => println!("{}: {} files", "Scanned".dimmed(), completeness.scanned),
    }

    print_misses(&report.misses, index);
    print_warnings(&session.generation.warnings);
    Ok(())
}
