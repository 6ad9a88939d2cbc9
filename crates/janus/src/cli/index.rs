//! `janus index` command implementation.

use std::path::Path;

use colored::Colorize;

use super::display::print_warnings;

/// Run the index command.
pub fn run(config: Option<&Path>, scenario: &Path) -> Result<(), janus::Error> {
    println!("{} {}...", "Indexing".cyan().bold(), scenario.display());

    let session = super::open(config, scenario)?;
    let stats = session.generation.index.stats();

    println!();
    println!(
        "{} {} declarations ({} source, {} library), {} aliases",
        "Indexed".green().bold(),
        stats.declarations,
        stats.source_declarations,
        stats.library_declarations,
        stats.aliases
    );
    println!("{}: {}", "Packages".dimmed(), stats.packages);
    println!(
        "{}: {:016x}",
        "Fingerprint".dimmed(),
        session.generation.index.fingerprint()
    );

    print_warnings(&session.generation.warnings);
    Ok(())
}
