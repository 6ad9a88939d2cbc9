//! `janus at` command implementation.

use std::path::Path;

use colored::Colorize;
use janus::Resolution;

use super::display::describe;

/// Run the at command.
pub fn run(
    config: Option<&Path>,
    scenario: &Path,
    file: &Path,
    offset: u32,
) -> Result<(), janus::Error> {
    let session = super::open(config, scenario)?;
    let Some(source) = session.scenario.file(file) else {
        return Err(janus::Error::Config(format!(
            "{} is not part of the scenario",
            file.display()
        )));
    };

    let index = &session.generation.index;
    match session.janus.resolution_at(source, offset) {
        Some(Resolution::Unique(target)) => {
            let Some(decl) = index.get(target.decl) else {
                return Err(janus::Error::UnknownDeclaration(target.decl.to_string()));
            };
            println!("{} {}", decl.kind.as_str().cyan().bold(), decl.key);
            if let Some(tag) = target.via.synthetic() {
                println!("  {}: {tag}", "via".dimmed());
            }
            if let Some(location) = &decl.source {
                println!(
                    "  {}: {} ({})",
                    "declared".dimmed(),
                    location.file.display(),
                    location.name_range
                );
            }
        }
        Some(resolution @ Resolution::Ambiguous(_)) => {
            println!(
                "{} {}",
                "Ambiguous".yellow().bold(),
                describe(&resolution, index)
            );
        }
        Some(Resolution::Unresolved(reason)) => {
            println!("{}: {reason}", "Unresolved".red().bold());
        }
        None => {
            println!("{}", "Nothing at this offset".dimmed());
        }
    }
    Ok(())
}
