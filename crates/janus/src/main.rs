//! Janus CLI - cross-language find-usages from the command line.
//!
//! Janus reads a scenario (front-end output plus library artifacts as JSON),
//! builds the declaration index, and answers usage queries against it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// Janus: Cross-language find-usages for Kotlin and Java.
#[derive(Parser)]
#[command(name = "janus")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index for a scenario and report what was skipped
    Index {
        /// Scenario JSON file
        scenario: PathBuf,
    },

    /// Find usages of a declaration
    Usages {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Declaration key (e.g., "`method:com.acme/Foo.run#(I)V`")
        key: String,

        /// Number of files the project declares (overrides the scenario)
        #[arg(long)]
        expect_files: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the declaration at a file offset
    At {
        /// Scenario JSON file
        scenario: PathBuf,

        /// File path as it appears in the scenario
        file: PathBuf,

        /// Byte offset inside the file
        offset: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Index { scenario } => cli::index::run(config, &scenario),
        Commands::Usages {
            scenario,
            key,
            expect_files,
            json,
        } => cli::usages::run(config, &scenario, &key, expect_files, json),
        Commands::At {
            scenario,
            file,
            offset,
        } => cli::at::run(config, &scenario, &file, offset),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
