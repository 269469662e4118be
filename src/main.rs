//! Traitscan Worker main executable

pub mod analysis;
pub mod common;
pub mod db;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Traitscan server heavy lifting",
    long_about = "This tool performs the heavy lifting for traitscan-server"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Catalog database related commands.
    Db(Db),
    /// Genome analysis related commands.
    Analysis(Analysis),
}

/// Parsing of "db *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Db {
    /// The sub command to run
    #[command(subcommand)]
    command: DbCommands,
}

/// Enum supporting the parsing of "db *" sub commands.
#[derive(Debug, Subcommand)]
enum DbCommands {
    Build(db::build::Args),
}

/// Parsing of "analysis *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Analysis {
    /// The sub command to run
    #[command(subcommand)]
    command: AnalysisCommands,
}

/// Enum supporting the parsing of "analysis *" sub commands.
#[derive(Debug, Subcommand)]
enum AnalysisCommands {
    Run(analysis::run::Args),
    Page(analysis::page::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Db(db) => match &db.command {
                DbCommands::Build(args) => {
                    db::build::run(&cli.common, args)?;
                }
            },
            Commands::Analysis(analysis) => match &analysis.command {
                AnalysisCommands::Run(args) => {
                    analysis::run::run(&cli.common, args)?;
                }
                AnalysisCommands::Page(args) => {
                    analysis::page::run(&cli.common, args)?;
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
