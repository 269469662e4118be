//! Implementation of the `analysis page` sub command.
//!
//! Reads a stored analysis result document and returns one page of a
//! category group, the same view the server hands to the web layer.

use std::io::Write;
use std::time::Instant;

use clap::Parser;

use crate::analysis::aggregate::AnalysisResult;
use crate::common;

/// Command line arguments for `analysis page` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Page stored analysis results", long_about = None)]
pub struct Args {
    /// Path to the analysis result JSON file (possibly gzip-ed).
    #[arg(long, required = true)]
    pub path_results: String,
    /// Name of the category group to page.
    #[arg(long, required = true)]
    pub category: String,

    /// Offset into the (filtered) category group.
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// Maximal number of entries to return; must be positive.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
    /// Only consider associations with at least this importance score.
    #[arg(long)]
    pub min_importance: Option<f64>,
    /// Optional path to the output JSON file; stdout when missing.
    #[arg(long)]
    pub path_output: Option<String>,
}

/// Main entry point for `analysis page` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    anyhow::ensure!(args.limit > 0, "--limit must be positive");

    tracing::info!("Loading analysis results...");
    let content = common::read_to_string_maybe_gz(&args.path_results)?;
    let result: AnalysisResult = serde_json::from_str(&content)?;

    let page = result.page(&args.category, args.offset, args.limit, args.min_importance);
    tracing::info!(
        "returning {} of {} entries in category {:?}",
        page.items.len(),
        page.total_count,
        &args.category
    );

    if let Some(path_output) = &args.path_output {
        let mut writer = common::open_write_maybe_gz(path_output)?;
        serde_json::to_writer_pretty(&mut writer, &page)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &page)?;
        handle.write_all(b"\n")?;
    }

    tracing::info!(
        "All of `analysis page` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
