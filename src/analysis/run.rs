//! Implementation of the `analysis run` sub command.

use std::io::Write;
use std::time::Instant;

use clap::Parser;
use itertools::Itertools;
use thousands::Separable;

use crate::analysis::aggregate::AnalysisResult;
use crate::analysis::catalog::rocks::RocksCatalog;
use crate::analysis::{analyze, format, AnalyzeOptions, DEFAULT_BATCH_SIZE};
use crate::common::{self, trace_rss_now};

/// Length to which trait names are truncated in the run report log.
const MAX_TRAIT_LOG_LEN: usize = 60;

/// Command line arguments for `analysis run` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Run genome analysis", long_about = None)]
pub struct Args {
    /// Path to the catalog RocksDB built with `db build`.
    #[arg(long, required = true)]
    pub path_db: String,
    /// Path to the genotype file (possibly gzip-ed).
    #[arg(long, required = true)]
    pub path_input: String,
    /// Path to the output JSON file (possibly gzip-ed).
    #[arg(long, required = true)]
    pub path_output: String,

    /// Number of variants per catalog match batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    /// Set the number of threads to use, defaults to number of cores.
    #[arg(long)]
    pub num_threads: Option<usize>,
}

/// Main entry point for `analysis run` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    if let Some(num_threads) = args.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()?;
    }

    tracing::debug!(
        "file name hints at format {}",
        format::detect_from_filename(&args.path_input)
    );

    tracing::info!("Loading genotype file...");
    let content = common::read_to_string_maybe_gz(&args.path_input)?;

    tracing::info!("Opening catalog database...");
    let store = RocksCatalog::open(&args.path_db)?;
    if let Some(version) = store.fetch_meta("traitscan-worker-version")? {
        tracing::debug!("catalog was built with worker version {}", &version);
    }

    trace_rss_now();

    tracing::info!("Running analysis...");
    let before_analysis = Instant::now();
    let result = analyze(
        &content,
        &store,
        &AnalyzeOptions {
            batch_size: args.batch_size,
            cancel: None,
        },
    )?;
    tracing::info!(
        "... done running analysis in {:?}",
        before_analysis.elapsed()
    );

    log_report(&result);

    tracing::info!("Writing results...");
    let mut writer = common::open_write_maybe_gz(&args.path_output)?;
    serde_json::to_writer_pretty(&mut writer, &result)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    trace_rss_now();
    tracing::info!(
        "All of `analysis run` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

/// Log a compact report of the analysis result.
fn log_report(result: &AnalysisResult) {
    tracing::info!(
        "summary: {} variants, {} matched, {} associations, {} with clinical data",
        result.summary.total_variants.separate_with_commas(),
        result.summary.matched_variants.separate_with_commas(),
        result.summary.total_associations.separate_with_commas(),
        result.summary.clinvar_count.separate_with_commas()
    );
    if !result.summary.top_categories.is_empty() {
        tracing::info!(
            "top categories: {}",
            result.summary.top_categories.iter().join(", ")
        );
    }
    for group in &result.category_groups {
        tracing::info!(
            "category {} -- {} associations",
            &group.category,
            group.associations.len().separate_with_commas()
        );
    }
    for (i, assoc) in result.associations.iter().take(10).enumerate() {
        let trait_name = if assoc.trait_name.chars().count() > MAX_TRAIT_LOG_LEN {
            let truncated: String = assoc.trait_name.chars().take(MAX_TRAIT_LOG_LEN).collect();
            format!("{}...", truncated)
        } else {
            assoc.trait_name.clone()
        };
        tracing::info!(
            "top {:2}: {} -- score {:.1} -- {} ({}) -- {}",
            i + 1,
            &trait_name,
            assoc.importance_score,
            &assoc.variant_id,
            &assoc.genotype,
            assoc
                .manual_category
                .as_deref()
                .unwrap_or("Uncategorized")
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::aggregate::AnalysisResult;

    #[test]
    fn run_smoke() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_db = tmp_dir
            .to_path_buf()
            .join("rocksdb")
            .to_str()
            .expect("path is valid utf-8")
            .to_string();
        let path_output = tmp_dir
            .to_path_buf()
            .join("result.json")
            .to_str()
            .expect("path is valid utf-8")
            .to_string();

        let build_args = crate::db::build::Args {
            path_associations: String::from("tests/data/db/build/associations.tsv"),
            path_clinical: String::from("tests/data/db/build/clinical.tsv"),
            path_out_rocksdb: path_db.clone(),
            path_wal_dir: None,
        };
        crate::db::build::run(&crate::common::Args::default(), &build_args)?;

        let args = super::Args {
            path_db,
            path_input: String::from("tests/data/analysis/example_23andme.txt"),
            path_output: path_output.clone(),
            batch_size: super::DEFAULT_BATCH_SIZE,
            num_threads: None,
        };
        super::run(&crate::common::Args::default(), &args)?;

        let result: AnalysisResult =
            serde_json::from_str(&std::fs::read_to_string(&path_output)?)?;

        assert_eq!(3, result.summary.total_variants);
        assert_eq!(3, result.summary.matched_variants);
        assert_eq!(3, result.summary.total_associations);
        assert_eq!(1, result.summary.clinvar_count);
        assert_eq!(3, result.associations.len());
        assert_eq!("rs429358", result.associations[0].variant_id);
        assert_eq!(
            vec!["Alzheimer", "T2D"],
            result
                .category_groups
                .iter()
                .map(|group| group.category.as_str())
                .collect::<Vec<_>>()
        );

        Ok(())
    }
}
