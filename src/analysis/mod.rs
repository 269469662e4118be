//! Genome analysis: matching user variants against the catalogs and
//! scoring, classifying, and aggregating the results.
//!
//! The pipeline is sequential (parse, batched match, score, classify,
//! aggregate); only the match batches run concurrently since they are
//! independent and read-only against the catalog.  The merge after the
//! batch stage is deterministic by variant id.

pub mod aggregate;
pub mod catalog;
pub mod classify;
pub mod clinvar;
pub mod format;
pub mod page;
pub mod parse;
pub mod run;
pub mod schema;
pub mod score;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use thousands::Separable;

use aggregate::{AnalysisResult, RunCounts};
use catalog::{match_batch, BatchMatch, CatalogStore};

/// Default number of variants per catalog match batch.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Errors that abort an analysis run.
///
/// Per-record data quality issues (malformed genotype lines, unparseable
/// numeric fields) are not errors; those degrade to skipped lines or zero
/// score contributions.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The input does not look like the supported genotype format.
    #[error("unsupported genotype file format: {0}")]
    UnsupportedFormat(format::FileFormat),
    /// A catalog store call failed; fatal for the whole run.
    #[error("catalog store unavailable: {0}")]
    CatalogUnavailable(#[source] anyhow::Error),
    /// The run was cancelled by the caller.
    #[error("analysis run cancelled")]
    Cancelled,
}

/// Options for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Number of variants per catalog match batch; 0 falls back to
    /// [`DEFAULT_BATCH_SIZE`].
    pub batch_size: usize,
    /// Cooperative cancellation flag, checked between batches.  On
    /// cancellation the run fails as a whole; results from completed
    /// batches are discarded.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl AnalyzeOptions {
    fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            self.batch_size
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

/// Run the full analysis pipeline on genotype file content.
pub fn analyze(
    content: &str,
    store: &dyn CatalogStore,
    options: &AnalyzeOptions,
) -> Result<AnalysisResult, AnalysisError> {
    let variants = parse::parse(content)?;
    tracing::info!(
        "parsed {} variants from genotype file",
        variants.len().separate_with_commas()
    );

    let all_variants = variants.values().collect::<Vec<_>>();
    let matched = all_variants
        .chunks(options.effective_batch_size())
        .collect::<Vec<_>>()
        .par_iter()
        .map(|batch| {
            if options.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            match_batch(store, batch)
        })
        .try_reduce(BatchMatch::default, |mut merged, batch| {
            merged.merge(batch);
            Ok(merged)
        })?;
    if options.is_cancelled() {
        return Err(AnalysisError::Cancelled);
    }
    tracing::info!(
        "matched {} variants against the catalog",
        matched.associations.len().separate_with_commas()
    );

    let categories = classify::CuratedCategories::new();
    let mut counts = RunCounts {
        total_variants: variants.len(),
        ..Default::default()
    };
    let mut scored = Vec::new();
    for variant in variants.values() {
        let records = match matched.associations.get(&variant.variant_id) {
            Some(records) if !records.is_empty() => records,
            _ => continue,
        };
        counts.matched_variants += 1;
        counts.total_associations += records.len();

        let clinical_records = matched
            .clinical
            .get(&variant.variant_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let clinvar_info = clinvar::score_clinical(clinical_records);
        if let Some(info) = &clinvar_info {
            counts.clinvar_count += 1;
            tracing::trace!(
                "variant {} has {} clinical submissions",
                &variant.variant_id,
                info.submission_count()
            );
        }

        for record in records {
            let mut assoc = score::score_association(variant, record, clinvar_info.as_ref());
            assoc.manual_category = categories
                .classify(&record.variant_id, &record.trait_name)
                .map(str::to_string);
            if assoc.trait_category.is_none() {
                assoc.trait_category = Some(classify::trait_category(&record.trait_name).to_string());
            }
            scored.push(assoc);
        }
    }

    Ok(aggregate::aggregate(counts, scored))
}
