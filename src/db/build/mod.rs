//! Implementation of the `db build` subcommand.
//!
//! Converts the association catalog and clinical-variant TSV exports into
//! the RocksDB that `analysis run` queries.  Records are grouped under
//! their index key (allele-aware for associations, plain variant id for
//! clinical data) and stored as serde_json encoded vectors.

pub mod input;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use indexmap::IndexMap;
use thousands::Separable;

use crate::analysis::catalog::record_key;
use crate::analysis::catalog::rocks::{CF_ASSOCIATIONS, CF_CLINVAR, CF_META};
use crate::analysis::schema::{AssociationRecord, ClinicalVariantRecord};
use crate::common::{self, open_read_maybe_gz, trace_rss_now};

/// Command line arguments for `db build` sub command.
#[derive(Parser, Debug)]
#[command(author, version, about = "Build catalog RocksDB from TSV exports", long_about = None)]
pub struct Args {
    /// Path to the association catalog TSV file (possibly gzip-ed).
    #[clap(long)]
    pub path_associations: String,
    /// Path to the clinical-variant TSV file (possibly gzip-ed).
    #[clap(long)]
    pub path_clinical: String,
    /// Path to the output RocksDB.
    #[clap(long)]
    pub path_out_rocksdb: String,

    /// Optional path to RocksDB WAL directory.
    #[arg(long)]
    pub path_wal_dir: Option<String>,
}

/// Load association records, grouped by their allele-aware index key.
///
/// Malformed rows and rows without a single usable variant id are skipped
/// with a warning; duplicates on `(variant id, trait, reference)` are
/// dropped.
fn load_associations(
    path: &str,
) -> Result<IndexMap<String, Vec<AssociationRecord>>, anyhow::Error> {
    let mut result: IndexMap<String, Vec<AssociationRecord>> = IndexMap::new();
    let mut seen = HashSet::new();
    let mut count_rows = 0;
    let mut count_skipped = 0;

    let reader = open_read_maybe_gz(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    for row in csv_reader.deserialize::<input::AssociationRow>() {
        count_rows += 1;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("skipping malformed association row: {}", e);
                count_skipped += 1;
                continue;
            }
        };
        let Some(record) = row.into_record() else {
            count_skipped += 1;
            continue;
        };
        if !seen.insert((
            record.variant_id.clone(),
            record.trait_name.clone(),
            record.reference_id.clone(),
        )) {
            continue;
        }
        result.entry(record_key(&record)).or_default().push(record);
    }

    tracing::info!(
        "read {} association rows, skipped {}",
        count_rows.separate_with_commas(),
        count_skipped.separate_with_commas()
    );
    Ok(result)
}

/// Load clinical-variant records, grouped by variant id; duplicates on
/// `(variant id, accession)` are dropped.
fn load_clinical(path: &str) -> Result<IndexMap<String, Vec<ClinicalVariantRecord>>, anyhow::Error> {
    let mut result: IndexMap<String, Vec<ClinicalVariantRecord>> = IndexMap::new();
    let mut seen = HashSet::new();
    let mut count_rows = 0;
    let mut count_skipped = 0;

    let reader = open_read_maybe_gz(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    for row in csv_reader.deserialize::<input::ClinicalRow>() {
        count_rows += 1;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("skipping malformed clinical row: {}", e);
                count_skipped += 1;
                continue;
            }
        };
        let record = ClinicalVariantRecord::from(row);
        if !seen.insert((record.variant_id.clone(), record.accession.clone())) {
            continue;
        }
        result
            .entry(record.variant_id.clone())
            .or_default()
            .push(record);
    }

    tracing::info!(
        "read {} clinical rows, skipped {}",
        count_rows.separate_with_commas(),
        count_skipped.separate_with_commas()
    );
    Ok(result)
}

/// Main entry point for `db build` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    tracing::info!("Loading association catalog...");
    let before_loading = Instant::now();
    let associations = load_associations(&args.path_associations)?;
    tracing::info!(
        "... done loading {} association index keys in {:?}",
        associations.len().separate_with_commas(),
        before_loading.elapsed()
    );

    tracing::info!("Loading clinical variants...");
    let before_loading = Instant::now();
    let clinical = load_clinical(&args.path_clinical)?;
    tracing::info!(
        "... done loading {} clinical variants in {:?}",
        clinical.len().separate_with_commas(),
        before_loading.elapsed()
    );

    trace_rss_now();

    tracing::info!("Opening RocksDB...");
    let mut options = rocksdb_utils_lookup::tune_options(
        rocksdb::Options::default(),
        args.path_wal_dir.as_ref().map(|s| s.as_ref()),
    );
    options.create_if_missing(true);
    options.create_missing_column_families(true);
    let cf_names = &[CF_META, CF_ASSOCIATIONS, CF_CLINVAR];
    let cf_descriptors = cf_names
        .iter()
        .map(|name| rocksdb::ColumnFamilyDescriptor::new(*name, options.clone()))
        .collect::<Vec<_>>();

    let db: Arc<rocksdb::DBWithThreadMode<rocksdb::MultiThreaded>> = Arc::new(
        rocksdb::DB::open_cf_descriptors(&options, &args.path_out_rocksdb, cf_descriptors)?,
    );
    tracing::info!("  writing meta information");
    let cf_meta = db
        .cf_handle(CF_META)
        .ok_or_else(|| anyhow::anyhow!("unknown column family: {}", CF_META))?;
    db.put_cf(&cf_meta, "traitscan-worker-version", common::worker_version())?;
    db.put_cf(&cf_meta, "db-name", "trait-catalog")?;
    tracing::info!("... done opening RocksDB");

    tracing::info!("Writing association records...");
    let before_import = Instant::now();
    let cf_associations = db
        .cf_handle(CF_ASSOCIATIONS)
        .ok_or_else(|| anyhow::anyhow!("unknown column family: {}", CF_ASSOCIATIONS))?;
    for (key, records) in &associations {
        db.put_cf(&cf_associations, key.as_bytes(), serde_json::to_vec(records)?)?;
    }
    tracing::info!(
        "... done writing association records in {:?}",
        before_import.elapsed()
    );

    tracing::info!("Writing clinical-variant records...");
    let before_import = Instant::now();
    let cf_clinvar = db
        .cf_handle(CF_CLINVAR)
        .ok_or_else(|| anyhow::anyhow!("unknown column family: {}", CF_CLINVAR))?;
    for (key, records) in &clinical {
        db.put_cf(&cf_clinvar, key.as_bytes(), serde_json::to_vec(records)?)?;
    }
    tracing::info!(
        "... done writing clinical-variant records in {:?}",
        before_import.elapsed()
    );

    tracing::info!("Running RocksDB compaction ...");
    let before_compaction = Instant::now();
    rocksdb_utils_lookup::force_compaction_cf(&db, cf_names, Some("  "), true)?;
    tracing::info!(
        "... done compacting RocksDB in {:?}",
        before_compaction.elapsed()
    );

    trace_rss_now();
    tracing::info!(
        "All of `db build` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
