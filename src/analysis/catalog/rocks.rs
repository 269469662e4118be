//! RocksDB-backed catalog store.

use std::path::Path;
use std::sync::Arc;

use crate::analysis::catalog::{AssociationKey, CatalogStore};
use crate::analysis::schema::{AssociationRecord, ClinicalVariantRecord};

/// Name of the column family for meta information.
pub const CF_META: &str = "meta";
/// Name of the column family for association records.
pub const CF_ASSOCIATIONS: &str = "associations";
/// Name of the column family for clinical-variant records.
pub const CF_CLINVAR: &str = "clinvar";

/// Catalog store backed by the RocksDB written by `db build`.
///
/// The database is opened read-only; values are serde_json encoded record
/// vectors grouped under their index key.
pub struct RocksCatalog {
    /// The RocksDB database handle.
    db: Arc<rocksdb::DBWithThreadMode<rocksdb::MultiThreaded>>,
}

impl RocksCatalog {
    /// Open the catalog RocksDB at `path` read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        tracing::debug!("opening catalog RocksDB at {:?}", path.as_ref());
        let db = rocksdb::DB::open_cf_for_read_only(
            &rocksdb::Options::default(),
            path.as_ref(),
            [CF_META, CF_ASSOCIATIONS, CF_CLINVAR],
            true,
        )?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Fetch a meta value as a string, e.g., the version of the worker
    /// that built the catalog.
    pub fn fetch_meta(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        let cf_meta = self
            .db
            .cf_handle(CF_META)
            .ok_or_else(|| anyhow::anyhow!("unknown column family: {}", CF_META))?;
        let raw_data = self.db.get_cf(&cf_meta, key.as_bytes())?;
        raw_data
            .map(|raw_data| {
                String::from_utf8(raw_data.to_vec())
                    .map_err(|e| anyhow::anyhow!("problem decoding utf8 (key={}): {}", key, e))
            })
            .transpose()
    }

    /// Perform one bulk lookup in column family `cf_name` and decode the
    /// hit values as record vectors.
    fn multi_get<T>(&self, cf_name: &str, keys: &[String]) -> Result<Vec<T>, anyhow::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("unknown column family: {}", cf_name))?;
        let mut result = Vec::new();
        for value in self
            .db
            .multi_get_cf(keys.iter().map(|key| (&cf, key.as_bytes())))
        {
            let value =
                value.map_err(|e| anyhow::anyhow!("problem querying {}: {}", cf_name, e))?;
            if let Some(raw_data) = value {
                let records: Vec<T> = serde_json::from_slice(&raw_data)
                    .map_err(|e| anyhow::anyhow!("problem decoding {} value: {}", cf_name, e))?;
                result.extend(records);
            }
        }
        Ok(result)
    }
}

impl CatalogStore for RocksCatalog {
    fn fetch_associations(
        &self,
        keys: &[AssociationKey],
    ) -> Result<Vec<AssociationRecord>, anyhow::Error> {
        let storage_keys = keys
            .iter()
            .map(AssociationKey::storage_key)
            .collect::<Vec<_>>();
        self.multi_get(CF_ASSOCIATIONS, &storage_keys)
    }

    fn fetch_clinical(
        &self,
        variant_ids: &[String],
    ) -> Result<Vec<ClinicalVariantRecord>, anyhow::Error> {
        self.multi_get(CF_CLINVAR, variant_ids)
    }
}
