//! In-memory catalog store for tests.

use multimap::MultiMap;

use crate::analysis::catalog::{record_key, AssociationKey, CatalogStore};
use crate::analysis::schema::{AssociationRecord, ClinicalVariantRecord};

/// Catalog store backed by in-process multi-maps.
#[derive(Debug, Default)]
pub struct MemCatalog {
    /// Association records by storage key.
    associations: MultiMap<String, AssociationRecord>,
    /// Clinical-variant records by variant id.
    clinical: MultiMap<String, ClinicalVariantRecord>,
}

impl MemCatalog {
    /// Build the store from plain record lists, indexing the same way the
    /// catalog build does.
    pub fn new(
        associations: Vec<AssociationRecord>,
        clinical: Vec<ClinicalVariantRecord>,
    ) -> Self {
        let mut result = Self::default();
        for record in associations {
            result.associations.insert(record_key(&record), record);
        }
        for record in clinical {
            result.clinical.insert(record.variant_id.clone(), record);
        }
        result
    }
}

impl CatalogStore for MemCatalog {
    fn fetch_associations(
        &self,
        keys: &[AssociationKey],
    ) -> Result<Vec<AssociationRecord>, anyhow::Error> {
        let mut result = Vec::new();
        for key in keys {
            if let Some(records) = self.associations.get_vec(&key.storage_key()) {
                result.extend(records.iter().cloned());
            }
        }
        Ok(result)
    }

    fn fetch_clinical(
        &self,
        variant_ids: &[String],
    ) -> Result<Vec<ClinicalVariantRecord>, anyhow::Error> {
        let mut result = Vec::new();
        for variant_id in variant_ids {
            if let Some(records) = self.clinical.get_vec(variant_id) {
                result.extend(records.iter().cloned());
            }
        }
        Ok(result)
    }
}

/// Catalog store whose lookups always fail; simulates store outage.
#[derive(Debug)]
pub struct FailingCatalog;

impl CatalogStore for FailingCatalog {
    fn fetch_associations(
        &self,
        _keys: &[AssociationKey],
    ) -> Result<Vec<AssociationRecord>, anyhow::Error> {
        anyhow::bail!("connection refused")
    }

    fn fetch_clinical(
        &self,
        _variant_ids: &[String],
    ) -> Result<Vec<ClinicalVariantRecord>, anyhow::Error> {
        anyhow::bail!("connection refused")
    }
}
