//! Catalog store access and batched, allele-aware matching.
//!
//! Matching a user variant against the association catalog is allele
//! aware: for each variant the distinct alleles of its genotype form
//! `(variant id, allele)` pairs, and one bulk lookup per batch joins the
//! deduplicated pair set against the `(variant id, effect allele)` index
//! of the catalog.  This bounds both the query count (one per batch) and
//! the result set (only alleles the user actually carries).  Records
//! without a usable effect allele are indexed under [`UNKNOWN_ALLELE`] and
//! fetched for every matched variant id.

#[cfg(test)]
pub mod mem;
pub mod rocks;

use std::collections::{BTreeMap, HashSet};

use crate::analysis::schema::{AssociationRecord, ClinicalVariantRecord, UserVariant};
use crate::analysis::AnalysisError;

/// Placeholder allele for records without a usable effect allele.
pub const UNKNOWN_ALLELE: char = '?';

/// Key into the allele-aware association index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssociationKey {
    /// Variant identifier.
    pub variant_id: String,
    /// Single-character allele, or [`UNKNOWN_ALLELE`].
    pub allele: char,
}

impl AssociationKey {
    /// Construct a new key.
    pub fn new(variant_id: &str, allele: char) -> Self {
        Self {
            variant_id: variant_id.to_string(),
            allele,
        }
    }

    /// The string representation used as storage key.
    pub fn storage_key(&self) -> String {
        format!("{}|{}", self.variant_id, self.allele)
    }
}

/// Derive the storage key under which an association record is indexed.
pub fn record_key(record: &AssociationRecord) -> String {
    AssociationKey::new(
        &record.variant_id,
        record.effect_allele.unwrap_or(UNKNOWN_ALLELE),
    )
    .storage_key()
}

/// Read access to the association and clinical-variant catalogs.
///
/// Implementations perform one bulk lookup per call; a key or variant id
/// without catalog data simply contributes no rows.  Errors mean the
/// store itself is unavailable and are fatal for the batch.
pub trait CatalogStore: Send + Sync {
    /// Bulk lookup of association records by `(variant id, allele)` keys.
    fn fetch_associations(
        &self,
        keys: &[AssociationKey],
    ) -> Result<Vec<AssociationRecord>, anyhow::Error>;

    /// Bulk lookup of clinical-variant records by variant id.
    fn fetch_clinical(
        &self,
        variant_ids: &[String],
    ) -> Result<Vec<ClinicalVariantRecord>, anyhow::Error>;
}

/// Result of matching one batch of user variants, grouped by variant id.
#[derive(Debug, Default)]
pub struct BatchMatch {
    /// Association records by variant id.
    pub associations: BTreeMap<String, Vec<AssociationRecord>>,
    /// Clinical-variant records by variant id.
    pub clinical: BTreeMap<String, Vec<ClinicalVariantRecord>>,
}

impl BatchMatch {
    /// Merge another batch into this one.  Batches partition the variant
    /// ids, so merging is plain insertion.
    pub fn merge(&mut self, other: BatchMatch) {
        self.associations.extend(other.associations);
        self.clinical.extend(other.clinical);
    }
}

/// Match one batch of user variants against the catalog.
pub fn match_batch(
    store: &dyn CatalogStore,
    variants: &[&UserVariant],
) -> Result<BatchMatch, AnalysisError> {
    // Deduplicated (variant id, allele) pair set over the whole batch.
    let mut keys = Vec::new();
    let mut seen = HashSet::new();
    for variant in variants {
        for allele in variant
            .alleles()
            .into_iter()
            .chain(std::iter::once(UNKNOWN_ALLELE))
        {
            let key = AssociationKey::new(&variant.variant_id, allele);
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
    }

    let rows = store
        .fetch_associations(&keys)
        .map_err(AnalysisError::CatalogUnavailable)?;
    let mut associations: BTreeMap<String, Vec<AssociationRecord>> = BTreeMap::new();
    for row in rows {
        associations
            .entry(row.variant_id.clone())
            .or_default()
            .push(row);
    }

    let variant_ids = variants
        .iter()
        .map(|variant| variant.variant_id.clone())
        .collect::<Vec<_>>();
    let clinical_rows = store
        .fetch_clinical(&variant_ids)
        .map_err(AnalysisError::CatalogUnavailable)?;
    let mut clinical: BTreeMap<String, Vec<ClinicalVariantRecord>> = BTreeMap::new();
    for row in clinical_rows {
        clinical
            .entry(row.variant_id.clone())
            .or_default()
            .push(row);
    }

    Ok(BatchMatch {
        associations,
        clinical,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::schema::EffectMeasure;

    use super::*;

    fn user_variant(variant_id: &str, genotype: &str) -> UserVariant {
        UserVariant {
            variant_id: variant_id.to_string(),
            chromosome: String::from("1"),
            position: String::from("12345"),
            genotype: genotype.to_string(),
        }
    }

    fn association(variant_id: &str, trait_name: &str, allele: Option<char>) -> AssociationRecord {
        AssociationRecord {
            variant_id: variant_id.to_string(),
            trait_name: trait_name.to_string(),
            effect_allele: allele,
            effect_measure: EffectMeasure::Unknown,
            ..Default::default()
        }
    }

    #[test]
    fn storage_keys() {
        assert_eq!(
            "rs429358|T",
            AssociationKey::new("rs429358", 'T').storage_key()
        );
        assert_eq!(
            "rs429358|?",
            record_key(&association("rs429358", "Trait", None))
        );
        assert_eq!(
            "rs429358|C",
            record_key(&association("rs429358", "Trait", Some('C')))
        );
    }

    #[test]
    fn match_batch_is_allele_aware() -> Result<(), AnalysisError> {
        let store = mem::MemCatalog::new(
            vec![
                association("rs100", "Matching allele", Some('A')),
                association("rs100", "Other allele", Some('T')),
                association("rs100", "No allele", None),
                association("rs200", "Unrelated", Some('C')),
            ],
            vec![],
        );

        let variants = [user_variant("rs100", "AG")];
        let refs = variants.iter().collect::<Vec<_>>();
        let result = match_batch(&store, &refs)?;

        let traits = result.associations["rs100"]
            .iter()
            .map(|record| record.trait_name.as_str())
            .collect::<Vec<_>>();
        // The T-allele record is bounded away, the allele-less record is
        // always fetched.
        assert_eq!(vec!["Matching allele", "No allele"], traits);
        assert!(!result.associations.contains_key("rs200"));

        Ok(())
    }

    #[test]
    fn match_batch_no_match_is_empty_not_error() -> Result<(), AnalysisError> {
        let store = mem::MemCatalog::new(vec![], vec![]);

        let variants = [user_variant("rs999", "AA")];
        let refs = variants.iter().collect::<Vec<_>>();
        let result = match_batch(&store, &refs)?;

        assert!(result.associations.is_empty());
        assert!(result.clinical.is_empty());

        Ok(())
    }

    #[test]
    fn match_batch_groups_clinical_by_variant() -> Result<(), AnalysisError> {
        let store = mem::MemCatalog::new(
            vec![],
            vec![
                ClinicalVariantRecord {
                    variant_id: String::from("rs100"),
                    accession: String::from("RCV000000001"),
                    ..Default::default()
                },
                ClinicalVariantRecord {
                    variant_id: String::from("rs100"),
                    accession: String::from("RCV000000002"),
                    ..Default::default()
                },
            ],
        );

        let variants = [user_variant("rs100", "AA"), user_variant("rs300", "CC")];
        let refs = variants.iter().collect::<Vec<_>>();
        let result = match_batch(&store, &refs)?;

        assert_eq!(2, result.clinical["rs100"].len());
        assert!(!result.clinical.contains_key("rs300"));

        Ok(())
    }

    #[test]
    fn match_batch_propagates_store_failure() {
        let store = mem::FailingCatalog;

        let variants = [user_variant("rs100", "AA")];
        let refs = variants.iter().collect::<Vec<_>>();
        let result = match_batch(&store, &refs);

        assert!(matches!(result, Err(AnalysisError::CatalogUnavailable(_))));
    }
}
