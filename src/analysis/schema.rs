//! Data structures for user variants and catalog records.

/// One variant call from the uploaded genotype file.
///
/// There is one entry per distinct variant identifier; no-call entries are
/// dropped by the parser before matching.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserVariant {
    /// Variant identifier, e.g., "rs429358".
    pub variant_id: String,
    /// Chromosome name as given in the file.
    pub chromosome: String,
    /// Position as given in the file (kept as string, builds differ).
    pub position: String,
    /// Two-letter genotype call, e.g., "AG" (single letter on hemizygous
    /// chromosomes).
    pub genotype: String,
}

impl UserVariant {
    /// Return the distinct single-character alleles of the genotype, in
    /// order of first occurrence.
    pub fn alleles(&self) -> Vec<char> {
        let mut result = Vec::new();
        for c in self.genotype.chars() {
            if !result.contains(&c) {
                result.push(c);
            }
        }
        result
    }
}

/// Kind of the effect measure reported by an association study.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EffectMeasure {
    /// Odds ratio (relative risk multiplier).
    OddsRatio,
    /// Regression coefficient on a quantitative trait.
    Beta,
    /// Could not be determined from the catalog export.
    #[default]
    Unknown,
}

/// One published variant-trait association from the catalog.
///
/// Read-only from the engine's perspective; unique by
/// `(variant_id, trait_name, reference_id)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssociationRecord {
    /// Variant identifier.
    pub variant_id: String,
    /// Trait or disease name.
    pub trait_name: String,
    /// Free-text trait category from the catalog, if any.
    pub trait_category: Option<String>,
    /// P-value as reported, e.g. "5E-8".
    pub p_value: Option<String>,
    /// Effect (risk) allele, if a single base could be determined.
    pub effect_allele: Option<char>,
    /// Kind of the effect measure value.
    pub effect_measure: EffectMeasure,
    /// Effect measure value as reported.
    pub effect_value: Option<String>,
    /// Risk allele frequency in the study population, as reported.
    pub risk_allele_frequency: Option<String>,
    /// Short study description.
    pub study_description: Option<String>,
    /// Literature reference identifier (e.g., PubMed).
    pub reference_id: Option<String>,
    /// Chromosome of the variant, if mapped.
    pub chromosome: Option<String>,
    /// Position of the variant, if mapped.
    pub position: Option<String>,
    /// Mapped gene symbol(s), if any.
    pub mapped_gene: Option<String>,
}

/// One clinical-variant database submission for a variant.
///
/// Multiple records may exist per variant (one per submission); unique by
/// `(variant_id, accession)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClinicalVariantRecord {
    /// Variant identifier.
    pub variant_id: String,
    /// Gene symbol, if known.
    pub gene: Option<String>,
    /// Submission accession.
    pub accession: String,
    /// Clinical significance as submitted (free text).
    pub clinical_significance: Option<String>,
    /// Condition name, if any.
    pub condition: Option<String>,
    /// Review status as submitted (free text).
    pub review_status: Option<String>,
    /// Date of last evaluation, as submitted.
    pub last_evaluated: Option<String>,
    /// Number of submitters behind the record.
    pub number_submitters: Option<u32>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("AG", &['A', 'G'])]
    #[case("AA", &['A'])]
    #[case("A", &['A'])]
    #[case("DI", &['D', 'I'])]
    fn user_variant_alleles(#[case] genotype: &str, #[case] expected: &[char]) {
        let variant = UserVariant {
            variant_id: String::from("rs42"),
            chromosome: String::from("1"),
            position: String::from("12345"),
            genotype: genotype.to_string(),
        };

        assert_eq!(expected.to_vec(), variant.alleles());
    }

    #[test]
    fn effect_measure_display() {
        assert_eq!("odds_ratio", format!("{}", EffectMeasure::OddsRatio));
        assert_eq!("beta", format!("{}", EffectMeasure::Beta));
        assert_eq!("unknown", format!("{}", EffectMeasure::Unknown));
    }
}
