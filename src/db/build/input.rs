//! Input records for the catalog TSV exports.
//!
//! Note that not the full column set is modeled, only the parts that are
//! needed for building the catalog database.

use crate::analysis::schema::{AssociationRecord, ClinicalVariantRecord, EffectMeasure};

/// One row of the association catalog TSV export.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AssociationRow {
    /// Variant identifier(s); multi-variant haplotype rows are skipped.
    #[serde(rename = "SNPS", default)]
    pub snps: String,
    /// Trait or disease name.
    #[serde(rename = "DISEASE/TRAIT", default)]
    pub disease_trait: String,
    /// Ontology-mapped trait name.
    #[serde(rename = "MAPPED_TRAIT", default)]
    pub mapped_trait: Option<String>,
    /// P-value in scientific notation.
    #[serde(rename = "P-VALUE", default)]
    pub p_value: Option<String>,
    /// Variant and risk allele, e.g., "rs429358-C".
    #[serde(rename = "STRONGEST SNP-RISK ALLELE", default)]
    pub strongest_snp_risk_allele: Option<String>,
    /// Effect size, either odds ratio or beta.
    #[serde(rename = "OR or BETA", default)]
    pub or_or_beta: Option<String>,
    /// Confidence interval text; used to tell betas from odds ratios.
    #[serde(rename = "95% CI (TEXT)", default)]
    pub ci_text: Option<String>,
    /// Risk allele frequency in the study population.
    #[serde(rename = "RISK ALLELE FREQUENCY", default)]
    pub risk_allele_frequency: Option<String>,
    /// Study description.
    #[serde(rename = "STUDY", default)]
    pub study: Option<String>,
    /// Literature reference identifier.
    #[serde(rename = "PUBMEDID", default)]
    pub pubmed_id: Option<String>,
    /// Chromosome of the variant.
    #[serde(rename = "CHR_ID", default)]
    pub chr_id: Option<String>,
    /// Position of the variant.
    #[serde(rename = "CHR_POS", default)]
    pub chr_pos: Option<String>,
    /// Mapped gene symbol(s).
    #[serde(rename = "MAPPED_GENE", default)]
    pub mapped_gene: Option<String>,
}

/// CI text fragments that mark the effect size as a beta value.
const BETA_INDICATORS: &[&str] = &[
    "unit increase",
    "unit decrease",
    "sd increase",
    "sd decrease",
    "sd unit",
    "cm increase",
    "cm decrease",
    "mm increase",
    "mm decrease",
    "kg increase",
    "kg decrease",
    "z score",
    "z-score",
    "year increase",
    "year decrease",
    "mmol/l",
    "mg/dl",
    "mg/l",
];

/// Parse the effect allele from the "STRONGEST SNP-RISK ALLELE" column:
/// the token after the last dash, when it is a single ACGT letter.
fn parse_effect_allele(raw: &str) -> Option<char> {
    let (_, token) = raw.rsplit_once('-')?;
    let token = token.trim().to_uppercase();
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(allele @ ('A' | 'C' | 'G' | 'T')), None) => Some(allele),
        _ => None,
    }
}

/// Classify the effect size value as odds ratio or beta.
///
/// The CI text is the reliable signal when present; otherwise fall back
/// to a value heuristic.  Reciprocal odds ratios stay odds ratios.
fn effect_measure(value: Option<f64>, ci_text: &str) -> EffectMeasure {
    let value = match value {
        Some(value) if value != 0.0 => value,
        _ => return EffectMeasure::Unknown,
    };

    let ci_lower = ci_text.to_lowercase();
    if BETA_INDICATORS
        .iter()
        .any(|indicator| ci_lower.contains(indicator))
    {
        return EffectMeasure::Beta;
    }
    if ci_lower.contains("reciprocal") {
        return EffectMeasure::OddsRatio;
    }

    if value >= 1.01 {
        EffectMeasure::OddsRatio
    } else if (-1.0..=1.0).contains(&value) {
        EffectMeasure::Beta
    } else {
        EffectMeasure::OddsRatio
    }
}

impl AssociationRow {
    /// Convert the row into an [`AssociationRecord`].
    ///
    /// Returns `None` for rows without a single usable variant id
    /// (haplotype and interaction rows list several).
    pub fn into_record(self) -> Option<AssociationRecord> {
        let variant_id = self.snps.trim().to_string();
        if !(variant_id.starts_with("rs") || variant_id.starts_with('i'))
            || variant_id.contains(';')
            || variant_id.contains(char::is_whitespace)
        {
            return None;
        }

        let effect_allele = self
            .strongest_snp_risk_allele
            .as_deref()
            .and_then(parse_effect_allele);
        let effect_value = self
            .or_or_beta
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(str::to_string);
        let effect_measure = effect_measure(
            effect_value.as_deref().and_then(|raw| raw.parse().ok()),
            self.ci_text.as_deref().unwrap_or(""),
        );

        Some(AssociationRecord {
            variant_id,
            trait_name: self.disease_trait.trim().to_string(),
            trait_category: self.mapped_trait.filter(|s| !s.is_empty()),
            p_value: self.p_value.filter(|s| !s.is_empty()),
            effect_allele,
            effect_measure,
            effect_value,
            risk_allele_frequency: self.risk_allele_frequency.filter(|s| !s.is_empty()),
            study_description: self.study.filter(|s| !s.is_empty()),
            reference_id: self.pubmed_id.filter(|s| !s.is_empty()),
            chromosome: self.chr_id.filter(|s| !s.is_empty()),
            position: self.chr_pos.filter(|s| !s.is_empty()),
            mapped_gene: self.mapped_gene.filter(|s| !s.is_empty()),
        })
    }
}

/// One row of the clinical-variant TSV export.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClinicalRow {
    /// Variant identifier.
    pub variant_id: String,
    /// Gene symbol.
    #[serde(default)]
    pub gene: Option<String>,
    /// Submission accession.
    pub accession: String,
    /// Clinical significance free text.
    #[serde(default)]
    pub clinical_significance: Option<String>,
    /// Condition name.
    #[serde(default)]
    pub condition: Option<String>,
    /// Review status free text.
    #[serde(default)]
    pub review_status: Option<String>,
    /// Date of last evaluation.
    #[serde(default)]
    pub last_evaluated: Option<String>,
    /// Number of submitters.
    #[serde(default)]
    pub number_submitters: Option<u32>,
}

impl From<ClinicalRow> for ClinicalVariantRecord {
    fn from(row: ClinicalRow) -> Self {
        ClinicalVariantRecord {
            variant_id: row.variant_id.trim().to_string(),
            gene: row.gene.filter(|s| !s.is_empty()),
            accession: row.accession.trim().to_string(),
            clinical_significance: row.clinical_significance.filter(|s| !s.is_empty()),
            condition: row.condition.filter(|s| !s.is_empty()),
            review_status: row.review_status.filter(|s| !s.is_empty()),
            last_evaluated: row.last_evaluated.filter(|s| !s.is_empty()),
            number_submitters: row.number_submitters,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("rs429358-C", Some('C'))]
    #[case("rs429358-c", Some('C'))]
    #[case("rs7412-?", None)]
    #[case("rs123", None)]
    #[case("rs123-CT", None)]
    #[case("rs1234-56-T", Some('T'))]
    fn parse_effect_allele_cases(#[case] raw: &str, #[case] expected: Option<char>) {
        assert_eq!(expected, parse_effect_allele(raw));
    }

    #[rstest]
    #[case(Some(1.4), "[1.2-1.6]", EffectMeasure::OddsRatio)]
    #[case(Some(0.04), "[0.02-0.06] unit increase", EffectMeasure::Beta)]
    #[case(Some(1.2), "[NR] sd decrease", EffectMeasure::Beta)]
    #[case(Some(1.3), "(OR reciprocal)", EffectMeasure::OddsRatio)]
    #[case(Some(0.5), "", EffectMeasure::Beta)]
    #[case(Some(-0.7), "", EffectMeasure::Beta)]
    #[case(Some(2.5), "", EffectMeasure::OddsRatio)]
    #[case(Some(-3.0), "", EffectMeasure::OddsRatio)]
    #[case(Some(0.0), "", EffectMeasure::Unknown)]
    #[case(None, "[1.2-1.6]", EffectMeasure::Unknown)]
    fn effect_measure_cases(
        #[case] value: Option<f64>,
        #[case] ci_text: &str,
        #[case] expected: EffectMeasure,
    ) {
        assert_eq!(expected, effect_measure(value, ci_text));
    }

    fn row(snps: &str) -> AssociationRow {
        AssociationRow {
            snps: snps.to_string(),
            disease_trait: String::from("Type 2 diabetes"),
            mapped_trait: Some(String::from("type II diabetes mellitus")),
            p_value: Some(String::from("2E-31")),
            strongest_snp_risk_allele: Some(format!("{}-T", snps)),
            or_or_beta: Some(String::from("1.37")),
            ci_text: Some(String::from("[1.31-1.43]")),
            risk_allele_frequency: Some(String::from("0.25")),
            study: Some(String::from("Genome-wide association study")),
            pubmed_id: Some(String::from("17293876")),
            chr_id: Some(String::from("10")),
            chr_pos: Some(String::from("112998590")),
            mapped_gene: Some(String::from("TCF7L2")),
        }
    }

    #[test]
    fn into_record_happy_path() {
        let record = row("rs7903146").into_record().expect("usable row");

        assert_eq!("rs7903146", record.variant_id);
        assert_eq!("Type 2 diabetes", record.trait_name);
        assert_eq!(Some('T'), record.effect_allele);
        assert_eq!(EffectMeasure::OddsRatio, record.effect_measure);
        assert_eq!(Some(String::from("1.37")), record.effect_value);
        assert_eq!(Some(String::from("17293876")), record.reference_id);
    }

    #[rstest]
    #[case("rs123; rs456")]
    #[case("rs123 x rs456")]
    #[case("chr10:12345")]
    #[case("")]
    fn into_record_skips_unusable_ids(#[case] snps: &str) {
        assert!(row(snps).into_record().is_none());
    }
}
