//! Importance scoring and risk-level classification of associations.

use crate::analysis::clinvar::ClinvarInfo;
use crate::analysis::schema::{AssociationRecord, EffectMeasure, UserVariant};

/// Cap for the p-value component of the importance score.
pub const MAX_P_VALUE_SCORE: f64 = 50.0;

/// Risk allele frequency above which a variant counts as common.
const COMMON_FREQUENCY: f64 = 0.8;

/// Compute the p-value component of the importance score.
///
/// Parseable positive p-values contribute `-log10(p)`, clamped to
/// `[0, 50]` so that malformed or extreme catalog values can neither turn
/// the score negative nor dominate the ordering.  Everything else
/// contributes zero.
pub fn p_value_score(p_value: Option<&str>) -> f64 {
    p_value
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|p| *p > 0.0)
        .map(|p| (-p.log10()).clamp(0.0, MAX_P_VALUE_SCORE))
        .unwrap_or(0.0)
}

/// Compute the importance score of one association.
///
/// The p-value component is doubled up with twice the maximal clinical
/// significance score when clinical data exists for the variant.
pub fn importance_score(p_value: Option<&str>, clinvar: Option<&ClinvarInfo>) -> f64 {
    let mut score = p_value_score(p_value);
    if let Some(info) = clinvar {
        score += f64::from(info.max_significance_score) * 2.0;
    }
    score
}

/// Risk level of one scored association, used for final ranking.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    /// No statement possible.
    Unknown,
    /// User does not carry the risk allele.
    Lower,
    /// Slightly elevated risk.
    Slight,
    /// Moderately elevated risk.
    Moderate,
    /// Highly elevated risk.
    High,
    /// Very highly elevated risk.
    VeryHigh,
}

impl RiskLevel {
    /// Sort priority of the risk level; used as the primary sort key
    /// before the importance score.
    pub fn priority(&self) -> u32 {
        match self {
            RiskLevel::VeryHigh => 100,
            RiskLevel::High => 90,
            RiskLevel::Moderate => 75,
            RiskLevel::Slight => 55,
            RiskLevel::Lower => 1,
            RiskLevel::Unknown => 0,
        }
    }

    /// Classify one association into a risk level.
    ///
    /// The first matching rule wins; missing odds ratio defaults to 1.0
    /// and missing frequency to 0.0.
    pub fn classify(
        importance: f64,
        has_risk_allele: bool,
        odds_ratio: Option<f64>,
        risk_allele_frequency: Option<f64>,
    ) -> Self {
        let odds_ratio = odds_ratio.unwrap_or(1.0);
        let is_common = risk_allele_frequency.unwrap_or(0.0) > COMMON_FREQUENCY;

        if importance >= 30.0 && has_risk_allele && odds_ratio >= 2.0 && !is_common {
            RiskLevel::VeryHigh
        } else if importance >= 30.0 && has_risk_allele && odds_ratio >= 1.5 && !is_common {
            RiskLevel::High
        } else if importance >= 15.0 && has_risk_allele && odds_ratio >= 2.0 && !is_common {
            RiskLevel::Moderate
        } else if importance >= 30.0 && has_risk_allele {
            if is_common {
                RiskLevel::Slight
            } else {
                RiskLevel::Moderate
            }
        } else if importance >= 15.0 && has_risk_allele && odds_ratio >= 1.5 {
            RiskLevel::Slight
        } else if importance >= 15.0 && has_risk_allele {
            RiskLevel::Slight
        } else if !has_risk_allele {
            RiskLevel::Lower
        } else {
            RiskLevel::Unknown
        }
    }
}

/// One association scored against a user variant.
///
/// Created fresh on every analysis run; only the deduplicated,
/// categorized subset is kept afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoredAssociation {
    /// Variant identifier.
    pub variant_id: String,
    /// User genotype at the variant.
    pub genotype: String,
    /// Chromosome from the genotype file.
    pub chromosome: String,
    /// Position from the genotype file.
    pub position: String,
    /// Trait or disease name.
    pub trait_name: String,
    /// P-value as reported by the catalog.
    pub p_value: Option<String>,
    /// Combined importance score.
    pub importance_score: f64,
    /// The risk allele, if known.
    pub risk_allele: Option<char>,
    /// Whether the user's genotype contains the risk allele; `None` when
    /// the risk allele is unknown.
    pub user_has_risk_allele: Option<bool>,
    /// Odds ratio, if the effect measure is one.
    pub odds_ratio: Option<f64>,
    /// Population frequency of the risk allele.
    pub risk_allele_frequency: Option<f64>,
    /// Representative clinical condition, if clinical data exists.
    pub clinvar_condition: Option<String>,
    /// Maximal clinical significance score, if clinical data exists.
    pub clinvar_significance: Option<i32>,
    /// Expert-curated category; set by the classifier.
    pub manual_category: Option<String>,
    /// Free-text trait category (catalog value or keyword fallback).
    pub trait_category: Option<String>,
    /// Mapped gene symbol(s), if any.
    pub mapped_gene: Option<String>,
    /// Short study description.
    pub study_description: Option<String>,
    /// Literature reference identifier.
    pub reference_id: Option<String>,
    /// Classified risk level.
    pub risk_level: RiskLevel,
}

impl ScoredAssociation {
    /// Sort priority derived from the risk level.
    pub fn risk_priority(&self) -> u32 {
        self.risk_level.priority()
    }
}

/// Score one association record against the user variant it matched.
pub fn score_association(
    variant: &UserVariant,
    record: &AssociationRecord,
    clinvar: Option<&ClinvarInfo>,
) -> ScoredAssociation {
    let importance = importance_score(record.p_value.as_deref(), clinvar);
    let user_has_risk_allele = record
        .effect_allele
        .map(|allele| variant.genotype.contains(allele));
    let odds_ratio = match record.effect_measure {
        EffectMeasure::OddsRatio => record
            .effect_value
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok()),
        _ => None,
    };
    let risk_allele_frequency = record
        .risk_allele_frequency
        .as_deref()
        .and_then(|raw| raw.trim().parse::<f64>().ok());
    let risk_level = RiskLevel::classify(
        importance,
        user_has_risk_allele.unwrap_or(false),
        odds_ratio,
        risk_allele_frequency,
    );

    ScoredAssociation {
        variant_id: variant.variant_id.clone(),
        genotype: variant.genotype.clone(),
        chromosome: variant.chromosome.clone(),
        position: variant.position.clone(),
        trait_name: record.trait_name.clone(),
        p_value: record.p_value.clone(),
        importance_score: importance,
        risk_allele: record.effect_allele,
        user_has_risk_allele,
        odds_ratio,
        risk_allele_frequency,
        clinvar_condition: clinvar
            .and_then(|info| info.representative_condition())
            .map(str::to_string),
        clinvar_significance: clinvar.map(|info| info.max_significance_score),
        manual_category: None,
        trait_category: record.trait_category.clone(),
        mapped_gene: record.mapped_gene.clone(),
        study_description: record.study_description.clone(),
        reference_id: record.reference_id.clone(),
        risk_level,
    }
}
