//! Deduplication, grouping, and pagination of scored associations.

use indexmap::IndexMap;

use crate::analysis::score::ScoredAssociation;

/// Clinical significance score from which on a variant counts as
/// clinically significant (risk factor and above).
const CLINVAR_SIGNIFICANT: i32 = 6;
/// Maximal number of entries in the clinically significant list.
const MAX_CLINVAR_VARIANTS: usize = 20;
/// Number of category names surfaced in the summary.
const MAX_TOP_CATEGORIES: usize = 8;

/// Rollup counts of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisSummary {
    /// Number of variants parsed from the genotype file.
    pub total_variants: usize,
    /// Number of variants with at least one association match.
    pub matched_variants: usize,
    /// Number of matched associations before deduplication.
    pub total_associations: usize,
    /// Number of matched variants with clinical data.
    pub clinvar_count: usize,
    /// Names of the largest category groups, largest first.
    pub top_categories: Vec<String>,
}

/// Counts collected during the scoring stage, before deduplication.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCounts {
    /// Number of variants parsed from the genotype file.
    pub total_variants: usize,
    /// Number of variants with at least one association match.
    pub matched_variants: usize,
    /// Number of matched associations before deduplication.
    pub total_associations: usize,
    /// Number of matched variants with clinical data.
    pub clinvar_count: usize,
}

/// One expert-curated category with its deduplicated associations.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategoryGroup {
    /// Curated category name.
    pub category: String,
    /// Associations sorted by (risk priority, importance score), both
    /// descending.
    pub associations: Vec<ScoredAssociation>,
}

/// The complete result document of one analysis run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisResult {
    /// Rollup counts.
    pub summary: AnalysisSummary,
    /// Deduplicated associations (one per variant), sorted by importance
    /// score descending.
    pub associations: Vec<ScoredAssociation>,
    /// Category groups, sorted by member count descending.
    pub category_groups: Vec<CategoryGroup>,
    /// Clinically significant subset of `associations`, capped at
    /// [`MAX_CLINVAR_VARIANTS`] entries.
    pub clinvar_variants: Vec<ScoredAssociation>,
}

/// One page of a category group, as handed to the web layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Page {
    /// Curated category name.
    pub category: String,
    /// Offset that was applied.
    pub offset: usize,
    /// Limit that was applied.
    pub limit: usize,
    /// Number of entries after filtering, before slicing.
    pub total_count: usize,
    /// The page items.
    pub items: Vec<ScoredAssociation>,
}

/// Deduplicate, group, and summarize scored associations.
pub fn aggregate(counts: RunCounts, scored: Vec<ScoredAssociation>) -> AnalysisResult {
    // One association per variant id: a strictly higher importance score
    // replaces, ties keep the first seen.
    let mut deduped: IndexMap<String, ScoredAssociation> = IndexMap::new();
    for assoc in scored {
        match deduped.entry(assoc.variant_id.clone()) {
            indexmap::map::Entry::Occupied(mut entry) => {
                if assoc.importance_score > entry.get().importance_score {
                    entry.insert(assoc);
                }
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(assoc);
            }
        }
    }

    let mut associations = deduped.into_values().collect::<Vec<_>>();
    associations.sort_by(|a, b| b.importance_score.total_cmp(&a.importance_score));

    // Bucket by curated category; associations without one stay out of
    // the grouped view but are already counted in the summary.
    let mut by_category: IndexMap<String, Vec<ScoredAssociation>> = IndexMap::new();
    for assoc in &associations {
        if let Some(category) = &assoc.manual_category {
            by_category
                .entry(category.clone())
                .or_default()
                .push(assoc.clone());
        }
    }
    let mut category_groups = by_category
        .into_iter()
        .map(|(category, mut associations)| {
            associations.sort_by(|a, b| {
                b.risk_priority()
                    .cmp(&a.risk_priority())
                    .then_with(|| b.importance_score.total_cmp(&a.importance_score))
            });
            CategoryGroup {
                category,
                associations,
            }
        })
        .collect::<Vec<_>>();
    // Stable sort; equally-sized groups keep first-encounter order.
    category_groups.sort_by(|a, b| b.associations.len().cmp(&a.associations.len()));

    let top_categories = category_groups
        .iter()
        .take(MAX_TOP_CATEGORIES)
        .map(|group| group.category.clone())
        .collect();
    let clinvar_variants = associations
        .iter()
        .filter(|assoc| {
            assoc
                .clinvar_significance
                .map_or(false, |score| score >= CLINVAR_SIGNIFICANT)
        })
        .take(MAX_CLINVAR_VARIANTS)
        .cloned()
        .collect();

    AnalysisResult {
        summary: AnalysisSummary {
            total_variants: counts.total_variants,
            matched_variants: counts.matched_variants,
            total_associations: counts.total_associations,
            clinvar_count: counts.clinvar_count,
            top_categories,
        },
        associations,
        category_groups,
        clinvar_variants,
    }
}

impl AnalysisResult {
    /// Return one page of the given category group.
    ///
    /// The `min_importance` filter applies before counting and slicing,
    /// so `total_count` reflects the filtered set.  An unknown category
    /// yields an empty page.
    pub fn page(
        &self,
        category: &str,
        offset: usize,
        limit: usize,
        min_importance: Option<f64>,
    ) -> Page {
        let filtered = self
            .category_groups
            .iter()
            .find(|group| group.category == category)
            .map(|group| {
                group
                    .associations
                    .iter()
                    .filter(|assoc| {
                        min_importance.map_or(true, |min| assoc.importance_score >= min)
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Page {
            category: category.to_string(),
            offset,
            limit,
            total_count: filtered.len(),
            items: filtered
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::score::RiskLevel;

    use super::*;

    fn scored(
        variant_id: &str,
        trait_name: &str,
        importance: f64,
        category: Option<&str>,
        risk_level: RiskLevel,
    ) -> ScoredAssociation {
        ScoredAssociation {
            variant_id: variant_id.to_string(),
            genotype: String::from("AG"),
            chromosome: String::from("1"),
            position: String::from("12345"),
            trait_name: trait_name.to_string(),
            p_value: None,
            importance_score: importance,
            risk_allele: None,
            user_has_risk_allele: None,
            odds_ratio: None,
            risk_allele_frequency: None,
            clinvar_condition: None,
            clinvar_significance: None,
            manual_category: category.map(str::to_string),
            trait_category: None,
            mapped_gene: None,
            study_description: None,
            reference_id: None,
            risk_level,
        }
    }

    #[test]
    fn dedup_keeps_max_importance() {
        let result = aggregate(
            RunCounts::default(),
            vec![
                scored("rs1801133", "Trait A", 12.0, None, RiskLevel::Unknown),
                scored("rs1801133", "Trait B", 30.5, None, RiskLevel::Unknown),
            ],
        );

        assert_eq!(1, result.associations.len());
        assert_eq!("Trait B", result.associations[0].trait_name);
        assert_eq!(30.5, result.associations[0].importance_score);
    }

    #[test]
    fn dedup_ties_keep_first_seen() {
        let result = aggregate(
            RunCounts::default(),
            vec![
                scored("rs1801133", "First", 12.0, None, RiskLevel::Unknown),
                scored("rs1801133", "Second", 12.0, None, RiskLevel::Unknown),
            ],
        );

        assert_eq!("First", result.associations[0].trait_name);
    }

    #[test]
    fn groups_only_contain_curated_categories() {
        let result = aggregate(
            RunCounts::default(),
            vec![
                scored("rs1", "Trait A", 10.0, Some("T2D"), RiskLevel::Slight),
                scored("rs2", "Trait B", 20.0, None, RiskLevel::Slight),
            ],
        );

        assert_eq!(2, result.associations.len());
        assert_eq!(1, result.category_groups.len());
        assert_eq!("T2D", result.category_groups[0].category);
        assert_eq!(1, result.category_groups[0].associations.len());
    }

    #[test]
    fn groups_sorted_by_size_and_members_by_priority() {
        let result = aggregate(
            RunCounts::default(),
            vec![
                scored("rs1", "Trait A", 40.0, Some("Alzheimer"), RiskLevel::Slight),
                scored("rs2", "Trait B", 10.0, Some("T2D"), RiskLevel::Slight),
                scored("rs3", "Trait C", 35.0, Some("T2D"), RiskLevel::Moderate),
                scored("rs4", "Trait D", 20.0, Some("T2D"), RiskLevel::VeryHigh),
            ],
        );

        assert_eq!(
            vec!["T2D", "Alzheimer"],
            result
                .category_groups
                .iter()
                .map(|group| group.category.as_str())
                .collect::<Vec<_>>()
        );
        // Risk priority dominates the importance score.
        assert_eq!(
            vec!["rs4", "rs3", "rs2"],
            result.category_groups[0]
                .associations
                .iter()
                .map(|assoc| assoc.variant_id.as_str())
                .collect::<Vec<_>>()
        );
        assert_eq!(vec!["T2D", "Alzheimer"], result.summary.top_categories);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let input = vec![
            scored("rs1", "Trait A", 40.0, Some("Alzheimer"), RiskLevel::High),
            scored("rs2", "Trait B", 10.0, Some("T2D"), RiskLevel::Slight),
            scored("rs2", "Trait C", 25.0, Some("T2D"), RiskLevel::Moderate),
            scored("rs3", "Trait D", 20.0, None, RiskLevel::Lower),
        ];

        let once = aggregate(RunCounts::default(), input.clone());
        let twice = aggregate(RunCounts::default(), once.associations.clone());

        assert_eq!(once.associations, twice.associations);
        assert_eq!(once.category_groups, twice.category_groups);
    }

    #[test]
    fn clinvar_variants_keep_significant_only() {
        let mut significant = scored("rs1", "Trait A", 30.0, None, RiskLevel::Slight);
        significant.clinvar_significance = Some(7);
        let mut benign = scored("rs2", "Trait B", 20.0, None, RiskLevel::Slight);
        benign.clinvar_significance = Some(1);
        let without = scored("rs3", "Trait C", 10.0, None, RiskLevel::Slight);

        let result = aggregate(RunCounts::default(), vec![significant, benign, without]);

        assert_eq!(1, result.clinvar_variants.len());
        assert_eq!("rs1", result.clinvar_variants[0].variant_id);
    }

    #[test]
    fn page_filters_before_counting() {
        let result = aggregate(
            RunCounts::default(),
            vec![
                scored("rs1", "Trait A", 40.0, Some("T2D"), RiskLevel::Slight),
                scored("rs2", "Trait B", 30.0, Some("T2D"), RiskLevel::Slight),
                scored("rs3", "Trait C", 20.0, Some("T2D"), RiskLevel::Slight),
                scored("rs4", "Trait D", 10.0, Some("T2D"), RiskLevel::Slight),
            ],
        );

        let page = result.page("T2D", 1, 2, Some(15.0));
        assert_eq!(3, page.total_count);
        assert_eq!(
            vec!["rs2", "rs3"],
            page.items
                .iter()
                .map(|assoc| assoc.variant_id.as_str())
                .collect::<Vec<_>>()
        );

        let all = result.page("T2D", 0, 10, None);
        assert_eq!(4, all.total_count);
        assert_eq!(4, all.items.len());
    }

    #[test]
    fn page_unknown_category_is_empty() {
        let result = aggregate(RunCounts::default(), vec![]);

        let page = result.page("CKD", 0, 10, None);
        assert_eq!(0, page.total_count);
        assert!(page.items.is_empty());
    }

    #[test]
    fn page_offset_beyond_end_is_empty() {
        let result = aggregate(
            RunCounts::default(),
            vec![scored("rs1", "Trait A", 40.0, Some("T2D"), RiskLevel::Slight)],
        );

        let page = result.page("T2D", 5, 10, None);
        assert_eq!(1, page.total_count);
        assert!(page.items.is_empty());
    }
}
