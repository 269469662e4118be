//! Scoring of clinical-variant submissions.
//!
//! Clinical significance and review status arrive as free text; both are
//! normalized against fixed ranked tables via longest case-insensitive
//! substring match.

use crate::analysis::schema::ClinicalVariantRecord;

/// Ranked clinical significance table, most to least severe.
///
/// Higher score means more clinically important.
const SIGNIFICANCE_SCORES: &[(&str, i32)] = &[
    ("Pathogenic/Established risk allele", 10),
    ("Pathogenic", 10),
    ("Pathogenic/Likely pathogenic", 9),
    ("Likely pathogenic", 8),
    ("risk factor", 7),
    ("drug response", 6),
    ("association", 5),
    ("Conflicting interpretations", 4),
    ("Uncertain significance", 3),
    ("other", 2),
    ("not provided", 2),
    ("Likely benign", 1),
    ("Benign", 0),
];

/// Ranked review status table.  Higher score means more reliable.
const REVIEW_STATUS_SCORES: &[(&str, i32)] = &[
    ("practice guideline", 4),
    ("reviewed by expert panel", 4),
    ("criteria provided, multiple submitters, no conflicts", 3),
    ("criteria provided, conflicting interpretations", 2),
    ("criteria provided, single submitter", 2),
    ("no assertion criteria provided", 1),
    ("no assertion provided", 1),
];

/// Find the longest table key that is a case-insensitive substring of
/// `raw`; ties keep the earlier (more severe) entry.
fn best_match<'a>(table: &'a [(&'a str, i32)], raw: &str) -> Option<(&'a str, i32)> {
    let lower = raw.to_lowercase();
    let mut best: Option<(&str, i32)> = None;
    for (key, score) in table {
        if lower.contains(&key.to_lowercase())
            && best.map_or(true, |(best_key, _)| key.len() > best_key.len())
        {
            best = Some((key, *score));
        }
    }
    best
}

/// Normalize a clinical significance string and score it.
///
/// Unmatched strings keep their raw form and score 0.
pub fn parse_significance(raw: &str) -> (String, i32) {
    match best_match(SIGNIFICANCE_SCORES, raw) {
        Some((key, score)) => (key.to_string(), score),
        None => (raw.to_string(), 0),
    }
}

/// Score a review status string; unmatched strings score 0.
pub fn review_status_score(raw: &str) -> i32 {
    best_match(REVIEW_STATUS_SCORES, raw).map_or(0, |(_, score)| score)
}

/// One scored clinical-variant submission.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClinvarSubmission {
    /// Submission accession.
    pub accession: String,
    /// Normalized clinical significance label.
    pub clinical_significance: String,
    /// Score of the clinical significance.
    pub significance_score: i32,
    /// Condition name, if any.
    pub condition: Option<String>,
    /// Review status as submitted.
    pub review_status: Option<String>,
    /// Score of the review status.
    pub review_score: i32,
    /// Date of last evaluation, as submitted.
    pub last_evaluated: Option<String>,
    /// Number of submitters behind the record.
    pub number_submitters: Option<u32>,
}

/// Aggregated, scored clinical information for one variant.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClinvarInfo {
    /// Gene symbol, if any submission carries one.
    pub gene: Option<String>,
    /// Maximal significance score over all submissions.
    pub max_significance_score: i32,
    /// Maximal review score over all submissions.
    pub max_review_score: i32,
    /// Submissions sorted descending by (significance score, review score).
    pub submissions: Vec<ClinvarSubmission>,
}

impl ClinvarInfo {
    /// Number of submissions.
    pub fn submission_count(&self) -> usize {
        self.submissions.len()
    }

    /// Condition of the top-ranked submission, surfaced as the
    /// representative condition for the variant.
    pub fn representative_condition(&self) -> Option<&str> {
        self.submissions
            .first()
            .and_then(|submission| submission.condition.as_deref())
    }
}

/// Score the clinical-variant records of one variant.
///
/// Returns `None` when there are no records, i.e., the variant has no
/// clinical data at all.
pub fn score_clinical(records: &[ClinicalVariantRecord]) -> Option<ClinvarInfo> {
    if records.is_empty() {
        return None;
    }

    let gene = records.iter().find_map(|record| record.gene.clone());

    let mut submissions = records
        .iter()
        .map(|record| {
            let (clinical_significance, significance_score) =
                parse_significance(record.clinical_significance.as_deref().unwrap_or(""));
            let review_score = review_status_score(record.review_status.as_deref().unwrap_or(""));
            ClinvarSubmission {
                accession: record.accession.clone(),
                clinical_significance,
                significance_score,
                condition: record.condition.clone(),
                review_status: record.review_status.clone(),
                review_score,
                last_evaluated: record.last_evaluated.clone(),
                number_submitters: record.number_submitters,
            }
        })
        .collect::<Vec<_>>();

    let max_significance_score = submissions
        .iter()
        .map(|submission| submission.significance_score)
        .max()
        .unwrap_or(0);
    let max_review_score = submissions
        .iter()
        .map(|submission| submission.review_score)
        .max()
        .unwrap_or(0);

    // Stable sort so equally-ranked submissions keep first-seen order.
    submissions.sort_by(|a, b| {
        (b.significance_score, b.review_score).cmp(&(a.significance_score, a.review_score))
    });

    Some(ClinvarInfo {
        gene,
        max_significance_score,
        max_review_score,
        submissions,
    })
}
