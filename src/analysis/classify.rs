//! Expert-curated category assignment for (variant, trait) pairs.
//!
//! The curated table is trait-specific so that pleiotropic variants land
//! in the right bucket.  A keyword heuristic over the trait name exists as
//! a coarse fallback grouping for display; it never feeds the curated
//! category view.

use std::collections::HashMap;

/// Curated (variant id, trait) to category entries.
const CURATED_CATEGORIES: &[(&str, &str, &str)] = &[
    // Alzheimer's disease
    ("rs429358", "Alzheimer's disease", "Alzheimer"),
    ("rs7412", "Alzheimer's disease", "Alzheimer"),
    ("rs3851179", "Alzheimer's disease", "Alzheimer"),
    ("rs744373", "Alzheimer's disease", "Alzheimer"),
    ("rs11136000", "Alzheimer's disease", "Alzheimer"),
    ("rs3764650", "Alzheimer's disease", "Alzheimer"),
    ("rs6656401", "Alzheimer's disease", "Alzheimer"),
    ("rs11218343", "Alzheimer's disease", "Alzheimer"),
    ("rs75932628", "Alzheimer's disease", "Alzheimer"),
    // Coronary artery disease
    ("rs11591147", "Coronary artery disease", "Cardiological"),
    ("rs6511720", "Coronary artery disease", "Cardiological"),
    ("rs10455872", "Coronary artery disease", "Cardiological"),
    ("rs1333049", "Coronary artery disease", "Cardiological"),
    ("rs9349379", "Coronary artery disease", "Cardiological"),
    ("rs9818870", "Coronary artery disease", "Cardiological"),
    ("rs1746048", "Coronary artery disease", "Cardiological"),
    ("rs11556924", "Coronary artery disease", "Cardiological"),
    ("rs579459", "Coronary artery disease", "Cardiological"),
    ("rs11206510", "Coronary artery disease", "Cardiological"),
    // Cholesterol and lipids
    ("rs12740374", "LDL cholesterol", "Cardiological"),
    ("rs12916", "LDL cholesterol", "Cardiological"),
    ("rs58542926", "LDL cholesterol", "Cardiological"),
    ("rs693", "LDL cholesterol", "Cardiological"),
    ("rs12678919", "Triglycerides", "Cardiological"),
    ("rs780094", "Triglycerides", "Cardiological"),
    ("rs10468017", "HDL cholesterol", "Cardiological"),
    ("rs3764261", "HDL cholesterol", "Cardiological"),
    // Stroke
    ("rs2107595", "Large-artery ischemic stroke", "Cardiological"),
    // Heart failure
    ("rs1739843", "Heart failure", "Cardiological"),
    ("rs2234962", "Heart failure", "Cardiological"),
    // Hypertension
    ("rs11191548", "Hypertension", "Cardiological"),
    ("rs198389", "Hypertension", "Cardiological"),
    // Type 2 diabetes
    ("rs7903146", "Type 2 diabetes", "T2D"),
    ("rs5219", "Type 2 diabetes", "T2D"),
    ("rs13266634", "Type 2 diabetes", "T2D"),
    ("rs7756992", "Type 2 diabetes", "T2D"),
    ("rs4402960", "Type 2 diabetes", "T2D"),
    ("rs10811661", "Type 2 diabetes", "T2D"),
    ("rs2237892", "Type 2 diabetes", "T2D"),
    ("rs1801282", "Type 2 diabetes", "T2D"),
    // Body mass index / Obesity
    ("rs9939609", "Body mass index", "Obesity_BMI"),
    ("rs17782313", "Body mass index", "Obesity_BMI"),
    ("rs1558902", "Body mass index", "Obesity_BMI"),
    // Fasting glucose
    ("rs16926246", "Fasting glucose", "Obesity_BMI"),
    ("rs560887", "Fasting glucose", "Obesity_BMI"),
    // Chronic kidney disease
    ("rs12917707", "Chronic kidney disease", "CKD"),
    ("rs17319721", "Chronic kidney disease", "CKD"),
    ("rs1150459", "Chronic kidney disease", "CKD"),
    // Atrial fibrillation
    ("rs2200733", "Atrial fibrillation", "AF"),
    ("rs2106261", "Atrial fibrillation", "AF"),
    ("rs13376333", "Atrial fibrillation", "AF"),
    // Inflammation (C-reactive protein)
    ("rs1800795", "C-reactive protein", "Inflammation"),
    ("rs2228145", "C-reactive protein", "Inflammation"),
    ("rs1205", "C-reactive protein", "Inflammation"),
    // Parkinson's disease
    ("rs34637584", "Parkinson's disease", "Parkinson"),
    ("rs356219", "Parkinson's disease", "Parkinson"),
    ("rs2230288", "Parkinson's disease", "Parkinson"),
    // Lung cancer
    ("rs2736100", "Lung cancer", "Lung Cancer"),
    ("rs16969968", "Lung cancer", "Lung Cancer"),
    // Colorectal cancer
    ("rs6983267", "Colorectal cancer", "Colorectal Cancer"),
    ("rs4939827", "Colorectal cancer", "Colorectal Cancer"),
    ("rs4779584", "Colorectal cancer", "Colorectal Cancer"),
    // Breast cancer
    ("rs3803662", "Breast cancer (female)", "Breast Cancer"),
    ("rs2981582", "Breast cancer (female)", "Breast Cancer"),
    ("rs13281615", "Breast cancer (female)", "Breast Cancer"),
    ("rs17468277", "Breast cancer (female)", "Breast Cancer"),
    // Prostate cancer
    ("rs2735839", "Prostate cancer (male)", "Prostate Cancer"),
    ("rs138213197", "Prostate cancer (male)", "Prostate Cancer"),
    // Pancreatic cancer
    ("rs505922", "Pancreatic cancer", "Pancreatic Cancer"),
    // Melanoma
    ("rs1805007", "Melanoma", "Melanoma"),
    // Osteoarthritis
    ("rs143383", "Osteoarthritis", "Osteoarthritis"),
    // Bone mineral density / Osteoporosis
    ("rs3736228", "Bone mineral density", "Osteoporosis"),
    ("rs4355801", "Bone mineral density", "Osteoporosis"),
    ("rs851056", "Bone mineral density", "Osteoporosis"),
    // Grip strength / Sarcopenia
    ("rs55872725", "Grip strength", "Sarcopenia"),
    ("rs12928404", "Grip strength", "Sarcopenia"),
    // Exceptional longevity
    ("rs2802292", "Exceptional longevity", "Longevity"),
    // Parental lifespan
    ("rs429358", "Parental lifespan", "General Longevity"),
    ("rs7412", "Parental lifespan", "General Longevity"),
    // DNAm GrimAge acceleration
    ("rs2736100", "DNAm GrimAge acceleration", "General Longevity"),
    // All-cause mortality
    ("rs1799945", "All-cause mortality", "General Longevity"),
];

/// Immutable lookup over the curated (variant id, trait) category table.
#[derive(Debug)]
pub struct CuratedCategories {
    /// Exact-match lookup.
    by_key: HashMap<(&'static str, &'static str), &'static str>,
    /// Lowercased lookup for the case-insensitive retry.
    by_key_folded: HashMap<(String, String), &'static str>,
}

impl Default for CuratedCategories {
    fn default() -> Self {
        Self::new()
    }
}

impl CuratedCategories {
    /// Build the lookup maps from the static table.
    pub fn new() -> Self {
        let mut by_key = HashMap::new();
        let mut by_key_folded = HashMap::new();
        for (variant_id, trait_name, category) in CURATED_CATEGORIES {
            by_key.insert((*variant_id, *trait_name), *category);
            by_key_folded.insert(
                (variant_id.to_lowercase(), trait_name.to_lowercase()),
                *category,
            );
        }
        Self {
            by_key,
            by_key_folded,
        }
    }

    /// Look up the curated category for a (variant id, trait) pair.
    ///
    /// Exact match first, then a case-insensitive retry on both fields.
    pub fn classify(&self, variant_id: &str, trait_name: &str) -> Option<&'static str> {
        if let Some(category) = self.by_key.get(&(variant_id, trait_name)) {
            return Some(category);
        }
        self.by_key_folded
            .get(&(variant_id.to_lowercase(), trait_name.to_lowercase()))
            .copied()
    }
}

/// Bucket a trait name into a coarse display category by keyword.
pub fn trait_category(trait_name: &str) -> &'static str {
    let lower = trait_name.to_lowercase();
    let contains_any =
        |words: &[&str]| -> bool { words.iter().any(|word| lower.contains(word)) };

    if contains_any(&[
        "cancer",
        "tumor",
        "carcinoma",
        "melanoma",
        "leukemia",
        "lymphoma",
    ]) {
        "Cancer"
    } else if contains_any(&[
        "heart",
        "cardiac",
        "cardiovascular",
        "coronary",
        "blood pressure",
        "hypertension",
    ]) {
        "Cardiovascular disease"
    } else if contains_any(&["cholesterol", "ldl", "hdl", "triglyceride", "lipid"]) {
        "Lipid or lipoprotein measurement"
    } else if contains_any(&["diabetes", "glucose", "insulin", "metabolic"]) {
        "Metabolic disorder"
    } else if contains_any(&[
        "alzheimer",
        "parkinson",
        "neurological",
        "brain",
        "cognitive",
        "dementia",
    ]) {
        "Neurological disorder"
    } else if contains_any(&["height", "weight", "bmi", "body mass"]) {
        "Body measurement"
    } else if lower.contains("measurement") {
        "Other measurement"
    } else if lower.contains("disease") || lower.contains("disorder") {
        "Other disease"
    } else {
        "Other trait"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn classify_exact_match() {
        let categories = CuratedCategories::new();

        assert_eq!(
            Some("Alzheimer"),
            categories.classify("rs429358", "Alzheimer's disease")
        );
        assert_eq!(
            Some("General Longevity"),
            categories.classify("rs429358", "Parental lifespan")
        );
    }

    #[test]
    fn classify_case_insensitive_retry() {
        let categories = CuratedCategories::new();

        assert_eq!(
            Some("T2D"),
            categories.classify("RS7903146", "type 2 DIABETES")
        );
    }

    #[test]
    fn classify_unknown_pair_is_none() {
        let categories = CuratedCategories::new();

        assert_eq!(None, categories.classify("rs429358", "Coffee consumption"));
        assert_eq!(None, categories.classify("rs0", "Alzheimer's disease"));
    }

    #[rstest]
    #[case("Breast cancer (female)", "Cancer")]
    #[case("Chronic lymphocytic leukemia", "Cancer")]
    #[case("Coronary artery disease", "Cardiovascular disease")]
    #[case("Systolic blood pressure", "Cardiovascular disease")]
    #[case("LDL cholesterol", "Lipid or lipoprotein measurement")]
    #[case("Type 2 diabetes", "Metabolic disorder")]
    #[case("Alzheimer's disease", "Neurological disorder")]
    #[case("Body mass index", "Body measurement")]
    #[case("C-reactive protein measurement", "Other measurement")]
    #[case("Crohn's disease", "Other disease")]
    #[case("Eye color", "Other trait")]
    fn trait_category_buckets(#[case] trait_name: &str, #[case] expected: &str) {
        assert_eq!(expected, trait_category(trait_name));
    }
}
