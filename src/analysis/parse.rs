//! Parsing of genotype files into normalized user variants.

use indexmap::IndexMap;

use crate::analysis::format::{detect, FileFormat};
use crate::analysis::schema::UserVariant;
use crate::analysis::AnalysisError;

/// Genotype value that marks a failed call; such lines are dropped.
pub const NO_CALL: &str = "--";

/// Parse genotype file content into a map of variant id to [`UserVariant`].
///
/// Fails with [`AnalysisError::UnsupportedFormat`] if content-based format
/// detection does not recognize the supported format.  Comment lines, one
/// optional header line, lines with fewer than four fields, and no-call
/// lines are skipped.  When a variant id occurs more than once the last
/// occurrence wins.
pub fn parse(content: &str) -> Result<IndexMap<String, UserVariant>, AnalysisError> {
    match detect(content) {
        FileFormat::TwentyThreeAndMe => (),
        format => return Err(AnalysisError::UnsupportedFormat(format)),
    }

    let mut result = IndexMap::new();
    let mut first_line = true;
    for line in content.lines() {
        if line.starts_with('#') {
            continue;
        }
        // The first non-comment line may repeat the column names without a
        // comment marker; skip exactly that one.
        if first_line {
            first_line = false;
            let lower = line.to_lowercase();
            if lower.contains("rsid") && lower.contains("chromosome") {
                continue;
            }
        }

        let line = line.trim();
        let fields = line.split('\t').collect::<Vec<_>>();
        if fields.len() < 4 {
            continue;
        }

        let (variant_id, chromosome, position, genotype) =
            (fields[0], fields[1], fields[2], fields[3]);
        if genotype == NO_CALL {
            continue;
        }

        result.insert(
            variant_id.to_string(),
            UserVariant {
                variant_id: variant_id.to_string(),
                chromosome: chromosome.to_string(),
                position: position.to_string(),
                genotype: genotype.to_string(),
            },
        );
    }

    Ok(result)
}
