//! Detection of genotype file formats.
//!
//! Only the 23andMe-style tab-separated export is parsed by this worker;
//! other vendor formats are recognized by name so error messages can point
//! at them, but they are rejected by the parser.

/// Maximal number of non-empty lines that content-based detection looks at.
const MAX_SNIFF_LINES: usize = 100;

/// The genotype file formats that the worker can name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize, serde::Deserialize,
)]
pub enum FileFormat {
    /// 23andMe-style tab separated export (the supported format).
    #[strum(serialize = "23andme")]
    #[serde(rename = "23andme")]
    TwentyThreeAndMe,
    /// AncestryDNA export (named, not parsed).
    #[strum(serialize = "ancestry")]
    #[serde(rename = "ancestry")]
    Ancestry,
    /// VCF (named, not parsed).
    #[strum(serialize = "vcf")]
    #[serde(rename = "vcf")]
    Vcf,
    /// Anything else.
    #[strum(serialize = "unknown")]
    #[serde(rename = "unknown")]
    Unknown,
}

/// Detect the format of a genotype file from its content.
///
/// Looks at the first [`MAX_SNIFF_LINES`] non-empty lines.  The supported
/// format is recognized by either a comment line mentioning both "rsid" and
/// "chromosome" or by a data line with at least four tab-separated fields
/// where the first field looks like an rsid and the fourth has genotype
/// length (at most two characters).
pub fn detect(content: &str) -> FileFormat {
    for line in content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SNIFF_LINES)
    {
        if line.starts_with("##fileformat=VCF") {
            return FileFormat::Vcf;
        }

        if let Some(comment) = line.strip_prefix('#') {
            let lower = comment.to_lowercase();
            if lower.contains("rsid") && lower.contains("chromosome") {
                return FileFormat::TwentyThreeAndMe;
            }
            continue;
        }

        let fields = line.split('\t').collect::<Vec<_>>();
        if fields.len() >= 4
            && (fields[0].starts_with("rs") || fields[0].starts_with('i'))
            && fields[3].chars().count() <= 2
        {
            return FileFormat::TwentyThreeAndMe;
        }
    }

    FileFormat::Unknown
}

/// Detect the likely format of a genotype file from its name alone.
///
/// Lightweight detection for when the file content is not available yet,
/// e.g., while the upload is still in flight.
pub fn detect_from_filename(file_name: &str) -> FileFormat {
    let lower = file_name.to_lowercase();

    if lower.contains("23andme") || lower.contains("23-and-me") {
        FileFormat::TwentyThreeAndMe
    } else if lower.contains("ancestry") {
        FileFormat::Ancestry
    } else if lower.ends_with(".vcf") || lower.ends_with(".vcf.gz") {
        FileFormat::Vcf
    } else {
        FileFormat::Unknown
    }
}
