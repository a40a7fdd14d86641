//! Annotation file parsing (the second file of a dual import).

use crate::error::ImportError;
use crate::importer::plan::AnnotationCandidate;
use crate::importer::{read_records, TextKey};

/// Columns every annotation file must carry.
pub const ANNOTATION_REQUIRED_COLUMNS: &[&str] =
    &["input_text_id", "content", "start_index", "error_cat"];

/// Optional column holding a single correction suggestion.
pub const CORRECTIONS_COLUMN: &str = "corrections";

const FILE: &str = "annotation CSV file";

/// Parse a decoded annotation file into candidates for
/// [`plan_annotations`](crate::importer::plan::plan_annotations).
///
/// A file without data rows yields no candidates. Otherwise every column in
/// [`ANNOTATION_REQUIRED_COLUMNS`] must be present.
pub fn parse_annotation_file(source: &str) -> Result<Vec<AnnotationCandidate>, ImportError> {
    let (headers, records) = read_records(source, FILE)?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let missing: Vec<&str> = ANNOTATION_REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.contains(col))
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::Schema(format!(
            "Annotation CSV is missing required columns: {}",
            missing.join(", ")
        )));
    }

    let candidates = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let corrections = headers.get_or_empty(record, &[CORRECTIONS_COLUMN]).trim();
            AnnotationCandidate {
                row: i + 1,
                text_key: TextKey::Id(
                    headers.get_or_empty(record, &["input_text_id"]).trim().to_string(),
                ),
                start_index: headers.get_or_empty(record, &["start_index"]).to_string(),
                label: headers.get_or_empty(record, &["error_cat"]).to_string(),
                span_text: headers.get_or_empty(record, &["content"]).to_string(),
                suggestions: if corrections.is_empty() {
                    Vec::new()
                } else {
                    vec![corrections.to_string()]
                },
            }
        })
        .collect();

    Ok(candidates)
}
