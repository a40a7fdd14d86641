//! Annotation export as CSV or JSON.
//!
//! The annotated substring is recomputed from the live text content. A span
//! that no longer fits the content exports an empty `selected_sub_text`
//! instead of failing the row.

use serde::Serialize;

use crate::error::CoreError;
use crate::span::slice_span;
use crate::types::DbId;

/// Column order of the CSV export, also accepted by combined import.
pub const EXPORT_COLUMNS: [&str; 7] = [
    "ID",
    "input_text_id",
    "content",
    "selected_sub_text",
    "start_index",
    "error_label",
    "suggestions",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// Parse a `format` query value. Absent means CSV.
    pub fn parse(value: Option<&str>) -> Result<Self, CoreError> {
        match value.map(str::trim) {
            None | Some("") | Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(CoreError::Validation(format!(
                "Unknown export format \"{other}\". Use csv or json."
            ))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json; charset=utf-8",
        }
    }
}

/// One stored annotation joined with its text and label, in export order
/// (text id, then start index).
#[derive(Debug, Clone)]
pub struct ExportSource {
    pub annotation_id: DbId,
    pub external_text_id: Option<String>,
    pub content: String,
    pub start_index: i64,
    pub end_index: i64,
    pub label: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    #[serde(rename = "ID")]
    pub id: DbId,
    pub input_text_id: Option<String>,
    pub content: String,
    pub selected_sub_text: String,
    pub start_index: i64,
    pub error_label: String,
    pub suggestions: Vec<String>,
}

pub fn build_records(sources: Vec<ExportSource>) -> Vec<ExportRecord> {
    sources
        .into_iter()
        .map(|s| {
            let selected_sub_text = slice_span(&s.content, s.start_index, s.end_index)
                .unwrap_or("")
                .to_string();
            ExportRecord {
                id: s.annotation_id,
                input_text_id: s.external_text_id,
                content: s.content,
                selected_sub_text,
                start_index: s.start_index,
                error_label: s.label,
                suggestions: s.suggestions,
            }
        })
        .collect()
}

/// Serialize records in the requested format.
pub fn write(records: &[ExportRecord], format: ExportFormat) -> Result<Vec<u8>, CoreError> {
    match format {
        ExportFormat::Csv => write_csv(records),
        ExportFormat::Json => write_json(records),
    }
}

pub fn write_csv(records: &[ExportRecord]) -> Result<Vec<u8>, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_COLUMNS).map_err(csv_error)?;

    for r in records {
        let suggestions = serde_json::to_string(&r.suggestions)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        writer
            .write_record([
                r.id.to_string().as_str(),
                r.input_text_id.as_deref().unwrap_or(""),
                r.content.as_str(),
                r.selected_sub_text.as_str(),
                r.start_index.to_string().as_str(),
                r.error_label.as_str(),
                suggestions.as_str(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| CoreError::Internal(e.to_string()))
}

/// JSON array, UTF-8 with non-ASCII characters left unescaped.
pub fn write_json(records: &[ExportRecord]) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec(records).map_err(|e| CoreError::Internal(e.to_string()))
}

fn csv_error(e: csv::Error) -> CoreError {
    CoreError::Internal(format!("CSV export failed: {e}"))
}
