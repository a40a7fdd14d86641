//! Single-file import carrying texts and annotations together.
//!
//! This is the shape the CSV export produces, so an exported project can be
//! loaded back into another project.

use crate::error::ImportError;
use crate::importer::plan::AnnotationCandidate;
use crate::importer::{
    non_blank, normalize_content, read_records, ParsedTexts, TextCollector, TextKey,
};

/// Any of these headers switches a single-file upload into combined mode.
pub const COMBINED_MODE_MARKERS: &[&str] = &["start_index", "error_label", "suggestions"];

const ID_ALIASES: &[&str] = &["input_text_id", "ID", "id"];
const CONTENT_ALIASES: &[&str] = &["content", "Content", "text"];

const FILE: &str = "CSV file";

/// Texts and annotation candidates read from one combined file.
#[derive(Debug, Clone, Default)]
pub struct ParsedCombined {
    pub texts: ParsedTexts,
    pub annotations: Vec<AnnotationCandidate>,
}

/// Whether a header row marks a combined file.
pub fn is_combined_header(source: &str) -> Result<bool, ImportError> {
    let (headers, _) = read_records(source, FILE)?;
    Ok(headers.contains_any(COMBINED_MODE_MARKERS))
}

/// Parse a combined file. Rows with blank content contribute neither a text
/// nor an annotation.
pub fn parse_combined_file(source: &str) -> Result<ParsedCombined, ImportError> {
    let (headers, records) = read_records(source, FILE)?;
    if headers.names().is_empty() {
        return Err(ImportError::Schema(
            "CSV file is empty or missing headers.".into(),
        ));
    }

    let mut collector = TextCollector::default();
    let mut annotations = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let raw_content = headers.get_or_empty(record, CONTENT_ALIASES);
        if raw_content.trim().is_empty() {
            continue;
        }
        let content = normalize_content(raw_content);
        let external_id = non_blank(headers.get_or_empty(record, ID_ALIASES));
        let text_key = TextKey::for_row(external_id.as_deref(), &content);

        collector.push(row, external_id, content);

        annotations.push(AnnotationCandidate {
            row,
            text_key,
            start_index: headers.get_or_empty(record, &["start_index"]).to_string(),
            label: headers.get_or_empty(record, &["error_label"]).to_string(),
            span_text: headers
                .get_or_empty(record, &["selected_sub_text"])
                .to_string(),
            suggestions: parse_suggestions(headers.get_or_empty(record, &["suggestions"])),
        });
    }

    Ok(ParsedCombined {
        texts: collector.finish(Vec::new()),
        annotations,
    })
}

/// Suggestions cell: a JSON array of strings (as written by export), or
/// else a comma-separated list.
pub fn parse_suggestions(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.starts_with('[') {
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return list
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_combined_header() {
        assert!(is_combined_header("ID,content,start_index\n").unwrap());
        assert!(is_combined_header("id,text,suggestions\n").unwrap());
        assert!(!is_combined_header("ID,text\n").unwrap());
    }

    #[test]
    fn parses_export_shaped_file() {
        let source = "ID,input_text_id,content,selected_sub_text,start_index,error_label,suggestions\n\
                      1,t1,Hello world,Hello,0,GREETING,\"[\"\"Hi\"\"]\"\n\
                      2,t1,Hello world,world,6,NOUN,[]\n";
        let parsed = parse_combined_file(source).unwrap();

        assert_eq!(parsed.texts.texts.len(), 1);
        assert_eq!(parsed.texts.texts[0].external_id.as_deref(), Some("t1"));
        assert_eq!(parsed.texts.repeated, 1);

        assert_eq!(parsed.annotations.len(), 2);
        assert_eq!(parsed.annotations[0].text_key, TextKey::Id("t1".into()));
        assert_eq!(parsed.annotations[0].span_text, "Hello");
        assert_eq!(parsed.annotations[0].label, "GREETING");
        assert_eq!(parsed.annotations[0].suggestions, vec!["Hi".to_string()]);
        assert!(parsed.annotations[1].suggestions.is_empty());
    }

    #[test]
    fn input_text_id_takes_priority_over_id() {
        let source = "ID,input_text_id,content,start_index\n99,t7,body,0\n";
        let parsed = parse_combined_file(source).unwrap();
        assert_eq!(parsed.texts.texts[0].key, TextKey::Id("t7".into()));
    }

    #[test]
    fn id_less_rows_key_on_content_prefix() {
        let parsed = parse_combined_file("text,start_index,error_label\nsome body,0,L\n").unwrap();
        assert_eq!(parsed.texts.texts[0].external_id, None);
        assert_eq!(
            parsed.annotations[0].text_key,
            TextKey::Prefix("some body".into())
        );
    }

    #[test]
    fn id_less_row_does_not_attach_to_text_with_that_id() {
        let source = "id,content,start_index,error_label
abc,first text,0,L
,abc,0,M
";
        let parsed = parse_combined_file(source).unwrap();
        assert_eq!(parsed.texts.texts.len(), 2);
        assert_eq!(parsed.texts.texts[0].content, "first text");
        assert_eq!(parsed.annotations[1].text_key, TextKey::Prefix("abc".into()));
    }

    #[test]
    fn rows_without_content_are_dropped() {
        let parsed = parse_combined_file("id,content,start_index\n1,,0\n").unwrap();
        assert!(parsed.texts.texts.is_empty());
        assert!(parsed.annotations.is_empty());
    }

    #[test]
    fn suggestions_accept_json_or_commas() {
        assert_eq!(parse_suggestions(r#"["a", "b, c"]"#), vec!["a", "b, c"]);
        assert_eq!(parse_suggestions("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(parse_suggestions("  ").is_empty());
        assert_eq!(parse_suggestions("[not json"), vec!["[not json"]);
    }
}
