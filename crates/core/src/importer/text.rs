//! Text file parsing.
//!
//! A text file needs one id column and one content column. When those are
//! the only two columns, each raw line is split on the first (or last) comma
//! instead of going through the CSV reader, so content containing quotes and
//! commas is stored exactly as it appears in the file.

use crate::error::{ImportError, RowWarning};
use crate::importer::{non_blank, normalize_content, read_records, ParsedTexts, TextCollector};

/// Accepted id column names (case-sensitive).
pub const TEXT_ID_COLUMNS: &[&str] = &["ID", "id"];

/// Accepted content column names (case-sensitive), in lookup priority.
pub const TEXT_CONTENT_COLUMNS: &[&str] = &["Text", "text", "Content", "content"];

const FILE: &str = "text CSV file";

/// Parse a decoded text file into deduplicated text rows.
///
/// Fails with [`ImportError::Schema`] when the file has no data rows or
/// lacks either an id or a content column.
pub fn parse_text_file(source: &str) -> Result<ParsedTexts, ImportError> {
    let (headers, records) = read_records(source, FILE)?;

    if records.is_empty() {
        return Err(ImportError::Schema("Text CSV file is empty.".into()));
    }
    if !headers.contains_any(TEXT_ID_COLUMNS) {
        return Err(ImportError::Schema(
            "Text CSV must contain an ID column (ID or id).".into(),
        ));
    }
    if !headers.contains_any(TEXT_CONTENT_COLUMNS) {
        return Err(ImportError::Schema(
            "Text CSV must contain a text content column (Text, text, Content or content).".into(),
        ));
    }

    if let Some(layout) = TwoColumnLayout::detect(headers.names()) {
        return Ok(parse_raw_lines(source, layout));
    }

    let mut collector = TextCollector::default();
    for (i, record) in records.iter().enumerate() {
        let content = headers.get_or_empty(record, TEXT_CONTENT_COLUMNS);
        if content.trim().is_empty() {
            continue;
        }
        let external_id = non_blank(headers.get_or_empty(record, TEXT_ID_COLUMNS));
        collector.push(i + 1, external_id, normalize_content(content));
    }

    Ok(collector.finish(Vec::new()))
}

/// Which side of the single delimiter holds the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TwoColumnLayout {
    IdFirst,
    ContentFirst,
}

impl TwoColumnLayout {
    fn detect(names: &[String]) -> Option<Self> {
        let [first, second] = names else {
            return None;
        };
        let is_id = |n: &str| TEXT_ID_COLUMNS.contains(&n);
        let is_content = |n: &str| TEXT_CONTENT_COLUMNS.contains(&n);

        let (first, second) = (first.as_str(), second.as_str());
        if is_id(first) && is_content(second) {
            Some(Self::IdFirst)
        } else if is_content(first) && is_id(second) {
            Some(Self::ContentFirst)
        } else {
            None
        }
    }

    fn split<'a>(self, line: &'a str) -> Option<(&'a str, &'a str)> {
        match self {
            Self::IdFirst => line.split_once(','),
            Self::ContentFirst => line.rsplit_once(',').map(|(content, id)| (id, content)),
        }
    }
}

fn parse_raw_lines(source: &str, layout: TwoColumnLayout) -> ParsedTexts {
    let mut collector = TextCollector::default();
    let mut warnings = Vec::new();

    for (i, line) in source.lines().skip(1).enumerate() {
        let row = i + 1;
        if line.is_empty() {
            continue;
        }
        let Some((id, content)) = layout.split(line) else {
            warnings.push(RowWarning::new(row, "Row has no delimiter. Skipping text."));
            continue;
        };
        if content.trim().is_empty() {
            continue;
        }
        collector.push(row, non_blank(id), content.replace('\0', ""));
    }

    collector.finish(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::TextKey;
    use assert_matches::assert_matches;

    #[test]
    fn reads_standard_csv_with_extra_columns() {
        let parsed = parse_text_file("id,text,source\n1,  Hello world ,web\n2,Second,web\n").unwrap();
        assert_eq!(parsed.texts.len(), 2);
        assert_eq!(parsed.texts[0].external_id.as_deref(), Some("1"));
        assert_eq!(parsed.texts[0].content, "Hello world");
        assert_eq!(parsed.texts[1].content, "Second");
    }

    #[test]
    fn skips_rows_with_blank_content() {
        let parsed = parse_text_file("ID,Content,x\n1,   ,a\n2,kept,b\n").unwrap();
        assert_eq!(parsed.texts.len(), 1);
        assert_eq!(parsed.texts[0].key, TextKey::Id("2".into()));
    }

    #[test]
    fn repeated_ids_collapse_to_one_text() {
        let parsed = parse_text_file("ID,text,n\n7,old,1\n7,new,2\n").unwrap();
        assert_eq!(parsed.texts.len(), 1);
        assert_eq!(parsed.repeated, 1);
        assert_eq!(parsed.texts[0].content, "new");
    }

    #[test]
    fn id_less_row_matching_another_id_stays_separate() {
        let parsed = parse_text_file("id,text,x\nabc,first text,1\n,abc,2\n").unwrap();
        assert_eq!(parsed.texts.len(), 2);
        assert_eq!(parsed.repeated, 0);
        assert_eq!(parsed.texts[0].external_id.as_deref(), Some("abc"));
        assert_eq!(parsed.texts[0].content, "first text");
        assert_eq!(parsed.texts[1].external_id, None);
        assert_eq!(parsed.texts[1].content, "abc");
    }

    #[test]
    fn missing_id_column_is_a_schema_error() {
        let err = parse_text_file("key,text\n1,hello\n").unwrap_err();
        assert_matches!(err, ImportError::Schema(msg) if msg.contains("ID column"));
    }

    #[test]
    fn missing_content_column_is_a_schema_error() {
        let err = parse_text_file("ID,body\n1,hello\n").unwrap_err();
        assert_matches!(err, ImportError::Schema(msg) if msg.contains("content column"));
    }

    #[test]
    fn header_names_are_case_sensitive() {
        assert!(parse_text_file("Id,TEXT\n1,hello\n").is_err());
    }

    #[test]
    fn empty_file_is_a_schema_error() {
        assert_matches!(parse_text_file("ID,text\n"), Err(ImportError::Schema(_)));
    }

    #[test]
    fn two_column_file_preserves_quotes_and_commas() {
        let parsed = parse_text_file("ID,text\n1,\"Hello, world\" she said\n").unwrap();
        assert_eq!(parsed.texts[0].external_id.as_deref(), Some("1"));
        assert_eq!(parsed.texts[0].content, "\"Hello, world\" she said");
    }

    #[test]
    fn two_column_file_with_content_first_splits_on_last_comma() {
        let parsed = parse_text_file("text,id\nlists, commas, more,42\r\n").unwrap();
        assert_eq!(parsed.texts[0].external_id.as_deref(), Some("42"));
        assert_eq!(parsed.texts[0].content, "lists, commas, more");
    }

    #[test]
    fn two_column_file_keeps_surrounding_whitespace() {
        let parsed = parse_text_file("id,content\n1,  padded \n").unwrap();
        assert_eq!(parsed.texts[0].content, "  padded ");
    }

    #[test]
    fn two_column_line_without_delimiter_is_a_row_warning() {
        let parsed = parse_text_file("id,content\nlonely\n2,ok\n").unwrap();
        assert_eq!(parsed.texts.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].row, 1);
    }
}
