//! CSV import of texts and annotations.
//!
//! Three upload shapes are supported:
//!
//! - **Text file** ([`text`]): one text per row, keyed by an external id.
//! - **Annotation file** ([`annotation`]): one annotation per row, referring
//!   to texts from a text file by external id. Used together with a text file
//!   in "dual" mode.
//! - **Combined file** ([`combined`]): texts and annotations in one file, as
//!   produced by export.
//!
//! Parsing and planning are pure. The caller persists the texts, builds a
//! map of external id to [`plan::TextTarget`], and hands that back to
//! [`plan::plan_annotations`] to get the rows to insert.

pub mod annotation;
pub mod combined;
pub mod plan;
pub mod text;

use std::collections::HashMap;
use std::fmt;

use csv::{ReaderBuilder, StringRecord};
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{ImportError, RowWarning};
use crate::span::char_prefix;

/// Number of leading content characters used as the dedupe key for rows
/// without an external id.
pub const FALLBACK_KEY_CHARS: usize = 50;

/// Identity of a text within one upload.
///
/// External ids and content prefixes are separate namespaces: a row without
/// an id never folds into, or resolves to, a row whose id happens to equal
/// its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextKey {
    Id(String),
    /// First [`FALLBACK_KEY_CHARS`] characters of the content.
    Prefix(String),
}

impl TextKey {
    pub fn for_row(external_id: Option<&str>, content: &str) -> Self {
        match external_id {
            Some(id) => Self::Id(id.to_string()),
            None => Self::Prefix(char_prefix(content, FALLBACK_KEY_CHARS).to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Id(key) | Self::Prefix(key) => key,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl fmt::Display for TextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Import mode selected by the `import_type` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    #[default]
    Single,
    Dual,
}

impl ImportMode {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "dual" => Self::Dual,
            _ => Self::Single,
        }
    }
}

/// A text to create or update, after normalization and in-file deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    /// First data row this text appeared on.
    pub row: usize,
    pub key: TextKey,
    pub external_id: Option<String>,
    pub content: String,
}

/// Parsed texts plus the warnings collected while reading them.
#[derive(Debug, Clone, Default)]
pub struct ParsedTexts {
    pub texts: Vec<TextRow>,
    /// Rows folded into an earlier row with the same key.
    pub repeated: usize,
    pub warnings: Vec<RowWarning>,
}

/// Outcome counters reported to the uploader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub texts_created: usize,
    pub texts_updated: usize,
    pub texts_unchanged: usize,
    /// Text rows folded into an earlier row with the same key.
    pub texts_repeated: usize,
    pub annotations_imported: usize,
    pub duplicates: usize,
    pub warnings: Vec<RowWarning>,
}

/// Trim, then strip embedded null bytes and carriage returns.
pub fn normalize_content(raw: &str) -> String {
    raw.trim().replace(['\0', '\r'], "")
}

/// Non-blank trimmed value, or `None`.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Header name to column position. Later duplicates win, matching how a
/// dictionary-style row reader resolves repeated header names.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeaderIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(str::to_string).collect();
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, positions }
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub(crate) fn contains_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.contains(n))
    }

    /// Value of the first alias present in the header. A short row yields
    /// an empty string for a present-but-missing cell.
    pub(crate) fn get<'r>(&self, record: &'r StringRecord, aliases: &[&str]) -> Option<&'r str> {
        aliases
            .iter()
            .find_map(|alias| self.positions.get(*alias))
            .map(|&pos| record.get(pos).unwrap_or(""))
    }

    pub(crate) fn get_or_empty<'r>(&self, record: &'r StringRecord, aliases: &[&str]) -> &'r str {
        self.get(record, aliases).unwrap_or("")
    }
}

/// Read the header and all data records of a decoded CSV document.
pub(crate) fn read_records(
    source: &str,
    file: &'static str,
) -> Result<(HeaderIndex, Vec<StringRecord>), ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source.as_bytes());

    let headers = reader.headers().map_err(|e| csv_error(file, e))?.clone();
    let index = HeaderIndex::new(&headers);

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| csv_error(file, e))?;

    Ok((index, records))
}

fn csv_error(file: &'static str, err: csv::Error) -> ImportError {
    ImportError::Csv {
        file,
        message: err.to_string(),
    }
}

/// Folds rows that share a key into one text. The first occurrence fixes the
/// position; later occurrences replace the content, so the file's last word
/// on a given id is what gets stored.
#[derive(Debug, Default)]
pub(crate) struct TextCollector {
    texts: IndexMap<TextKey, TextRow>,
    repeated: usize,
}

impl TextCollector {
    pub(crate) fn push(&mut self, row: usize, external_id: Option<String>, content: String) {
        let key = TextKey::for_row(external_id.as_deref(), &content);

        if let Some(existing) = self.texts.get_mut(&key) {
            existing.content = content;
            self.repeated += 1;
            return;
        }

        self.texts.insert(
            key.clone(),
            TextRow {
                row,
                key,
                external_id,
                content,
            },
        );
    }

    pub(crate) fn finish(self, warnings: Vec<RowWarning>) -> ParsedTexts {
        ParsedTexts {
            texts: self.texts.into_values().collect(),
            repeated: self.repeated,
            warnings,
        }
    }
}
