//! Encoding detection for uploaded tabular files.
//!
//! Uploads come from spreadsheet tools on every platform, so the bytes may be
//! UTF-8 (with or without a byte-order mark) or a European single-byte code
//! page. Candidates are tried in a fixed order and the first strict decode
//! wins. The legacy pages run from most to least common, ending with
//! ISO-8859-1, which accepts any byte sequence.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1250, WINDOWS_1252};

use crate::error::ImportError;

/// A text encoding the importer knows how to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    /// UTF-8, stripping a leading byte-order mark if present.
    Utf8Sig,
    /// UTF-8 taken as-is.
    Utf8,
    /// Windows code page 1252. Bytes the code page leaves undefined
    /// (0x81, 0x8D, 0x8F, 0x90, 0x9D) make the decode fail.
    Windows1252,
    /// Windows code page 1250 (Central European). Undefined bytes
    /// (0x81, 0x83, 0x88, 0x90, 0x98) make the decode fail.
    Windows1250,
    /// ISO-8859-1. Every byte maps to a character.
    Latin1,
}

/// The candidate order used for every upload.
pub const DEFAULT_CANDIDATES: &[SourceEncoding] = &[
    SourceEncoding::Utf8Sig,
    SourceEncoding::Utf8,
    SourceEncoding::Windows1252,
    SourceEncoding::Windows1250,
    SourceEncoding::Latin1,
];

const WINDOWS_1252_UNDEFINED: &[u8] = &[0x81, 0x8D, 0x8F, 0x90, 0x9D];
const WINDOWS_1250_UNDEFINED: &[u8] = &[0x81, 0x83, 0x88, 0x90, 0x98];

impl SourceEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8Sig => "utf-8-sig",
            Self::Utf8 => "utf-8",
            Self::Windows1252 => "windows-1252",
            Self::Windows1250 => "windows-1250",
            Self::Latin1 => "iso-8859-1",
        }
    }

    /// Strictly decode `bytes`, returning `None` on any malformed input.
    pub fn try_decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8Sig => {
                let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
                (!had_errors).then(|| text.into_owned())
            }
            Self::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(Cow::into_owned),
            Self::Windows1252 => decode_code_page(WINDOWS_1252, WINDOWS_1252_UNDEFINED, bytes),
            Self::Windows1250 => decode_code_page(WINDOWS_1250, WINDOWS_1250_UNDEFINED, bytes),
            Self::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes).into_owned()),
        }
    }
}

/// The WHATWG tables map every byte of a code page, so bytes the vendor
/// table leaves undefined are rejected up front.
fn decode_code_page(
    encoding: &'static Encoding,
    undefined: &[u8],
    bytes: &[u8],
) -> Option<String> {
    if bytes.iter().any(|b| undefined.contains(b)) {
        return None;
    }
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    Some(text.into_owned())
}

impl std::fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: SourceEncoding,
}

/// Decode an uploaded file with [`DEFAULT_CANDIDATES`].
///
/// `file` names the upload in the error message (e.g. `"text CSV file"`).
pub fn decode(bytes: &[u8], file: &'static str) -> Result<Decoded, ImportError> {
    decode_with(bytes, DEFAULT_CANDIDATES, file)
}

/// Decode with an explicit candidate list, returning the first success.
pub fn decode_with(
    bytes: &[u8],
    candidates: &[SourceEncoding],
    file: &'static str,
) -> Result<Decoded, ImportError> {
    candidates
        .iter()
        .find_map(|&encoding| {
            encoding
                .try_decode(bytes)
                .map(|text| Decoded { text, encoding })
        })
        .ok_or(ImportError::Decode { file })
}
