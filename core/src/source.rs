//! Source text loading with encoding fallback.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Encoding that successfully decoded a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

/// Decoded contents of one source file.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub text: String,
    pub encoding: Encoding,
}

impl SourceText {
    /// Read a file and decode it, trying UTF-8 before Latin-1.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::decode(bytes))
    }

    pub fn decode(bytes: Vec<u8>) -> Self {
        let bytes = match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => rest.to_vec(),
            None => bytes,
        };
        let (mut text, encoding) = match String::from_utf8(bytes) {
            Ok(text) => (text, Encoding::Utf8),
            Err(err) => (
                err.as_bytes().iter().map(|&b| char::from(b)).collect(),
                Encoding::Latin1,
            ),
        };
        if text.contains('\r') {
            text = normalize_newlines(&text).into_owned();
        }
        Self { text, encoding }
    }
}

/// Turn old Mac `\r` line endings into `\n`. `\r\n` pairs are left alone.
pub(crate) fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' && chars.peek() != Some(&'\n') {
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
