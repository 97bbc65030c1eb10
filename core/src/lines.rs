//! Line number to source text lookup.

use std::path::Path;

use crate::source::SourceText;

/// Maps 1-based line numbers to the literal text of each line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    lines: Vec<String>,
}

impl LineIndex {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    /// Build the index straight from disk, for callers that only hold a path.
    ///
    /// The scan pipeline already has the decoded text and uses
    /// [`LineIndex::from_text`] instead. An unreadable file yields an empty
    /// index and a warning; callers fall back to placeholder text for every
    /// line.
    pub fn load(path: &Path) -> Self {
        match SourceText::read(path) {
            Ok(source) => Self::from_text(&source.text),
            Err(err) => {
                tracing::warn!(path = %path.display(), "{err}");
                Self::default()
            }
        }
    }

    pub fn get(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
