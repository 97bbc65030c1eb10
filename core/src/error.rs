//! Error taxonomy for scanning.
//!
//! Read and parse failures are scoped to a single file: the pipeline logs them
//! and moves on. Everything else aborts the run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {} at line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("python grammar unavailable: {0}")]
    Grammar(String),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("csv output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl ScanError {
    /// True for failures that only cost the current file.
    pub fn is_file_scoped(&self) -> bool {
        matches!(self, ScanError::Read { .. } | ScanError::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_parse_are_file_scoped() {
        let read = ScanError::Read {
            path: "a.py".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let parse = ScanError::Parse {
            path: "b.py".into(),
            line: 3,
            message: "unexpected token".into(),
        };
        assert!(read.is_file_scoped());
        assert!(parse.is_file_scoped());
        assert!(!ScanError::Grammar("abi".into()).is_file_scoped());
        assert_eq!(
            parse.to_string(),
            "syntax error in b.py at line 3: unexpected token"
        );
    }
}
