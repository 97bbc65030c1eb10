//! File-by-file scan pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::collect_test_files;
use crate::error::Result;
use crate::source::{Encoding, SourceText};
use crate::walker::extract_assertions;
use crate::{AssertionRecord, Config};

/// A file that was dropped from the run and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Outcome of scanning a set of files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// All records, files in visitation order, each file in document order.
    pub records: Vec<AssertionRecord>,
    pub files_scanned: usize,
    pub files_with_assertions: usize,
    pub skipped: Vec<SkippedFile>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read, parse and walk one file. `display_path` becomes the record filepath.
pub fn analyze_file(path: &Path, display_path: &str) -> Result<Vec<AssertionRecord>> {
    let source = SourceText::read(path)?;
    if source.encoding == Encoding::Latin1 {
        tracing::debug!(path = %path.display(), "decoded as latin-1");
    }
    extract_assertions(display_path, &source.text, path)
}

/// Scan `files`, skipping (and logging) any that cannot be read or parsed.
pub fn scan_files(root: &Path, files: &[PathBuf]) -> Result<ScanReport> {
    let mut report = ScanReport::default();
    for path in files {
        let shown = display_path(root, path);
        tracing::debug!(path = %shown, "analyzing");
        match analyze_file(path, &shown) {
            Ok(records) => {
                report.files_scanned += 1;
                if !records.is_empty() {
                    report.files_with_assertions += 1;
                }
                report.records.extend(records);
            }
            Err(err) if err.is_file_scoped() => {
                tracing::warn!(path = %shown, "skipping file: {err}");
                report.skipped.push(SkippedFile {
                    path: shown,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

/// Discover candidate test files under `root` and scan them.
pub fn scan_directory(root: &Path, config: &Config) -> Result<ScanReport> {
    let files = collect_test_files(root, config)?;
    tracing::info!(count = files.len(), "found test files");
    scan_files(root, &files)
}

/// Path relative to `root` with forward slashes.
pub fn display_path(root: &Path, path: &Path) -> String {
    let rel = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    rel.to_string_lossy().replace('\\', "/")
}
