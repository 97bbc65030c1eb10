//! Assertion scanner core.
//! Finds assertion statements and assertion-method calls inside Python test
//! functions and summarises them.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod lines;
pub mod report;
pub mod scan;
pub mod source;
pub mod walker;

pub use aggregate::{categorize, AssertionCategory, Count, FileStats, Summary};
pub use classify::{collect_test_files, is_test_file, is_test_function};
pub use error::{Result, ScanError};
pub use lines::LineIndex;
pub use scan::{analyze_file, scan_directory, scan_files, ScanReport, SkippedFile};

/// One assertion found inside a test function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionRecord {
    pub filepath: String,
    /// Nearest enclosing class, or empty when the assertion is not in a class.
    #[serde(rename = "testclass")]
    pub test_class: String,
    #[serde(rename = "testname")]
    pub test_name: String,
    pub line_number: usize,
    /// Trimmed source line, or a placeholder when the line was unavailable.
    pub assert_string: String,
}

/// How many entries each ranking in the report keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    pub top_files: usize,
    pub top_classes: usize,
    pub top_functions: usize,
    pub top_directories: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            top_files: 10,
            top_classes: 10,
            top_functions: 10,
            top_directories: 15,
        }
    }
}

/// Top-level configuration, usually read from `assertscan.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File extensions treated as Python sources.
    pub extensions: Vec<String>,
    /// Globs, relative to the scanned root, that are never visited.
    pub ignore_globs: Vec<String>,
    pub report: ReportLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec!["py".into()],
            ignore_globs: vec![".git/**".into()],
            report: ReportLimits::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|err| ScanError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Load `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml(
            "ignore_globs: [\"venv/**\"]\nreport:\n  top_files: 5\n",
            Path::new("assertscan.yml"),
        )
        .unwrap();
        assert_eq!(cfg.extensions, vec!["py".to_string()]);
        assert_eq!(cfg.ignore_globs, vec!["venv/**".to_string()]);
        assert_eq!(cfg.report.top_files, 5);
        assert_eq!(cfg.report.top_directories, 15);
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let err = Config::from_yaml("extensions: 3\n", Path::new("bad.yml")).unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let cfg = Config::load(Path::new("/no/such/assertscan.yml")).unwrap();
        assert_eq!(cfg.report.top_classes, 10);
        assert_eq!(cfg.ignore_globs, vec![".git/**".to_string()]);
    }

    #[test]
    fn record_serializes_with_report_column_names() {
        let record = AssertionRecord {
            filepath: "tests/test_a.py".into(),
            test_class: String::new(),
            test_name: "test_a".into(),
            line_number: 2,
            assert_string: "assert a".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["testclass"], "");
        assert_eq!(json["testname"], "test_a");
        assert_eq!(json["line_number"], 2);
    }
}
