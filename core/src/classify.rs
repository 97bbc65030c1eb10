//! Heuristics deciding which files and functions count as tests.
//!
//! Both predicates are name-based only. They ignore project configuration such
//! as pytest's `python_files` and deliberately match loosely.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::Result;
use crate::Config;

const TEST_MARKER: &str = "test";

/// True when the file name or any directory on its path mentions "test".
///
/// Pass a path relative to the scanned root so that the location of the root
/// itself (a temp dir, a home folder called `tests`) does not leak in.
pub fn is_test_file(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(part) => part.to_string_lossy().to_lowercase().contains(TEST_MARKER),
        _ => false,
    })
}

/// True when a function name looks like a test.
///
/// The substring branch subsumes the prefix checks and also matches names such
/// as `latest_value`.
pub fn is_test_function(name: &str) -> bool {
    name.starts_with("test_")
        || name.starts_with("Test")
        || name.to_lowercase().contains(TEST_MARKER)
}

/// Walk `root` and return candidate test files in a stable order.
pub fn collect_test_files(root: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    let ignore = build_ignore_set(&config.ignore_globs)?;
    let mut files = Vec::new();
    let mut walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry_res) = walker.next() {
        let entry = entry_res?;
        let entry_path = entry.path();
        let relative = entry_path.strip_prefix(root).unwrap_or(entry_path);
        if relative.as_os_str().is_empty() {
            continue;
        }
        if let Some(set) = &ignore {
            if set.is_match(relative) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }
        }
        if !entry.file_type().is_file() {
            continue;
        }
        if has_extension(entry_path, &config.extensions) && is_test_file(relative) {
            files.push(entry_path.to_path_buf());
        }
    }
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}

fn build_ignore_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
        // "dir/**" should also prune the directory entry itself
        if let Some(dir) = pattern.strip_suffix("/**") {
            builder.add(Glob::new(dir)?);
        }
    }
    Ok(Some(builder.build()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_by_name_or_directory() {
        assert!(is_test_file(Path::new("test_math.py")));
        assert!(is_test_file(Path::new("pkg/math_TEST.py")));
        assert!(is_test_file(Path::new("Tests/unit/helpers.py")));
        assert!(is_test_file(Path::new("src/testing/conftest.py")));
        assert!(!is_test_file(Path::new("src/pkg/math.py")));
        assert!(!is_test_file(Path::new("setup.py")));
    }

    #[test]
    fn test_function_prefixes_and_substring() {
        assert!(is_test_function("test_add"));
        assert!(is_test_function("TestSomething"));
        assert!(is_test_function("check_TEST_case"));
        assert!(is_test_function("latest_value"));
        assert!(!is_test_function("helper"));
        assert!(!is_test_function("setUp"));
        assert!(!is_test_function("tst_add"));
    }

    #[test]
    fn extension_match_ignores_case_and_dot() {
        let exts = vec![".py".to_string()];
        assert!(has_extension(Path::new("a/test_x.PY"), &exts));
        assert!(!has_extension(Path::new("a/test_x.pyc"), &exts));
        assert!(!has_extension(Path::new("a/Makefile"), &exts));
    }
}
