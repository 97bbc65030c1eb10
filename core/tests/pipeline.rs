use std::fs;
use std::path::Path;

use assertscan_core::{
    collect_test_files, report, scan_directory, scan_files, Config, ScanReport, Summary,
};

fn write_file(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write file");
}

fn scan(root: &Path) -> ScanReport {
    scan_directory(root, &Config::default()).expect("scan")
}

#[test]
fn selects_test_files_by_name_and_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(root, "pkg/core.py", b"def test_hidden():\n    assert 1\n");
    write_file(root, "pkg/test_core.py", b"");
    write_file(root, "tests/helpers.py", b"");
    write_file(root, "tests/data.json", b"{}");
    write_file(root, "testing/conftest.py", b"");
    write_file(root, ".git/hooks/test_hook.py", b"");

    let files = collect_test_files(root, &Config::default()).unwrap();
    let rel: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        rel,
        vec!["pkg/test_core.py", "testing/conftest.py", "tests/helpers.py"]
    );
}

#[test]
fn aggregates_files_in_visitation_order() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(
        root,
        "tests/test_a.py",
        b"def test_add():\n    assert 1 + 1 == 2\n\ndef helper():\n    assert True\n",
    );
    write_file(
        root,
        "tests/test_b.py",
        b"import unittest\n\nclass MathTest(unittest.TestCase):\n    def test_sub(self):\n        self.assertEqual(2-1, 1)\n        self.assertTrue(True)\n",
    );

    let report = scan(root);
    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.files_with_assertions, 2);
    assert!(report.skipped.is_empty());

    let seen: Vec<(&str, &str, &str, usize)> = report
        .records
        .iter()
        .map(|r| {
            (
                r.filepath.as_str(),
                r.test_class.as_str(),
                r.test_name.as_str(),
                r.line_number,
            )
        })
        .collect();
    assert_eq!(
        seen,
        vec![
            ("tests/test_a.py", "", "test_add", 2),
            ("tests/test_b.py", "MathTest", "test_sub", 5),
            ("tests/test_b.py", "MathTest", "test_sub", 6),
        ]
    );
    assert_eq!(report.records[1].assert_string, "self.assertEqual(2-1, 1)");
}

#[test]
fn broken_file_is_skipped_and_run_continues() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(root, "tests/test_bad.py", b"def test_x(:\n    assert 1\n");
    write_file(root, "tests/test_good.py", b"def test_y():\n    assert 2\n");

    let report = scan(root);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, "tests/test_bad.py");
    assert!(report.skipped[0].reason.contains("syntax error"));
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].test_name, "test_y");
}

#[test]
fn latin1_file_is_decoded() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(
        root,
        "test_legacy.py",
        b"def test_name():\n    assert name == 'caf\xE9'\n",
    );

    let report = scan(root);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].filepath, "test_legacy.py");
    assert_eq!(report.records[0].assert_string, "assert name == 'caf\u{e9}'");
}

#[test]
fn missing_file_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(root, "tests/test_ok.py", b"def test_ok():\n    assert 1\n");
    let files = vec![root.join("tests/test_gone.py"), root.join("tests/test_ok.py")];

    let report = scan_files(root, &files).unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, "tests/test_gone.py");
    assert_eq!(report.records.len(), 1);
}

#[test]
fn no_assertions_is_a_valid_outcome() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(root, "tests/test_empty.py", b"def helper():\n    assert True\n");

    let report = scan(root);
    assert!(report.is_empty());
    assert_eq!(report.files_scanned, 1);
    assert!(Summary::from_records(&report.records).is_empty());
}

#[test]
fn scanning_twice_is_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(
        root,
        "tests/test_x.py",
        b"class TestX:\n    def test_a(self):\n        assert 1\n        self.assertIn(1, [1])\n",
    );
    assert_eq!(scan(root).records, scan(root).records);
}

#[test]
fn ignore_globs_prune_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(root, "venv/lib/test_vendor.py", b"def test_v():\n    assert 1\n");
    write_file(root, "tests/test_own.py", b"def test_o():\n    assert 1\n");
    let cfg = Config {
        ignore_globs: vec!["venv/**".into()],
        ..Config::default()
    };

    let report = scan_directory(root, &cfg).unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].filepath, "tests/test_own.py");
}

#[test]
fn csv_file_round_trip_shape() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    write_file(root, "tests/test_a.py", b"def test_a():\n    assert a, \"msg, with comma\"\n");
    let report = scan(root);

    let out = root.join("out.csv");
    report::write_csv_file(&out, &report.records).unwrap();
    let text = fs::read_to_string(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "filepath,testclass,testname,line number,assert string");
    assert_eq!(
        lines[1],
        r#"tests/test_a.py,,test_a,2,"assert a, ""msg, with comma""""#
    );
}
