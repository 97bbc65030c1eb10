//! CSV export of assertion records.
//!
//! Rows end in CRLF, as Python's `csv` module writes them.
//!
//! Column names and order are a compatibility contract with existing
//! consumers of the report; do not rename them.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, ScanError};
use crate::AssertionRecord;

pub const CSV_HEADER: [&str; 5] = [
    "filepath",
    "testclass",
    "testname",
    "line number",
    "assert string",
];

pub fn write_csv<W: Write>(out: W, records: &[AssertionRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for r in records {
        let line = r.line_number.to_string();
        wtr.write_record([
            r.filepath.as_str(),
            r.test_class.as_str(),
            r.test_name.as_str(),
            line.as_str(),
            r.assert_string.as_str(),
        ])?;
    }
    wtr.flush().map_err(|err| ScanError::Csv(err.into()))?;
    Ok(())
}

pub fn write_csv_file(path: &Path, records: &[AssertionRecord]) -> Result<()> {
    let file = File::create(path).map_err(|source| ScanError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, records)
}
