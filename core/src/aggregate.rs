//! Summary statistics over the merged record sequence.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AssertionRecord, ReportLimits};

/// Coarse assertion kind guessed from the assertion text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssertionCategory {
    Equality,
    BooleanTrue,
    BooleanFalse,
    Exception,
    Membership,
    IdentityNot,
    Identity,
    GreaterThan,
    LessThan,
    Other,
}

impl AssertionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AssertionCategory::Equality => "Equality",
            AssertionCategory::BooleanTrue => "Boolean True",
            AssertionCategory::BooleanFalse => "Boolean False",
            AssertionCategory::Exception => "Exception",
            AssertionCategory::Membership => "Membership",
            AssertionCategory::IdentityNot => "Identity Not",
            AssertionCategory::Identity => "Identity",
            AssertionCategory::GreaterThan => "Greater Than",
            AssertionCategory::LessThan => "Less Than",
            AssertionCategory::Other => "Other",
        }
    }
}

impl fmt::Display for AssertionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify by case-insensitive substring. The first matching rule wins, so
/// `assertNotIn` lands in Membership and `assertIsNot` in Identity Not.
pub fn categorize(assert_string: &str) -> AssertionCategory {
    let text = assert_string.to_lowercase();
    let has = |needle: &str| text.contains(needle);
    if has("equal") {
        AssertionCategory::Equality
    } else if has("true") {
        AssertionCategory::BooleanTrue
    } else if has("false") {
        AssertionCategory::BooleanFalse
    } else if has("raise") || has("exception") {
        AssertionCategory::Exception
    } else if has("in") {
        AssertionCategory::Membership
    } else if has("is") && has("not") {
        AssertionCategory::IdentityNot
    } else if has("is") {
        AssertionCategory::Identity
    } else if has("greater") || has(">") {
        AssertionCategory::GreaterThan
    } else if has("less") || has("<") {
        AssertionCategory::LessThan
    } else {
        AssertionCategory::Other
    }
}

/// Last component of the record's parent directory, or `root` when the path
/// has no directory part. A file directly under `/` has an empty label.
pub fn directory_label(filepath: &str) -> String {
    let normalized = filepath.replace('\\', "/");
    match normalized.rsplit_once('/') {
        Some((dir, _)) => dir
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
        None => "root".to_string(),
    }
}

/// Name/count pair in a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    pub name: String,
    pub count: usize,
}

/// Per-file breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub filepath: String,
    pub assertions: usize,
    pub test_functions: usize,
    pub test_classes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_assertions: usize,
    pub files: usize,
    pub average_per_file: f64,
    pub unique_test_classes: usize,
    pub by_file: Vec<Count>,
    pub by_class: Vec<Count>,
    pub by_function: Vec<Count>,
    pub by_category: Vec<Count>,
    pub by_directory: Vec<Count>,
    pub file_stats: Vec<FileStats>,
}

impl Summary {
    /// Full, untruncated counts.
    pub fn from_records(records: &[AssertionRecord]) -> Self {
        let by_file = count_by(records.iter().map(|r| r.filepath.as_str()));
        let by_class = count_by(
            records
                .iter()
                .filter(|r| !r.test_class.is_empty())
                .map(|r| r.test_class.as_str()),
        );
        let by_function = count_by(records.iter().map(|r| r.test_name.as_str()));
        let categories: Vec<AssertionCategory> =
            records.iter().map(|r| categorize(&r.assert_string)).collect();
        let by_category = count_by(categories.iter().map(|c| c.label()));
        let directories: Vec<String> =
            records.iter().map(|r| directory_label(&r.filepath)).collect();
        let by_directory = count_by(directories.iter().map(String::as_str));

        let files = by_file.len();
        let average_per_file = if files == 0 {
            0.0
        } else {
            round2(records.len() as f64 / files as f64)
        };

        Self {
            total_assertions: records.len(),
            files,
            average_per_file,
            unique_test_classes: by_class.len(),
            by_file,
            by_class,
            by_function,
            by_category,
            by_directory,
            file_stats: file_stats(records),
        }
    }

    /// Truncate the rankings to the configured sizes. Classes past the limit
    /// are folded into a single "Others" entry.
    pub fn limited(mut self, limits: &ReportLimits) -> Self {
        self.by_file.truncate(limits.top_files);
        self.by_function.truncate(limits.top_functions);
        self.by_directory.truncate(limits.top_directories);
        self.file_stats.truncate(limits.top_files);
        if self.by_class.len() > limits.top_classes {
            let others: usize = self.by_class[limits.top_classes..]
                .iter()
                .map(|c| c.count)
                .sum();
            self.by_class.truncate(limits.top_classes);
            self.by_class.push(Count {
                name: "Others".into(),
                count: others,
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.total_assertions == 0
    }
}

fn count_by<'a>(names: impl Iterator<Item = &'a str>) -> Vec<Count> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    let mut ranked: Vec<Count> = counts
        .into_iter()
        .map(|(name, count)| Count {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked
}

fn file_stats(records: &[AssertionRecord]) -> Vec<FileStats> {
    #[derive(Default)]
    struct Acc<'a> {
        assertions: usize,
        functions: BTreeSet<&'a str>,
        classes: BTreeSet<&'a str>,
    }

    let mut per_file: BTreeMap<&str, Acc> = BTreeMap::new();
    for record in records {
        let acc = per_file.entry(record.filepath.as_str()).or_default();
        acc.assertions += 1;
        acc.functions.insert(record.test_name.as_str());
        if !record.test_class.is_empty() {
            acc.classes.insert(record.test_class.as_str());
        }
    }
    let mut stats: Vec<FileStats> = per_file
        .into_iter()
        .map(|(filepath, acc)| FileStats {
            filepath: filepath.to_string(),
            assertions: acc.assertions,
            test_functions: acc.functions.len(),
            test_classes: acc.classes.len(),
        })
        .collect();
    stats.sort_by(|a, b| {
        b.assertions
            .cmp(&a.assertions)
            .then_with(|| a.filepath.cmp(&b.filepath))
    });
    stats
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
