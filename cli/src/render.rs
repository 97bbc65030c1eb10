//! Terminal rendering: record table, statistics and text charts.

use assertscan_core::{AssertionRecord, Count, ScanReport, Summary};
use console::style;

const BAR_WIDTH: usize = 40;
const TABLE_ROWS: usize = 20;

pub fn print_skipped(report: &ScanReport) {
    if report.skipped.is_empty() {
        return;
    }
    println!("{}", style("Skipped files:").yellow().bold());
    for skipped in &report.skipped {
        println!("  - {}: {}", style(&skipped.path).cyan(), skipped.reason);
    }
    println!();
}

pub fn print_table(records: &[AssertionRecord]) {
    println!("{}", style("Assertion data").bold());
    for r in records.iter().take(TABLE_ROWS) {
        let scope = if r.test_class.is_empty() {
            r.test_name.clone()
        } else {
            format!("{}.{}", r.test_class, r.test_name)
        };
        println!(
            "  {}:{} {} {}",
            style(&r.filepath).cyan(),
            r.line_number,
            style(scope).yellow(),
            r.assert_string
        );
    }
    if records.len() > TABLE_ROWS {
        println!("  ... {} more rows in the CSV", records.len() - TABLE_ROWS);
    }
    println!();
}

pub fn print_statistics(summary: &Summary) {
    println!("{}", style("Assertion statistics").bold());
    println!("  Total assertions:         {}", summary.total_assertions);
    println!("  Avg. assertions per file: {:.2}", summary.average_per_file);
    println!("  Unique test classes:      {}", summary.unique_test_classes);
    println!();

    println!("{}", style("Top test functions").bold());
    for c in &summary.by_function {
        println!("  {:>5}  {}", c.count, c.name);
    }
    println!();

    println!("{}", style("Files with most assertions").bold());
    println!("  {:>10} {:>10} {:>8}  file", "assertions", "functions", "classes");
    for f in &summary.file_stats {
        println!(
            "  {:>10} {:>10} {:>8}  {}",
            f.assertions, f.test_functions, f.test_classes, f.filepath
        );
    }
    println!();
}

pub fn print_charts(summary: &Summary) {
    print_bar_chart("Top files by assertion count", &file_name_counts(&summary.by_file));
    if summary.by_class.is_empty() {
        println!("{}", style("No test class data available").dim());
        println!();
    } else {
        print_bar_chart("Assertion distribution by test class", &summary.by_class);
    }
    print_bar_chart("Assertion types", &summary.by_category);
    print_bar_chart("Assertion concentration by directory", &summary.by_directory);
}

fn file_name_counts(counts: &[Count]) -> Vec<Count> {
    counts
        .iter()
        .map(|c| Count {
            name: c.name.rsplit('/').next().unwrap_or(&c.name).to_string(),
            count: c.count,
        })
        .collect()
}

fn print_bar_chart(title: &str, counts: &[Count]) {
    println!("{}", style(title).bold());
    let label_width = counts.iter().map(|c| c.name.chars().count()).max().unwrap_or(0);
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    for c in counts {
        println!(
            "  {:<width$} {} {}",
            c.name,
            style(bar(c.count, max)).blue(),
            c.count,
            width = label_width
        );
    }
    println!();
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH).div_ceil(max);
    "█".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_max() {
        assert_eq!(bar(10, 10).chars().count(), BAR_WIDTH);
        assert_eq!(bar(5, 10).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(1, 1000).chars().count(), 1);
        assert_eq!(bar(0, 0), "");
    }

    #[test]
    fn file_counts_show_base_names() {
        let counts = vec![Count {
            name: "tests/unit/test_a.py".into(),
            count: 4,
        }];
        assert_eq!(file_name_counts(&counts)[0].name, "test_a.py");
    }
}
