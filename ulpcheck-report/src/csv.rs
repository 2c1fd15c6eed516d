//! CSV Output
//!
//! One row per (mode, segment, bucket).

use crate::report::RunReport;
use std::fmt::Write;

/// Generate a CSV report with a header row
pub fn generate_csv_report(report: &RunReport) -> String {
    let mut out = String::from("function,mode,segment,label,ulp,count,percent\n");
    for mode in &report.modes {
        for (index, segment) in mode.segments.iter().enumerate() {
            let total = segment.total().max(1) as f64;
            for (ulp, count) in &segment.histogram {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{},{},{:.4}",
                    report.meta.function.name,
                    mode.mode.abbrev(),
                    index,
                    escape(segment.label.trim()),
                    ulp,
                    count,
                    count as f64 / total * 100.0
                );
            }
        }
    }
    out
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
