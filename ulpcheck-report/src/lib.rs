#![warn(missing_docs)]
//! ulpcheck Report - Output
//!
//! Turns histograms into something to read:
//! - Human text, streamed segment by segment while the run progresses
//! - JSON (machine-readable, the whole run)
//! - CSV (one row per histogram bucket)

mod csv;
mod format;
mod json;
mod printer;
mod report;

pub use csv::generate_csv_report;
pub use format::{fmt_general, segment_label};
pub use json::{SCHEMA_VERSION, generate_json_report};
pub use printer::{NullSink, ReportPrinter, ReportSink};
pub use report::{ModeReport, PolicyInfo, ReportMeta, RunReport, SegmentReport};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text, streamed
    #[default]
    Human,
    /// JSON with the full run
    Json,
    /// CSV for spreadsheets
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Human => "human",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
