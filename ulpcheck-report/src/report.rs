//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::Serialize;
use ulpcheck_core::{Binding, FailMode, FunctionDescriptor, RoundingMode};
use ulpcheck_stats::{HistogramSummary, UlpHistogram, summarize};

/// Complete run report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Run metadata
    pub meta: ReportMeta,
    /// One entry per verified rounding mode, in run order
    pub modes: Vec<ModeReport>,
    /// Wall-clock time of the whole run
    pub elapsed_secs: f64,
}

impl RunReport {
    /// Samples at or above the threshold across the run
    pub fn failures(&self) -> u64 {
        self.modes
            .iter()
            .flat_map(|m| &m.segments)
            .map(|s| s.failures)
            .sum()
    }

    /// Largest recorded error across the run
    pub fn max_ulp(&self) -> f64 {
        self.modes
            .iter()
            .flat_map(|m| &m.segments)
            .map(|s| s.summary.max_ulp)
            .fold(0.0, f64::max)
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    /// Report schema version
    pub schema_version: u32,
    /// ulpcheck version
    pub version: String,
    /// Start of the run
    pub timestamp: DateTime<Utc>,
    /// Function under test
    pub function: FunctionDescriptor,
    /// Implementation under test
    pub binding: Binding,
    /// Reference backend
    pub reference: String,
    /// Master seed, when one was given
    pub seed: Option<u64>,
    /// Worker threads
    pub threads: usize,
    /// Failure policy
    pub policy: PolicyInfo,
}

/// Failure policy as configured
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PolicyInfo {
    /// none / first / all
    pub fail: FailMode,
    /// Failure threshold in ULPs
    pub threshold: f64,
    /// Clamp applied to recorded errors
    pub max_ulp: f64,
}

/// All segments of one rounding mode
#[derive(Debug, Clone, Serialize)]
pub struct ModeReport {
    /// Rounding mode
    pub mode: RoundingMode,
    /// Segments in description order
    pub segments: Vec<SegmentReport>,
    /// Wall-clock time of the mode
    pub elapsed_secs: f64,
}

/// One sample specification under one mode
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    /// Segment kind, e.g. `random-1arg`
    pub kind: String,
    /// Header label (range or interval name)
    pub label: String,
    /// ULP histogram
    pub histogram: UlpHistogram,
    /// Histogram summary
    pub summary: HistogramSummary,
    /// Samples at or above the failure threshold (counted under `all`)
    pub failures: u64,
    /// Wall-clock time of the segment
    pub elapsed_secs: f64,
}

impl SegmentReport {
    /// Build from a finished histogram
    pub fn new(
        kind: impl Into<String>,
        label: impl Into<String>,
        histogram: UlpHistogram,
        failures: u64,
        elapsed_secs: f64,
    ) -> Self {
        let summary = summarize(&histogram);
        Self {
            kind: kind.into(),
            label: label.into(),
            histogram,
            summary,
            failures,
            elapsed_secs,
        }
    }

    /// Number of samples
    pub fn total(&self) -> u64 {
        self.summary.total
    }
}
