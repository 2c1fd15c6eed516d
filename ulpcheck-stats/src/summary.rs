//! Histogram Summaries
//!
//! Everything here is derived from bucket counts alone. Quantiles use the
//! nearest-rank definition, so they are always one of the recorded ULP
//! values and need no interpolation.

use crate::histogram::UlpHistogram;
use serde::Serialize;

/// Condensed view of one histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSummary {
    /// Number of samples
    pub total: u64,
    /// Largest error
    pub max_ulp: f64,
    /// Count-weighted mean error
    pub mean_ulp: f64,
    /// Fraction of samples with zero error
    pub exact_fraction: f64,
    /// Median error
    pub p50: f64,
    /// 99th percentile error
    pub p99: f64,
    /// 99.9th percentile error
    pub p999: f64,
}

/// Nearest-rank quantile, `q` in `[0, 1]`. Zero for an empty histogram.
pub fn ulp_quantile(histogram: &UlpHistogram, q: f64) -> f64 {
    let total = histogram.total();
    if total == 0 {
        return 0.0;
    }
    let rank = ((q.clamp(0.0, 1.0) * total as f64).ceil() as u64).max(1);
    let mut seen = 0u64;
    for (ulp, count) in histogram {
        seen += count;
        if seen >= rank {
            return ulp;
        }
    }
    histogram.max_ulp().unwrap_or(0.0)
}

/// Compute the summary of a histogram
pub fn summarize(histogram: &UlpHistogram) -> HistogramSummary {
    let total = histogram.total();
    if total == 0 {
        return HistogramSummary {
            total: 0,
            max_ulp: 0.0,
            mean_ulp: 0.0,
            exact_fraction: 0.0,
            p50: 0.0,
            p99: 0.0,
            p999: 0.0,
        };
    }

    let weighted: f64 = histogram.iter().map(|(ulp, count)| ulp * count as f64).sum();
    let [q50, q99, q999] = crate::SUMMARY_QUANTILES;

    HistogramSummary {
        total,
        max_ulp: histogram.max_ulp().unwrap_or(0.0),
        mean_ulp: weighted / total as f64,
        exact_fraction: histogram.get(0.0) as f64 / total as f64,
        p50: ulp_quantile(histogram, q50),
        p99: ulp_quantile(histogram, q99),
        p999: ulp_quantile(histogram, q999),
    }
}
