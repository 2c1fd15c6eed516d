#![warn(missing_docs)]
//! ulpcheck Statistical Engine
//!
//! Accumulates ULP errors into histograms and characterises them:
//! - `UlpHistogram`: exact ULP value → count, merged by pointwise addition
//! - Summaries: maximum and mean error, fraction of exact results
//! - Quantiles read off the cumulative counts (no raw samples are kept)

mod histogram;
mod summary;

pub use histogram::{UlpBucket, UlpHistogram};
pub use summary::{HistogramSummary, summarize, ulp_quantile};

/// Quantiles reported in summaries
pub const SUMMARY_QUANTILES: [f64; 3] = [0.5, 0.99, 0.999];
