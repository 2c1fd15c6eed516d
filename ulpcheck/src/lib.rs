#![warn(missing_docs)]
//! # ulpcheck
//!
//! Measures how far a math routine's results are from the correctly rounded
//! value, in units in the last place, under each of the four IEEE-754
//! rounding modes.
//!
//! - **Four rounding modes**: every segment runs under round-to-nearest,
//!   upward, downward and toward zero, each against a reference rounded the
//!   same way
//! - **Random and exhaustive inputs**: uniform draws from a range, or every
//!   bit pattern of an interval (all normal binary32 values, for instance)
//! - **Reproducible**: per-worker generators derived from one master seed
//!   replay the same inputs in every mode
//! - **Failure policies**: keep going silently, stop at the first sample over
//!   the threshold, or report every one
//! - **Reports**: streamed ULP histograms, plus JSON and CSV
//!
//! ## Quick Start
//!
//! ```text
//! $ cat sinf.json
//! { "function": "sinf", "samples": [ { "x": ["-pi", "pi"], "count": 1000000 } ] }
//! $ ulpcheck --desc sinf.json --candidate --fail first
//! ```
//!
//! ## Library Use
//!
//! ```ignore
//! use ulpcheck::prelude::*;
//!
//! let sampler = ParallelSampler::new(&SamplerOptions::default(), FailurePolicy::default())?;
//! let modes = RoundingModeSet::all();
//! let orchestrator = Orchestrator::new(&sampler, &modes);
//! let report = orchestrator.run(meta, &routine, &specs, &mut NullSink)?;
//! ```

// Re-export core types
pub use ulpcheck_core::{
    Binding, ConfigError, FailMode, FailurePolicy, FloatFormat, FullRange, FunctionDescriptor,
    HAS_ROUNDING_CONTROL, HexFloat, Inputs, IntRange, ModeScope, Range, RoundingError,
    RoundingGuard, RoundingMode, RoundingModeSet, SampleResult, SampleSpec, SeedBank, Shape,
    Width, WyRand, ulp, ulpdiff,
};

// Re-export the catalog
pub use ulpcheck_funcs::{
    Bindings, CatalogError, Candidate, FunctionDef, Kernel, REFERENCE_BACKEND, Reference,
    Routine, find_function, functions,
};

// Re-export stats
pub use ulpcheck_stats::{HistogramSummary, UlpHistogram, summarize};

// Re-export reports
pub use ulpcheck_report::{
    ModeReport, NullSink, OutputFormat, ReportMeta, ReportPrinter, ReportSink, RunReport,
    SegmentReport, generate_csv_report, generate_json_report,
};

// Re-export the engine
pub use ulpcheck_cli::{
    Description, DescriptionError, Orchestrator, ParallelSampler, SamplerOptions, VerifyError,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Binding, Description, FailMode, FailurePolicy, NullSink, Orchestrator, ParallelSampler,
        Range, ReportPrinter, RoundingMode, RoundingModeSet, SampleSpec, SamplerOptions,
        find_function,
    };
}

/// Run the ulpcheck CLI.
///
/// ```ignore
/// fn main() {
///     if let Err(e) = ulpcheck::run() {
///         eprintln!("Error: {}", e);
///         std::process::exit(1);
///     }
/// }
/// ```
pub use ulpcheck_cli::run;
