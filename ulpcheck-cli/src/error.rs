//! Errors that end a verification run.

use crate::description::DescriptionError;
use thiserror::Error;
use ulpcheck_core::{ConfigError, RoundingError, Shape};
use ulpcheck_funcs::CatalogError;

/// Reasons a run stops before its report is complete
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Invalid configuration value
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Function or binding could not be resolved
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Description file could not be used
    #[error(transparent)]
    Description(#[from] DescriptionError),

    /// Rounding mode could not be installed
    #[error(transparent)]
    Rounding(#[from] RoundingError),

    /// Worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A sample reached the failure threshold under the `first` policy
    #[error("accuracy violation: {sample}")]
    AccuracyViolation {
        /// Rendered sample: mode, inputs, computed and expected values
        sample: String,
    },

    /// A segment handed to a routine of another shape
    #[error("{sample} sample cannot drive a {shape} routine")]
    ShapeMismatch {
        /// Segment kind
        sample: &'static str,
        /// Routine shape
        shape: Shape,
    },

    /// Report or diagnostic output failed
    #[error("output failed: {0}")]
    Io(#[from] std::io::Error),
}
