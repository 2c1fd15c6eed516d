//! Configuration errors shared by every layer that validates user input.

use crate::function::Shape;
use thiserror::Error;

/// A rejected configuration value.
///
/// Each variant names the offending field so the message can be shown to the
/// user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A range bound is NaN or infinite
    #[error("{field}: bound {value} is not finite")]
    NonFiniteBound {
        /// Field path, e.g. `samples[0].x`
        field: String,
        /// Rendered bound
        value: String,
    },

    /// A range whose start lies above its end
    #[error("{field}: start {start} is greater than end {end}")]
    InvertedRange {
        /// Field path
        field: String,
        /// Rendered start
        start: String,
        /// Rendered end
        end: String,
    },

    /// A range whose width overflows the format
    #[error("{field}: width of [{start}, {end}] is not representable")]
    RangeOverflow {
        /// Field path
        field: String,
        /// Rendered start
        start: String,
        /// Rendered end
        end: String,
    },

    /// A random sample with no draws
    #[error("{field}: sample count must be positive")]
    ZeroCount {
        /// Field path
        field: String,
    },

    /// Full-enumeration interval with start above end
    #[error("{label}: start bits {start:#x} exceed end bits {end:#x}")]
    InvertedBits {
        /// Interval label
        label: String,
        /// Start bit pattern
        start: u64,
        /// End bit pattern
        end: u64,
    },

    /// Full-enumeration bit pattern wider than the format
    #[error("{label}: bit pattern {bits:#x} does not fit in {width} bits")]
    BitsOutOfWidth {
        /// Interval label
        label: String,
        /// Offending pattern
        bits: u64,
        /// Format width in bits
        width: u32,
    },

    /// Unknown rounding-mode abbreviation
    #[error("unknown rounding mode '{0}' (expected rndn, rndu, rndd, rndz or all)")]
    UnknownRoundingMode(String),

    /// No rounding mode selected
    #[error("rounding mode set is empty")]
    EmptyRoundingSet,

    /// Unknown failure policy
    #[error("unknown failure policy '{0}' (expected none, first or all)")]
    UnknownFailMode(String),

    /// Threshold that is not a positive finite number
    #[error("failure threshold {0} must be a positive finite number")]
    InvalidThreshold(f64),

    /// ULP clamp below the failure threshold
    #[error("max ulp {max_ulp} must be at least the failure threshold {threshold}")]
    ClampBelowThreshold {
        /// Configured clamp
        max_ulp: f64,
        /// Configured threshold
        threshold: f64,
    },

    /// Sample specification that does not fit the function's argument shape
    #[error("{sample} sample cannot drive {shape} function '{function}'")]
    ShapeMismatch {
        /// Function name
        function: String,
        /// Function shape
        shape: Shape,
        /// Sample kind
        sample: &'static str,
    },
}

impl ConfigError {
    /// Re-label a range error with the field path it came from
    pub fn in_field(self, path: &str) -> Self {
        match self {
            ConfigError::NonFiniteBound { value, .. } => ConfigError::NonFiniteBound {
                field: path.to_string(),
                value,
            },
            ConfigError::InvertedRange { start, end, .. } => ConfigError::InvertedRange {
                field: path.to_string(),
                start,
                end,
            },
            ConfigError::RangeOverflow { start, end, .. } => ConfigError::RangeOverflow {
                field: path.to_string(),
                start,
                end,
            },
            ConfigError::ZeroCount { .. } => ConfigError::ZeroCount {
                field: path.to_string(),
            },
            other => other,
        }
    }
}
