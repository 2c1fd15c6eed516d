#![warn(missing_docs)]
//! ulpcheck Core - Accuracy Model
//!
//! The value types every other ulpcheck crate is built from:
//! - `FloatFormat` describing IEEE-754 binary32 / binary64 at the bit level
//! - The ULP metric (`ulp`, `ulpdiff`) with the exact edge-case semantics
//! - Rounding-mode guards for the floating-point environment
//! - Sample specifications and per-sample results
//! - `WyRand`, the per-worker sample generator
//!
//! ```text
//! SampleSpec ──▶ inputs ──▶ routine / oracle ──▶ SampleResult ──▶ histogram
//!                               ▲
//!                    RoundingGuard (per thread)
//! ```

mod error;
mod float;
mod function;
mod policy;
mod result;
mod rng;
mod rounding;
mod sample;
mod ulp;

pub use error::ConfigError;
pub use float::{FloatFormat, HexFloat, Width};
pub use function::{Binding, FunctionDescriptor, Shape};
pub use policy::{
    DEFAULT_MAX_ULP, DEFAULT_THRESHOLD, FailMode, FailurePolicy, RoundingModeSet,
};
pub use result::{Inputs, SampleResult};
pub use rng::{SeedBank, WyRand};
/// Whether this platform lets ulpcheck switch the hardware rounding mode.
/// When `false`, every mode runs under round-to-nearest and a warning is logged.
pub use rounding::HAS_ROUNDING_CONTROL;
pub use rounding::{ModeScope, RoundingError, RoundingGuard, RoundingMode};
pub use sample::{FullRange, IntRange, Range, SampleSpec};
pub use ulp::{ulp, ulp_distance, ulpdiff};
