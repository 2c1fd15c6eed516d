//! Verification Executor
//!
//! Runs a function's segments under every selected rounding mode.
//!
//! ## Pipeline Overview
//!
//! ```text
//! RoundingModeSet + [SampleSpec] (from the description)
//!       │
//!       ▼
//! ┌──────────────┐
//! │ orchestrator │  One ModeScope per mode, segments in order
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   sampler    │  Worker pool: draw, evaluate, judge, histogram
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  ReportSink  │  Segment tables streamed as they finish
//! └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`sampler`] - Parallel evaluation of one segment under one mode
//! - [`orchestrator`] - Mode sequencing and report assembly

mod orchestrator;
mod sampler;

pub use orchestrator::Orchestrator;
pub use sampler::{ParallelSampler, SamplerOptions, SegmentOutcome};
