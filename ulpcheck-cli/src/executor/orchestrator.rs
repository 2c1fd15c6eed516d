//! Mode Orchestration
//!
//! Modes run strictly one after another: the rounding mode is process-wide
//! state, so each mode holds a [`ModeScope`] for all of its segments and
//! releases it before the next mode starts. Segment reports are handed to
//! the sink as soon as they finish.

use super::sampler::ParallelSampler;
use crate::error::VerifyError;
use chrono::Utc;
use std::time::Instant;
use ulpcheck_core::{Binding, FloatFormat, FunctionDescriptor, ModeScope, RoundingModeSet, SampleSpec};
use ulpcheck_funcs::{REFERENCE_BACKEND, RoundingEncoding, Routine};
use ulpcheck_report::{
    ModeReport, PolicyInfo, ReportMeta, ReportSink, RunReport, SCHEMA_VERSION, SegmentReport,
    segment_label,
};

/// Runs every segment under every selected mode
#[derive(Debug)]
pub struct Orchestrator<'a> {
    sampler: &'a ParallelSampler,
    modes: &'a RoundingModeSet,
}

impl<'a> Orchestrator<'a> {
    /// Sequence `modes` over `sampler`
    pub fn new(sampler: &'a ParallelSampler, modes: &'a RoundingModeSet) -> Self {
        Self { sampler, modes }
    }

    /// Report metadata for a run of `function` through `binding`
    pub fn meta(&self, function: FunctionDescriptor, binding: Binding) -> ReportMeta {
        let policy = self.sampler.policy();
        ReportMeta {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            function,
            binding,
            reference: REFERENCE_BACKEND.to_string(),
            seed: self.sampler.seed(),
            threads: self.sampler.threads(),
            policy: PolicyInfo {
                fail: policy.mode(),
                threshold: policy.threshold(),
                max_ulp: policy.max_ulp(),
            },
        }
    }

    /// Verify `routine` on `specs` under every mode.
    ///
    /// Every segment is checked against the routine's shape before the first
    /// mode starts. Under the `first` policy the run ends with
    /// `AccuracyViolation` after the failing segment; the segments already
    /// handed to `sink` stay reported.
    pub fn run<F, R>(
        &self,
        meta: ReportMeta,
        routine: &Routine<F, R>,
        specs: &[SampleSpec<F>],
        sink: &mut dyn ReportSink,
    ) -> Result<RunReport, VerifyError>
    where
        F: FloatFormat,
        R: RoundingEncoding,
    {
        for spec in specs {
            spec.check_shape(meta.function.name, routine.shape())?;
        }

        let started = Instant::now();
        let mut modes = Vec::with_capacity(self.modes.len());
        for mode in self.modes.iter() {
            let mode_started = Instant::now();
            let scope = ModeScope::enter(mode)?;
            tracing::info!(function = meta.function.name, mode = %mode, "checking");

            let mut segments = Vec::with_capacity(specs.len());
            for spec in specs {
                let segment_started = Instant::now();
                let outcome = self.sampler.run(&scope, routine, spec)?;
                let segment = SegmentReport::new(
                    spec.kind(),
                    segment_label(spec),
                    outcome.histogram,
                    outcome.failures,
                    segment_started.elapsed().as_secs_f64(),
                );
                tracing::debug!(
                    mode = %mode,
                    label = %segment.label,
                    total = segment.total(),
                    max_ulp = segment.summary.max_ulp,
                    failures = segment.failures,
                    "segment finished"
                );
                sink.segment_finished(mode, &segment)?;
                segments.push(segment);
            }
            drop(scope);

            let report = ModeReport {
                mode,
                segments,
                elapsed_secs: mode_started.elapsed().as_secs_f64(),
            };
            sink.mode_finished(&report)?;
            modes.push(report);
        }

        let report = RunReport {
            meta,
            modes,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        sink.run_finished(&report)?;
        Ok(report)
    }
}
