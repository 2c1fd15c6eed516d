//! Parallel Sampler
//!
//! Evaluates one segment under one rounding mode on a dedicated worker pool
//! and reduces the per-task histograms into one.
//!
//! ## Work split
//!
//! - **Random segments**: one task per worker slot. Slot `i` restarts from
//!   its own seed and draws `count / slots` samples, plus one when
//!   `i < count % slots`. Which thread runs a slot is up to the pool; the
//!   inputs a slot produces are not.
//! - **Full enumeration**: the bit-pattern interval is cut into fixed-size
//!   chunks that idle workers steal, since evaluation cost varies a lot
//!   across the domain.
//!
//! Every task installs the scope's rounding mode on its own thread before
//! evaluating anything. Histograms stay task-local until the final reduce.

use crate::error::VerifyError;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use ulpcheck_core::{
    FailurePolicy, FloatFormat, FullRange, Inputs, ModeScope, RoundingGuard, RoundingMode,
    SampleResult, SampleSpec, SeedBank, WyRand,
};
use ulpcheck_funcs::{RoundingEncoding, Routine};
use ulpcheck_stats::UlpHistogram;

/// Draws between progress-bar updates
const PROGRESS_STRIDE: u64 = 4096;

/// Worker pool and sampling setup
#[derive(Debug, Clone)]
pub struct SamplerOptions {
    /// Worker threads, 0 = all cores
    pub threads: usize,
    /// Master seed; drawn from the OS when `None`
    pub seed: Option<u64>,
    /// Bit patterns per full-enumeration work item
    pub chunk_size: u64,
    /// Show a progress bar per segment
    pub progress: bool,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            seed: None,
            chunk_size: 65_536,
            progress: false,
        }
    }
}

/// Result of one segment
#[derive(Debug, Clone)]
pub struct SegmentOutcome {
    /// Clamped ULP errors of every evaluated sample
    pub histogram: UlpHistogram,
    /// Samples at or above the failure threshold
    pub failures: u64,
}

/// Runs segments on a fixed worker pool
pub struct ParallelSampler {
    pool: ThreadPool,
    seeds: SeedBank,
    seed: Option<u64>,
    policy: FailurePolicy,
    chunk_size: u64,
    progress: bool,
    diagnostics: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ParallelSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelSampler")
            .field("threads", &self.threads())
            .field("seeds", &self.seeds)
            .field("policy", &self.policy)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl ParallelSampler {
    /// Build the pool and capture one seed per worker slot
    pub fn new(options: &SamplerOptions, policy: FailurePolicy) -> Result<Self, VerifyError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .thread_name(|i| format!("ulpcheck-worker-{i}"))
            .build()?;
        let slots = pool.current_num_threads();
        let seeds = match options.seed {
            Some(seed) => SeedBank::from_seed(seed, slots),
            None => SeedBank::from_entropy(slots),
        };
        tracing::debug!(threads = slots, seeds = ?seeds.seeds(), "worker pool ready");

        Ok(Self {
            pool,
            seeds,
            seed: options.seed,
            policy,
            chunk_size: options.chunk_size.max(1),
            progress: options.progress,
            diagnostics: Mutex::new(Box::new(std::io::stderr())),
        })
    }

    /// Send failing-sample lines to `out` instead of stderr
    pub fn with_diagnostics(mut self, out: impl Write + Send + 'static) -> Self {
        self.diagnostics = Mutex::new(Box::new(out));
        self
    }

    /// Worker slots
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Per-slot seeds
    pub fn seeds(&self) -> &SeedBank {
        &self.seeds
    }

    /// Master seed, if one was given
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Failure policy
    pub fn policy(&self) -> &FailurePolicy {
        &self.policy
    }

    /// Evaluate `spec` under the mode held by `scope`.
    ///
    /// Returns `AccuracyViolation` as soon as a sample fails under the
    /// `first` policy; the remaining workers stop at their next sample.
    pub fn run<F, R>(
        &self,
        scope: &ModeScope,
        routine: &Routine<F, R>,
        spec: &SampleSpec<F>,
    ) -> Result<SegmentOutcome, VerifyError>
    where
        F: FloatFormat,
        R: RoundingEncoding,
    {
        if spec.shape() != routine.shape() {
            return Err(VerifyError::ShapeMismatch {
                sample: spec.kind(),
                shape: routine.shape(),
            });
        }

        let progress = self.progress_bar(spec.sample_count(), scope.mode());
        let outcome = self.run_segment(scope, routine, spec, &progress);
        progress.finish_and_clear();
        outcome
    }

    fn run_segment<F, R>(
        &self,
        scope: &ModeScope,
        routine: &Routine<F, R>,
        spec: &SampleSpec<F>,
        progress: &ProgressBar,
    ) -> Result<SegmentOutcome, VerifyError>
    where
        F: FloatFormat,
        R: RoundingEncoding,
    {
        let mode = scope.mode();
        let failures = AtomicU64::new(0);
        let stop = AtomicBool::new(false);
        let pass = Pass {
            sampler: self,
            routine: *routine,
            mode,
            kind: spec.kind(),
            failures: &failures,
            stop: &stop,
            progress,
        };

        let histogram = match spec {
            SampleSpec::Random1Arg { range, count } => {
                pass.random(*count, |rng| Inputs::Unary(range.sample(rng)))
            }
            SampleSpec::Random2Arg {
                range_x,
                range_y,
                count,
            } => pass.random(*count, |rng| {
                let x = range_x.sample(rng);
                let y = range_y.sample(rng);
                Inputs::Binary(x, y)
            }),
            SampleSpec::Random1ArgPlusInt {
                range_float,
                range_int,
                count,
            } => pass.random(*count, |rng| {
                let x = range_float.sample(rng);
                let n = range_int.sample(rng);
                Inputs::RealInt(x, n)
            }),
            SampleSpec::FullEnumeration(range) => pass.full(range),
        };

        Ok(SegmentOutcome {
            histogram: histogram?,
            failures: failures.into_inner(),
        })
    }

    fn progress_bar(&self, len: u128, mode: RoundingMode) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(mode.name());
        pb
    }

    fn report_failure<F: FloatFormat>(&self, result: &SampleResult<F>) -> std::io::Result<()> {
        let mut out = self
            .diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{result}")?;
        out.flush()
    }
}

// ─── One segment pass ────────────────────────────────────────────────────────

struct Pass<'a, F, R> {
    sampler: &'a ParallelSampler,
    routine: Routine<F, R>,
    mode: RoundingMode,
    kind: &'static str,
    failures: &'a AtomicU64,
    stop: &'a AtomicBool,
    progress: &'a ProgressBar,
}

impl<F: FloatFormat, R: RoundingEncoding> Pass<'_, F, R> {
    fn random<D>(&self, count: u64, draw: D) -> Result<UlpHistogram, VerifyError>
    where
        D: Fn(&mut WyRand) -> Inputs<F> + Sync,
    {
        // Same starting state under every mode
        let mut rngs = self.sampler.seeds.reseed();
        let slots = rngs.len() as u64;
        let threshold = self.sampler.policy.threshold();

        self.sampler.pool.install(|| {
            rngs.par_iter_mut()
                .enumerate()
                .map(|(slot, rng)| -> Result<UlpHistogram, VerifyError> {
                    let draws = count / slots + u64::from((slot as u64) < count % slots);
                    let _guard = RoundingGuard::enter(self.mode)?;
                    let mut local = UlpHistogram::new();
                    let mut pending = 0;
                    for _ in 0..draws {
                        if self.stop.load(Ordering::Relaxed) {
                            break;
                        }
                        let result = self.evaluate(draw(rng))?;
                        self.judge(&result, result.check(threshold))?;
                        local.record(result.ulp);
                        pending += 1;
                        if pending == PROGRESS_STRIDE {
                            self.progress.inc(pending);
                            pending = 0;
                        }
                    }
                    self.progress.inc(pending);
                    Ok(local)
                })
                .try_reduce(UlpHistogram::new, |a, b| Ok(a.merged(b)))
        })
    }

    fn full(&self, range: &FullRange) -> Result<UlpHistogram, VerifyError> {
        let chunk_size = self.sampler.chunk_size;
        let chunks = range.chunk_count(chunk_size);
        let threshold = self.sampler.policy.threshold();
        tracing::debug!(label = range.label(), chunks, chunk_size, "enumerating");

        self.sampler.pool.install(|| {
            (0..chunks)
                .into_par_iter()
                .try_fold(
                    UlpHistogram::new,
                    |mut local, index| -> Result<UlpHistogram, VerifyError> {
                        if self.stop.load(Ordering::Relaxed) {
                            return Ok(local);
                        }
                        let _guard = RoundingGuard::enter(self.mode)?;
                        let mut evaluated = 0;
                        let scanned = range
                            .chunk(index, chunk_size)
                            .take_while(|_| !self.stop.load(Ordering::Relaxed))
                            .try_for_each(|pattern| {
                                let x = F::from_bits_u64(pattern);
                                let result = self.evaluate(Inputs::Unary(x))?;
                                evaluated += 1;
                                self.judge(&result, result.check_full(threshold))?;
                                local.record(result.ulp);
                                Ok::<_, VerifyError>(())
                            });
                        self.progress.inc(evaluated);
                        scanned.map(|()| local)
                    },
                )
                .try_reduce(UlpHistogram::new, |a, b| Ok(a.merged(b)))
        })
    }

    #[inline]
    fn evaluate(&self, inputs: Inputs<F>) -> Result<SampleResult<F>, VerifyError> {
        let (computed, expected) =
            self.routine
                .evaluate(inputs, self.mode)
                .ok_or_else(|| VerifyError::ShapeMismatch {
                    sample: self.kind,
                    shape: self.routine.shape(),
                })?;
        Ok(SampleResult::new(
            self.mode,
            inputs,
            computed,
            expected,
            self.sampler.policy.max_ulp(),
        ))
    }

    /// Count a failed sample and apply the failure policy
    fn judge(&self, result: &SampleResult<F>, passed: bool) -> Result<(), VerifyError> {
        if passed {
            return Ok(());
        }
        self.failures.fetch_add(1, Ordering::Relaxed);

        let policy = &self.sampler.policy;
        if !policy.reports_failures() {
            return Ok(());
        }
        self.progress
            .suspend(|| self.sampler.report_failure(result))?;
        if policy.stops_on_failure() {
            self.stop.store(true, Ordering::Relaxed);
            return Err(VerifyError::AccuracyViolation {
                sample: result.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::{SharedBuf, identity, identity_ref, scope_lock, sloppy};
    use ulpcheck_core::{FailMode, Range};
    use ulpcheck_funcs::{Candidate, Reference};

    fn sampler(threads: usize, fail: FailMode) -> ParallelSampler {
        let options = SamplerOptions {
            threads,
            seed: Some(42),
            chunk_size: 3,
            progress: false,
        };
        ParallelSampler::new(&options, FailurePolicy::new(fail, 1.0, 9.0).unwrap()).unwrap()
    }

    fn routine(candidate: fn(f32) -> f32) -> Routine<f32, RoundingMode> {
        Routine::pair(Candidate::Unary(candidate), Reference::Unary(identity_ref)).unwrap()
    }

    fn random(start: f32, end: f32, count: u64) -> SampleSpec<f32> {
        SampleSpec::random_1arg(Range::new(start, end).unwrap(), count).unwrap()
    }

    #[test]
    fn test_identity_is_exact() {
        let _lock = scope_lock();
        let sampler = sampler(4, FailMode::All);
        let scope = ModeScope::enter(RoundingMode::Upward).unwrap();

        let outcome = sampler
            .run(&scope, &routine(identity), &random(-1.0, 1.0, 2000))
            .unwrap();
        assert_eq!(outcome.histogram.total(), 2000);
        assert_eq!(outcome.histogram.get(0.0), 2000);
        assert_eq!(outcome.failures, 0);
    }

    #[test]
    fn test_count_is_split_across_slots() {
        let _lock = scope_lock();
        let sampler = sampler(4, FailMode::None);
        assert_eq!(sampler.threads(), 4);
        let scope = ModeScope::enter(RoundingMode::ToNearest).unwrap();

        for count in [1, 3, 7, 1001] {
            let outcome = sampler
                .run(&scope, &routine(identity), &random(0.0, 1.0, count))
                .unwrap();
            assert_eq!(outcome.histogram.total(), count);
        }
    }

    #[test]
    fn test_full_enumeration_covers_interval() {
        let _lock = scope_lock();
        let sampler = sampler(3, FailMode::All);
        let scope = ModeScope::enter(RoundingMode::Downward).unwrap();
        let range = FullRange::new("ten", 0x3f80_0000, 0x3f80_0009, ulpcheck_core::Width::Binary32)
            .unwrap();

        let outcome = sampler
            .run(&scope, &routine(identity), &SampleSpec::FullEnumeration(range))
            .unwrap();
        assert_eq!(outcome.histogram.total(), 10);
        assert_eq!(outcome.histogram.get(0.0), 10);
    }

    #[test]
    fn test_full_enumeration_judges_special_values() {
        let _lock = scope_lock();
        let sampler = sampler(2, FailMode::None);
        let scope = ModeScope::enter(RoundingMode::ToNearest).unwrap();
        let width = ulpcheck_core::Width::Binary32;

        // MAX, +inf, then the first signaling NaN
        let edge = FullRange::new("edge", 0x7f7f_ffff, 0x7f80_0001, width).unwrap();
        let outcome = sampler
            .run(&scope, &routine(identity), &SampleSpec::FullEnumeration(edge))
            .unwrap();
        assert_eq!(outcome.histogram.total(), 3);
        assert_eq!(outcome.failures, 1);

        // Two signaling NaNs, then two quiet ones
        let nans = FullRange::new("nans", 0x7fbf_fffe, 0x7fc0_0001, width).unwrap();
        let outcome = sampler
            .run(&scope, &routine(identity), &SampleSpec::FullEnumeration(nans))
            .unwrap();
        assert_eq!(outcome.histogram.total(), 4);
        assert_eq!(outcome.histogram.get(0.0), 4);
        assert_eq!(outcome.failures, 2);
    }

    #[test]
    fn test_first_policy_stops_with_diagnostic() {
        let _lock = scope_lock();
        let diagnostics = SharedBuf::default();
        let sampler = sampler(2, FailMode::First).with_diagnostics(diagnostics.clone());
        let scope = ModeScope::enter(RoundingMode::TowardZero).unwrap();

        let err = sampler
            .run(&scope, &routine(sloppy), &random(1.0, 2.0, 1000))
            .unwrap_err();
        let sample = match err {
            VerifyError::AccuracyViolation { sample } => sample,
            other => panic!("expected an accuracy violation, got {other}"),
        };
        assert!(sample.contains("FE_TOWARDZERO"), "{sample}");

        let printed = diagnostics.contents();
        let line = printed.lines().next().unwrap();
        assert!(line.starts_with("FE_TOWARDZERO ulp="), "{line}");
        assert!(line.contains(" input=0x1"), "{line}");
        assert!(line.contains(" computed=0x1"), "{line}");
        assert!(line.contains(" expected=0x1"), "{line}");
    }

    /// Exact everywhere except on the third pattern above one
    fn wrong_at_third(x: f32) -> f32 {
        if x.to_bits() == 0x3f80_0002 {
            x * 2.0
        } else {
            x
        }
    }

    #[test]
    fn test_progress_counts_evaluated_patterns() {
        let _lock = scope_lock();
        let range = FullRange::new("eight", 0x3f80_0000, 0x3f80_0007, ulpcheck_core::Width::Binary32)
            .unwrap();
        let spec = SampleSpec::FullEnumeration(range);
        let options = SamplerOptions {
            threads: 1,
            chunk_size: 8,
            ..SamplerOptions::default()
        };
        let scope = ModeScope::enter(RoundingMode::ToNearest).unwrap();

        let first = FailurePolicy::new(FailMode::First, 1.0, 9.0).unwrap();
        let sampler = ParallelSampler::new(&options, first)
            .unwrap()
            .with_diagnostics(SharedBuf::default());
        let progress = ProgressBar::hidden();
        let err = sampler
            .run_segment(&scope, &routine(wrong_at_third), &spec, &progress)
            .unwrap_err();
        assert!(matches!(err, VerifyError::AccuracyViolation { .. }));
        assert_eq!(progress.position(), 3);

        let sampler = ParallelSampler::new(&options, FailurePolicy::default()).unwrap();
        let progress = ProgressBar::hidden();
        let outcome = sampler
            .run_segment(&scope, &routine(wrong_at_third), &spec, &progress)
            .unwrap();
        assert_eq!(outcome.failures, 1);
        assert_eq!(progress.position(), 8);
    }

    #[test]
    fn test_all_policy_continues() {
        let _lock = scope_lock();
        let diagnostics = SharedBuf::default();
        let sampler = sampler(2, FailMode::All).with_diagnostics(diagnostics.clone());
        let scope = ModeScope::enter(RoundingMode::ToNearest).unwrap();

        let outcome = sampler
            .run(&scope, &routine(sloppy), &random(1.0, 2.0, 50))
            .unwrap();
        assert_eq!(outcome.histogram.total(), 50);
        assert_eq!(outcome.failures, 50);
        assert_eq!(diagnostics.contents().lines().count(), 50);
        // Every error lands at or above the threshold, none beyond the clamp
        assert!(outcome.histogram.iter().all(|(ulp, _)| (1.0..=9.0).contains(&ulp)));
    }

    #[test]
    fn test_none_policy_counts_silently() {
        let _lock = scope_lock();
        let diagnostics = SharedBuf::default();
        let sampler = sampler(2, FailMode::None).with_diagnostics(diagnostics.clone());
        let scope = ModeScope::enter(RoundingMode::ToNearest).unwrap();

        let outcome = sampler
            .run(&scope, &routine(sloppy), &random(1.0, 2.0, 20))
            .unwrap();
        assert_eq!(outcome.failures, 20);
        assert!(diagnostics.contents().is_empty());
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let _lock = scope_lock();
        let sampler = sampler(1, FailMode::None);
        let scope = ModeScope::enter(RoundingMode::ToNearest).unwrap();
        let range = Range::new(0.0f32, 1.0).unwrap();
        let spec = SampleSpec::random_2arg(range, range, 10).unwrap();

        let err = sampler.run(&scope, &routine(identity), &spec).unwrap_err();
        assert!(matches!(err, VerifyError::ShapeMismatch { sample: "random-2arg", .. }));
    }
}
