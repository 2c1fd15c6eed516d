//! Oracle Adapter
//!
//! References take their rounding direction as an explicit argument in
//! their own encoding (`rug::float::Round`, `widened::Direction`, ...).
//! `OracleAdapter` hides that: callers pass a `RoundingMode` and the adapter
//! encodes it before every call.

use std::sync::OnceLock;
use ulpcheck_core::{FloatFormat, RoundingMode, Width};

/// A reference's rounding-direction parameter type.
pub trait RoundingEncoding: Copy + Send + Sync + 'static {
    /// Map a verifier mode to this encoding
    fn encode(mode: RoundingMode) -> Self;
}

impl RoundingEncoding for RoundingMode {
    #[inline]
    fn encode(mode: RoundingMode) -> Self {
        mode
    }
}

#[cfg(feature = "mpfr")]
impl RoundingEncoding for rug::float::Round {
    #[inline]
    fn encode(mode: RoundingMode) -> Self {
        use rug::float::Round;
        match mode {
            RoundingMode::ToNearest => Round::Nearest,
            RoundingMode::Upward => Round::Up,
            RoundingMode::Downward => Round::Down,
            RoundingMode::TowardZero => Round::Zero,
        }
    }
}

/// Reference function plus the mode encoding it expects.
///
/// Implemented for the three argument shapes; `S` is the function pointer
/// type of the wrapped reference.
#[derive(Clone, Copy)]
pub struct OracleAdapter<S> {
    reference: S,
}

impl<S> OracleAdapter<S> {
    /// Wrap a reference
    pub const fn new(reference: S) -> Self {
        Self { reference }
    }
}

impl<F: FloatFormat, R: RoundingEncoding> OracleAdapter<fn(F, R) -> F> {
    /// Correctly rounded `f(x)` under `mode`
    #[inline]
    pub fn eval(&self, x: F, mode: RoundingMode) -> F {
        (self.reference)(x, R::encode(mode))
    }
}

impl<F: FloatFormat, R: RoundingEncoding> OracleAdapter<fn(F, F, R) -> F> {
    /// Correctly rounded `f(x, y)` under `mode`
    #[inline]
    pub fn eval2(&self, x: F, y: F, mode: RoundingMode) -> F {
        (self.reference)(x, y, R::encode(mode))
    }
}

impl<F: FloatFormat, R: RoundingEncoding> OracleAdapter<fn(F, i64, R) -> F> {
    /// Correctly rounded `f(x, n)` under `mode`
    #[inline]
    pub fn eval_int(&self, x: F, n: i64, mode: RoundingMode) -> F {
        (self.reference)(x, n, R::encode(mode))
    }
}

impl<S> std::fmt::Debug for OracleAdapter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleAdapter")
            .field("reference", &std::any::type_name::<S>())
            .finish()
    }
}

// ─── Reference setup ─────────────────────────────────────────────────────────

/// Exponent range the reference must reproduce for one format.
///
/// `emin`/`emax` use the MPFR convention (significand in `[0.5, 1)`), so the
/// smallest subnormal is `2^(emin - 1)` and the largest finite value is just
/// below `2^emax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceFormat {
    /// Target format
    pub width: Width,
    /// Significand bits
    pub precision: u32,
    /// Minimum exponent (subnormals included)
    pub emin: i32,
    /// Maximum exponent
    pub emax: i32,
}

impl ReferenceFormat {
    fn of<F: FloatFormat>() -> Self {
        Self {
            width: F::WIDTH,
            precision: F::MANTISSA_DIGITS,
            emin: F::MIN_SUBNORMAL_EXP + 1,
            emax: F::MAX_EXP,
        }
    }
}

static SETUP: [OnceLock<ReferenceFormat>; 2] = [OnceLock::new(), OnceLock::new()];

/// One-time reference configuration for `F`. Later calls return the
/// recorded format without doing any work.
pub fn setup_reference<F: FloatFormat>() -> &'static ReferenceFormat {
    let slot = match F::WIDTH {
        Width::Binary32 => &SETUP[0],
        Width::Binary64 => &SETUP[1],
    };
    slot.get_or_init(|| {
        let format = ReferenceFormat::of::<F>();
        check_backend_range(&format);
        tracing::debug!(
            width = %format.width,
            precision = format.precision,
            emin = format.emin,
            emax = format.emax,
            backend = crate::REFERENCE_BACKEND,
            "reference configured"
        );
        format
    })
}

#[cfg(feature = "mpfr")]
fn check_backend_range(format: &ReferenceFormat) {
    // Results are subnormalised per call, so MPFR only needs a wider range
    if rug::float::exp_min() > format.emin || rug::float::exp_max() < format.emax {
        tracing::warn!(
            mpfr_emin = rug::float::exp_min(),
            mpfr_emax = rug::float::exp_max(),
            "MPFR exponent range narrower than {}",
            format.width
        );
    }
}

#[cfg(not(feature = "mpfr"))]
fn check_backend_range(format: &ReferenceFormat) {
    if format.width != Width::Binary32 {
        tracing::warn!("no widened reference for {}", format.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(x: f32, mode: RoundingMode) -> f32 {
        match mode {
            RoundingMode::ToNearest => x,
            _ => -x,
        }
    }

    fn sum(x: f64, y: f64, _mode: RoundingMode) -> f64 {
        x + y
    }

    #[test]
    fn test_adapter_forwards_mode() {
        let adapter = OracleAdapter::new(echo as fn(f32, RoundingMode) -> f32);
        assert_eq!(adapter.eval(2.0, RoundingMode::ToNearest), 2.0);
        assert_eq!(adapter.eval(2.0, RoundingMode::Downward), -2.0);

        let adapter = OracleAdapter::new(sum as fn(f64, f64, RoundingMode) -> f64);
        assert_eq!(adapter.eval2(1.0, 2.0, RoundingMode::Upward), 3.0);
    }

    #[test]
    fn test_setup_is_recorded_once() {
        let first = setup_reference::<f32>();
        let second = setup_reference::<f32>();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.precision, 24);
        assert_eq!(first.emin, -148);
        assert_eq!(first.emax, 128);
        let double = setup_reference::<f64>();
        assert_eq!(double.emin, -1073);
        assert_eq!(double.emax, 1024);
    }

    #[cfg(feature = "mpfr")]
    #[test]
    fn test_mpfr_encoding() {
        use rug::float::Round;
        assert_eq!(Round::encode(RoundingMode::Upward), Round::Up);
        assert_eq!(Round::encode(RoundingMode::TowardZero), Round::Zero);
    }
}
