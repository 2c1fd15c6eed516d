//! Outcome of evaluating one input under one rounding mode.

use crate::float::{FloatFormat, HexFloat};
use crate::rounding::RoundingMode;
use crate::ulp::ulp_distance;
use std::fmt;

/// Argument tuple of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inputs<F> {
    /// `f(x)`
    Unary(F),
    /// `f(x, y)`
    Binary(F, F),
    /// `f(x, n)`
    RealInt(F, i64),
}

impl<F: FloatFormat> fmt::Display for Inputs<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Inputs::Unary(x) => write!(f, "input={}", HexFloat(x)),
            Inputs::Binary(x, y) => write!(f, "input=({}, {})", HexFloat(x), HexFloat(y)),
            Inputs::RealInt(x, n) => write!(f, "input=({}, {n})", HexFloat(x)),
        }
    }
}

/// One computed/expected pair with its clamped ULP error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResult<F> {
    /// Mode the sample was evaluated under
    pub mode: RoundingMode,
    /// Arguments
    pub inputs: Inputs<F>,
    /// Value from the routine under test
    pub computed: F,
    /// Value from the reference
    pub expected: F,
    /// ULP error, zero when not finite, clamped to the configured maximum
    pub ulp: f64,
}

impl<F: FloatFormat> SampleResult<F> {
    /// Build a result, computing and clamping the ULP error
    pub fn new(mode: RoundingMode, inputs: Inputs<F>, computed: F, expected: F, max_ulp: f64) -> Self {
        Self {
            mode,
            inputs,
            computed,
            expected,
            ulp: ulp_distance(computed, expected, max_ulp),
        }
    }

    /// Magnitude check for samples whose values are finite by construction
    #[inline]
    pub fn check(&self, threshold: f64) -> bool {
        self.ulp < threshold
    }

    /// Check that also judges special values: both NaN or equally signed
    /// infinities pass, a signaling NaN or a finiteness mismatch fails.
    pub fn check_full(&self, threshold: f64) -> bool {
        let (c, e) = (self.computed, self.expected);
        if c.is_signaling_nan() || e.is_signaling_nan() {
            return false;
        }
        if c.is_nan() && e.is_nan() {
            return true;
        }
        if !c.is_nan() && !e.is_nan() && !c.is_finite() && !e.is_finite() {
            return c.is_sign_negative() == e.is_sign_negative();
        }
        if !c.is_finite() || !e.is_finite() {
            return false;
        }
        self.check(threshold)
    }
}

impl<F: FloatFormat> fmt::Display for SampleResult<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ulp={} {} computed={} expected={}",
            self.mode,
            self.ulp,
            self.inputs,
            HexFloat(self.computed),
            HexFloat(self.expected)
        )
    }
}
