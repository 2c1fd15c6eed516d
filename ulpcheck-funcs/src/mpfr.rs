//! MPFR reference backend.
//!
//! Each evaluation runs at the target precision with the requested
//! rounding, then subnormalises with the ternary value of that first
//! rounding so results in the subnormal range are rounded once, as the
//! target format would.

use rug::Float;
use rug::float::Round;
use std::cmp::Ordering;
use ulpcheck_core::FloatFormat;

/// Conversion between a target format and MPFR values
pub(crate) trait MpFormat: FloatFormat {
    fn to_float(self) -> Float;
    fn from_float(value: &Float, round: Round) -> Self;
}

impl MpFormat for f32 {
    fn to_float(self) -> Float {
        Float::with_val(<f32 as FloatFormat>::MANTISSA_DIGITS, self)
    }

    fn from_float(value: &Float, round: Round) -> Self {
        value.to_f32_round(round)
    }
}

impl MpFormat for f64 {
    fn to_float(self) -> Float {
        Float::with_val(<f64 as FloatFormat>::MANTISSA_DIGITS, self)
    }

    fn from_float(value: &Float, round: Round) -> Self {
        value.to_f64_round(round)
    }
}

fn finish<F: MpFormat>(mut value: Float, ternary: Ordering, round: Round) -> F {
    value.subnormalize_ieee_round(ternary, round);
    F::from_float(&value, round)
}

pub(crate) fn unary<F: MpFormat>(
    x: F,
    round: Round,
    op: impl FnOnce(&mut Float, Round) -> Ordering,
) -> F {
    let mut value = x.to_float();
    let ternary = op(&mut value, round);
    finish(value, ternary, round)
}

pub(crate) fn binary<F: MpFormat>(
    x: F,
    y: F,
    round: Round,
    op: impl FnOnce(&mut Float, &Float, Round) -> Ordering,
) -> F {
    let mut value = x.to_float();
    let other = y.to_float();
    let ternary = op(&mut value, &other, round);
    finish(value, ternary, round)
}

pub(crate) fn real_int<F: MpFormat>(
    x: F,
    n: i64,
    round: Round,
    op: impl FnOnce(&mut Float, i32, Round) -> Ordering,
) -> F {
    let mut value = x.to_float();
    let ternary = op(&mut value, crate::routine::saturate_i32(n), round);
    finish(value, ternary, round)
}

/// `log|Γ(x)|`; MPFR also reports the sign of Γ, which is dropped
pub(crate) fn ln_abs_gamma(value: &mut Float, round: Round) -> Ordering {
    value.ln_abs_gamma_round(round).1
}

pub(crate) fn pow(value: &mut Float, exponent: &Float, round: Round) -> Ordering {
    use rug::ops::PowAssignRound;
    value.pow_assign_round(exponent, round)
}

pub(crate) fn pown(value: &mut Float, n: i32, round: Round) -> Ordering {
    use rug::ops::PowAssignRound;
    value.pow_assign_round(n, round)
}

/// `x · 2^n` is exact at any precision; overflow and underflow are left to
/// the final conversion
pub(crate) fn scale(value: &mut Float, n: i32, _round: Round) -> Ordering {
    *value <<= n;
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directed_results_bracket() {
        let up: f32 = unary(2.0f32, Round::Up, Float::sqrt_round);
        let down: f32 = unary(2.0f32, Round::Down, Float::sqrt_round);
        assert_eq!(up.to_bits() - down.to_bits(), 1);
        let exact: f64 = unary(4.0f64, Round::Up, Float::sqrt_round);
        assert_eq!(exact, 2.0);
    }

    #[test]
    fn test_subnormal_results_round_once() {
        // 2^-149 · 1.5 lies halfway between two subnormals; ties go to even
        let half_way: f32 = real_int(1.5, -149, Round::Nearest, scale);
        assert_eq!(half_way.to_bits(), 2);
        let up: f32 = real_int(1.25, -149, Round::Up, scale);
        assert_eq!(up.to_bits(), 2);
        let down: f32 = real_int(1.25, -149, Round::Down, scale);
        assert_eq!(down.to_bits(), 1);
    }

    #[test]
    fn test_overflow_follows_direction() {
        let up: f32 = binary(f32::MAX, 2.0, Round::Up, pow);
        let zero: f32 = binary(f32::MAX, 2.0, Round::Zero, pow);
        assert_eq!(up, f32::INFINITY);
        assert_eq!(zero, f32::MAX);
    }

    #[test]
    fn test_lgamma_and_pown() {
        let lg: f64 = unary(1.0f64, Round::Nearest, ln_abs_gamma);
        assert_eq!(lg, 0.0);
        let cube: f32 = real_int(-2.0, 3, Round::Nearest, pown);
        assert_eq!(cube, -8.0);
    }
}
