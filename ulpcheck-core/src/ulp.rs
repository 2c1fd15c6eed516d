//! ULP Metric
//!
//! `ulp(v)` is the spacing of the format at `v`, with zero and subnormals
//! sharing the spacing of the smallest subnormal. `ulpdiff` measures the
//! distance between a computed and an expected value in units of the
//! expected value's ULP.

use crate::float::FloatFormat;
use std::num::FpCategory;

/// Unit in the last place of a finite value.
///
/// Non-finite inputs have no ULP; they yield NaN (and trip a debug
/// assertion, since callers are expected to filter them first).
pub fn ulp<F: FloatFormat>(value: F) -> F {
    match value.classify() {
        FpCategory::Zero | FpCategory::Subnormal => F::pow2(F::MIN_SUBNORMAL_EXP),
        FpCategory::Normal => F::pow2(value.ilogb() - F::MANTISSA_DIGITS as i32 + 1),
        FpCategory::Nan | FpCategory::Infinite => {
            debug_assert!(false, "ulp of a non-finite value");
            F::NAN
        }
    }
}

/// `|given - expected| / ulp(expected)`, evaluated in binary64.
///
/// Returns NaN when `expected` is not finite. An infinite `given` against a
/// finite `expected` yields infinity; `ulp_distance` maps both to zero.
pub fn ulpdiff<F: FloatFormat>(given: F, expected: F) -> f64 {
    if !expected.is_finite() {
        return f64::NAN;
    }
    (given.to_f64() - expected.to_f64()).abs() / ulp(expected).to_f64()
}

/// The ULP error recorded for a sample: `ulpdiff` with non-finite outcomes
/// forced to zero and the rest clamped to `max_ulp`.
pub fn ulp_distance<F: FloatFormat>(given: F, expected: F, max_ulp: f64) -> f64 {
    let diff = ulpdiff(given, expected);
    if diff.is_finite() {
        diff.min(max_ulp)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_strides<F: FloatFormat>(exponents: impl Iterator<Item = i32>) {
        for e in exponents {
            let v = F::pow2(e);
            let expected = F::pow2(e - F::MANTISSA_DIGITS as i32 + 1);
            assert_eq!(
                ulp(v).to_bits_u64(),
                expected.to_bits_u64(),
                "{} ulp at 2^{e}",
                F::WIDTH
            );
        }
    }

    #[test]
    fn test_ulp_normal_binades() {
        check_strides::<f32>(-126..=127);
        check_strides::<f64>((-1022..=1023).step_by(7));
        assert_eq!(ulp(1.0f64), f64::EPSILON);
        assert_eq!(ulp(1.0f32), f32::EPSILON);
        assert_eq!(ulp(-1.5f32), f32::EPSILON);
        assert_eq!(ulp(f64::MAX), 2f64.powi(971));
    }

    #[test]
    fn test_ulp_zero_and_subnormal_share_min_spacing() {
        let min_sub32 = f32::from_bits(1);
        assert_eq!(ulp(0.0f32), min_sub32);
        assert_eq!(ulp(-0.0f32), min_sub32);
        assert_eq!(ulp(f32::from_bits(0x007f_ffff)), min_sub32);
        assert_eq!(ulp(f32::MIN_POSITIVE), min_sub32);
        let min_sub64 = f64::from_bits(1);
        assert_eq!(ulp(0.0f64), min_sub64);
        assert_eq!(ulp(f64::from_bits(0x000f_ffff_ffff_ffff)), min_sub64);
    }

    #[test]
    fn test_ulpdiff_identity_and_steps() {
        for &x in &[0.0f32, 1.0, -3.25, 1e-40, f32::MAX, f32::MIN_POSITIVE] {
            assert_eq!(ulpdiff(x, x), 0.0);
        }
        let one = 1.0f64;
        let next = f64::from_bits(one.to_bits() + 3);
        assert_eq!(ulpdiff(next, one), 3.0);
        // Below a power of two the given value sits in the finer binade
        let below = f64::from_bits(one.to_bits() - 1);
        assert_eq!(ulpdiff(below, one), 0.5);
    }

    #[test]
    fn test_ulpdiff_non_finite() {
        assert!(ulpdiff(1.0f32, f32::NAN).is_nan());
        assert!(ulpdiff(1.0f32, f32::INFINITY).is_nan());
        assert_eq!(ulpdiff(f32::INFINITY, 1.0), f64::INFINITY);
        assert_eq!(ulp_distance(f32::INFINITY, 1.0, 9.0), 0.0);
        assert_eq!(ulp_distance(1.0f32, f32::NAN, 9.0), 0.0);
    }

    #[test]
    fn test_ulp_distance_clamps() {
        let far = f32::from_bits(1.0f32.to_bits() + 100);
        assert_eq!(ulp_distance(far, 1.0, 9.0), 9.0);
        assert_eq!(ulp_distance(far, 1.0, 1000.0), 100.0);
    }
}
