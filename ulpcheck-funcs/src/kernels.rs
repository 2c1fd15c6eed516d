//! Binary64 kernels for the functions `std` has no method for: the
//! half-revolution trigonometric family and the base-2 and base-10
//! `m1`/`p1` forms.
//!
//! Each kernel is exact where the true result is a binary32 value. Where
//! the true result sits closer to a binary32 value than binary64 can
//! resolve, the kernel returns the binary64 neighbour on the true side so
//! that [`narrow`](crate::widened::narrow) still rounds in the right
//! direction.

use std::f64::consts::{LN_2, LN_10, PI};

/// Below this magnitude `1 + v` is inexact for binary32 `v`
const TINY: f64 = 1.862645149230957e-9; // 2^-29

/// From here on `1 + v` rounds to `v`
const HUGE: f64 = 9007199254740992.0; // 2^53

/// The binary64 neighbour of nonzero `v` in the direction of `target`
fn toward(v: f64, target: f64) -> f64 {
    if v == target || !v.is_finite() {
        return v;
    }
    let bits = v.to_bits();
    let away_from_zero = (target > v) == (v > 0.0);
    f64::from_bits(if away_from_zero { bits + 1 } else { bits - 1 })
}

/// `k` when `u` is the normal power of two `2^k`
fn exact_log2(u: f64) -> Option<f64> {
    let bits = u.to_bits();
    let exponent = (bits >> 52) as i64 - 1023;
    (u.is_normal() && u > 0.0 && bits & ((1 << 52) - 1) == 0).then_some(exponent as f64)
}

/// `k` when `u` is the power of ten `10^k` binary64 holds exactly
fn exact_log10(u: f64) -> Option<f64> {
    let mut power = 1.0;
    for k in 0..=22 {
        if power == u {
            return Some(f64::from(k));
        }
        power *= 10.0;
    }
    None
}

// ─── Half-revolution trigonometry ────────────────────────────────────────────

/// `cos(πv)`
pub(crate) fn cos_pi(v: f64) -> f64 {
    if !v.is_finite() {
        return f64::NAN;
    }
    // Even with period 2; every step of the fold into [0, 1] is exact
    let mut a = (v % 2.0).abs();
    if a > 1.0 {
        a = 2.0 - a;
    }
    if a == 0.5 {
        return 0.0;
    }
    let c = (PI * (0.5 - a)).sin();
    if a != 0.0 && c == 1.0 { toward(c, 0.0) } else { c }
}

/// `sin(πv)`; integers give a zero carrying the sign of `v`
pub(crate) fn sin_pi(v: f64) -> f64 {
    if !v.is_finite() {
        return f64::NAN;
    }
    let mut a = (v % 2.0).abs();
    let mut negative = v.is_sign_negative();
    if a > 1.0 {
        a -= 1.0;
        negative = !negative;
    }
    if a > 0.5 {
        a = 1.0 - a;
    }
    let s = if a == 0.0 { 0.0 } else { (PI * a).sin() };
    if negative { -s } else { s }
}

/// `tan(πv)`; the poles at `n + 1/2` are +∞ for even `n`, −∞ for odd `n`
pub(crate) fn tan_pi(v: f64) -> f64 {
    sin_pi(v) / cos_pi(v)
}

/// `acos(v) / π`
pub(crate) fn acos_pi(v: f64) -> f64 {
    v.acos() / PI
}

/// `asin(v) / π`
pub(crate) fn asin_pi(v: f64) -> f64 {
    v.asin() / PI
}

/// `atan(v) / π`
pub(crate) fn atan_pi(v: f64) -> f64 {
    let t = v.atan() / PI;
    // ±1/2 is only reached at ±∞
    if v.is_finite() && t.abs() == 0.5 { toward(t, 0.0) } else { t }
}

// ─── m1 / p1 ─────────────────────────────────────────────────────────────────

/// `2^v − 1`
pub(crate) fn exp2_m1(v: f64) -> f64 {
    if v == 0.0 || v.is_nan() {
        return v;
    }
    if v.fract() == 0.0 {
        if v.abs() <= 53.0 {
            return v.exp2() - 1.0;
        }
        if v > 0.0 {
            return toward(v.exp2(), 0.0);
        }
    }
    let e = if v.abs() < 1.0 { (v * LN_2).exp_m1() } else { v.exp2() - 1.0 };
    if v.is_finite() && e == -1.0 { toward(e, 0.0) } else { e }
}

/// `10^v − 1`
pub(crate) fn exp10_m1(v: f64) -> f64 {
    if v == 0.0 || v.is_nan() {
        return v;
    }
    if v.fract() == 0.0 && (1.0..=22.0).contains(&v) {
        return 10f64.powi(v as i32) - 1.0;
    }
    let e = if v.abs() < 1.0 {
        (v * LN_10).exp_m1()
    } else {
        10f64.powf(v) - 1.0
    };
    if v.is_finite() && e == -1.0 { toward(e, 0.0) } else { e }
}

/// `log2(1 + v)`
pub(crate) fn log2_1p(v: f64) -> f64 {
    if v == 0.0 || !v.is_finite() {
        return v.ln_1p();
    }
    if v.abs() < TINY {
        return v.ln_1p() / LN_2;
    }
    if v < HUGE {
        let u = 1.0 + v;
        if let Some(k) = exact_log2(u) {
            return k;
        }
        return if v.abs() < 1.0 { v.ln_1p() / LN_2 } else { u.log2() };
    }
    let l = v.log2();
    if l.fract() == 0.0 { toward(l, f64::INFINITY) } else { l }
}

/// `log10(1 + v)`
pub(crate) fn log10_1p(v: f64) -> f64 {
    if v == 0.0 || !v.is_finite() {
        return v.ln_1p();
    }
    if v.abs() < TINY {
        return v.ln_1p() / LN_10;
    }
    if v < HUGE {
        let u = 1.0 + v;
        if let Some(k) = exact_log10(u) {
            return k;
        }
        return if v.abs() < 1.0 { v.ln_1p() / LN_10 } else { u.log10() };
    }
    v.log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widened::{Direction, unary};

    fn bits(v: f64) -> u64 {
        v.to_bits()
    }

    #[test]
    fn test_half_revolution_exact_points() {
        assert_eq!(cos_pi(0.0), 1.0);
        assert_eq!(bits(cos_pi(0.5)), bits(0.0));
        assert_eq!(bits(cos_pi(-7.5)), bits(0.0));
        assert_eq!(cos_pi(1.0), -1.0);
        assert_eq!(cos_pi(-3.0), -1.0);
        assert_eq!(cos_pi(1e10), 1.0);

        assert_eq!(bits(sin_pi(-0.0)), bits(-0.0));
        assert_eq!(bits(sin_pi(3.0)), bits(0.0));
        assert_eq!(bits(sin_pi(-3.0)), bits(-0.0));
        assert_eq!(sin_pi(0.5), 1.0);
        assert_eq!(sin_pi(-2.5), -1.0);
        assert_eq!(sin_pi(1.5), -1.0);

        assert_eq!(tan_pi(0.25), 1.0);
        assert_eq!(tan_pi(0.75), -1.0);
        assert_eq!(tan_pi(2.5), f64::INFINITY);
        assert_eq!(tan_pi(1.5), f64::NEG_INFINITY);
        assert_eq!(bits(tan_pi(1.0)), bits(-0.0));

        assert!(cos_pi(f64::INFINITY).is_nan());
        assert!(sin_pi(f64::NAN).is_nan());
    }

    #[test]
    fn test_inverse_half_revolution() {
        assert_eq!(acos_pi(-1.0), 1.0);
        assert_eq!(acos_pi(0.0), 0.5);
        assert_eq!(acos_pi(1.0), 0.0);
        assert_eq!(asin_pi(1.0), 0.5);
        assert_eq!(asin_pi(-1.0), -0.5);
        assert_eq!(bits(asin_pi(-0.0)), bits(-0.0));
        assert_eq!(atan_pi(1.0), 0.25);
        assert_eq!(atan_pi(f64::NEG_INFINITY), -0.5);
        assert!(atan_pi(1e300) < 0.5);
        assert!(acos_pi(2.0).is_nan());
    }

    #[test]
    fn test_m1_p1_exact_points() {
        assert_eq!(exp2_m1(1.0), 1.0);
        assert_eq!(exp2_m1(-1.0), -0.5);
        assert_eq!(exp2_m1(10.0), 1023.0);
        assert_eq!(bits(exp2_m1(-0.0)), bits(-0.0));
        assert_eq!(exp2_m1(f64::NEG_INFINITY), -1.0);
        assert!(exp2_m1(-100.5) > -1.0);
        assert!(exp2_m1(60.0) < 2f64.powi(60));

        assert_eq!(exp10_m1(2.0), 99.0);
        assert_eq!(exp10_m1(f64::NEG_INFINITY), -1.0);
        assert!(exp10_m1(-20.0) > -1.0);

        assert_eq!(log2_1p(1.0), 1.0);
        assert_eq!(log2_1p(-0.75), -2.0);
        assert_eq!(log2_1p(-1.0), f64::NEG_INFINITY);
        assert!(log2_1p(-2.0).is_nan());
        assert!(log2_1p(2f64.powi(60)) > 60.0);

        assert_eq!(log10_1p(9.0), 1.0);
        assert_eq!(log10_1p(999_999.0), 6.0);
        assert_eq!(bits(log10_1p(-0.0)), bits(-0.0));
    }

    #[test]
    fn test_directed_results_near_boundaries() {
        // cos(π·2^-40) is just below one
        let x = 2f32.powi(-40);
        assert_eq!(unary(x, Direction::Up, cos_pi), 1.0);
        assert_eq!(unary(x, Direction::Down, cos_pi), 1.0 - f32::EPSILON / 2.0);
        // 2^-100 − 1 is just above minus one
        assert_eq!(unary(-100.0, Direction::Down, exp2_m1), -1.0);
        assert_eq!(unary(-100.0, Direction::Zero, exp2_m1), -1.0 + f32::EPSILON / 2.0);
        // log2(1 + 2^100) is just above 100
        assert_eq!(unary(2f32.powi(100), Direction::Down, log2_1p), 100.0);
        assert!(unary(2f32.powi(100), Direction::Up, log2_1p) > 100.0);
        // Exact results stay put in every direction
        for dir in [Direction::Nearest, Direction::Up, Direction::Down, Direction::Zero] {
            assert_eq!(unary(0.5, dir, sin_pi), 1.0);
            assert_eq!(unary(3.0, dir, exp2_m1), 7.0);
            assert_eq!(unary(99.0, dir, log10_1p), 2.0);
        }
    }
}
