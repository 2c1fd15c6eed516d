//! Widened binary32 reference.
//!
//! Evaluates a binary32 function in binary64 and rounds the binary64 result
//! to binary32 in the requested direction in software. With 29 extra bits
//! the binary64 evaluation error almost never straddles a binary32
//! rounding boundary, which makes this a usable oracle when MPFR is not
//! built. There is no binary64 counterpart.

use crate::adapter::RoundingEncoding;
use crate::routine::saturate_i32;
use ulpcheck_core::{RoundingGuard, RoundingMode};

/// Rounding direction applied when narrowing to binary32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ties to even
    Nearest,
    /// Toward +∞
    Up,
    /// Toward −∞
    Down,
    /// Toward zero
    Zero,
}

impl RoundingEncoding for Direction {
    #[inline]
    fn encode(mode: RoundingMode) -> Self {
        match mode {
            RoundingMode::ToNearest => Direction::Nearest,
            RoundingMode::Upward => Direction::Up,
            RoundingMode::Downward => Direction::Down,
            RoundingMode::TowardZero => Direction::Zero,
        }
    }
}

fn next_up(x: f32) -> f32 {
    if x.is_nan() || x == f32::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f32::from_bits(1);
    }
    let bits = x.to_bits();
    f32::from_bits(if x > 0.0 { bits + 1 } else { bits - 1 })
}

fn next_down(x: f32) -> f32 {
    -next_up(-x)
}

/// Round a binary64 value to binary32 in direction `dir`.
///
/// Must run under round-to-nearest: the initial `as` conversion is the
/// hardware's.
pub fn narrow(value: f64, dir: Direction) -> f32 {
    let nearest = value as f32;
    if value.is_nan() || f64::from(nearest) == value {
        return nearest;
    }
    let below = f64::from(nearest) < value;
    match dir {
        Direction::Nearest => nearest,
        Direction::Up if below => next_up(nearest),
        Direction::Down if !below => next_down(nearest),
        Direction::Zero if value > 0.0 && !below => next_down(nearest),
        Direction::Zero if value < 0.0 && below => next_up(nearest),
        _ => nearest,
    }
}

fn in_nearest<T>(eval: impl FnOnce() -> T) -> T {
    // Workers run under the mode being verified; the binary64 evaluation
    // and the first narrowing step must not.
    let _nearest = match RoundingGuard::enter(RoundingMode::ToNearest) {
        Ok(guard) => guard,
        Err(e) => {
            // Every reference value would be computed in the verified mode
            tracing::error!(error = %e, "cannot evaluate widened reference");
            std::process::abort();
        }
    };
    eval()
}

/// `op(x)` evaluated in binary64, narrowed in direction `dir`
pub fn unary(x: f32, dir: Direction, op: fn(f64) -> f64) -> f32 {
    in_nearest(|| narrow(op(f64::from(x)), dir))
}

/// `op(x, y)` evaluated in binary64, narrowed in direction `dir`
pub fn binary(x: f32, y: f32, dir: Direction, op: fn(f64, f64) -> f64) -> f32 {
    in_nearest(|| narrow(op(f64::from(x), f64::from(y)), dir))
}

/// `op(x, n)` evaluated in binary64, narrowed in direction `dir`
pub fn real_int(x: f32, n: i64, dir: Direction, op: fn(f64, i32) -> f64) -> f32 {
    in_nearest(|| narrow(op(f64::from(x), saturate_i32(n)), dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hint::black_box;
    use ulpcheck_core::HAS_ROUNDING_CONTROL;

    /// `v + 2^-54`: exactly `v` near one in round-to-nearest, the next
    /// binary64 value upward
    fn nudge(v: f64) -> f64 {
        black_box(v) + black_box(2f64.powi(-54))
    }

    #[test]
    fn test_binary64_step_runs_in_nearest() {
        let _upward = RoundingGuard::enter(RoundingMode::Upward).unwrap();
        assert_eq!(unary(1.0, Direction::Up, nudge), 1.0);
        assert_eq!(binary(1.0, 0.0, Direction::Up, |x, _| nudge(x)), 1.0);
        if HAS_ROUNDING_CONTROL {
            // The caller's mode is back once the reference returns
            assert!(nudge(1.0) > 1.0);
        }
    }

    #[test]
    fn test_exact_values_are_kept() {
        for dir in [Direction::Nearest, Direction::Up, Direction::Down, Direction::Zero] {
            assert_eq!(narrow(1.0, dir), 1.0);
            assert_eq!(narrow(-0.0, dir).to_bits(), (-0.0f32).to_bits());
            assert_eq!(narrow(f64::INFINITY, dir), f32::INFINITY);
        }
        assert!(narrow(f64::NAN, Direction::Up).is_nan());
    }

    #[test]
    fn test_directed_narrowing_brackets() {
        let third = 1.0f64 / 3.0;
        let up = narrow(third, Direction::Up);
        let down = narrow(third, Direction::Down);
        assert!(f64::from(down) < third && third < f64::from(up));
        assert_eq!(up.to_bits() - down.to_bits(), 1);
        assert_eq!(narrow(third, Direction::Zero), down);
        assert_eq!(narrow(-third, Direction::Zero), -down);
        assert_eq!(narrow(-third, Direction::Up), -down);
        assert_eq!(narrow(-third, Direction::Down), -up);
    }

    #[test]
    fn test_overflow_and_underflow() {
        let huge = f64::from(f32::MAX) * 1.5;
        assert_eq!(narrow(huge, Direction::Up), f32::INFINITY);
        assert_eq!(narrow(huge, Direction::Down), f32::MAX);
        assert_eq!(narrow(huge, Direction::Zero), f32::MAX);
        assert_eq!(narrow(-huge, Direction::Up), -f32::MAX);

        let tiny = 1e-50f64;
        assert_eq!(narrow(tiny, Direction::Up), f32::from_bits(1));
        assert_eq!(narrow(tiny, Direction::Down), 0.0);
        assert_eq!(narrow(-tiny, Direction::Down), -f32::from_bits(1));
        assert!(narrow(-tiny, Direction::Up).is_sign_negative());
    }

    #[test]
    fn test_widened_functions() {
        assert_eq!(unary(4.0, Direction::Down, f64::sqrt), 2.0);
        let up = unary(2.0, Direction::Up, f64::sqrt);
        let down = unary(2.0, Direction::Down, f64::sqrt);
        assert_eq!(up.to_bits() - down.to_bits(), 1);
        assert_eq!(binary(3.0, 4.0, Direction::Nearest, f64::hypot), 5.0);
        assert_eq!(real_int(1.5, 3, Direction::Zero, libm::scalbn), 12.0);
    }
}
