//! Shape-tagged routines.
//!
//! The three argument shapes form a closed set, so bindings are plain enums
//! over function pointers rather than trait objects.

use crate::adapter::{OracleAdapter, RoundingEncoding, setup_reference};
use ulpcheck_core::{FloatFormat, Inputs, RoundingMode, Shape};

/// Implementation under test, by shape
#[derive(Debug, Clone, Copy)]
pub enum Candidate<F> {
    /// `f(x)`
    Unary(fn(F) -> F),
    /// `f(x, y)`
    Binary(fn(F, F) -> F),
    /// `f(x, n)`
    RealInt(fn(F, i64) -> F),
}

impl<F> Candidate<F> {
    /// Argument shape
    pub fn shape(&self) -> Shape {
        match self {
            Candidate::Unary(_) => Shape::UnaryReal,
            Candidate::Binary(_) => Shape::BinaryReal,
            Candidate::RealInt(_) => Shape::RealInteger,
        }
    }
}

/// Reference taking an explicit rounding direction `R`, by shape
#[derive(Debug, Clone, Copy)]
pub enum Reference<F, R> {
    /// `f(x, rnd)`
    Unary(fn(F, R) -> F),
    /// `f(x, y, rnd)`
    Binary(fn(F, F, R) -> F),
    /// `f(x, n, rnd)`
    RealInt(fn(F, i64, R) -> F),
}

impl<F, R> Reference<F, R> {
    /// Argument shape
    pub fn shape(&self) -> Shape {
        match self {
            Reference::Unary(_) => Shape::UnaryReal,
            Reference::Binary(_) => Shape::BinaryReal,
            Reference::RealInt(_) => Shape::RealInteger,
        }
    }
}

/// A candidate paired with the reference of the same shape.
#[derive(Debug, Clone, Copy)]
pub enum Routine<F, R> {
    /// `f(x)`
    Unary {
        /// Implementation under test
        candidate: fn(F) -> F,
        /// Reference
        oracle: OracleAdapter<fn(F, R) -> F>,
    },
    /// `f(x, y)`
    Binary {
        /// Implementation under test
        candidate: fn(F, F) -> F,
        /// Reference
        oracle: OracleAdapter<fn(F, F, R) -> F>,
    },
    /// `f(x, n)`
    RealInt {
        /// Implementation under test
        candidate: fn(F, i64) -> F,
        /// Reference
        oracle: OracleAdapter<fn(F, i64, R) -> F>,
    },
}

impl<F: FloatFormat, R: RoundingEncoding> Routine<F, R> {
    /// Pair a candidate with its reference. `None` if the shapes differ.
    /// Configures the reference for `F` on first use.
    pub fn pair(candidate: Candidate<F>, reference: Reference<F, R>) -> Option<Self> {
        let routine = match (candidate, reference) {
            (Candidate::Unary(candidate), Reference::Unary(r)) => Routine::Unary {
                candidate,
                oracle: OracleAdapter::new(r),
            },
            (Candidate::Binary(candidate), Reference::Binary(r)) => Routine::Binary {
                candidate,
                oracle: OracleAdapter::new(r),
            },
            (Candidate::RealInt(candidate), Reference::RealInt(r)) => Routine::RealInt {
                candidate,
                oracle: OracleAdapter::new(r),
            },
            _ => return None,
        };
        setup_reference::<F>();
        Some(routine)
    }

    /// Argument shape
    pub fn shape(&self) -> Shape {
        match self {
            Routine::Unary { .. } => Shape::UnaryReal,
            Routine::Binary { .. } => Shape::BinaryReal,
            Routine::RealInt { .. } => Shape::RealInteger,
        }
    }

    /// `(computed, expected)` for one input tuple, or `None` if the tuple
    /// does not match the routine's shape.
    #[inline]
    pub fn evaluate(&self, inputs: Inputs<F>, mode: RoundingMode) -> Option<(F, F)> {
        match (*self, inputs) {
            (Routine::Unary { candidate, oracle }, Inputs::Unary(x)) => {
                Some((candidate(x), oracle.eval(x, mode)))
            }
            (Routine::Binary { candidate, oracle }, Inputs::Binary(x, y)) => {
                Some((candidate(x, y), oracle.eval2(x, y, mode)))
            }
            (Routine::RealInt { candidate, oracle }, Inputs::RealInt(x, n)) => {
                Some((candidate(x, n), oracle.eval_int(x, n, mode)))
            }
            _ => None,
        }
    }
}

/// Clamp an integer argument to the `i32` range taken by C-style APIs
#[inline]
pub fn saturate_i32(n: i64) -> i32 {
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twice(x: f32) -> f32 {
        2.0 * x
    }

    fn twice_ref(x: f32, _: RoundingMode) -> f32 {
        2.0 * x
    }

    fn add(x: f32, y: f32) -> f32 {
        x + y
    }

    #[test]
    fn test_pair_requires_same_shape() {
        let unary = Routine::pair(Candidate::Unary(twice), Reference::Unary(twice_ref));
        assert!(unary.is_some());
        let mismatched: Option<Routine<f32, RoundingMode>> =
            Routine::pair(Candidate::Binary(add), Reference::Unary(twice_ref));
        assert!(mismatched.is_none());
    }

    #[test]
    fn test_evaluate_checks_inputs() {
        let routine = Routine::pair(Candidate::Unary(twice), Reference::Unary(twice_ref)).unwrap();
        assert_eq!(routine.shape(), Shape::UnaryReal);
        assert_eq!(
            routine.evaluate(Inputs::Unary(1.5), RoundingMode::ToNearest),
            Some((3.0, 3.0))
        );
        assert_eq!(routine.evaluate(Inputs::Binary(1.0, 2.0), RoundingMode::ToNearest), None);
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate_i32(5), 5);
        assert_eq!(saturate_i32(i64::MAX), i32::MAX);
        assert_eq!(saturate_i32(i64::MIN), i32::MIN);
    }
}
