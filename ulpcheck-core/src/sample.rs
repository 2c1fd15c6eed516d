//! Sample Specifications
//!
//! A `SampleSpec` declares one segment of input domain: a uniform random
//! range (one or two arguments, or a float plus an integer) or a closed
//! interval of raw bit patterns to enumerate exhaustively. Constructors
//! validate, so a spec that exists can always be sampled.

use crate::error::ConfigError;
use crate::float::{FloatFormat, Width};
use crate::function::Shape;
use rand::Rng;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Closed float interval `[start, end]` with a finite width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range<F> {
    start: F,
    end: F,
}

impl<F: FloatFormat> Range<F> {
    /// Validate bounds: finite, ordered, and a width the uniform
    /// distribution can scale without overflow
    pub fn new(start: F, end: F) -> Result<Self, ConfigError> {
        for bound in [start, end] {
            if !bound.is_finite() {
                return Err(ConfigError::NonFiniteBound {
                    field: "range".into(),
                    value: bound.to_string(),
                });
            }
        }
        if !(start <= end) {
            return Err(ConfigError::InvertedRange {
                field: "range".into(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        // The uniform distribution scales the width by `1 / (1 - ε)`; keep one
        // more ε of headroom for workers that build it under directed rounding
        let headroom = 1.0 - 2f64.powi(1 - F::MANTISSA_DIGITS as i32);
        let scale = (end.to_f64() - start.to_f64()) / headroom / headroom;
        if !(end - start).is_finite() || !(scale <= F::MAX.to_f64()) {
            return Err(ConfigError::RangeOverflow {
                field: "range".into(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Lower bound
    pub fn start(&self) -> F {
        self.start
    }

    /// Upper bound
    pub fn end(&self) -> F {
        self.end
    }

    /// Uniform draw from the closed interval
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> F {
        rng.gen_range(self.start..=self.end)
    }
}

/// Closed integer interval for the integer argument of real+integer
/// functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntRange {
    start: i64,
    end: i64,
}

impl IntRange {
    /// Validate ordering
    pub fn new(start: i64, end: i64) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvertedRange {
                field: "range".into(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Lower bound
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Upper bound
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Uniform draw from the closed interval
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.gen_range(self.start..=self.end)
    }
}

/// Closed interval of raw bit patterns, enumerated in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullRange {
    label: String,
    start_bits: u64,
    end_bits: u64,
}

impl FullRange {
    /// Validate `start_bits <= end_bits` and that both fit in `width`
    pub fn new(
        label: impl Into<String>,
        start_bits: u64,
        end_bits: u64,
        width: Width,
    ) -> Result<Self, ConfigError> {
        let label = label.into();
        for bits in [start_bits, end_bits] {
            if bits > width.max_bits() {
                return Err(ConfigError::BitsOutOfWidth {
                    label,
                    bits,
                    width: width.bits(),
                });
            }
        }
        if start_bits > end_bits {
            return Err(ConfigError::InvertedBits {
                label,
                start: start_bits,
                end: end_bits,
            });
        }
        Ok(Self {
            label,
            start_bits,
            end_bits,
        })
    }

    /// Positive normal numbers of `F`
    pub fn positive_normal<F: FloatFormat>() -> Self {
        Self::named::<F>("positive normal", F::MIN_POSITIVE.to_bits_u64(), F::MAX.to_bits_u64())
    }

    /// Negative normal numbers of `F`
    pub fn negative_normal<F: FloatFormat>() -> Self {
        let sign = F::sign_mask();
        Self::named::<F>(
            "negative normal",
            sign | F::MIN_POSITIVE.to_bits_u64(),
            sign | F::MAX.to_bits_u64(),
        )
    }

    /// Positive subnormal numbers of `F`
    pub fn positive_subnormal<F: FloatFormat>() -> Self {
        Self::named::<F>("positive subnormal", 1, F::fraction_mask())
    }

    /// Negative subnormal numbers of `F`
    pub fn negative_subnormal<F: FloatFormat>() -> Self {
        let sign = F::sign_mask();
        Self::named::<F>("negative subnormal", sign | 1, sign | F::fraction_mask())
    }

    fn named<F: FloatFormat>(kind: &str, start_bits: u64, end_bits: u64) -> Self {
        Self {
            label: format!("{kind} ({})", F::WIDTH),
            start_bits,
            end_bits,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// First bit pattern
    pub fn start_bits(&self) -> u64 {
        self.start_bits
    }

    /// Last bit pattern
    pub fn end_bits(&self) -> u64 {
        self.end_bits
    }

    /// Number of patterns in the interval
    pub fn len(&self) -> u128 {
        u128::from(self.end_bits - self.start_bits) + 1
    }

    /// Never true: the interval is closed and ordered
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of `chunk_size` chunks covering the interval
    pub fn chunk_count(&self, chunk_size: u64) -> u64 {
        (self.end_bits - self.start_bits) / chunk_size.max(1) + 1
    }

    /// Bit patterns of chunk `index`
    pub fn chunk(&self, index: u64, chunk_size: u64) -> RangeInclusive<u64> {
        let size = chunk_size.max(1);
        let lo = self.start_bits.saturating_add(index.saturating_mul(size));
        let hi = lo.saturating_add(size - 1).min(self.end_bits);
        lo..=hi
    }

    /// Every value of the interval, reinterpreted as `F`
    pub fn values<F: FloatFormat>(&self) -> impl Iterator<Item = F> {
        (self.start_bits..=self.end_bits).map(F::from_bits_u64)
    }
}

/// One segment of input domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SampleSpec<F> {
    /// `count` uniform draws of one argument
    Random1Arg {
        /// Argument range
        range: Range<F>,
        /// Number of draws
        count: u64,
    },
    /// `count` uniform draws of two independent arguments
    Random2Arg {
        /// First argument range
        range_x: Range<F>,
        /// Second argument range
        range_y: Range<F>,
        /// Number of draws
        count: u64,
    },
    /// `count` uniform draws of a float and an integer
    Random1ArgPlusInt {
        /// Float argument range
        range_float: Range<F>,
        /// Integer argument range
        range_int: IntRange,
        /// Number of draws
        count: u64,
    },
    /// Every bit pattern in an interval
    FullEnumeration(FullRange),
}

fn positive(count: u64) -> Result<u64, ConfigError> {
    if count == 0 {
        return Err(ConfigError::ZeroCount {
            field: "count".into(),
        });
    }
    Ok(count)
}

impl<F: FloatFormat> SampleSpec<F> {
    /// Random single-argument segment
    pub fn random_1arg(range: Range<F>, count: u64) -> Result<Self, ConfigError> {
        Ok(SampleSpec::Random1Arg {
            range,
            count: positive(count)?,
        })
    }

    /// Random two-argument segment
    pub fn random_2arg(range_x: Range<F>, range_y: Range<F>, count: u64) -> Result<Self, ConfigError> {
        Ok(SampleSpec::Random2Arg {
            range_x,
            range_y,
            count: positive(count)?,
        })
    }

    /// Random float-plus-integer segment
    pub fn random_1arg_plus_int(
        range_float: Range<F>,
        range_int: IntRange,
        count: u64,
    ) -> Result<Self, ConfigError> {
        Ok(SampleSpec::Random1ArgPlusInt {
            range_float,
            range_int,
            count: positive(count)?,
        })
    }

    /// Shape of function this segment can drive
    pub fn shape(&self) -> Shape {
        match self {
            SampleSpec::Random1Arg { .. } | SampleSpec::FullEnumeration(_) => Shape::UnaryReal,
            SampleSpec::Random2Arg { .. } => Shape::BinaryReal,
            SampleSpec::Random1ArgPlusInt { .. } => Shape::RealInteger,
        }
    }

    /// Short kind name
    pub fn kind(&self) -> &'static str {
        match self {
            SampleSpec::Random1Arg { .. } => "random-1arg",
            SampleSpec::Random2Arg { .. } => "random-2arg",
            SampleSpec::Random1ArgPlusInt { .. } => "random-1arg-plus-int",
            SampleSpec::FullEnumeration(_) => "full-enumeration",
        }
    }

    /// Total number of evaluations
    pub fn sample_count(&self) -> u128 {
        match self {
            SampleSpec::Random1Arg { count, .. }
            | SampleSpec::Random2Arg { count, .. }
            | SampleSpec::Random1ArgPlusInt { count, .. } => u128::from(*count),
            SampleSpec::FullEnumeration(range) => range.len(),
        }
    }

    /// Reject a segment that cannot drive a function of `shape`
    pub fn check_shape(&self, function: &str, shape: Shape) -> Result<(), ConfigError> {
        if self.shape() == shape {
            return Ok(());
        }
        Err(ConfigError::ShapeMismatch {
            function: function.to_string(),
            shape,
            sample: self.kind(),
        })
    }
}
