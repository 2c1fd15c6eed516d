//! IEEE-754 Formats
//!
//! Bit-level view of binary32 and binary64. Everything the verifier needs to
//! know about a format (digits, exponent limits, encoding) lives here so the
//! ULP metric and the full enumerator stay generic.

use rand::distributions::uniform::SampleUniform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::FpCategory;
use std::ops::Sub;

/// Interchange format of a function under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    /// IEEE-754 binary32 (`f32`)
    Binary32,
    /// IEEE-754 binary64 (`f64`)
    Binary64,
}

impl Width {
    /// Storage size in bits
    pub fn bits(self) -> u32 {
        match self {
            Width::Binary32 => 32,
            Width::Binary64 => 64,
        }
    }

    /// Largest bit pattern of the format
    pub fn max_bits(self) -> u64 {
        match self {
            Width::Binary32 => u32::MAX as u64,
            Width::Binary64 => u64::MAX,
        }
    }

    /// Format name
    pub fn name(self) -> &'static str {
        match self {
            Width::Binary32 => "binary32",
            Width::Binary64 => "binary64",
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A binary floating-point format the verifier can test.
///
/// `MIN_EXP` and `MAX_EXP` follow the C `<float.h>` convention: the smallest
/// normal is `2^(MIN_EXP - 1)` and the largest finite value is just below
/// `2^MAX_EXP`.
pub trait FloatFormat:
    Copy
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Sub<Output = Self>
    + SampleUniform
    + Send
    + Sync
    + 'static
{
    /// Format tag
    const WIDTH: Width;
    /// Storage size in bits
    const TOTAL_BITS: u32;
    /// Significand precision including the implicit bit
    const MANTISSA_DIGITS: u32;
    /// C-style minimum exponent
    const MIN_EXP: i32;
    /// C-style maximum exponent
    const MAX_EXP: i32;

    /// Positive zero
    const ZERO: Self;
    /// Quiet NaN
    const NAN: Self;
    /// Positive infinity
    const INFINITY: Self;
    /// Largest finite value
    const MAX: Self;
    /// Smallest positive normal
    const MIN_POSITIVE: Self;
    /// Nearest value to π
    const PI: Self;

    /// Explicitly stored fraction bits
    const FRACTION_BITS: u32 = Self::MANTISSA_DIGITS - 1;
    /// Exponent field width
    const EXPONENT_BITS: u32 = Self::TOTAL_BITS - Self::MANTISSA_DIGITS;
    /// Exponent bias
    const EXPONENT_BIAS: i32 = Self::MAX_EXP - 1;
    /// Exponent of the smallest positive subnormal
    const MIN_SUBNORMAL_EXP: i32 = Self::MIN_EXP - Self::MANTISSA_DIGITS as i32;

    /// Raw encoding, zero-extended to 64 bits
    fn to_bits_u64(self) -> u64;
    /// Decode the low `TOTAL_BITS` of `bits`
    fn from_bits_u64(bits: u64) -> Self;
    /// Exact widening (binary64 is the identity)
    fn to_f64(self) -> f64;
    /// Round-to-nearest narrowing
    fn from_f64(value: f64) -> Self;
    /// IEEE classification
    fn classify(self) -> FpCategory;

    /// Sign bit in the raw encoding
    fn sign_mask() -> u64 {
        1u64 << (Self::TOTAL_BITS - 1)
    }

    /// Fraction field mask
    fn fraction_mask() -> u64 {
        (1u64 << Self::FRACTION_BITS) - 1
    }

    /// Biased exponent field
    fn biased_exponent(self) -> u32 {
        ((self.to_bits_u64() >> Self::FRACTION_BITS) & ((1u64 << Self::EXPONENT_BITS) - 1)) as u32
    }

    /// Stored fraction field
    fn fraction(self) -> u64 {
        self.to_bits_u64() & Self::fraction_mask()
    }

    /// True for NaN
    fn is_nan(self) -> bool {
        self.classify() == FpCategory::Nan
    }

    /// True for finite values (zero, subnormal, normal)
    fn is_finite(self) -> bool {
        !matches!(self.classify(), FpCategory::Nan | FpCategory::Infinite)
    }

    /// True if the sign bit is set
    fn is_sign_negative(self) -> bool {
        self.to_bits_u64() & Self::sign_mask() != 0
    }

    /// True for a NaN whose quiet bit (top fraction bit) is clear
    fn is_signaling_nan(self) -> bool {
        self.is_nan() && self.fraction() & (1u64 << (Self::FRACTION_BITS - 1)) == 0
    }

    /// Unbiased exponent of a finite non-zero value, as C `ilogb`.
    /// Returns `i32::MIN` for zero and non-finite inputs.
    fn ilogb(self) -> i32 {
        match self.classify() {
            FpCategory::Normal => self.biased_exponent() as i32 - Self::EXPONENT_BIAS,
            FpCategory::Subnormal => {
                let top = 63 - self.fraction().leading_zeros() as i32;
                top + Self::MIN_SUBNORMAL_EXP
            }
            _ => i32::MIN,
        }
    }

    /// Exact `2^exp`, saturating to zero below the subnormal range and to
    /// infinity above the largest binade.
    fn pow2(exp: i32) -> Self {
        let min_normal_exp = Self::MIN_EXP - 1;
        let bits = if exp > Self::MAX_EXP - 1 {
            return Self::INFINITY;
        } else if exp >= min_normal_exp {
            ((exp + Self::EXPONENT_BIAS) as u64) << Self::FRACTION_BITS
        } else if exp >= Self::MIN_SUBNORMAL_EXP {
            1u64 << (exp - Self::MIN_SUBNORMAL_EXP)
        } else {
            0
        };
        Self::from_bits_u64(bits)
    }
}

impl FloatFormat for f32 {
    const WIDTH: Width = Width::Binary32;
    const TOTAL_BITS: u32 = 32;
    const MANTISSA_DIGITS: u32 = f32::MANTISSA_DIGITS;
    const MIN_EXP: i32 = f32::MIN_EXP;
    const MAX_EXP: i32 = f32::MAX_EXP;
    const ZERO: Self = 0.0;
    const NAN: Self = f32::NAN;
    const INFINITY: Self = f32::INFINITY;
    const MAX: Self = f32::MAX;
    const MIN_POSITIVE: Self = f32::MIN_POSITIVE;
    const PI: Self = std::f32::consts::PI;

    #[inline]
    fn to_bits_u64(self) -> u64 {
        self.to_bits() as u64
    }

    #[inline]
    fn from_bits_u64(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn classify(self) -> FpCategory {
        f32::classify(self)
    }
}

impl FloatFormat for f64 {
    const WIDTH: Width = Width::Binary64;
    const TOTAL_BITS: u32 = 64;
    const MANTISSA_DIGITS: u32 = f64::MANTISSA_DIGITS;
    const MIN_EXP: i32 = f64::MIN_EXP;
    const MAX_EXP: i32 = f64::MAX_EXP;
    const ZERO: Self = 0.0;
    const NAN: Self = f64::NAN;
    const INFINITY: Self = f64::INFINITY;
    const MAX: Self = f64::MAX;
    const MIN_POSITIVE: Self = f64::MIN_POSITIVE;
    const PI: Self = std::f64::consts::PI;

    #[inline]
    fn to_bits_u64(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_bits_u64(bits: u64) -> Self {
        f64::from_bits(bits)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn classify(self) -> FpCategory {
        f64::classify(self)
    }
}

/// Exact hexadecimal rendering in the C `%a` style, e.g. `0x1.8p+1`.
#[derive(Debug, Clone, Copy)]
pub struct HexFloat<F>(pub F);

impl<F: FloatFormat> fmt::Display for HexFloat<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        let sign = if value.is_sign_negative() { "-" } else { "" };
        match value.classify() {
            FpCategory::Nan => return write!(f, "{sign}nan"),
            FpCategory::Infinite => return write!(f, "{sign}inf"),
            FpCategory::Zero => return write!(f, "{sign}0x0p+0"),
            _ => {}
        }

        let mut fraction = value.fraction();
        let exponent = if value.classify() == FpCategory::Subnormal {
            // Normalise so the leading one becomes the implicit bit
            let top = 63 - fraction.leading_zeros();
            let shift = F::FRACTION_BITS - top;
            fraction = (fraction << shift) & F::fraction_mask();
            F::MIN_EXP - 1 - shift as i32
        } else {
            value.ilogb()
        };

        let digits = F::FRACTION_BITS.div_ceil(4) as usize;
        let padded = fraction << (digits as u32 * 4 - F::FRACTION_BITS);
        let hex = format!("{padded:0digits$x}");
        let hex = hex.trim_end_matches('0');
        if hex.is_empty() {
            write!(f, "{sign}0x1p{exponent:+}")
        } else {
            write!(f, "{sign}0x1.{hex}p{exponent:+}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_constants() {
        assert_eq!(<f32 as FloatFormat>::FRACTION_BITS, 23);
        assert_eq!(<f32 as FloatFormat>::EXPONENT_BITS, 8);
        assert_eq!(<f32 as FloatFormat>::EXPONENT_BIAS, 127);
        assert_eq!(<f32 as FloatFormat>::MIN_SUBNORMAL_EXP, -149);
        assert_eq!(<f64 as FloatFormat>::FRACTION_BITS, 52);
        assert_eq!(<f64 as FloatFormat>::EXPONENT_BITS, 11);
        assert_eq!(<f64 as FloatFormat>::EXPONENT_BIAS, 1023);
        assert_eq!(<f64 as FloatFormat>::MIN_SUBNORMAL_EXP, -1074);
    }

    #[test]
    fn test_ilogb_matches_binade() {
        assert_eq!(FloatFormat::ilogb(1.0f32), 0);
        assert_eq!(FloatFormat::ilogb(3.0f64), 1);
        assert_eq!(FloatFormat::ilogb(f32::MIN_POSITIVE), -126);
        assert_eq!(FloatFormat::ilogb(f32::from_bits(1)), -149);
        assert_eq!(FloatFormat::ilogb(f64::from_bits(1)), -1074);
        assert_eq!(FloatFormat::ilogb(f64::from_bits(0x0008_0000_0000_0000)), -1023);
        assert_eq!(FloatFormat::ilogb(0.0f32), i32::MIN);
    }

    #[test]
    fn test_pow2_covers_subnormals_and_saturates() {
        assert_eq!(<f32 as FloatFormat>::pow2(0), 1.0);
        assert_eq!(<f32 as FloatFormat>::pow2(-149).to_bits(), 1);
        assert_eq!(<f32 as FloatFormat>::pow2(-150), 0.0);
        assert_eq!(<f32 as FloatFormat>::pow2(127), 2f32.powi(127));
        assert_eq!(<f32 as FloatFormat>::pow2(128), f32::INFINITY);
        assert_eq!(<f64 as FloatFormat>::pow2(-1022), f64::MIN_POSITIVE);
        assert_eq!(<f64 as FloatFormat>::pow2(-1074).to_bits(), 1);
    }

    #[test]
    fn test_signaling_nan_detection() {
        assert!(!FloatFormat::is_signaling_nan(f32::NAN));
        assert!(FloatFormat::is_signaling_nan(f32::from_bits(0x7f80_0001)));
        assert!(FloatFormat::is_signaling_nan(f64::from_bits(0x7ff0_0000_0000_0001)));
        assert!(!FloatFormat::is_signaling_nan(f64::INFINITY));
        assert!(!FloatFormat::is_signaling_nan(1.0f64));
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(HexFloat(1.0f64).to_string(), "0x1p+0");
        assert_eq!(HexFloat(3.0f64).to_string(), "0x1.8p+1");
        assert_eq!(HexFloat(-0.1f32).to_string(), "-0x1.99999ap-4");
        assert_eq!(HexFloat(0.1f64).to_string(), "0x1.999999999999ap-4");
        assert_eq!(HexFloat(f32::from_bits(1)).to_string(), "0x1p-149");
        assert_eq!(HexFloat(f64::MIN_POSITIVE).to_string(), "0x1p-1022");
        assert_eq!(HexFloat(-0.0f64).to_string(), "-0x0p+0");
        assert_eq!(HexFloat(f32::INFINITY).to_string(), "inf");
        assert_eq!(HexFloat(f64::NAN).to_string(), "nan");
    }
}
