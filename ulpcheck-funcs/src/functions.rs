//! Catalog registrations.
//!
//! `f`-suffixed names are binary32, bare names binary64, as in C.

use crate::catalog::{Bindings, FunctionDef, Kernel, ReferenceRound};
use crate::routine::{Candidate, Reference, saturate_i32};
#[cfg(feature = "mpfr")]
use rug::Float;
use ulpcheck_core::Shape;

// ─── Reference selection ─────────────────────────────────────────────────────

#[cfg(feature = "mpfr")]
macro_rules! reference {
    (unary, $t:ident, $mp:expr, $wide:expr) => {
        Some(Reference::Unary(|x: $t, r: ReferenceRound| {
            crate::mpfr::unary(x, r, $mp)
        }))
    };
    (binary, $t:ident, $mp:expr, $wide:expr) => {
        Some(Reference::Binary(|x: $t, y: $t, r: ReferenceRound| {
            crate::mpfr::binary(x, y, r, $mp)
        }))
    };
    (real_int, $t:ident, $mp:expr, $wide:expr) => {
        Some(Reference::RealInt(|x: $t, n: i64, r: ReferenceRound| {
            crate::mpfr::real_int(x, n, r, $mp)
        }))
    };
}

#[cfg(not(feature = "mpfr"))]
macro_rules! reference {
    (unary, f32, $mp:expr, $wide:expr) => {
        Some(Reference::Unary(|x: f32, d: ReferenceRound| {
            crate::widened::unary(x, d, $wide)
        }))
    };
    (binary, f32, $mp:expr, $wide:expr) => {
        Some(Reference::Binary(|x: f32, y: f32, d: ReferenceRound| {
            crate::widened::binary(x, y, d, $wide)
        }))
    };
    (real_int, f32, $mp:expr, $wide:expr) => {
        Some(Reference::RealInt(|x: f32, n: i64, d: ReferenceRound| {
            crate::widened::real_int(x, n, d, $wide)
        }))
    };
    ($shape:ident, f64, $mp:expr, $wide:expr) => {
        None
    };
}

macro_rules! library {
    ($variant:ident, $t:ident) => {
        None
    };
    ($variant:ident, $t:ident, $method:ident) => {
        Some(Candidate::$variant($t::$method))
    };
}

// ─── Shapes ──────────────────────────────────────────────────────────────────

macro_rules! unary {
    ($name:ident / $namef:ident, std: $($std:ident)?, mpfr: $mp:expr, wide: $wide:expr) => {
        inventory::submit! {
            FunctionDef::new(stringify!($namef), Shape::UnaryReal, Kernel::Binary32(Bindings {
                library: library!(Unary, f32 $(, $std)?),
                candidate: Some(Candidate::Unary(libm::$namef)),
                reference: reference!(unary, f32, $mp, $wide),
            }))
        }
        inventory::submit! {
            FunctionDef::new(stringify!($name), Shape::UnaryReal, Kernel::Binary64(Bindings {
                library: library!(Unary, f64 $(, $std)?),
                candidate: Some(Candidate::Unary(libm::$name)),
                reference: reference!(unary, f64, $mp, $wide),
            }))
        }
    };
}

macro_rules! binary {
    ($name:ident / $namef:ident, std: $std:ident, mpfr: $mp:expr, wide: $wide:expr) => {
        inventory::submit! {
            FunctionDef::new(stringify!($namef), Shape::BinaryReal, Kernel::Binary32(Bindings {
                library: library!(Binary, f32, $std),
                candidate: Some(Candidate::Binary(libm::$namef)),
                reference: reference!(binary, f32, $mp, $wide),
            }))
        }
        inventory::submit! {
            FunctionDef::new(stringify!($name), Shape::BinaryReal, Kernel::Binary64(Bindings {
                library: library!(Binary, f64, $std),
                candidate: Some(Candidate::Binary(libm::$name)),
                reference: reference!(binary, f64, $mp, $wide),
            }))
        }
    };
}

/// Neither `std` nor `libm` has these; the library binding is the naive
/// composition of `std` methods, with the `consts` of its width in scope
macro_rules! composed {
    ($name:ident / $namef:ident, naive: |$x:ident| $naive:expr, mpfr: $mp:expr, wide: $wide:expr) => {
        inventory::submit! {
            FunctionDef::new(stringify!($namef), Shape::UnaryReal, Kernel::Binary32(Bindings {
                library: Some(Candidate::Unary({
                    use std::f32::consts::*;
                    |$x: f32| $naive
                })),
                candidate: None,
                reference: reference!(unary, f32, $mp, $wide),
            }))
        }
        inventory::submit! {
            FunctionDef::new(stringify!($name), Shape::UnaryReal, Kernel::Binary64(Bindings {
                library: Some(Candidate::Unary({
                    use std::f64::consts::*;
                    |$x: f64| $naive
                })),
                candidate: None,
                reference: reference!(unary, f64, $mp, $wide),
            }))
        }
    };
}

// ─── unary-real ──────────────────────────────────────────────────────────────

unary!(acos / acosf, std: acos, mpfr: Float::acos_round, wide: f64::acos);
unary!(acosh / acoshf, std: acosh, mpfr: Float::acosh_round, wide: f64::acosh);
unary!(asin / asinf, std: asin, mpfr: Float::asin_round, wide: f64::asin);
unary!(asinh / asinhf, std: asinh, mpfr: Float::asinh_round, wide: f64::asinh);
unary!(atan / atanf, std: atan, mpfr: Float::atan_round, wide: f64::atan);
unary!(atanh / atanhf, std: atanh, mpfr: Float::atanh_round, wide: f64::atanh);
unary!(cbrt / cbrtf, std: cbrt, mpfr: Float::cbrt_round, wide: f64::cbrt);
unary!(cos / cosf, std: cos, mpfr: Float::cos_round, wide: f64::cos);
unary!(cosh / coshf, std: cosh, mpfr: Float::cosh_round, wide: f64::cosh);
unary!(erf / erff, std: , mpfr: Float::erf_round, wide: libm::erf);
unary!(erfc / erfcf, std: , mpfr: Float::erfc_round, wide: libm::erfc);
unary!(exp / expf, std: exp, mpfr: Float::exp_round, wide: f64::exp);
unary!(exp10 / exp10f, std: , mpfr: Float::exp10_round, wide: libm::exp10);
unary!(exp2 / exp2f, std: exp2, mpfr: Float::exp2_round, wide: f64::exp2);
unary!(expm1 / expm1f, std: exp_m1, mpfr: Float::exp_m1_round, wide: f64::exp_m1);
unary!(lgamma / lgammaf, std: , mpfr: crate::mpfr::ln_abs_gamma, wide: libm::lgamma);
unary!(log / logf, std: ln, mpfr: Float::ln_round, wide: f64::ln);
unary!(log10 / log10f, std: log10, mpfr: Float::log10_round, wide: f64::log10);
unary!(log1p / log1pf, std: ln_1p, mpfr: Float::ln_1p_round, wide: f64::ln_1p);
unary!(log2 / log2f, std: log2, mpfr: Float::log2_round, wide: f64::log2);
unary!(sin / sinf, std: sin, mpfr: Float::sin_round, wide: f64::sin);
unary!(sinh / sinhf, std: sinh, mpfr: Float::sinh_round, wide: f64::sinh);
unary!(sqrt / sqrtf, std: sqrt, mpfr: Float::sqrt_round, wide: f64::sqrt);
unary!(tan / tanf, std: tan, mpfr: Float::tan_round, wide: f64::tan);
unary!(tanh / tanhf, std: tanh, mpfr: Float::tanh_round, wide: f64::tanh);
unary!(tgamma / tgammaf, std: , mpfr: Float::gamma_round, wide: libm::tgamma);

composed!(acospi / acospif, naive: |x| x.acos() / PI, mpfr: Float::acos_pi_round, wide: crate::kernels::acos_pi);
composed!(asinpi / asinpif, naive: |x| x.asin() / PI, mpfr: Float::asin_pi_round, wide: crate::kernels::asin_pi);
composed!(atanpi / atanpif, naive: |x| x.atan() / PI, mpfr: Float::atan_pi_round, wide: crate::kernels::atan_pi);
composed!(cospi / cospif, naive: |x| (x * PI).cos(), mpfr: Float::cos_pi_round, wide: crate::kernels::cos_pi);
composed!(sinpi / sinpif, naive: |x| (x * PI).sin(), mpfr: Float::sin_pi_round, wide: crate::kernels::sin_pi);
composed!(tanpi / tanpif, naive: |x| (x * PI).tan(), mpfr: Float::tan_pi_round, wide: crate::kernels::tan_pi);
composed!(exp2m1 / exp2m1f, naive: |x| (x * LN_2).exp_m1(), mpfr: Float::exp2_m1_round, wide: crate::kernels::exp2_m1);
composed!(exp10m1 / exp10m1f, naive: |x| (x * LN_10).exp_m1(), mpfr: Float::exp10_m1_round, wide: crate::kernels::exp10_m1);
composed!(log2p1 / log2p1f, naive: |x| x.ln_1p() / LN_2, mpfr: Float::log2_1p_round, wide: crate::kernels::log2_1p);
composed!(log10p1 / log10p1f, naive: |x| x.ln_1p() / LN_10, mpfr: Float::log10_1p_round, wide: crate::kernels::log10_1p);

// libm has no reciprocal square root; the library binding is the naive
// two-rounding expression
inventory::submit! {
    FunctionDef::new("rsqrtf", Shape::UnaryReal, Kernel::Binary32(Bindings {
        library: Some(Candidate::Unary(|x: f32| 1.0 / x.sqrt())),
        candidate: None,
        reference: reference!(unary, f32, Float::recip_sqrt_round, |v: f64| 1.0 / v.sqrt()),
    }))
}

inventory::submit! {
    FunctionDef::new("rsqrt", Shape::UnaryReal, Kernel::Binary64(Bindings {
        library: Some(Candidate::Unary(|x: f64| 1.0 / x.sqrt())),
        candidate: None,
        reference: reference!(unary, f64, Float::recip_sqrt_round, |v: f64| 1.0 / v.sqrt()),
    }))
}

// ─── binary-real ─────────────────────────────────────────────────────────────

binary!(atan2 / atan2f, std: atan2, mpfr: Float::atan2_round, wide: f64::atan2);
binary!(hypot / hypotf, std: hypot, mpfr: Float::hypot_round, wide: f64::hypot);
binary!(pow / powf, std: powf, mpfr: crate::mpfr::pow, wide: f64::powf);

// ─── real+integer ────────────────────────────────────────────────────────────

#[cfg(not(feature = "mpfr"))]
fn powi_f64(x: f64, n: i32) -> f64 {
    // Through powf: powi's repeated squaring is not accurate enough to act
    // as a reference
    x.powf(f64::from(n))
}

inventory::submit! {
    FunctionDef::new("pownf", Shape::RealInteger, Kernel::Binary32(Bindings {
        library: Some(Candidate::RealInt(|x: f32, n: i64| x.powi(saturate_i32(n)))),
        candidate: None,
        reference: reference!(real_int, f32, crate::mpfr::pown, powi_f64),
    }))
}

inventory::submit! {
    FunctionDef::new("pown", Shape::RealInteger, Kernel::Binary64(Bindings {
        library: Some(Candidate::RealInt(|x: f64, n: i64| x.powi(saturate_i32(n)))),
        candidate: None,
        reference: reference!(real_int, f64, crate::mpfr::pown, powi_f64),
    }))
}

inventory::submit! {
    FunctionDef::new("scalbnf", Shape::RealInteger, Kernel::Binary32(Bindings {
        library: None,
        candidate: Some(Candidate::RealInt(|x: f32, n: i64| libm::scalbnf(x, saturate_i32(n)))),
        reference: reference!(real_int, f32, crate::mpfr::scale, libm::scalbn),
    }))
}

inventory::submit! {
    FunctionDef::new("scalbn", Shape::RealInteger, Kernel::Binary64(Bindings {
        library: None,
        candidate: Some(Candidate::RealInt(|x: f64, n: i64| libm::scalbn(x, saturate_i32(n)))),
        reference: reference!(real_int, f64, crate::mpfr::scale, libm::scalbn),
    }))
}

inventory::submit! {
    FunctionDef::new("ldexpf", Shape::RealInteger, Kernel::Binary32(Bindings {
        library: None,
        candidate: Some(Candidate::RealInt(|x: f32, n: i64| libm::ldexpf(x, saturate_i32(n)))),
        reference: reference!(real_int, f32, crate::mpfr::scale, libm::ldexp),
    }))
}

inventory::submit! {
    FunctionDef::new("ldexp", Shape::RealInteger, Kernel::Binary64(Bindings {
        library: None,
        candidate: Some(Candidate::RealInt(|x: f64, n: i64| libm::ldexp(x, saturate_i32(n)))),
        reference: reference!(real_int, f64, crate::mpfr::scale, libm::ldexp),
    }))
}
