//! Number formatting in the C `printf` style used by the text report.

use ulpcheck_core::{FloatFormat, SampleSpec};

/// `%<width>.<precision>g`: shortest of fixed and exponential notation with
/// `precision` significant digits and trailing zeros removed, right-aligned
/// to `width`.
pub fn fmt_general(value: f64, width: usize, precision: usize) -> String {
    let body = general_body(value, precision.max(1));
    format!("{body:>width$}")
}

fn general_body(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // The exponent after rounding to `precision` digits decides the style
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Header label of a segment, e.g. `range [    -3.1,      3.1]`
pub fn segment_label<F: FloatFormat>(spec: &SampleSpec<F>) -> String {
    let g = |v: F| fmt_general(v.to_f64(), 9, 2);
    match spec {
        SampleSpec::Random1Arg { range, .. } => {
            format!("range [{},{}]", g(range.start()), g(range.end()))
        }
        SampleSpec::Random2Arg {
            range_x, range_y, ..
        } => format!(
            "range x [{},{}] y [{},{}]",
            g(range_x.start()),
            g(range_x.end()),
            g(range_y.start()),
            g(range_y.end())
        ),
        SampleSpec::Random1ArgPlusInt {
            range_float,
            range_int,
            ..
        } => format!(
            "range [{},{}] n [{},{}]",
            g(range_float.start()),
            g(range_float.end()),
            range_int.start(),
            range_int.end()
        ),
        SampleSpec::FullEnumeration(full) => full.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulpcheck_core::{FullRange, IntRange, Range};

    #[test]
    fn test_general_matches_printf() {
        assert_eq!(fmt_general(0.0, 0, 6), "0");
        assert_eq!(fmt_general(0.5, 0, 6), "0.5");
        assert_eq!(fmt_general(1.0, 0, 6), "1");
        assert_eq!(fmt_general(9.0, 0, 6), "9");
        assert_eq!(fmt_general(1.5, 0, 6), "1.5");
        assert_eq!(fmt_general(100000.0, 0, 6), "100000");
        assert_eq!(fmt_general(1000000.0, 0, 6), "1e+06");
        assert_eq!(fmt_general(0.0001, 0, 6), "0.0001");
        assert_eq!(fmt_general(0.00001, 0, 6), "1e-05");
        assert_eq!(fmt_general(std::f64::consts::PI, 9, 2), "      3.1");
        assert_eq!(fmt_general(-std::f64::consts::PI, 9, 2), "     -3.1");
        assert_eq!(fmt_general(f64::from(f32::MAX), 9, 2), "  3.4e+38");
        assert_eq!(fmt_general(f64::from(f32::MIN_POSITIVE), 9, 2), "  1.2e-38");
        assert_eq!(fmt_general(99.0, 0, 2), "99");
        assert_eq!(fmt_general(99.7, 0, 2), "1e+02");
        assert_eq!(fmt_general(f64::INFINITY, 5, 2), "  inf");
    }

    #[test]
    fn test_segment_labels() {
        let r = Range::new(-1.0f32, 1.0).unwrap();
        let spec = SampleSpec::random_1arg(r, 10).unwrap();
        assert_eq!(segment_label(&spec), "range [       -1,        1]");
        let spec = SampleSpec::random_1arg_plus_int(r, IntRange::new(-4, 4).unwrap(), 10).unwrap();
        assert_eq!(segment_label(&spec), "range [       -1,        1] n [-4,4]");
        let spec: SampleSpec<f32> = SampleSpec::FullEnumeration(FullRange::positive_subnormal::<f32>());
        assert_eq!(segment_label(&spec), "positive subnormal (binary32)");
    }
}
