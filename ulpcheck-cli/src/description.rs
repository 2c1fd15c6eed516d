//! Test Descriptions
//!
//! A description is a small JSON document naming one catalogued function and
//! the input segments to check it on:
//!
//! ```json
//! { "function": "sinf",
//!   "samples": [ { "x": ["-pi", "pi"], "count": 100000 } ],
//!   "full": "normal,subnormal" }
//! ```
//!
//! Loading happens in two steps. [`Description::parse`] checks the JSON and
//! resolves the function; [`Description::specs`] then turns every segment
//! into a validated [`SampleSpec`] of the function's format. Every error
//! names the field it came from, e.g. `samples[1].x`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use ulpcheck_core::{ConfigError, FloatFormat, FullRange, IntRange, Range, SampleSpec, Shape};
use ulpcheck_funcs::{CatalogError, FunctionDef, find_function};

/// Failure to load a description
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// File could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Description path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Not valid JSON, or not the expected layout
    #[error("invalid description: {0}")]
    Json(#[from] serde_json::Error),

    /// Function lookup failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A segment failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A bound that is neither a number nor a known token
    #[error("{field}: invalid bound '{value}'")]
    InvalidBound {
        /// Field path
        field: String,
        /// Offending text
        value: String,
    },

    /// A range with other than two bounds
    #[error("{field}: expected two bounds, found {found}")]
    BoundCount {
        /// Field path
        field: String,
        /// Number of bounds given
        found: usize,
    },

    /// An integer bound outside the range taken by the function
    #[error("{field}: integer bound {value} is outside [{}, {}]", i32::MIN, i32::MAX)]
    IntegerOutOfRange {
        /// Field path
        field: String,
        /// Offending bound
        value: String,
    },

    /// An unknown `full` keyword
    #[error("{field}: unknown full range '{name}' (expected normal or subnormal)")]
    UnknownFullRange {
        /// Field path
        field: String,
        /// Offending keyword
        name: String,
    },

    /// Neither `samples` nor `full` given
    #[error("description for '{0}' has no samples")]
    NoSamples(String),

    /// Specs requested in a format other than the function's
    #[error("function '{name}' is {expected}, not {requested}")]
    WidthMismatch {
        /// Function name
        name: &'static str,
        /// Function format
        expected: ulpcheck_core::Width,
        /// Requested format
        requested: ulpcheck_core::Width,
    },
}

// ─── JSON layout ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDescription {
    function: String,
    #[serde(default)]
    samples: Vec<RawSample>,
    #[serde(default)]
    full: Option<RawFull>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSample {
    x: Vec<Bound>,
    #[serde(default)]
    y: Option<Vec<Bound>>,
    count: u64,
}

/// Range bound as written: text (numbers or tokens) or a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Bound {
    Text(String),
    Integer(i64),
    Number(f64),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawFull {
    Keywords(String),
    Ranges(Vec<RawFullRange>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFullRange {
    name: String,
    start: Bits,
    end: Bits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Bits {
    Text(String),
    Integer(u64),
}

// ─── Description ─────────────────────────────────────────────────────────────

/// A parsed description bound to a catalogued function
#[derive(Debug, Clone)]
pub struct Description {
    function: &'static FunctionDef,
    samples: Vec<RawSample>,
    full: Option<RawFull>,
}

impl Description {
    /// Read and parse a description file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DescriptionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse a description from JSON text
    pub fn parse(json: &str) -> Result<Self, DescriptionError> {
        let raw: RawDescription = serde_json::from_str(json)?;
        let function = find_function(raw.function.trim())?;
        if raw.samples.is_empty() && raw.full.is_none() {
            return Err(DescriptionError::NoSamples(raw.function));
        }
        Ok(Self {
            function,
            samples: raw.samples,
            full: raw.full,
        })
    }

    /// The function under test
    pub fn function(&self) -> &'static FunctionDef {
        self.function
    }

    /// Validated segments in description order: random samples first, then
    /// full-enumeration intervals.
    pub fn specs<F>(&self) -> Result<Vec<SampleSpec<F>>, DescriptionError>
    where
        F: FloatFormat + FromStr,
    {
        let def = self.function;
        if F::WIDTH != def.width() {
            return Err(DescriptionError::WidthMismatch {
                name: def.name,
                expected: def.width(),
                requested: F::WIDTH,
            });
        }

        let mut specs = Vec::new();
        for (i, sample) in self.samples.iter().enumerate() {
            let spec = random_spec::<F>(def, sample, &format!("samples[{i}]"))?;
            tracing::debug!(function = def.name, kind = spec.kind(), "segment {i}: {spec:?}");
            specs.push(spec);
        }

        if let Some(full) = &self.full {
            for range in full_ranges::<F>(full)? {
                let spec = SampleSpec::FullEnumeration(range);
                spec.check_shape(def.name, def.shape)?;
                specs.push(spec);
            }
        }
        Ok(specs)
    }
}

fn random_spec<F>(
    def: &FunctionDef,
    sample: &RawSample,
    field: &str,
) -> Result<SampleSpec<F>, DescriptionError>
where
    F: FloatFormat + FromStr,
{
    let x_field = format!("{field}.x");
    let y_field = format!("{field}.y");
    let count_field = format!("{field}.count");
    let range_x = float_range::<F>(&sample.x, &x_field)?;

    let spec = match (&sample.y, def.shape) {
        (None, _) => SampleSpec::random_1arg(range_x, sample.count),
        (Some(y), Shape::RealInteger) => {
            let range_int = int_range(y, &y_field)?;
            SampleSpec::random_1arg_plus_int(range_x, range_int, sample.count)
        }
        (Some(y), _) => {
            let range_y = float_range::<F>(y, &y_field)?;
            SampleSpec::random_2arg(range_x, range_y, sample.count)
        }
    }
    .map_err(|e| e.in_field(&count_field))?;

    spec.check_shape(def.name, def.shape)?;
    Ok(spec)
}

fn bound_pair<'a>(bounds: &'a [Bound], field: &str) -> Result<(&'a Bound, &'a Bound), DescriptionError> {
    match bounds {
        [start, end] => Ok((start, end)),
        _ => Err(DescriptionError::BoundCount {
            field: field.to_string(),
            found: bounds.len(),
        }),
    }
}

fn float_range<F>(bounds: &[Bound], field: &str) -> Result<Range<F>, DescriptionError>
where
    F: FloatFormat + FromStr,
{
    let (start, end) = bound_pair(bounds, field)?;
    let start = float_bound::<F>(start, field)?;
    let end = float_bound::<F>(end, field)?;
    Ok(Range::new(start, end).map_err(|e| e.in_field(field))?)
}

fn float_bound<F>(bound: &Bound, field: &str) -> Result<F, DescriptionError>
where
    F: FloatFormat + FromStr,
{
    let invalid = |value: String| DescriptionError::InvalidBound {
        field: field.to_string(),
        value,
    };
    match bound {
        Bound::Text(text) => parse_float::<F>(text).ok_or_else(|| invalid(text.clone())),
        Bound::Integer(n) => n.to_string().parse::<F>().map_err(|_| invalid(n.to_string())),
        Bound::Number(v) => Ok(F::from_f64(*v)),
    }
}

/// Decimal number or one of the symbolic tokens
pub(crate) fn parse_float<F>(text: &str) -> Option<F>
where
    F: FloatFormat + FromStr,
{
    let text = text.trim();
    let value = match text {
        "pi" => F::PI,
        "-pi" => F::ZERO - F::PI,
        "2pi" => F::from_f64(2.0 * F::PI.to_f64()),
        "min" => F::MIN_POSITIVE,
        "-min" => F::ZERO - F::MIN_POSITIVE,
        "max" => F::MAX,
        "-max" => F::ZERO - F::MAX,
        _ => text.parse::<F>().ok()?,
    };
    Some(value)
}

fn int_range(bounds: &[Bound], field: &str) -> Result<IntRange, DescriptionError> {
    let (start, end) = bound_pair(bounds, field)?;
    let start = int_bound(start, field)?;
    let end = int_bound(end, field)?;
    Ok(IntRange::new(start, end).map_err(|e| e.in_field(field))?)
}

fn int_bound(bound: &Bound, field: &str) -> Result<i64, DescriptionError> {
    let (value, text) = match bound {
        Bound::Integer(n) => (Some(*n), n.to_string()),
        Bound::Text(text) => (text.trim().parse::<i64>().ok(), text.clone()),
        Bound::Number(v) => (None, v.to_string()),
    };
    let value = value.ok_or_else(|| DescriptionError::InvalidBound {
        field: field.to_string(),
        value: text.clone(),
    })?;
    if i32::try_from(value).is_err() {
        return Err(DescriptionError::IntegerOutOfRange {
            field: field.to_string(),
            value: text,
        });
    }
    Ok(value)
}

fn full_ranges<F: FloatFormat>(full: &RawFull) -> Result<Vec<FullRange>, DescriptionError> {
    let mut ranges = Vec::new();
    match full {
        RawFull::Keywords(keywords) => {
            for (i, keyword) in keywords.split(',').map(str::trim).enumerate() {
                match keyword {
                    "normal" => {
                        ranges.push(FullRange::positive_normal::<F>());
                        ranges.push(FullRange::negative_normal::<F>());
                    }
                    "subnormal" => {
                        ranges.push(FullRange::positive_subnormal::<F>());
                        ranges.push(FullRange::negative_subnormal::<F>());
                    }
                    other => {
                        return Err(DescriptionError::UnknownFullRange {
                            field: format!("full[{i}]"),
                            name: other.to_string(),
                        });
                    }
                }
            }
        }
        RawFull::Ranges(explicit) => {
            for (i, range) in explicit.iter().enumerate() {
                let field = format!("full[{i}]");
                let start = bit_pattern(&range.start, &format!("{field}.start"))?;
                let end = bit_pattern(&range.end, &format!("{field}.end"))?;
                ranges.push(FullRange::new(range.name.clone(), start, end, F::WIDTH)?);
            }
        }
    }
    Ok(ranges)
}

fn bit_pattern(bits: &Bits, field: &str) -> Result<u64, DescriptionError> {
    match bits {
        Bits::Integer(n) => Ok(*n),
        Bits::Text(text) => {
            let trimmed = text.trim();
            let parsed = match trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
            {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => trimmed.parse::<u64>(),
            };
            parsed.map_err(|_| DescriptionError::InvalidBound {
                field: field.to_string(),
                value: text.clone(),
            })
        }
    }
}
