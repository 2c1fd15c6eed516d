//! Catalog Planner
//!
//! Selects catalogued functions for listing.
//!
//! Filtering options:
//! - Regex pattern matching on the function name
//! - Interchange format (`binary32` / `binary64`)
//! - Argument shape
//!
//! Ordering: functions are sorted alphabetically by name.

use regex::Regex;
use ulpcheck_core::{Shape, Width};
use ulpcheck_funcs::FunctionDef;

/// Functions selected for listing
pub struct CatalogPlan {
    /// Ordered list of functions
    pub functions: Vec<&'static FunctionDef>,
}

/// Filter and order catalogued functions
pub fn build_plan(
    functions: impl IntoIterator<Item = &'static FunctionDef>,
    filter: Option<&Regex>,
    width: Option<Width>,
    shape: Option<Shape>,
) -> CatalogPlan {
    let mut selected: Vec<_> = functions
        .into_iter()
        .filter(|f| filter.map_or(true, |re| re.is_match(f.name)))
        .filter(|f| width.map_or(true, |w| f.width() == w))
        .filter(|f| shape.map_or(true, |s| f.shape == s))
        .collect();

    selected.sort_by_key(|f| f.name);

    CatalogPlan {
        functions: selected,
    }
}

/// Parse `binary32`/`binary64` (also `f32`/`f64`)
pub fn parse_width(s: &str) -> Result<Width, String> {
    match s.to_lowercase().as_str() {
        "binary32" | "f32" | "float" => Ok(Width::Binary32),
        "binary64" | "f64" | "double" => Ok(Width::Binary64),
        other => Err(format!("Unknown width: {}", other)),
    }
}

/// Parse a shape name as printed by `list`
pub fn parse_shape(s: &str) -> Result<Shape, String> {
    match s.to_lowercase().as_str() {
        "unary-real" | "unary" => Ok(Shape::UnaryReal),
        "binary-real" | "binary" => Ok(Shape::BinaryReal),
        "real+integer" | "real-integer" | "int" => Ok(Shape::RealInteger),
        other => Err(format!("Unknown shape: {}", other)),
    }
}
