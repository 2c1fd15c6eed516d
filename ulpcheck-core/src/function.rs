//! Description of a function under test, independent of how it is bound.

use crate::float::Width;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Argument shape of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// `f(x)`
    UnaryReal,
    /// `f(x, y)`
    BinaryReal,
    /// `f(x, n)` with integer `n`
    RealInteger,
}

impl Shape {
    /// Name used in listings and errors
    pub fn name(self) -> &'static str {
        match self {
            Shape::UnaryReal => "unary-real",
            Shape::BinaryReal => "binary-real",
            Shape::RealInteger => "real+integer",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which implementation of a function is put under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    /// The platform math library
    #[default]
    Library,
    /// The alternative implementation being certified
    Candidate,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Binding::Library => "library",
            Binding::Candidate => "candidate",
        })
    }
}

/// Name, shape and width of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionDescriptor {
    /// C-style name, e.g. `sinf`
    pub name: &'static str,
    /// Argument shape
    pub shape: Shape,
    /// Interchange format
    pub width: Width,
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.shape, self.width)
    }
}
