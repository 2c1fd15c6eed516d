//! Function Catalog
//!
//! Every testable function registers a `FunctionDef` through `inventory`.
//! A definition carries up to three bindings; any of them may be missing
//! (`std` has no `erf`, `libm` has no `rsqrt`, binary64 has no widened
//! reference), and asking for a missing one is a configuration error.

use crate::routine::{Candidate, Reference, Routine};
use thiserror::Error;
use ulpcheck_core::{Binding, FunctionDescriptor, Shape, Width};

/// Rounding encoding of the compiled-in reference backend
#[cfg(feature = "mpfr")]
pub type ReferenceRound = rug::float::Round;

/// Rounding encoding of the compiled-in reference backend
#[cfg(not(feature = "mpfr"))]
pub type ReferenceRound = crate::widened::Direction;

/// Name of the compiled-in reference backend
#[cfg(feature = "mpfr")]
pub const REFERENCE_BACKEND: &str = "mpfr";

/// Name of the compiled-in reference backend
#[cfg(not(feature = "mpfr"))]
pub const REFERENCE_BACKEND: &str = "widened-binary64";

/// Resolution failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No function with that name
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// The selected binding does not provide the function
    #[error("function '{name}' is not provided by the {binding} binding")]
    MissingBinding {
        /// Function name
        name: &'static str,
        /// Requested binding
        binding: Binding,
    },

    /// The compiled-in reference cannot evaluate the function
    #[error("function '{name}' has no reference in the {backend} backend")]
    MissingReference {
        /// Function name
        name: &'static str,
        /// Backend name
        backend: &'static str,
    },

    /// Binding and reference disagree on the argument shape
    #[error("function '{0}' binds a candidate and reference of different shapes")]
    ShapeMismatch(&'static str),
}

/// Implementations of one function in one format
#[derive(Debug, Clone, Copy)]
pub struct Bindings<F> {
    /// `std` binding
    pub library: Option<Candidate<F>>,
    /// `libm` binding
    pub candidate: Option<Candidate<F>>,
    /// Reference
    pub reference: Option<Reference<F, ReferenceRound>>,
}

/// Format-tagged bindings
#[derive(Debug, Clone, Copy)]
pub enum Kernel {
    /// binary32 bindings
    Binary32(Bindings<f32>),
    /// binary64 bindings
    Binary64(Bindings<f64>),
}

/// A catalogued function
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    /// C-style name
    pub name: &'static str,
    /// Argument shape
    pub shape: Shape,
    /// Bindings
    pub kernel: Kernel,
}

impl FunctionDef {
    /// Registration constructor
    pub const fn new(name: &'static str, shape: Shape, kernel: Kernel) -> Self {
        Self { name, shape, kernel }
    }

    /// Interchange format
    pub fn width(&self) -> Width {
        match self.kernel {
            Kernel::Binary32(_) => Width::Binary32,
            Kernel::Binary64(_) => Width::Binary64,
        }
    }

    /// Name, shape and width
    pub fn descriptor(&self) -> FunctionDescriptor {
        FunctionDescriptor {
            name: self.name,
            shape: self.shape,
            width: self.width(),
        }
    }

    /// Whether `binding` provides the function
    pub fn provides(&self, binding: Binding) -> bool {
        match &self.kernel {
            Kernel::Binary32(b) => b.select(binding).is_some(),
            Kernel::Binary64(b) => b.select(binding).is_some(),
        }
    }

    /// Whether the compiled-in reference covers the function
    pub fn has_reference(&self) -> bool {
        match &self.kernel {
            Kernel::Binary32(b) => b.reference.is_some(),
            Kernel::Binary64(b) => b.reference.is_some(),
        }
    }
}

impl<F: ulpcheck_core::FloatFormat> Bindings<F> {
    /// The candidate for `binding`, if provided
    pub fn select(&self, binding: Binding) -> Option<Candidate<F>> {
        match binding {
            Binding::Library => self.library,
            Binding::Candidate => self.candidate,
        }
    }

    /// Pair the selected binding with the reference
    pub fn routine(
        &self,
        name: &'static str,
        binding: Binding,
    ) -> Result<Routine<F, ReferenceRound>, CatalogError> {
        let candidate = self
            .select(binding)
            .ok_or(CatalogError::MissingBinding { name, binding })?;
        let reference = self.reference.ok_or(CatalogError::MissingReference {
            name,
            backend: REFERENCE_BACKEND,
        })?;
        Routine::pair(candidate, reference).ok_or(CatalogError::ShapeMismatch(name))
    }
}

/// All catalogued functions, sorted by name
pub fn functions() -> Vec<&'static FunctionDef> {
    let mut defs: Vec<_> = inventory::iter::<FunctionDef>.into_iter().collect();
    defs.sort_by_key(|d| d.name);
    defs
}

/// Look up a function by name
pub fn find_function(name: &str) -> Result<&'static FunctionDef, CatalogError> {
    inventory::iter::<FunctionDef>
        .into_iter()
        .find(|d| d.name == name)
        .ok_or_else(|| CatalogError::UnknownFunction(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulpcheck_core::{Inputs, RoundingMode};

    #[test]
    fn test_catalog_is_complete_and_unique() {
        let defs = functions();
        let names: Vec<_> = defs.iter().map(|d| d.name).collect();
        let mut unique = names.clone();
        unique.dedup();
        assert_eq!(names, unique, "duplicate registrations");
        // 37 unary + 3 binary + 3 real+integer, each in two widths
        assert_eq!(defs.len(), 86);
        for name in [
            "sinf", "sin", "atan2f", "pow", "ldexpf", "scalbn", "rsqrtf", "tgamma", "cospif",
            "atanpi", "exp10m1f", "log2p1",
        ] {
            assert!(names.contains(&name), "missing {name}");
        }
    }

    #[test]
    fn test_suffix_selects_width() {
        assert_eq!(find_function("expf").unwrap().width(), Width::Binary32);
        assert_eq!(find_function("exp").unwrap().width(), Width::Binary64);
        assert_eq!(find_function("hypotf").unwrap().shape, Shape::BinaryReal);
        assert_eq!(find_function("pownf").unwrap().shape, Shape::RealInteger);
        assert_eq!(
            find_function("sincos").unwrap_err(),
            CatalogError::UnknownFunction("sincos".into())
        );
    }

    #[test]
    fn test_missing_bindings() {
        let erf = find_function("erff").unwrap();
        assert!(!erf.provides(Binding::Library));
        assert!(erf.provides(Binding::Candidate));
        let Kernel::Binary32(bindings) = erf.kernel else {
            panic!("erff is binary32");
        };
        assert_eq!(
            bindings.routine(erf.name, Binding::Library).unwrap_err(),
            CatalogError::MissingBinding {
                name: "erff",
                binding: Binding::Library
            }
        );
    }

    #[test]
    fn test_binary32_routines_resolve() {
        for def in functions() {
            let Kernel::Binary32(bindings) = def.kernel else {
                continue;
            };
            assert!(def.has_reference(), "{} has no reference", def.name);
            for binding in [Binding::Library, Binding::Candidate] {
                if def.provides(binding) {
                    let routine = bindings.routine(def.name, binding).unwrap();
                    assert_eq!(routine.shape(), def.shape);
                }
            }
        }
    }

    #[test]
    fn test_sqrtf_library_is_correctly_rounded() {
        let def = find_function("sqrtf").unwrap();
        let Kernel::Binary32(bindings) = def.kernel else {
            panic!("sqrtf is binary32");
        };
        let routine = bindings.routine(def.name, Binding::Library).unwrap();
        for x in [0.0f32, 1.0, 2.0, 3.0, 1e-40, 123456.78] {
            let (computed, expected) = routine
                .evaluate(Inputs::Unary(x), RoundingMode::ToNearest)
                .unwrap();
            assert_eq!(computed, expected, "sqrtf({x})");
        }
    }

    #[test]
    fn test_half_revolution_and_m1_p1_families() {
        for name in ["cospif", "sinpif", "tanpif", "acospif", "asinpif", "atanpif"] {
            let def = find_function(name).unwrap();
            assert!(def.provides(Binding::Library), "{name}");
            assert!(!def.provides(Binding::Candidate), "{name}");
        }
        // (function, input, exact result)
        let exact = [
            ("cospif", 0.5f32, 0.0f32),
            ("sinpif", -2.5, -1.0),
            ("tanpif", 0.25, 1.0),
            ("acospif", -1.0, 1.0),
            ("asinpif", 1.0, 0.5),
            ("atanpif", 1.0, 0.25),
            ("exp2m1f", 1.0, 1.0),
            ("exp10m1f", 3.0, 999.0),
            ("log2p1f", 3.0, 2.0),
            ("log10p1f", 9.0, 1.0),
        ];
        for (name, x, y) in exact {
            let def = find_function(name).unwrap();
            let Kernel::Binary32(bindings) = def.kernel else {
                panic!("{name} is binary32");
            };
            let routine = bindings.routine(def.name, Binding::Library).unwrap();
            for mode in RoundingMode::ALL {
                let (_, expected) = routine.evaluate(Inputs::Unary(x), mode).unwrap();
                assert_eq!(expected, y, "{name}({x}) under {mode:?}");
            }
        }
    }

    #[cfg(not(feature = "mpfr"))]
    #[test]
    fn test_binary64_needs_mpfr() {
        let def = find_function("sin").unwrap();
        assert!(!def.has_reference());
        let Kernel::Binary64(bindings) = def.kernel else {
            panic!("sin is binary64");
        };
        assert!(matches!(
            bindings.routine(def.name, Binding::Library),
            Err(CatalogError::MissingReference { .. })
        ));
    }
}
