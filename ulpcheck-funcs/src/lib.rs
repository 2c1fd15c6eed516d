#![warn(missing_docs)]
//! ulpcheck Functions - Routines and Oracles
//!
//! Binds every catalogued math function to the implementations that can be
//! put under test and to a reference that computes the correctly rounded
//! result for a requested rounding mode:
//! - Library binding: Rust `std` float methods, or their naive composition
//!   where `std` has no method
//! - Candidate binding: the `libm` crate
//! - Reference: MPFR through `rug` (feature `mpfr`), otherwise a widened
//!   binary64 evaluation rounded to binary32 in software
//!
//! ```text
//! FunctionDef ──▶ Bindings<F> ──▶ Routine<F, R>
//!                                   ├─ candidate: fn(F, ..) -> F
//!                                   └─ OracleAdapter: RoundingMode ──encode──▶ R
//! ```

mod adapter;
mod catalog;
mod functions;
#[cfg(not(feature = "mpfr"))]
mod kernels;
#[cfg(feature = "mpfr")]
mod mpfr;
mod routine;
pub mod widened;

pub use adapter::{OracleAdapter, ReferenceFormat, RoundingEncoding, setup_reference};
pub use catalog::{
    Bindings, CatalogError, FunctionDef, Kernel, REFERENCE_BACKEND, ReferenceRound, find_function,
    functions,
};
pub use routine::{Candidate, Reference, Routine, saturate_i32};

inventory::collect!(FunctionDef);

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || {
    for _ in inventory::iter::<FunctionDef> {}
};
