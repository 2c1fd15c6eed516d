//! Rounding Modes
//!
//! Two guards manage the floating-point environment:
//! - `RoundingGuard` switches the calling thread's hardware rounding mode and
//!   restores the previous one on drop.
//! - `ModeScope` is the process-level marker that one verification mode is
//!   active. Only one can exist at a time; worker threads take their own
//!   `RoundingGuard` for the scope's mode.
//!
//! The rounding mode is per-thread state (MXCSR / FPCR), so a guard is
//! neither `Send` nor `Sync`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

// ─── Modes ───────────────────────────────────────────────────────────────────

/// IEEE-754 rounding-direction attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Round to nearest, ties to even
    #[serde(rename = "rndn")]
    ToNearest,
    /// Round toward +∞
    #[serde(rename = "rndu")]
    Upward,
    /// Round toward −∞
    #[serde(rename = "rndd")]
    Downward,
    /// Round toward zero
    #[serde(rename = "rndz")]
    TowardZero,
}

impl RoundingMode {
    /// All modes in canonical order
    pub const ALL: [RoundingMode; 4] = [
        RoundingMode::ToNearest,
        RoundingMode::Upward,
        RoundingMode::Downward,
        RoundingMode::TowardZero,
    ];

    /// C `<fenv.h>` macro name, used in reports
    pub fn name(self) -> &'static str {
        match self {
            RoundingMode::ToNearest => "FE_TONEAREST",
            RoundingMode::Upward => "FE_UPWARD",
            RoundingMode::Downward => "FE_DOWNWARD",
            RoundingMode::TowardZero => "FE_TOWARDZERO",
        }
    }

    /// Short name accepted on the command line
    pub fn abbrev(self) -> &'static str {
        match self {
            RoundingMode::ToNearest => "rndn",
            RoundingMode::Upward => "rndu",
            RoundingMode::Downward => "rndd",
            RoundingMode::TowardZero => "rndz",
        }
    }

    /// Parse a short name
    pub fn from_abbrev(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.abbrev() == s)
    }

    fn to_register(self) -> u8 {
        self as u8 + 1
    }

    fn from_register(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw).checked_sub(1)?).copied()
    }

    fn fe_constant(self) -> libc::c_int {
        match self {
            RoundingMode::ToNearest => fe::TONEAREST,
            RoundingMode::Upward => fe::UPWARD,
            RoundingMode::Downward => fe::DOWNWARD,
            RoundingMode::TowardZero => fe::TOWARDZERO,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rounding-environment failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundingError {
    /// A second process-level scope was requested while one is live
    #[error("cannot enter {requested}: rounding mode {active} is already active")]
    AlreadyActive {
        /// Mode held by the live scope
        active: RoundingMode,
        /// Mode that was requested
        requested: RoundingMode,
    },

    /// The C library refused to switch mode
    #[error("fesetround rejected {0}")]
    Rejected(RoundingMode),
}

// ─── Platform ────────────────────────────────────────────────────────────────

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod fe {
    pub const TONEAREST: libc::c_int = 0x000;
    pub const DOWNWARD: libc::c_int = 0x400;
    pub const UPWARD: libc::c_int = 0x800;
    pub const TOWARDZERO: libc::c_int = 0xc00;
}

#[cfg(target_arch = "aarch64")]
mod fe {
    pub const TONEAREST: libc::c_int = 0x000000;
    pub const UPWARD: libc::c_int = 0x400000;
    pub const DOWNWARD: libc::c_int = 0x800000;
    pub const TOWARDZERO: libc::c_int = 0xc00000;
}

#[cfg(target_arch = "riscv64")]
mod fe {
    pub const TONEAREST: libc::c_int = 0;
    pub const TOWARDZERO: libc::c_int = 1;
    pub const DOWNWARD: libc::c_int = 2;
    pub const UPWARD: libc::c_int = 3;
}

#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "riscv64"
)))]
mod fe {
    pub const TONEAREST: libc::c_int = 0;
    pub const UPWARD: libc::c_int = 0;
    pub const DOWNWARD: libc::c_int = 0;
    pub const TOWARDZERO: libc::c_int = 0;
}

/// Whether the rounding mode can be switched on this platform.
pub const HAS_ROUNDING_CONTROL: bool = cfg!(all(
    unix,
    any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "riscv64"
    )
));

#[cfg(all(
    unix,
    any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "riscv64"
    )
))]
mod env {
    #[cfg_attr(target_os = "linux", link(name = "m"))]
    extern "C" {
        fn fegetround() -> libc::c_int;
        fn fesetround(round: libc::c_int) -> libc::c_int;
    }

    pub fn get() -> libc::c_int {
        // SAFETY: fegetround only reads the calling thread's FP control word.
        unsafe { fegetround() }
    }

    pub fn set(mode: libc::c_int) -> bool {
        // SAFETY: mode is one of the FE_* constants for this target.
        unsafe { fesetround(mode) == 0 }
    }
}

#[cfg(not(all(
    unix,
    any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "riscv64"
    )
)))]
mod env {
    pub fn get() -> libc::c_int {
        super::fe::TONEAREST
    }

    pub fn set(_mode: libc::c_int) -> bool {
        true
    }
}

// ─── Thread guard ────────────────────────────────────────────────────────────

/// Sets the calling thread's rounding mode; restores the previous mode on
/// drop.
#[derive(Debug)]
pub struct RoundingGuard {
    mode: RoundingMode,
    previous: libc::c_int,
    _thread_bound: PhantomData<*const ()>,
}

impl RoundingGuard {
    /// Switch this thread to `mode`
    pub fn enter(mode: RoundingMode) -> Result<Self, RoundingError> {
        let previous = env::get();
        if !env::set(mode.fe_constant()) {
            return Err(RoundingError::Rejected(mode));
        }
        Ok(Self {
            mode,
            previous,
            _thread_bound: PhantomData,
        })
    }

    /// Mode installed by this guard
    pub fn mode(&self) -> RoundingMode {
        self.mode
    }
}

impl Drop for RoundingGuard {
    fn drop(&mut self) {
        if !env::set(self.previous) {
            // Continuing would silently evaluate in the wrong mode
            tracing::error!(previous = self.previous, "failed to restore rounding mode");
            std::process::abort();
        }
    }
}

// ─── Process scope ───────────────────────────────────────────────────────────

const NO_MODE: u8 = 0;

static ACTIVE_MODE: AtomicU8 = AtomicU8::new(NO_MODE);

fn decode_register(raw: u8) -> Option<RoundingMode> {
    if raw == NO_MODE {
        return None;
    }
    match RoundingMode::from_register(raw) {
        Some(mode) => Some(mode),
        None => {
            tracing::error!(raw, "corrupt rounding-mode register");
            std::process::abort();
        }
    }
}

/// Process-wide "mode M is being verified" marker.
///
/// Holding a `ModeScope` also holds a `RoundingGuard` for the creating
/// thread. Samplers read `mode()` and install a guard on every worker.
#[derive(Debug)]
pub struct ModeScope {
    mode: RoundingMode,
    _guard: RoundingGuard,
}

impl ModeScope {
    /// Enter `mode`; fails if another scope is live
    pub fn enter(mode: RoundingMode) -> Result<Self, RoundingError> {
        ACTIVE_MODE
            .compare_exchange(NO_MODE, mode.to_register(), Ordering::AcqRel, Ordering::Acquire)
            .map_err(|raw| RoundingError::AlreadyActive {
                active: decode_register(raw).unwrap_or(mode),
                requested: mode,
            })?;

        match RoundingGuard::enter(mode) {
            Ok(guard) => {
                tracing::debug!(mode = %mode, "entered rounding scope");
                Ok(Self {
                    mode,
                    _guard: guard,
                })
            }
            Err(e) => {
                ACTIVE_MODE.store(NO_MODE, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Mode of this scope
    pub fn mode(&self) -> RoundingMode {
        self.mode
    }

    /// Mode of the live scope, if any
    pub fn active() -> Option<RoundingMode> {
        decode_register(ACTIVE_MODE.load(Ordering::Acquire))
    }
}

impl Drop for ModeScope {
    fn drop(&mut self) {
        ACTIVE_MODE.store(NO_MODE, Ordering::Release);
        tracing::debug!(mode = %self.mode, "left rounding scope");
    }
}
