//! Run configuration value objects: which modes to verify and what counts as
//! a failure.

use crate::error::ConfigError;
use crate::rounding::RoundingMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default failure threshold in ULPs
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Default clamp applied to recorded ULP errors
pub const DEFAULT_MAX_ULP: f64 = 9.0;

/// Ordered, duplicate-free, non-empty set of rounding modes.
///
/// Iteration always follows the canonical order rndn, rndu, rndd, rndz
/// regardless of how the set was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundingModeSet {
    modes: Vec<RoundingMode>,
}

impl RoundingModeSet {
    /// All four modes
    pub fn all() -> Self {
        Self {
            modes: RoundingMode::ALL.to_vec(),
        }
    }

    /// Build from any collection of modes
    pub fn from_modes(modes: impl IntoIterator<Item = RoundingMode>) -> Result<Self, ConfigError> {
        let mut modes: Vec<_> = modes.into_iter().collect();
        modes.sort();
        modes.dedup();
        if modes.is_empty() {
            return Err(ConfigError::EmptyRoundingSet);
        }
        Ok(Self { modes })
    }

    /// Modes in canonical order
    pub fn iter(&self) -> impl Iterator<Item = RoundingMode> + '_ {
        self.modes.iter().copied()
    }

    /// Number of selected modes
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Membership test
    pub fn contains(&self, mode: RoundingMode) -> bool {
        self.modes.contains(&mode)
    }
}

impl Default for RoundingModeSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for RoundingModeSet {
    type Err = ConfigError;

    /// Comma-separated abbreviations, or `all`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modes = Vec::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if token.eq_ignore_ascii_case("all") {
                modes.extend(RoundingMode::ALL);
                continue;
            }
            let mode = RoundingMode::from_abbrev(&token.to_ascii_lowercase())
                .ok_or_else(|| ConfigError::UnknownRoundingMode(token.to_string()))?;
            modes.push(mode);
        }
        Self::from_modes(modes)
    }
}

impl fmt::Display for RoundingModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.modes.iter().map(|m| m.abbrev()).collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for RoundingModeSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoundingModeSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What to do when a sample exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailMode {
    /// Report the histogram only
    #[default]
    None,
    /// Stop at the first failing sample
    First,
    /// Print every failing sample and continue
    All,
}

impl FromStr for FailMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(FailMode::None),
            "first" => Ok(FailMode::First),
            "all" => Ok(FailMode::All),
            _ => Err(ConfigError::UnknownFailMode(s.to_string())),
        }
    }
}

impl fmt::Display for FailMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailMode::None => "none",
            FailMode::First => "first",
            FailMode::All => "all",
        })
    }
}

/// Failure policy plus the ULP clamp it is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FailurePolicy {
    mode: FailMode,
    threshold: f64,
    max_ulp: f64,
}

impl FailurePolicy {
    /// Validate and build. The threshold must be positive and finite, and the
    /// clamp may not sit below it (a clamped error could never fail).
    pub fn new(mode: FailMode, threshold: f64, max_ulp: f64) -> Result<Self, ConfigError> {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        if !(max_ulp >= threshold) {
            return Err(ConfigError::ClampBelowThreshold { max_ulp, threshold });
        }
        Ok(Self {
            mode,
            threshold,
            max_ulp,
        })
    }

    /// Selected failure mode
    pub fn mode(&self) -> FailMode {
        self.mode
    }

    /// Samples at or above this many ULPs fail
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Recorded errors are clamped to this value
    pub fn max_ulp(&self) -> f64 {
        self.max_ulp
    }

    /// Whether failing samples are printed
    pub fn reports_failures(&self) -> bool {
        self.mode != FailMode::None
    }

    /// Whether a failure ends the run
    pub fn stops_on_failure(&self) -> bool {
        self.mode == FailMode::First
    }
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            mode: FailMode::None,
            threshold: DEFAULT_THRESHOLD,
            max_ulp: DEFAULT_MAX_ULP,
        }
    }
}
