//! Configuration loading from ulpcheck.toml
//!
//! Defaults for a verification run can live in an `ulpcheck.toml` file. The
//! file is discovered by walking up from the current directory; command-line
//! flags override whatever it sets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use ulpcheck_core::{DEFAULT_MAX_ULP, DEFAULT_THRESHOLD};

/// Name of the configuration file looked up by [`UlpcheckConfig::discover`]
pub const CONFIG_FILE: &str = "ulpcheck.toml";

/// ulpcheck configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UlpcheckConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Accuracy check configuration
    #[serde(default)]
    pub check: CheckConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Worker pool and sampling setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Worker threads, 0 = all cores
    #[serde(default)]
    pub threads: usize,
    /// Master seed; drawn from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Bit patterns per full-enumeration work item
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    /// Show progress bars on stderr
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            seed: None,
            chunk_size: default_chunk_size(),
            progress: default_progress(),
        }
    }
}

fn default_chunk_size() -> u64 {
    65_536
}
fn default_progress() -> bool {
    true
}

/// What counts as a failure and what happens then
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Comma-separated rounding modes (`rndn,rndu,rndd,rndz` or `all`)
    #[serde(default = "default_rounding")]
    pub rounding: String,
    /// Failure policy: `none`, `first` or `all`
    #[serde(default = "default_fail")]
    pub fail: String,
    /// A sample fails at or above this many ULPs
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Recorded errors are clamped to this many ULPs
    #[serde(default = "default_max_ulp")]
    pub max_ulp: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            rounding: default_rounding(),
            fail: default_fail(),
            threshold: default_threshold(),
            max_ulp: default_max_ulp(),
        }
    }
}

fn default_rounding() -> String {
    "all".to_string()
}
fn default_fail() -> String {
    "none".to_string()
}
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_max_ulp() -> f64 {
    DEFAULT_MAX_ULP
}

/// Report output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: human, json, csv
    #[serde(default = "default_format")]
    pub format: String,
    /// Write the report here instead of stdout
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            file: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl UlpcheckConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), "ignoring configuration: {e}");
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# ulpcheck configuration

[runner]
# Worker threads (0 = all cores)
threads = 0
# Master seed for reproducible runs (uncomment to enable)
# seed = 42
# Bit patterns per work item when enumerating a full range
chunk_size = 65536
# Progress bars on stderr
progress = true

[check]
# Rounding modes to verify: rndn, rndu, rndd, rndz or all
rounding = "all"
# Failure policy: none, first or all
fail = "none"
# A sample fails at or above this many ULPs
threshold = 1.0
# Recorded errors are clamped to this many ULPs (>= threshold)
max_ulp = 9.0

[output]
# Default output format: human, json, csv
format = "human"
# Report file (uncomment to enable)
# file = "ulpcheck-report.json"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UlpcheckConfig::default();
        assert_eq!(config.runner.threads, 0);
        assert_eq!(config.runner.chunk_size, 65_536);
        assert!(config.runner.progress);
        assert_eq!(config.check.rounding, "all");
        assert_eq!(config.check.fail, "none");
        assert_eq!(config.check.max_ulp, 9.0);
        assert_eq!(config.check.threshold, 1.0);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            threads = 4
            seed = 7

            [check]
            rounding = "rndn,rndz"
            fail = "first"
        "#;

        let config: UlpcheckConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.threads, 4);
        assert_eq!(config.runner.seed, Some(7));
        assert_eq!(config.check.rounding, "rndn,rndz");
        assert_eq!(config.check.fail, "first");
        // Defaults should still apply
        assert_eq!(config.runner.chunk_size, 65_536);
        assert_eq!(config.output.format, "human");
        assert!(config.output.file.is_none());
    }

    #[test]
    fn test_default_toml_parses() {
        let config: UlpcheckConfig = toml::from_str(&UlpcheckConfig::default_toml()).unwrap();
        assert_eq!(config.runner.seed, None);
        assert_eq!(config.check.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.check.max_ulp, DEFAULT_MAX_ULP);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("ulpcheck-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, "[output]\nformat = \"json\"\n").unwrap();

        let config = UlpcheckConfig::load(&path).unwrap();
        assert_eq!(config.output.format, "json");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
