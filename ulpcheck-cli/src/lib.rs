#![warn(missing_docs)]
//! ulpcheck CLI Library
//!
//! Command-line driver for the verifier: configuration layering, description
//! loading, catalog listing, and the parallel sampling engine that produces
//! the reports. Use `ulpcheck_cli::run()` from a binary's `main`.
//!
//! # Example
//!
//! ```text
//! $ ulpcheck --desc sinf.json --rnd rndn,rndz --fail first
//! Checking rounding mode FE_TONEAREST , range [    -3.1,     3.1], count 100000
//!     0:            99971 99.97%
//!     0.5:             29  0.03%
//! ```

mod config;
mod description;
mod error;
mod executor;
mod planner;

pub use config::*;
pub use description::{Description, DescriptionError};
pub use error::VerifyError;
pub use executor::{Orchestrator, ParallelSampler, SamplerOptions, SegmentOutcome};
pub use planner::{CatalogPlan, build_plan, parse_shape, parse_width};

use clap::{Parser, Subcommand};
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use ulpcheck_core::{
    Binding, FailMode, FailurePolicy, FloatFormat, HAS_ROUNDING_CONTROL, RoundingModeSet, Shape,
    Width,
};
use ulpcheck_funcs::{Bindings, FunctionDef, Kernel, REFERENCE_BACKEND, functions};
use ulpcheck_report::{
    NullSink, OutputFormat, ReportPrinter, RunReport, generate_csv_report, generate_json_report,
};

/// ulpcheck CLI arguments
#[derive(Parser, Debug)]
#[command(name = "ulpcheck")]
#[command(
    author,
    version,
    about = "ulpcheck - ULP accuracy of math functions across IEEE-754 rounding modes"
)]
pub struct Cli {
    /// Optional subcommand (Run, List, Config); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// JSON test description: function and input segments
    #[arg(short, long)]
    pub desc: Option<PathBuf>,

    /// Rounding modes: comma-separated rndn, rndu, rndd, rndz, or all
    #[arg(short, long)]
    pub rnd: Option<String>,

    /// Failure policy: none, first (stop at the first failure), all (report every failure)
    #[arg(short, long)]
    pub fail: Option<String>,

    /// Check the candidate implementation instead of the platform library
    #[arg(short, long)]
    pub candidate: bool,

    /// Worker threads (0 = all available cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Master seed for reproducible random sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// A sample fails at or above this many ULPs
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Clamp recorded ULP errors to this value
    #[arg(long)]
    pub max_ulp: Option<f64>,

    /// Bit patterns per work item when enumerating a full range
    #[arg(long)]
    pub chunk_size: Option<u64>,

    /// Output format: human, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify the function named by the description (default)
    Run,
    /// List catalogued functions
    List {
        /// Filter function names by regex pattern
        #[arg(default_value = ".*")]
        filter: String,
        /// Only functions of this format (binary32, binary64)
        #[arg(long, value_parser = parse_width)]
        width: Option<Width>,
        /// Only functions of this shape (unary-real, binary-real, real+integer)
        #[arg(long, value_parser = parse_shape)]
        shape: Option<Shape>,
    },
    /// Print a default ulpcheck.toml
    Config,
}

/// Effective settings after layering ulpcheck.toml and CLI flags
#[derive(Debug, Clone)]
pub struct Settings {
    /// Rounding modes to verify
    pub modes: RoundingModeSet,
    /// Failure policy and ULP clamp
    pub policy: FailurePolicy,
    /// Worker pool setup
    pub sampler: SamplerOptions,
    /// Report format
    pub format: OutputFormat,
    /// Report file
    pub output: Option<PathBuf>,
    /// Implementation under test
    pub binding: Binding,
}

impl Settings {
    /// Layer `cli` over `config`; flags win
    pub fn resolve(cli: &Cli, config: &UlpcheckConfig) -> anyhow::Result<Self> {
        let modes: RoundingModeSet = cli.rnd.as_deref().unwrap_or(&config.check.rounding).parse()?;
        let fail: FailMode = cli.fail.as_deref().unwrap_or(&config.check.fail).parse()?;
        let policy = FailurePolicy::new(
            fail,
            cli.threshold.unwrap_or(config.check.threshold),
            cli.max_ulp.unwrap_or(config.check.max_ulp),
        )?;
        let format: OutputFormat = cli
            .format
            .as_deref()
            .unwrap_or(&config.output.format)
            .parse()
            .map_err(anyhow::Error::msg)?;

        Ok(Self {
            modes,
            policy,
            sampler: SamplerOptions {
                threads: cli.threads.unwrap_or(config.runner.threads),
                seed: cli.seed.or(config.runner.seed),
                chunk_size: cli.chunk_size.unwrap_or(config.runner.chunk_size),
                progress: config.runner.progress && !cli.no_progress,
            },
            format,
            output: cli.output.clone().or_else(|| config.output.file.clone()),
            binding: if cli.candidate {
                Binding::Candidate
            } else {
                Binding::Library
            },
        })
    }
}

/// Run the ulpcheck CLI with the process arguments.
///
/// # Returns
/// `Ok(())` when the run completed (under `none` and `all` this includes runs
/// with failing samples), or the error that stopped it.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the ulpcheck CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    // Discover ulpcheck.toml configuration (CLI flags override)
    let config = UlpcheckConfig::discover().unwrap_or_default();

    match cli.command {
        Some(Commands::List {
            ref filter,
            width,
            shape,
        }) => list_functions(filter, width, shape),
        Some(Commands::Config) => {
            print!("{}", UlpcheckConfig::default_toml());
            Ok(())
        }
        Some(Commands::Run) | None => run_check(&cli, &config),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "ulpcheck=debug"
    } else {
        "ulpcheck=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Reports go to stdout; keep logs out of them
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn list_functions(filter: &str, width: Option<Width>, shape: Option<Shape>) -> anyhow::Result<()> {
    let filter_re = Regex::new(filter)?;
    let plan = build_plan(functions(), Some(&filter_re), width, shape);

    println!("ulpcheck catalog (reference: {}):", REFERENCE_BACKEND);

    let mut groups: std::collections::BTreeMap<Width, Vec<&FunctionDef>> =
        std::collections::BTreeMap::new();
    for &def in &plan.functions {
        groups.entry(def.width()).or_default().push(def);
    }

    for (width, defs) in &groups {
        println!("├── {}", width);
        for def in defs {
            let mut bindings = Vec::new();
            if def.provides(Binding::Library) {
                bindings.push("library");
            }
            if def.provides(Binding::Candidate) {
                bindings.push("candidate");
            }
            if def.has_reference() {
                bindings.push("reference");
            }
            println!(
                "│   ├── {:<10} {:<13} [{}]",
                def.name,
                def.shape.name(),
                bindings.join(", ")
            );
        }
    }

    println!("{} functions found.", plan.functions.len());
    Ok(())
}

fn run_check(cli: &Cli, config: &UlpcheckConfig) -> anyhow::Result<()> {
    let desc_path = cli
        .desc
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("--desc <FILE> is required to run a check"))?;
    let settings = Settings::resolve(cli, config)?;
    tracing::debug!(?settings, "resolved settings");

    let description = Description::load(desc_path)?;
    let def = description.function();

    if !HAS_ROUNDING_CONTROL {
        tracing::warn!(
            "no rounding-mode control on this platform: routines under test run in \
             round-to-nearest, only the reference follows the selected mode"
        );
    }

    let sampler = ParallelSampler::new(&settings.sampler, settings.policy)?;
    let report = match &def.kernel {
        Kernel::Binary32(bindings) => verify::<f32>(def, bindings, &description, &settings, &sampler)?,
        Kernel::Binary64(bindings) => verify::<f64>(def, bindings, &description, &settings, &sampler)?,
    };

    write_report(&report, &settings)?;

    if report.failures() > 0 {
        eprintln!(
            "\n{} sample(s) at or above {} ulp",
            report.failures(),
            settings.policy.threshold()
        );
    }
    Ok(())
}

/// Resolve `def` in format `F` and run it through every mode
fn verify<F>(
    def: &'static FunctionDef,
    bindings: &Bindings<F>,
    description: &Description,
    settings: &Settings,
    sampler: &ParallelSampler,
) -> Result<RunReport, VerifyError>
where
    F: FloatFormat + FromStr,
{
    let specs = description.specs::<F>()?;
    let routine = bindings.routine(def.name, settings.binding)?;
    let orchestrator = Orchestrator::new(sampler, &settings.modes);
    let meta = orchestrator.meta(def.descriptor(), settings.binding);

    match (settings.format, &settings.output) {
        (OutputFormat::Human, Some(path)) => {
            let file = std::io::BufWriter::new(std::fs::File::create(path)?);
            let mut printer = ReportPrinter::new(file);
            orchestrator.run(meta, &routine, &specs, &mut printer)
        }
        (OutputFormat::Human, None) => {
            let stdout = std::io::stdout();
            let mut printer = ReportPrinter::new(stdout.lock());
            orchestrator.run(meta, &routine, &specs, &mut printer)
        }
        _ => orchestrator.run(meta, &routine, &specs, &mut NullSink),
    }
}

fn write_report(report: &RunReport, settings: &Settings) -> anyhow::Result<()> {
    let output = match settings.format {
        OutputFormat::Human => {
            if let Some(ref path) = settings.output {
                println!("Report written to: {}", path.display());
            }
            return Ok(());
        }
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Csv => generate_csv_report(report),
    };

    if let Some(ref path) = settings.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ulpcheck").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_come_from_config() {
        let cli = parse(&["--desc", "sinf.json"]);
        let settings = Settings::resolve(&cli, &UlpcheckConfig::default()).unwrap();
        assert_eq!(settings.modes, RoundingModeSet::all());
        assert_eq!(settings.policy, FailurePolicy::default());
        assert_eq!(settings.format, OutputFormat::Human);
        assert_eq!(settings.binding, Binding::Library);
        assert_eq!(settings.sampler.chunk_size, 65_536);
        assert!(settings.sampler.progress);
        assert!(settings.output.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = UlpcheckConfig::default();
        config.check.fail = "all".to_string();
        config.runner.seed = Some(1);
        config.runner.threads = 8;

        let cli = parse(&[
            "-d", "x.json", "-r", "rndu,rndd", "-f", "first", "-c", "-j", "2", "--seed", "9",
            "--threshold", "0.5", "--max-ulp", "4", "--format", "json", "--no-progress",
        ]);
        let settings = Settings::resolve(&cli, &config).unwrap();
        assert_eq!(settings.modes.len(), 2);
        assert_eq!(settings.policy.mode(), FailMode::First);
        assert_eq!(settings.policy.threshold(), 0.5);
        assert_eq!(settings.policy.max_ulp(), 4.0);
        assert_eq!(settings.sampler.threads, 2);
        assert_eq!(settings.sampler.seed, Some(9));
        assert!(!settings.sampler.progress);
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.binding, Binding::Candidate);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let config = UlpcheckConfig::default();
        for args in [
            &["--rnd", "rndx"][..],
            &["--fail", "sometimes"],
            &["--threshold", "10"],
            &["--format", "xml"],
        ] {
            let cli = parse(args);
            assert!(Settings::resolve(&cli, &config).is_err(), "{args:?}");
        }
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = parse(&["list", "^sin", "--width", "binary32", "--shape", "unary-real"]);
        match cli.command {
            Some(Commands::List {
                filter,
                width,
                shape,
            }) => {
                assert_eq!(filter, "^sin");
                assert_eq!(width, Some(Width::Binary32));
                assert_eq!(shape, Some(Shape::UnaryReal));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(matches!(parse(&["config"]).command, Some(Commands::Config)));
        assert!(parse(&[]).command.is_none());
    }
}
