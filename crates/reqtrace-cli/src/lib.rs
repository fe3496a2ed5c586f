//! reqtrace CLI
//!
//! Command definitions and the two run entry points behind the `reqtrace`
//! binary:
//! - `analyze`: scan, build the link graph, write matrices and reports
//! - `lint`: per-record format and schema diagnostics
//!
//! Runs write their plain-text output to a caller-supplied writer (stdout in
//! the binary) and return the process exit code. Diagnostics go through
//! `tracing` to stderr.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use reqtrace_core::CategoryFilter;
use reqtrace_report::{summary_text, write_missing_fields_csv, ReportEmitter};
use reqtrace_scan::{CancelToken, PatternSet, Pipeline, ScanConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Clean run
pub const EXIT_OK: i32 = 0;
/// Lint reported error findings
pub const EXIT_LINT_ISSUES: i32 = 1;
/// Bad usage, missing corpus or unwritable output
pub const EXIT_USAGE: i32 = 2;
/// Strict mode and broken links or orphans exist
pub const EXIT_STRICT_FAILURE: i32 = 3;
/// Run interrupted before the scan finished
pub const EXIT_CANCELLED: i32 = 130;

/// Default output directory for `analyze`
pub const DEFAULT_OUTPUT_DIR: &str = "artifacts/traceability";

/// Build the command tree
#[must_use]
pub fn command() -> Command {
    Command::new("reqtrace")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Requirements traceability matrices and record lint")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Raise log level (-v info, -vv debug); RUST_LOG overrides"),
        )
        .subcommand(
            Command::new("analyze")
                .about("Build traceability matrices and reports")
                .arg(reqs_dir_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .default_value(DEFAULT_OUTPUT_DIR)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory"),
                )
                .arg(
                    Arg::new("patterns-file")
                        .long("patterns-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with evidence patterns"),
                )
                .arg(
                    Arg::new("categories")
                        .long("categories")
                        .action(ArgAction::SetTrue)
                        .help("Write one matrix per category"),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .action(ArgAction::Append)
                        .help("Only tabulate this category (repeatable, implies --categories)"),
                )
                .arg(ignore_templates_arg())
                .arg(exclude_arg())
                .arg(
                    Arg::new("jobs")
                        .long("jobs")
                        .short('j')
                        .default_value("0")
                        .value_parser(value_parser!(usize))
                        .help("Worker threads (0 = available parallelism)"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Exit 3 when broken links or orphans exist"),
                ),
        )
        .subcommand(
            Command::new("lint")
                .about("Check record format and required fields")
                .arg(reqs_dir_arg())
                .arg(ignore_templates_arg())
                .arg(exclude_arg())
                .arg(
                    Arg::new("check-links")
                        .long("check-links")
                        .action(ArgAction::SetTrue)
                        .help("Also report links to identifiers defined nowhere"),
                )
                .arg(
                    Arg::new("missing-fields-csv")
                        .long("missing-fields-csv")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write missing required fields per file as CSV"),
                ),
        )
}

fn reqs_dir_arg() -> Arg {
    Arg::new("reqs_dir")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Root of the requirement records")
}

fn ignore_templates_arg() -> Arg {
    Arg::new("ignore-templates")
        .long("ignore-templates")
        .action(ArgAction::SetTrue)
        .help("Skip `templates` directories")
}

fn exclude_arg() -> Arg {
    Arg::new("exclude")
        .long("exclude")
        .action(ArgAction::Append)
        .help("Skip files or directories with this name (repeatable)")
}

fn reqs_dir(matches: &ArgMatches) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>("reqs_dir")
        .cloned()
        .context("missing <reqs_dir>")
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn scan_config(ignore_templates: bool, exclude: &[String], jobs: usize) -> ScanConfig {
    exclude.iter().fold(
        ScanConfig::new()
            .with_jobs(jobs)
            .with_ignore_templates(ignore_templates),
        |config, name| config.with_excluded_name(name.as_str()),
    )
}

/// Options of `reqtrace analyze`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeArgs {
    /// Corpus root
    pub reqs_dir: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Evidence pattern file
    pub patterns_file: Option<PathBuf>,
    /// Category mode
    pub categories: bool,
    /// Category names to tabulate; empty means all
    pub category: Vec<String>,
    /// Skip `templates` directories
    pub ignore_templates: bool,
    /// Extra excluded names
    pub exclude: Vec<String>,
    /// Worker count, 0 = auto
    pub jobs: usize,
    /// Fail on findings
    pub strict: bool,
}

impl AnalyzeArgs {
    /// Defaults for a corpus root
    #[must_use]
    pub fn new(reqs_dir: impl Into<PathBuf>) -> Self {
        Self {
            reqs_dir: reqs_dir.into(),
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            patterns_file: None,
            categories: false,
            category: Vec::new(),
            ignore_templates: false,
            exclude: Vec::new(),
            jobs: 0,
            strict: false,
        }
    }

    /// Read from parsed `analyze` matches
    ///
    /// # Errors
    /// - If `<reqs_dir>` is absent
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            reqs_dir: reqs_dir(matches)?,
            output: matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            patterns_file: matches.get_one::<PathBuf>("patterns-file").cloned(),
            categories: matches.get_flag("categories"),
            category: strings(matches, "category"),
            ignore_templates: matches.get_flag("ignore-templates"),
            exclude: strings(matches, "exclude"),
            jobs: matches.get_one::<usize>("jobs").copied().unwrap_or(0),
            strict: matches.get_flag("strict"),
        })
    }

    /// Scan configuration for these options
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        scan_config(self.ignore_templates, &self.exclude, self.jobs)
    }

    /// Category filter, if category mode is on
    #[must_use]
    pub fn category_filter(&self) -> Option<CategoryFilter> {
        (self.categories || !self.category.is_empty())
            .then(|| CategoryFilter::from_names(self.category.iter().cloned()))
    }
}

/// Options of `reqtrace lint`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintArgs {
    /// Corpus root
    pub reqs_dir: PathBuf,
    /// Skip `templates` directories
    pub ignore_templates: bool,
    /// Extra excluded names
    pub exclude: Vec<String>,
    /// Corpus-wide broken link check
    pub check_links: bool,
    /// Missing-fields CSV destination
    pub missing_fields_csv: Option<PathBuf>,
}

impl LintArgs {
    /// Defaults for a corpus root
    #[must_use]
    pub fn new(reqs_dir: impl Into<PathBuf>) -> Self {
        Self {
            reqs_dir: reqs_dir.into(),
            ignore_templates: false,
            exclude: Vec::new(),
            check_links: false,
            missing_fields_csv: None,
        }
    }

    /// Read from parsed `lint` matches
    ///
    /// # Errors
    /// - If `<reqs_dir>` is absent
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            reqs_dir: reqs_dir(matches)?,
            ignore_templates: matches.get_flag("ignore-templates"),
            exclude: strings(matches, "exclude"),
            check_links: matches.get_flag("check-links"),
            missing_fields_csv: matches.get_one::<PathBuf>("missing-fields-csv").cloned(),
        })
    }

    /// Scan configuration for these options
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        scan_config(self.ignore_templates, &self.exclude, 0)
    }
}

/// Run `analyze`, printing the count summary to `out`
///
/// A cancelled scan prints its summary but writes no reports.
///
/// # Errors
/// - Missing or non-directory corpus root
/// - Unknown category name
/// - Unwritable output directory
pub fn run_analyze(args: &AnalyzeArgs, cancel: CancelToken, out: &mut dyn Write) -> Result<i32> {
    let patterns = PatternSet::load_or_default(args.patterns_file.as_deref());
    let run = Pipeline::new(args.scan_config())
        .with_patterns(patterns)
        .with_cancel_token(cancel)
        .analyze(&args.reqs_dir)
        .with_context(|| format!("scanning {}", args.reqs_dir.display()))?;

    write!(out, "{}", summary_text(&run))?;

    if run.analysis.counts.skipped > 0 {
        tracing::warn!(skipped = run.analysis.counts.skipped, "scan cancelled, no reports written");
        return Ok(EXIT_CANCELLED);
    }

    let mut emitter = ReportEmitter::new(&args.output);
    if let Some(filter) = args.category_filter() {
        emitter = emitter.with_categories(filter);
    }
    let emitted = emitter
        .emit(&run)
        .with_context(|| format!("writing reports to {}", args.output.display()))?;
    writeln!(
        out,
        "Wrote {} file(s) to {}",
        emitted.files.len(),
        emitted.output_dir.display()
    )?;

    Ok(run.analysis.verdict(args.strict).exit_code())
}

/// Run `lint`, printing findings and a closing line to `out`
///
/// A cancelled scan reports nothing and writes no CSV.
///
/// # Errors
/// - Missing or non-directory corpus root
/// - Unwritable missing-fields CSV path
pub fn run_lint(args: &LintArgs, cancel: CancelToken, out: &mut dyn Write) -> Result<i32> {
    let report = Pipeline::new(args.scan_config())
        .with_cancel_token(cancel)
        .lint(&args.reqs_dir, args.check_links)
        .with_context(|| format!("linting {}", args.reqs_dir.display()))?;

    if report.tally.skipped > 0 {
        writeln!(
            out,
            "Cancelled: {} file(s) not linted",
            report.tally.skipped
        )?;
        tracing::warn!(skipped = report.tally.skipped, "lint cancelled");
        return Ok(EXIT_CANCELLED);
    }

    for finding in report.findings() {
        writeln!(out, "{finding}")?;
    }
    for failure in &report.failures {
        writeln!(out, "error [read-failure] {}: {}", failure.location, failure.error)?;
    }

    if let Some(path) = &args.missing_fields_csv {
        write_missing_fields_csv(path, &report)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let errors = report.error_count();
    let warnings = report.warning_count();
    if errors == 0 && warnings == 0 {
        writeln!(out, "OK: no issues found in {} file(s)", report.tally.discovered)?;
    } else {
        writeln!(
            out,
            "Found {errors} error(s) and {warnings} warning(s) in {} file(s)",
            report.tally.discovered
        )?;
    }

    Ok(if report.has_errors() {
        EXIT_LINT_ISSUES
    } else {
        EXIT_OK
    })
}

/// Install the stderr subscriber
///
/// `RUST_LOG` wins when set; otherwise `warn`, raised by `verbosity`.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
