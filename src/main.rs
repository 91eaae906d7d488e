//! qgate - configuration-driven quality gate for git hooks
//!
//! ## Usage
//!
//! ```bash
//! # Create quality.yml for the current project
//! qgate --init
//!
//! # Install pre-commit and pre-push hooks into .git/hooks
//! qgate --install
//!
//! # Run the pre-commit checks
//! qgate pre-commit
//!
//! # Run the fix commands of the pre-commit hooks
//! qgate --fix pre-commit
//!
//! # Machine-readable results
//! qgate pre-push --output json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use qgate_config::{DEFAULT_CONFIG_FILE, load_config, validate_file};
use qgate_core::{LogGuard, QgateError, init_logging};
use qgate_init::{InitError, InitOptions, init, preview};
use qgate_runner::{
    ConsoleReporter, GateError, QualityGate, Reporter, RunReport, SystemShell, install_git_hooks,
};
use serde::Serialize;
use tracing::{error, info};

/// Configuration-driven quality gate for git hooks
///
/// Installs the tools a project needs, runs the checks registered for a
/// git hook type, and reports every result.
#[derive(Parser, Debug)]
#[command(name = "qgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Hook type to run (e.g. pre-commit, pre-push)
    hook_type: Option<String>,

    /// Run the fix commands of the hook type instead of its checks
    #[arg(long, requires = "hook_type")]
    fix: bool,

    /// Analyze the project and write a starter configuration
    #[arg(long, conflicts_with_all = ["hook_type", "install", "validate"])]
    init: bool,

    /// Overwrite an existing configuration file with --init
    #[arg(long, requires = "init")]
    force: bool,

    /// Print the configuration --init would write without writing it
    #[arg(long, requires = "init")]
    preview: bool,

    /// Install git hooks that call qgate
    #[arg(long, conflicts_with_all = ["hook_type", "validate"])]
    install: bool,

    /// Validate the configuration file and report findings
    #[arg(long, conflicts_with = "hook_type")]
    validate: bool,

    /// Also check that each tool's command is on PATH (with --validate)
    #[arg(long, requires = "validate")]
    check_tools: bool,

    /// Path to the configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Result format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Kill any single command still running after this many seconds
    #[arg(long, value_name = "SECS")]
    command_timeout: Option<u64>,

    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.qgate/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// The document printed for `--output json`.
#[derive(Serialize)]
struct JsonOutput<'a> {
    status: &'static str,
    #[serde(flatten)]
    report: &'a RunReport,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    let reporter: Arc<dyn Reporter> = match cli.output {
        OutputFormat::Text => Arc::new(ConsoleReporter::stdout()),
        OutputFormat::Json => Arc::new(ConsoleReporter::stderr()),
    };

    info!("Starting qgate");

    match run(&cli, reporter.clone()) {
        Ok(code) => code,
        Err(e) => {
            error!("qgate error: {:#}", e);
            reporter.line(&format!("Error: {e:#}"));
            if let Some(hint) = guidance(&e) {
                reporter.line(&format!("💡 {hint}"));
            }
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> qgate_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

fn run(cli: &Cli, reporter: Arc<dyn Reporter>) -> Result<ExitCode> {
    if cli.init {
        return run_init(cli, reporter.as_ref());
    }
    if cli.install {
        return run_install(reporter.as_ref());
    }
    if cli.validate {
        return run_validate(cli, reporter.as_ref());
    }

    let Some(hook_type) = cli.hook_type.as_deref() else {
        bail!("no hook type given (try `qgate pre-commit` or `qgate --help`)");
    };

    let config = load_config(&cli.config)?;
    let shell = SystemShell::new().with_timeout(cli.command_timeout.map(Duration::from_secs));
    let gate = QualityGate::new(Arc::new(shell), reporter.clone());

    if cli.fix {
        reporter.line("Fixing fixable issues...");
        let fixed = gate.fix(&config, hook_type);
        return match fixed {
            Ok(_) => {
                reporter.line("Fixable issues fixed successfully.");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Err(gate_failure(e, reporter.as_ref())),
        };
    }

    match gate.run(&config, hook_type) {
        Ok(report) => {
            match cli.output {
                OutputFormat::Json => print_json("success", &report)?,
                OutputFormat::Text => reporter.line("Quality gate passed successfully."),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(GateError::HooksFailed { report }) => {
            let failed = report.failed().count();
            reporter.line(&format!(
                "Quality gate failed: {failed} of {} hooks failed",
                report.results.len()
            ));
            if cli.output == OutputFormat::Json {
                print_json("failure", &report)?;
            }
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(gate_failure(e, reporter.as_ref())),
    }
}

fn run_init(cli: &Cli, reporter: &dyn Reporter) -> Result<ExitCode> {
    let root = std::env::current_dir().context("failed to read current directory")?;
    let options = InitOptions::new(&root)
        .with_output_path(&cli.config)
        .with_force(cli.force);

    if cli.preview {
        print!("{}", preview(&options)?);
        return Ok(ExitCode::SUCCESS);
    }

    reporter.line(&format!("Initializing {}...", cli.config.display()));
    let report = init(&options)?;
    let languages: Vec<&str> = report.structure.languages.iter().map(|l| l.as_str()).collect();
    if !languages.is_empty() {
        reporter.line(&format!("🔍 Detected languages: {}", languages.join(", ")));
    }
    reporter.line(&format!(
        "✅ {} {}",
        report.output_path.display(),
        if report.overwritten { "overwritten" } else { "created" }
    ));
    Ok(ExitCode::SUCCESS)
}

fn run_install(reporter: &dyn Reporter) -> Result<ExitCode> {
    reporter.line("Installing git hooks...");
    let root = std::env::current_dir().context("failed to read current directory")?;
    for path in install_git_hooks(&root)? {
        reporter.line(&format!("✅ {}", path.display()));
    }
    reporter.line("Git hooks installed successfully.");
    Ok(ExitCode::SUCCESS)
}

fn run_validate(cli: &Cli, reporter: &dyn Reporter) -> Result<ExitCode> {
    let result = validate_file(&cli.config, cli.check_tools);

    for line in result.formatted().lines() {
        reporter.line(line);
    }
    if result.valid {
        reporter.line(&format!("✅ {} is valid", cli.config.display()));
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Print the captured output attached to a failure before handing it back.
fn gate_failure(error: GateError, reporter: &dyn Reporter) -> anyhow::Error {
    if let Some(output) = error.output() {
        reporter.line(output.trim_end());
    }
    error.into()
}

fn print_json(status: &'static str, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonOutput { status, report })
        .context("failed to serialize results")?;
    println!("{json}");
    Ok(())
}

fn guidance(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| match cause.downcast_ref::<GateError>() {
            Some(GateError::Core(core)) => core.guidance(),
            Some(GateError::MissingFixCommand { .. }) => {
                Some("Add a fix_command to the hook, or run without --fix")
            }
            _ => match cause.downcast_ref::<InitError>() {
                Some(InitError::ConfigExists { .. }) => {
                    Some("Run with --preview to compare the generated file first")
                }
                _ => cause.downcast_ref::<QgateError>().and_then(QgateError::guidance),
            },
        })
}
