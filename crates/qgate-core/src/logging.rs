//! Logging infrastructure for qgate.
//!
//! Structured logging using the `tracing` ecosystem. qgate keeps its own
//! diagnostic log separate from the hook output it prints, so a failing
//! pre-commit run leaves a trace in `~/.qgate/logs/` without cluttering the
//! terminal.
//!
//! ## Features
//!
//! - JSON lines format for machine parsing
//! - File output to `~/.qgate/logs/qgate.log`
//! - Console output to stderr, warnings only unless `--verbose`
//!
//! ## Example
//!
//! ```no_run
//! use qgate_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//! tracing::info!("qgate started");
//! tracing::debug!(hook_type = "pre-commit", "resolving hooks");
//! ```

use std::path::PathBuf;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{QgateError, Result};

/// Guard that must be held to ensure log flushing on shutdown.
///
/// When this guard is dropped, it flushes any pending log entries.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the qgate logging system.
///
/// This sets up:
/// - File logging to `<log_dir>/qgate.log` (JSON lines, daily rotation)
/// - Console logging to stderr (compact, human-readable)
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.qgate/logs/`
/// * `verbose` - If true, the file log records DEBUG and the console shows INFO.
///   Otherwise the file records INFO and the console only shows warnings.
///
/// `RUST_LOG` overrides the file filter when set.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| QgateError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "qgate.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("qgate={default_level}")));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(env_filter);

    let console_level = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_filter(console_level);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| QgateError::LoggingInit {
            message: e.to_string(),
        })?;

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the default log directory path.
///
/// Returns `~/.qgate/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| QgateError::Internal {
        message: "home directory could not be determined".into(),
    })?;

    Ok(log_dir_under(home))
}

fn log_dir_under(home: PathBuf) -> PathBuf {
    home.join(".qgate").join("logs")
}
