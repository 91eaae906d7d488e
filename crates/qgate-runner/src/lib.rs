//! Tool installation, hook execution, and orchestration for qgate.
//!
//! # Overview
//!
//! A run for one hook type goes through three stages:
//!
//! - Every configured tool is checked and, when missing, installed. The
//!   first failed install aborts the run.
//! - Every hook registered for the hook type runs in group order, then
//!   declaration order. A failing hook does not stop the others.
//! - The results are combined into a [`RunReport`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │     QualityGate      │
//! │    (run, fix)        │
//! └──────────┬───────────┘
//!            │
//!      ┌─────┴──────┐
//!      ▼            ▼
//! ┌──────────┐ ┌──────────┐
//! │  Tool    │ │  Hook    │
//! │Installer │ │ Runner   │
//! └────┬─────┘ └────┬─────┘
//!      └─────┬──────┘
//!            ▼
//! ┌──────────────────────┐
//! │ ShellRunner/Reporter │
//! └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use qgate_config::load_config;
//! use qgate_runner::{ConsoleReporter, QualityGate, SystemShell};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config(std::path::Path::new("quality.yml"))?;
//!     let gate = QualityGate::new(
//!         Arc::new(SystemShell::new()),
//!         Arc::new(ConsoleReporter::stdout()),
//!     );
//!
//!     let report = gate.run(&config, "pre-commit")?;
//!     println!("{} hooks passed", report.results.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod git_hooks;
pub mod hooks;
pub mod orchestrator;
pub mod report;
pub mod shell;
pub mod testing;
pub mod tools;

pub use error::{GateError, Result};
pub use git_hooks::{find_git_dir, install_git_hooks};
pub use hooks::{ExecutionResult, HookRunner, render_outcome};
pub use orchestrator::{GIT_HOOK_TYPES, QualityGate, RunReport, resolve_hooks};
pub use report::{ConsoleReporter, Reporter, elapsed_millis, format_elapsed};
pub use shell::{CommandOutput, ShellRunner, SystemShell};
pub use tools::{ToolInstaller, ToolReport, ToolStatus};
