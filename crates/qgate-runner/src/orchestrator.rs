//! Sequencing of tool installation, hook runs, and fixes.

use std::sync::Arc;

use qgate_config::{Config, Hook};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{GateError, Result};
use crate::hooks::{ExecutionResult, HookRunner};
use crate::report::Reporter;
use crate::shell::ShellRunner;
use crate::tools::ToolInstaller;

/// Hook names git itself invokes. A hook type outside this list must be
/// declared in the configuration to be accepted.
pub const GIT_HOOK_TYPES: &[&str] = &[
    "applypatch-msg",
    "pre-applypatch",
    "post-applypatch",
    "pre-commit",
    "pre-merge-commit",
    "prepare-commit-msg",
    "commit-msg",
    "post-commit",
    "pre-rebase",
    "post-checkout",
    "post-merge",
    "pre-push",
    "post-rewrite",
    "pre-auto-gc",
];

/// Every hook result of one run, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub hook_type: String,
    pub results: Vec<ExecutionResult>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Every hook registered under `hook_type`, in group order then declaration
/// order within each group.
pub fn resolve_hooks(config: &Config, hook_type: &str) -> Vec<Hook> {
    config
        .hooks
        .iter()
        .flat_map(|group| group.hooks_for(hook_type))
        .cloned()
        .collect()
}

/// Runs a configuration's tools and hooks.
pub struct QualityGate {
    shell: Arc<dyn ShellRunner>,
    reporter: Arc<dyn Reporter>,
}

impl QualityGate {
    pub fn new(shell: Arc<dyn ShellRunner>, reporter: Arc<dyn Reporter>) -> Self {
        Self { shell, reporter }
    }

    fn installer(&self) -> ToolInstaller {
        ToolInstaller::new(self.shell.clone(), self.reporter.clone())
    }

    fn runner(&self) -> HookRunner {
        HookRunner::new(self.shell.clone(), self.reporter.clone())
    }

    /// Install missing tools, then run every hook for `hook_type`.
    ///
    /// All hooks run even after one fails; any failure turns the whole run
    /// into [`GateError::HooksFailed`], which still carries every result.
    #[instrument(skip(self, config))]
    pub fn run(&self, config: &Config, hook_type: &str) -> Result<RunReport> {
        check_hook_type(config, hook_type)?;

        self.installer().ensure_installed(&config.tools)?;

        let hooks = resolve_hooks(config, hook_type);
        info!(count = hooks.len(), "running hooks");
        let report = RunReport {
            hook_type: hook_type.to_string(),
            results: self.runner().run_all(&hooks),
        };

        if report.success() {
            info!("all hooks passed");
            Ok(report)
        } else {
            info!(failed = report.failed().count(), "hooks failed");
            Err(GateError::HooksFailed { report })
        }
    }

    /// Run the fix command of every fixable hook for `hook_type`.
    ///
    /// Stops at the first fix that fails. Returns the names of the hooks
    /// whose fixes ran.
    #[instrument(skip(self, config))]
    pub fn fix(&self, config: &Config, hook_type: &str) -> Result<Vec<String>> {
        check_hook_type(config, hook_type)?;

        let runner = self.runner();
        let mut fixed = Vec::new();
        for hook in resolve_hooks(config, hook_type)
            .iter()
            .filter(|hook| hook.fix().is_some())
        {
            runner.run_fix(hook)?;
            fixed.push(hook.name.clone());
        }

        info!(count = fixed.len(), "fix commands completed");
        Ok(fixed)
    }
}

fn check_hook_type(config: &Config, hook_type: &str) -> Result<()> {
    if GIT_HOOK_TYPES.contains(&hook_type) || config.hook_types().contains(&hook_type) {
        return Ok(());
    }
    Err(GateError::UnknownHookType {
        hook_type: hook_type.to_string(),
    })
}
