//! Ensure-present semantics for configured tools.

use std::sync::Arc;
use std::time::Instant;

use qgate_config::Tool;
use tracing::{debug, info, warn};

use crate::error::{GateError, Result};
use crate::report::{Reporter, format_elapsed};
use crate::shell::ShellRunner;

/// What happened to one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// The check command succeeded.
    AlreadyInstalled,
    /// The check failed and the install command succeeded.
    Installed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    pub name: String,
    pub status: ToolStatus,
}

/// Checks each tool and installs the missing ones, strictly in order.
pub struct ToolInstaller {
    shell: Arc<dyn ShellRunner>,
    reporter: Arc<dyn Reporter>,
}

impl ToolInstaller {
    pub fn new(shell: Arc<dyn ShellRunner>, reporter: Arc<dyn Reporter>) -> Self {
        Self { shell, reporter }
    }

    /// Make sure every tool is present.
    ///
    /// Stops at the first tool whose install command fails; the tools after
    /// it are neither checked nor installed.
    pub fn ensure_installed(&self, tools: &[Tool]) -> Result<Vec<ToolReport>> {
        let mut reports = Vec::with_capacity(tools.len());
        for tool in tools {
            let status = self.ensure_one(tool)?;
            reports.push(ToolReport {
                name: tool.name.clone(),
                status,
            });
        }
        Ok(reports)
    }

    fn ensure_one(&self, tool: &Tool) -> Result<ToolStatus> {
        self.reporter
            .start(&format!("Checking if {} is installed...", tool.name));
        let started = Instant::now();
        let check = self.shell.run(&tool.check_command);
        let elapsed = started.elapsed();
        self.reporter.stop();

        match check {
            Ok(out) if out.success() => {
                debug!(tool = %tool.name, "tool already installed");
                self.reporter.line(&format!(
                    "✅ {} is already installed ({})",
                    tool.name,
                    format_elapsed(elapsed)
                ));
                return Ok(ToolStatus::AlreadyInstalled);
            }
            Ok(out) => debug!(tool = %tool.name, status = %out.status_description(), "tool check failed"),
            Err(e) => debug!(tool = %tool.name, "tool check could not run: {}", e),
        }

        self.reporter.start(&format!("Installing {}...", tool.name));
        let started = Instant::now();
        let install = self.shell.run(&tool.install_command);
        let elapsed = started.elapsed();
        self.reporter.stop();

        match install {
            Ok(out) if out.success() => {
                info!(tool = %tool.name, "tool installed");
                self.reporter.line(&format!(
                    "✅ {} installed successfully ({})",
                    tool.name,
                    format_elapsed(elapsed)
                ));
                Ok(ToolStatus::Installed)
            }
            Ok(out) => {
                warn!(tool = %tool.name, status = %out.status_description(), "tool install failed");
                Err(GateError::ToolInstall {
                    tool: tool.name.clone(),
                    reason: out.status_description(),
                    output: out.output,
                })
            }
            Err(e) => {
                warn!(tool = %tool.name, "tool install could not run: {}", e);
                Err(GateError::ToolInstall {
                    tool: tool.name.clone(),
                    reason: e.to_string(),
                    output: String::new(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use crate::testing::MockShell;

    fn installer(shell: &Arc<MockShell>) -> (ToolInstaller, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::new());
        (ToolInstaller::new(shell.clone(), reporter.clone()), reporter)
    }

    #[test]
    fn test_present_tool_is_not_installed() {
        let shell = Arc::new(MockShell::new());
        let (installer, reporter) = installer(&shell);

        let reports = installer
            .ensure_installed(&[Tool::new("Black", "black --version", "pip install black")])
            .unwrap();

        assert_eq!(reports[0].status, ToolStatus::AlreadyInstalled);
        assert_eq!(shell.calls(), vec!["black --version"]);
        assert!(reporter.lines()[0].starts_with("✅ Black is already installed ("));
    }

    #[test]
    fn test_missing_tool_is_installed_once() {
        let shell = Arc::new(MockShell::new().with_response("ruff --version", "not found", 127));
        let (installer, reporter) = installer(&shell);

        let reports = installer
            .ensure_installed(&[Tool::new("Ruff", "ruff --version", "pip install ruff")])
            .unwrap();

        assert_eq!(reports[0].status, ToolStatus::Installed);
        assert_eq!(shell.calls(), vec!["ruff --version", "pip install ruff"]);
        assert!(reporter.lines()[0].starts_with("✅ Ruff installed successfully ("));
    }

    #[test]
    fn test_install_failure_stops_sequence() {
        let shell = Arc::new(
            MockShell::new()
                .with_response("a --version", "", 1)
                .with_response("install a", "E: package not found", 100),
        );
        let (installer, _) = installer(&shell);

        let err = installer
            .ensure_installed(&[
                Tool::new("A", "a --version", "install a"),
                Tool::new("B", "b --version", "install b"),
            ])
            .unwrap_err();

        match &err {
            GateError::ToolInstall {
                tool,
                reason,
                output,
            } => {
                assert_eq!(tool, "A");
                assert_eq!(reason, "exit status 100");
                assert_eq!(output, "E: package not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.output(), Some("E: package not found"));
        assert_eq!(shell.calls(), vec!["a --version", "install a"]);
    }

    #[test]
    fn test_check_that_cannot_run_triggers_install() {
        let shell = Arc::new(MockShell::new().with_spawn_error("x --version"));
        let (installer, _) = installer(&shell);

        let reports = installer
            .ensure_installed(&[Tool::new("X", "x --version", "install x")])
            .unwrap();
        assert_eq!(reports[0].status, ToolStatus::Installed);
    }
}
