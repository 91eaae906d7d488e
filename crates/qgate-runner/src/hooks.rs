//! Hook execution and the output display policy.

use std::sync::Arc;
use std::time::{Duration, Instant};

use qgate_config::{Hook, ShowOn};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{GateError, Result};
use crate::report::{Reporter, elapsed_millis, format_elapsed};
use crate::shell::ShellRunner;

/// Outcome of running one hook. Produced once, never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub hook: Hook,
    pub success: bool,
    /// Combined stdout and stderr, or the reason the command could not run.
    pub output: String,
    pub duration: Duration,
}

impl Serialize for ExecutionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExecutionResult", 5)?;
        state.serialize_field("hook", &self.hook.name)?;
        state.serialize_field("success", &self.success)?;
        state.serialize_field("output", &self.output)?;
        state.serialize_field("duration_ms", &elapsed_millis(self.duration))?;
        state.serialize_field("duration", &format_elapsed(self.duration))?;
        state.end()
    }
}

/// Lines shown for a finished hook.
///
/// Failure: marker, then the failure message if set, then the output when
/// `show_on` is `failure` or `always`. Success: marker, then the output only
/// when `show_on` is `always`.
pub fn render_outcome(result: &ExecutionResult) -> Vec<String> {
    let hook = &result.hook;
    let elapsed = format_elapsed(result.duration);
    let show_on = hook.show_on();
    let output = result.output.trim_end();

    let mut lines = Vec::new();
    if result.success {
        lines.push(format!("✅ {} passed ({elapsed})", hook.name));
        if show_on == Some(ShowOn::Always) && !output.is_empty() {
            lines.push(output.to_string());
        }
    } else {
        lines.push(format!("❌ {} failed ({elapsed})", hook.name));
        if let Some(message) = hook.failure_message() {
            lines.push(message.to_string());
        }
        if matches!(show_on, Some(ShowOn::Failure | ShowOn::Always)) && !output.is_empty() {
            lines.push(output.to_string());
        }
    }
    lines
}

/// Runs hooks one after another through the shell.
pub struct HookRunner {
    shell: Arc<dyn ShellRunner>,
    reporter: Arc<dyn Reporter>,
}

impl HookRunner {
    pub fn new(shell: Arc<dyn ShellRunner>, reporter: Arc<dyn Reporter>) -> Self {
        Self { shell, reporter }
    }

    /// Run every hook in order and return one result per hook.
    ///
    /// A failing hook does not stop the ones after it.
    pub fn run_all(&self, hooks: &[Hook]) -> Vec<ExecutionResult> {
        hooks.iter().map(|hook| self.run_one(hook)).collect()
    }

    fn run_one(&self, hook: &Hook) -> ExecutionResult {
        self.reporter.start(&format!("Running {}...", hook.name));
        let started = Instant::now();
        let outcome = self.shell.run(&hook.command);
        let duration = started.elapsed();
        self.reporter.stop();

        let (success, output) = match outcome {
            Ok(out) => (out.success(), out.output),
            Err(e) => {
                warn!(hook = %hook.name, "hook command could not run: {}", e);
                (false, e.to_string())
            }
        };
        debug!(hook = %hook.name, success, ?duration, "hook finished");

        let result = ExecutionResult {
            hook: hook.clone(),
            success,
            output,
            duration,
        };
        for line in render_outcome(&result) {
            self.reporter.line(&line);
        }
        result
    }

    /// Run the hook's fix command and return its output.
    ///
    /// A hook without a fix command is a usage error.
    pub fn run_fix(&self, hook: &Hook) -> Result<String> {
        let fix = hook.fix().ok_or_else(|| GateError::MissingFixCommand {
            hook: hook.name.clone(),
        })?;

        self.reporter
            .start(&format!("Running fix command for {}...", hook.name));
        let outcome = self.shell.run(fix);
        self.reporter.stop();

        match outcome {
            Ok(out) if out.success() => {
                self.reporter
                    .line(&format!("🔧 Fix command for {} completed.", hook.name));
                Ok(out.output)
            }
            Ok(out) => Err(GateError::FixFailed {
                hook: hook.name.clone(),
                reason: out.status_description(),
                output: out.output,
            }),
            Err(e) => Err(GateError::FixFailed {
                hook: hook.name.clone(),
                reason: e.to_string(),
                output: String::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{RecordingReporter, ReportEvent};
    use crate::testing::MockShell;

    fn runner(shell: MockShell) -> (HookRunner, Arc<MockShell>, Arc<RecordingReporter>) {
        let shell = Arc::new(shell);
        let reporter = Arc::new(RecordingReporter::new());
        (
            HookRunner::new(shell.clone(), reporter.clone()),
            shell,
            reporter,
        )
    }

    fn result(hook: Hook, success: bool, output: &str) -> ExecutionResult {
        ExecutionResult {
            hook,
            success,
            output: output.to_string(),
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_render_failure_with_message_and_output() {
        let hook = Hook::new("Lint", "eslint .")
            .with_show_on(ShowOn::Failure)
            .with_failure_message("Fix lint errors first");
        let lines = render_outcome(&result(hook, false, "3 problems\n"));
        assert_eq!(
            lines,
            vec!["❌ Lint failed (12ms)", "Fix lint errors first", "3 problems"]
        );
    }

    #[test]
    fn test_render_failure_without_policy_is_marker_only() {
        let lines = render_outcome(&result(Hook::new("Lint", "eslint ."), false, "boom"));
        assert_eq!(lines, vec!["❌ Lint failed (12ms)"]);
    }

    #[test]
    fn test_render_success_output_only_for_always() {
        let always = Hook::new("Tests", "cargo test").with_show_on(ShowOn::Always);
        assert_eq!(
            render_outcome(&result(always, true, "ok\n")),
            vec!["✅ Tests passed (12ms)", "ok"]
        );

        let failure = Hook::new("Tests", "cargo test").with_show_on(ShowOn::Failure);
        assert_eq!(
            render_outcome(&result(failure, true, "ok\n")),
            vec!["✅ Tests passed (12ms)"]
        );

        let success = Hook::new("Tests", "cargo test").with_show_on(ShowOn::Success);
        assert_eq!(
            render_outcome(&result(success, true, "ok\n")),
            vec!["✅ Tests passed (12ms)"]
        );
    }

    #[test]
    fn test_run_all_returns_one_result_per_hook_in_order() {
        let (runner, shell, _) = runner(
            MockShell::new()
                .with_response("first", "", 1)
                .with_spawn_error("second"),
        );
        let hooks = vec![
            Hook::new("First", "first"),
            Hook::new("Second", "second"),
            Hook::new("Third", "third"),
        ];

        let results = runner.run_all(&hooks);

        let names: Vec<&str> = results.iter().map(|r| r.hook.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
        let outcomes: Vec<bool> = results.iter().map(|r| r.success).collect();
        assert_eq!(outcomes, vec![false, false, true]);
        assert!(results[1].output.contains("second"));
        assert_eq!(shell.calls(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failed_hook_surfaces_output() {
        let (runner, _, reporter) = runner(
            MockShell::new().with_response("pytest", "FAILED test_api.py::test_get", 1),
        );
        let hook = Hook::new("Tests", "pytest").with_show_on(ShowOn::Failure);

        let results = runner.run_all(&[hook]);
        assert!(!results[0].success);
        assert_eq!(results[0].output, "FAILED test_api.py::test_get");

        let events = reporter.events();
        assert_eq!(events[0], ReportEvent::Start("Running Tests...".into()));
        assert_eq!(events[1], ReportEvent::Stop);
        assert!(reporter.lines().contains(&"FAILED test_api.py::test_get".to_string()));
    }

    #[test]
    fn test_run_fix_requires_fix_command() {
        let (runner, shell, _) = runner(MockShell::new());
        let err = runner.run_fix(&Hook::new("Lint", "eslint .")).unwrap_err();
        assert!(matches!(err, GateError::MissingFixCommand { ref hook } if hook == "Lint"));
        assert!(shell.calls().is_empty());
    }

    #[test]
    fn test_run_fix_reports_failure() {
        let (runner, _, _) = runner(MockShell::new().with_response("black .", "cannot format", 123));
        let hook = Hook::new("Format", "black --check .").with_fix_command("black .");

        let err = runner.run_fix(&hook).unwrap_err();
        assert!(matches!(err, GateError::FixFailed { ref hook, .. } if hook == "Format"));
        assert_eq!(err.output(), Some("cannot format"));
    }

    #[test]
    fn test_run_fix_success() {
        let (runner, shell, reporter) = runner(MockShell::new().with_response("cargo fmt", "", 0));
        let hook = Hook::new("Format", "cargo fmt -- --check").with_fix_command("cargo fmt");

        runner.run_fix(&hook).unwrap();
        assert_eq!(shell.calls(), vec!["cargo fmt"]);
        assert_eq!(reporter.lines(), vec!["🔧 Fix command for Format completed."]);
    }

    #[test]
    fn test_execution_result_json() {
        let value = serde_json::to_value(result(Hook::new("Lint", "eslint ."), true, "clean")).unwrap();
        assert_eq!(value["hook"], "Lint");
        assert_eq!(value["success"], true);
        assert_eq!(value["output"], "clean");
        assert_eq!(value["duration_ms"], 12);
        assert_eq!(value["duration"], "12ms");
    }

    #[test]
    fn test_json_durations_agree_when_rounding_up() {
        let mut result = result(Hook::new("Lint", "eslint ."), true, "clean");
        result.duration = Duration::from_micros(12_600);

        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["duration_ms"], 13);
        assert_eq!(value["duration"], "13ms");
    }
}
