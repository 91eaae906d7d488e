//! End-to-end runs of a parsed configuration.

use std::sync::Arc;

use qgate_config::Config;
use qgate_runner::report::RecordingReporter;
use qgate_runner::testing::MockShell;
use qgate_runner::{GateError, QualityGate};

const CONFIG: &str = r#"
tools:
  - name: Black
    check_command: black --version
    install_command: pip install black
hooks:
  python-backend:
    pre-commit:
      - name: Format
        command: black --check .
        fix_command: black .
        output_rules:
          show_on: failure
          on_failure_message: "Run 'qgate --fix pre-commit' to format."
      - name: Lint
        command: ruff check .
        fix_command: ruff check --fix .
      - name: Tests
        command: pytest
        output_rules:
          show_on: always
  security:
    pre-commit:
      - name: Secrets
        command: gitleaks detect --no-git --source .
    pre-push:
      - name: Full suite
        command: pytest --slow
"#;

fn config() -> Config {
    Config::from_yaml_str(CONFIG).expect("valid config")
}

#[test]
fn test_installs_missing_tool_then_runs_every_hook() {
    let shell = Arc::new(
        MockShell::new()
            .with_response("black --version", "command not found", 127)
            .with_response("black --check .", "would reformat app.py", 1)
            .with_response("pytest", "3 passed", 0),
    );
    let reporter = Arc::new(RecordingReporter::new());
    let gate = QualityGate::new(shell.clone(), reporter.clone());

    let err = gate.run(&config(), "pre-commit").unwrap_err();

    assert_eq!(
        shell.calls(),
        vec![
            "black --version",
            "pip install black",
            "black --check .",
            "ruff check .",
            "pytest",
            "gitleaks detect --no-git --source .",
        ]
    );

    let GateError::HooksFailed { report } = err else {
        panic!("expected hook failure");
    };
    let outcomes: Vec<(&str, bool)> = report
        .results
        .iter()
        .map(|r| (r.hook.name.as_str(), r.success))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("Format", false),
            ("Lint", true),
            ("Tests", true),
            ("Secrets", true)
        ]
    );

    let lines = reporter.lines();
    assert!(lines.iter().any(|l| l == "Run 'qgate --fix pre-commit' to format."));
    assert!(lines.iter().any(|l| l == "would reformat app.py"));
    assert!(lines.iter().any(|l| l == "3 passed"));
}

#[test]
fn test_pre_push_runs_only_its_hooks() {
    let shell = Arc::new(MockShell::new());
    let gate = QualityGate::new(shell.clone(), Arc::new(RecordingReporter::new()));

    let report = gate.run(&config(), "pre-push").unwrap();

    assert_eq!(report.hook_type, "pre-push");
    assert_eq!(report.results.len(), 1);
    assert_eq!(shell.calls(), vec!["black --version", "pytest --slow"]);
}

#[test]
fn test_fix_stops_at_first_failure() {
    let shell = Arc::new(MockShell::new().with_response("black .", "error: cannot parse", 123));
    let gate = QualityGate::new(shell.clone(), Arc::new(RecordingReporter::new()));

    let err = gate.fix(&config(), "pre-commit").unwrap_err();

    assert!(matches!(err, GateError::FixFailed { ref hook, .. } if hook == "Format"));
    assert_eq!(err.output(), Some("error: cannot parse"));
    assert_eq!(shell.calls(), vec!["black ."]);
}

#[test]
fn test_fix_runs_every_fixable_hook_in_order() {
    let shell = Arc::new(MockShell::new());
    let gate = QualityGate::new(shell.clone(), Arc::new(RecordingReporter::new()));

    let fixed = gate.fix(&config(), "pre-commit").unwrap();

    assert_eq!(fixed, vec!["Format", "Lint"]);
    assert_eq!(shell.calls(), vec!["black .", "ruff check --fix ."]);
}

#[test]
fn test_report_serializes_to_json() {
    let shell = Arc::new(MockShell::new());
    let gate = QualityGate::new(shell, Arc::new(RecordingReporter::new()));

    let report = gate.run(&config(), "pre-push").unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["hook_type"], "pre-push");
    assert_eq!(value["results"][0]["hook"], "Full suite");
    assert_eq!(value["results"][0]["success"], true);
}

#[cfg(unix)]
#[test]
fn test_runs_real_commands_through_the_system_shell() {
    use qgate_runner::SystemShell;

    let config = Config::from_yaml_str(
        r#"
hooks:
  smoke:
    pre-commit:
      - name: Pass
        command: echo ok
      - name: Fail
        command: echo broken 1>&2; exit 2
        output_rules:
          show_on: failure
"#,
    )
    .unwrap();
    let reporter = Arc::new(RecordingReporter::new());
    let gate = QualityGate::new(
        Arc::new(SystemShell::new().with_shell("/bin/sh")),
        reporter.clone(),
    );

    let err = gate.run(&config, "pre-commit").unwrap_err();
    let report = err.report().expect("report");

    assert!(report.results[0].success);
    assert!(!report.results[1].success);
    assert_eq!(report.results[1].output, "broken\n");
    assert!(reporter.lines().contains(&"broken".to_string()));
}
