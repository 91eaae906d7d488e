//! Generated documents must load and validate cleanly.

use std::fs;

use qgate_config::{Config, ConfigValidator, Severity};
use qgate_init::{Framework, InitOptions, Language, ProjectStructure, generate_config, init};
use tempfile::TempDir;

fn every_stack() -> ProjectStructure {
    let mut structure = ProjectStructure::with_languages([
        Language::Go,
        Language::Node,
        Language::Python,
        Language::Rust,
        Language::Php,
        Language::Java,
        Language::Docker,
        Language::TypeScript,
    ]);
    for framework in [
        Framework::React,
        Framework::Vue,
        Framework::Angular,
        Framework::Django,
        Framework::FastApi,
        Framework::Flask,
        Framework::Laravel,
    ] {
        structure.add_framework(framework);
    }
    structure
}

#[test]
fn test_generated_config_parses_and_validates() {
    let yaml = generate_config(&every_stack());
    let config = Config::from_yaml_str(&yaml).expect("generated YAML parses");

    let result = ConfigValidator::new(&config).validate();
    assert!(result.valid, "{}", result.formatted());
    assert_eq!(result.count(Severity::Error), 0);
    assert_eq!(result.count(Severity::Critical), 0);
}

#[test]
fn test_generated_config_has_no_cross_reference_gaps() {
    let yaml = generate_config(&every_stack());
    let config = Config::from_yaml_str(&yaml).unwrap();

    let result = ConfigValidator::new(&config).validate();
    assert!(result.errors.is_empty(), "{}", result.formatted());
}

#[test]
fn test_generated_groups_follow_detection_order() {
    let structure =
        ProjectStructure::with_languages([Language::Rust, Language::Go, Language::Python]);
    let config = Config::from_yaml_str(&generate_config(&structure)).unwrap();

    let names: Vec<&str> = config.hooks.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["security", "rust-backend", "go-backend", "python-backend"]
    );

    let python = config.group("python-backend").unwrap();
    let hooks = python.hooks_for("pre-commit");
    assert_eq!(hooks.len(), 3);
    assert_eq!(hooks[0].fix(), Some("black ."));
    assert!(hooks[1].fix().is_none());
}

#[test]
fn test_format_failure_message_names_a_runnable_fix() {
    let config = Config::from_yaml_str(&generate_config(&every_stack())).unwrap();

    for group in &config.hooks {
        for hook in group.hooks_for("pre-commit") {
            let Some(message) = hook.failure_message() else {
                continue;
            };
            if hook.fix().is_some() {
                assert!(
                    message.contains("qgate --fix pre-commit"),
                    "{}: {message}",
                    hook.name
                );
            }
        }
    }
}

#[test]
fn test_tool_names_are_unique() {
    let config = Config::from_yaml_str(&generate_config(&every_stack())).unwrap();

    let mut names: Vec<String> = config.tools.iter().map(|t| t.name.to_lowercase()).collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn test_init_output_loads_from_disk() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("package.json"),
        r#"{"devDependencies": {"typescript": "^5.4.0"}}"#,
    )
    .unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/index.ts"), "export {}\n").unwrap();

    let report = init(&InitOptions::new(temp.path())).unwrap();
    let config = qgate_config::load_config(&report.output_path).unwrap();

    assert!(config.group("security").is_some());
    assert!(config.group("typescript-frontend").is_some());
    assert!(config.group("node-frontend").is_none());

    let result = ConfigValidator::new(&config)
        .with_source(&report.output_path)
        .validate();
    assert!(result.valid, "{}", result.formatted());
}
