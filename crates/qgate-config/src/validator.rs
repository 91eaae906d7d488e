//! Configuration validation.
//!
//! [`ConfigValidator::validate`] never fails: every check runs independently
//! and appends severity-tagged findings to a [`ValidationResult`]. The
//! configuration is valid when no finding is an [`Severity::Error`] or
//! [`Severity::Critical`]; warnings never invalidate.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use qgate_core::QgateError;
use serde::Serialize;
use tracing::{debug, info};

use crate::loader::load_config;
use crate::model::{Config, Hook, OutputRules, ShowOn, Tool};
use crate::rules::{DANGEROUS_RULES, TYPO_RULES};

/// Ordinal risk classification of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, never blocks.
    Warning,
    /// Structural problem, fixable by editing the configuration.
    Error,
    /// Real operational risk.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl Severity {
    fn icon(&self) -> &'static str {
        match self {
            Severity::Warning => "⚠️",
            Severity::Error => "❌",
            Severity::Critical => "🚨",
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Path of the offending field, e.g. `tools[0].name`.
    pub field: String,
    pub value: String,
    pub issue: String,
    pub suggestion: String,
    pub severity: Severity,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.field, self.issue)
    }
}

/// Outcome of validating a configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Findings of exactly this severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.severity == severity)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.with_severity(severity).count()
    }

    /// Findings grouped by severity, most severe last.
    pub fn by_severity(&self) -> BTreeMap<Severity, Vec<&ValidationError>> {
        let mut grouped: BTreeMap<Severity, Vec<&ValidationError>> = BTreeMap::new();
        for err in &self.errors {
            grouped.entry(err.severity).or_default().push(err);
        }
        grouped
    }

    /// Human-readable report of all findings.
    pub fn formatted(&self) -> String {
        if self.errors.is_empty() {
            return "✅ No validation errors found".to_string();
        }

        let mut lines = vec![format!("❌ Found {} validation issues:", self.errors.len())];
        for err in &self.errors {
            lines.push(format!(
                "  {} [{}] {}: {}",
                err.severity.icon(),
                err.severity,
                err.field,
                err.issue
            ));
            if !err.suggestion.is_empty() {
                lines.push(format!("     💡 {}", err.suggestion));
            }
        }
        lines.join("\n")
    }

    fn push(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
        issue: impl Into<String>,
        suggestion: impl Into<String>,
        severity: Severity,
    ) {
        self.errors.push(ValidationError {
            field: field.into(),
            value: value.into(),
            issue: issue.into(),
            suggestion: suggestion.into(),
            severity,
        });
    }
}

/// Tools the cross-reference check knows about. Commands using anything
/// else are exempt.
const WELL_KNOWN_TOOLS: &[&str] = &[
    "prettier",
    "eslint",
    "ruff",
    "black",
    "mypy",
    "pytest",
    "gofmt",
    "golangci-lint",
    "rustfmt",
    "cargo",
    "php-cs-fixer",
    "phpstan",
    "phpunit",
    "pint",
    "checkstyle",
    "hadolint",
    "gitleaks",
];

/// Launcher prefixes that run another tool: `npx eslint .` uses `eslint`.
const WRAPPER_PREFIXES: &[&str] = &[
    "npx",
    "bunx",
    "pnpx",
    "command -v",
    "python -m",
    "python3 -m",
    "poetry run",
    "uv run",
];

/// The tool a command invokes: its leading token, or the token following a
/// known wrapper prefix.
pub fn tool_identifier(command: &str) -> Option<&str> {
    let trimmed = command.trim_start();
    for prefix in WRAPPER_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix)
            && rest.starts_with(char::is_whitespace)
            && let Some(token) = rest.split_whitespace().next()
        {
            return Some(token);
        }
    }
    trimmed.split_whitespace().next()
}

/// Validates a loaded `quality.yml`.
pub struct ConfigValidator<'a> {
    config: &'a Config,
    source: Option<PathBuf>,
    check_availability: bool,
}

impl<'a> ConfigValidator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            source: None,
            check_availability: false,
        }
    }

    /// Also check that the configuration file itself is accessible.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Also look up each tool's check command on PATH.
    pub fn with_availability_check(mut self, enabled: bool) -> Self {
        self.check_availability = enabled;
        self
    }

    /// Run every check and collect the findings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_tools(&mut result);
        self.validate_hooks(&mut result);
        self.validate_tool_references(&mut result);
        self.validate_duplicate_tool_names(&mut result);
        self.validate_duplicate_groups(&mut result);
        self.validate_essential_hooks(&mut result);
        if let Some(source) = &self.source {
            validate_file_system(source, &mut result);
        }

        result.valid = !result
            .errors
            .iter()
            .any(|e| e.severity >= Severity::Error);

        info!(
            valid = result.valid,
            warnings = result.count(Severity::Warning),
            errors = result.count(Severity::Error),
            critical = result.count(Severity::Critical),
            "configuration validated"
        );
        result
    }

    fn validate_tools(&self, result: &mut ValidationResult) {
        if self.config.tools.is_empty() {
            result.push(
                "tools",
                "empty",
                "No tools configured",
                "Add at least one tool configuration for quality checks",
                Severity::Warning,
            );
            return;
        }

        for (i, tool) in self.config.tools.iter().enumerate() {
            let prefix = format!("tools[{i}]");

            if tool.name.trim().is_empty() {
                result.push(
                    format!("{prefix}.name"),
                    &tool.name,
                    "Tool name is empty",
                    "Provide a descriptive name for the tool",
                    Severity::Error,
                );
            }

            if tool.check_command.trim().is_empty() {
                result.push(
                    format!("{prefix}.check_command"),
                    &tool.check_command,
                    "Check command is empty",
                    "Provide a command to check if the tool is installed (e.g., 'tool --version')",
                    Severity::Error,
                );
            } else {
                validate_command(&tool.check_command, &format!("{prefix}.check_command"), result);
            }

            if tool.install_command.trim().is_empty() {
                result.push(
                    format!("{prefix}.install_command"),
                    &tool.install_command,
                    "Install command is empty",
                    "Provide a command to install the tool",
                    Severity::Warning,
                );
            } else {
                validate_command(
                    &tool.install_command,
                    &format!("{prefix}.install_command"),
                    result,
                );
            }

            if self.check_availability {
                validate_tool_availability(tool, &prefix, result);
            }
        }
    }

    fn validate_hooks(&self, result: &mut ValidationResult) {
        if self.config.hooks.is_empty() {
            result.push(
                "hooks",
                "empty",
                "No hooks configured",
                "Add at least one hook configuration (pre-commit, pre-push, etc.)",
                Severity::Warning,
            );
            return;
        }

        for group in &self.config.hooks {
            let prefix = format!("hooks.{}", group.name);

            if group.name.trim().is_empty() {
                result.push(
                    &prefix,
                    &group.name,
                    "Hook group name is empty",
                    "Use descriptive names like 'security', 'backend', 'frontend'",
                    Severity::Error,
                );
            }

            let mut has_any_hooks = false;
            let mut seen_types: HashMap<&str, usize> = HashMap::new();
            for (s, stage) in group.stages.iter().enumerate() {
                match seen_types.get(stage.hook_type.as_str()).copied() {
                    Some(first) => result.push(
                        format!("{prefix}.{}", stage.hook_type),
                        &stage.hook_type,
                        format!("Duplicate hook type (also defined as stage #{first})"),
                        "Merge the hook lists under a single key",
                        Severity::Error,
                    ),
                    None => {
                        seen_types.insert(&stage.hook_type, s);
                    }
                }

                if stage.hooks.is_empty() {
                    continue;
                }
                has_any_hooks = true;
                for (i, hook) in stage.hooks.iter().enumerate() {
                    validate_hook(hook, &format!("{prefix}.{}[{i}]", stage.hook_type), result);
                }
            }

            if !has_any_hooks {
                result.push(
                    &prefix,
                    "no hooks",
                    "No hook types configured (pre-commit, pre-push)",
                    "Add at least one hook type with commands",
                    Severity::Warning,
                );
            }
        }
    }

    fn validate_tool_references(&self, result: &mut ValidationResult) {
        let configured: Vec<&str> = self
            .config
            .tools
            .iter()
            .filter_map(|tool| tool_identifier(&tool.check_command))
            .collect();

        for group in &self.config.hooks {
            for stage in &group.stages {
                for (i, hook) in stage.hooks.iter().enumerate() {
                    let Some(used) = tool_identifier(&hook.command) else {
                        continue;
                    };
                    if WELL_KNOWN_TOOLS.contains(&used) && !configured.contains(&used) {
                        result.push(
                            format!("hooks.{}.{}[{i}].command", group.name, stage.hook_type),
                            &hook.command,
                            format!("Command uses '{used}' but no tool configuration found"),
                            format!("Add a tool configuration for '{used}' in the tools section"),
                            Severity::Warning,
                        );
                    }
                }
            }
        }
    }

    fn validate_duplicate_tool_names(&self, result: &mut ValidationResult) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, tool) in self.config.tools.iter().enumerate() {
            if tool.name.trim().is_empty() {
                continue;
            }
            match seen.get(tool.name.as_str()) {
                Some(first) => result.push(
                    format!("tools[{i}].name"),
                    &tool.name,
                    format!("Duplicate tool name (also defined at tools[{first}])"),
                    "Use unique names for each tool or merge configurations",
                    Severity::Error,
                ),
                None => {
                    seen.insert(&tool.name, i);
                }
            }
        }
    }

    fn validate_duplicate_groups(&self, result: &mut ValidationResult) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (i, group) in self.config.hooks.iter().enumerate() {
            match seen.get(group.name.as_str()) {
                Some(first) => result.push(
                    format!("hooks.{}", group.name),
                    &group.name,
                    format!("Duplicate hook group name (also defined as group #{first})"),
                    "Merge the groups or give each a unique name",
                    Severity::Error,
                ),
                None => {
                    seen.insert(&group.name, i);
                }
            }
        }
    }

    fn validate_essential_hooks(&self, result: &mut ValidationResult) {
        let has_security = self
            .config
            .hooks
            .iter()
            .any(|group| group.name.to_lowercase().contains("security"));

        if !has_security {
            result.push(
                "hooks",
                "missing security",
                "No security hooks configured",
                "Consider adding a security hook group with tools like gitleaks for secret detection",
                Severity::Warning,
            );
        }
    }
}

fn validate_hook(hook: &Hook, prefix: &str, result: &mut ValidationResult) {
    if hook.name.trim().is_empty() {
        result.push(
            format!("{prefix}.name"),
            &hook.name,
            "Command name is empty",
            "Provide a descriptive name (e.g., '🎨 Format Check')",
            Severity::Error,
        );
    }

    if hook.command.trim().is_empty() {
        result.push(
            format!("{prefix}.command"),
            &hook.command,
            "Command is empty",
            "Provide the command to execute",
            Severity::Critical,
        );
    } else {
        validate_command(&hook.command, &format!("{prefix}.command"), result);
    }

    if let Some(fix) = hook.fix() {
        validate_command(fix, &format!("{prefix}.fix_command"), result);
    }

    if let Some(rules) = &hook.output_rules {
        validate_output_rules(rules, &format!("{prefix}.output_rules"), result);
    }
}

/// Safety, syntax, and typo checks shared by every command field.
fn validate_command(command: &str, field: &str, result: &mut ValidationResult) {
    if let Some(rule) = DANGEROUS_RULES.first_match(command) {
        debug!(rule = rule.id, field, "dangerous command pattern matched");
        result.push(field, command, rule.message, rule.suggestion, rule.severity);
    }

    if command.matches('\'').count() % 2 != 0 {
        result.push(
            field,
            command,
            "Unmatched single quotes in command",
            "Ensure all single quotes are properly paired",
            Severity::Error,
        );
    }

    if command.matches('"').count() % 2 != 0 {
        result.push(
            field,
            command,
            "Unmatched double quotes in command",
            "Ensure all double quotes are properly paired",
            Severity::Error,
        );
    }

    let lowered = command.to_lowercase();
    for rule in TYPO_RULES.all_matches(&lowered) {
        result.push(field, command, rule.message, rule.suggestion, rule.severity);
    }
}

fn validate_output_rules(rules: &OutputRules, field: &str, result: &mut ValidationResult) {
    if let Some(show_on) = &rules.show_on
        && show_on.parse::<ShowOn>().is_err()
    {
        result.push(
            format!("{field}.show_on"),
            show_on,
            "Invalid show_on value",
            format!("Use one of: {}", ShowOn::VALUES.join(", ")),
            Severity::Error,
        );
    }

    if let Some(message) = &rules.on_failure_message
        && message.matches("{{").count() != message.matches("}}").count()
    {
        result.push(
            format!("{field}.on_failure_message"),
            message,
            "Unbalanced template delimiters in message",
            "Ensure every {{ variable }} is properly closed",
            Severity::Warning,
        );
    }
}

fn validate_tool_availability(tool: &Tool, prefix: &str, result: &mut ValidationResult) {
    let Some(program) = tool_identifier(&tool.check_command) else {
        return;
    };

    // Paths and shell syntax are not resolvable through PATH.
    if program.contains(['/', '|', '&']) {
        return;
    }

    if which::which(program).is_err() {
        result.push(
            format!("{prefix}.check_command"),
            &tool.check_command,
            format!("Tool '{program}' not found in PATH"),
            format!(
                "Install '{}' or check the installation command: {}",
                tool.name, tool.install_command
            ),
            Severity::Warning,
        );
    }
}

/// Load the file at `path` and validate it.
///
/// A file that cannot be read is validated as an empty configuration so the
/// file-system check reports why. YAML that does not parse becomes a single
/// Critical finding.
pub fn validate_file(path: &Path, check_availability: bool) -> ValidationResult {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(QgateError::ConfigInvalid { message, .. }) => {
            let display = path.display().to_string();
            let mut result = ValidationResult::default();
            result.push(
                "file",
                &display,
                format!("Invalid YAML: {message}"),
                "Check indentation and quoting near the reported line",
                Severity::Critical,
            );
            info!(valid = false, "configuration could not be parsed");
            return result;
        }
        Err(e) => {
            debug!("validating empty configuration: {}", e);
            Config::default()
        }
    };

    ConfigValidator::new(&config)
        .with_source(path)
        .with_availability_check(check_availability)
        .validate()
}

fn validate_file_system(path: &Path, result: &mut ValidationResult) {
    let display = path.display().to_string();

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("configuration file not accessible: {}", e);
            result.push(
                "file",
                &display,
                format!("Cannot access {display}"),
                format!("Ensure {display} exists and is readable"),
                Severity::Critical,
            );
            return;
        }
    };

    if !metadata.is_file() {
        result.push(
            "file",
            &display,
            format!("{display} is not a regular file"),
            "Point qgate at the quality.yml file itself",
            Severity::Critical,
        );
        return;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o444 == 0 {
            result.push(
                "file",
                &display,
                format!("{display} is not readable"),
                format!("Fix file permissions: chmod 644 {display}"),
                Severity::Error,
            );
        }
    }
}
