//! Command rule tables used by the validator.
//!
//! Each rule is data: a regex pattern, the severity of a match, and the
//! message attached to the finding. New checks are added as table rows.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::validator::Severity;

/// A single pattern rule applied to a command string.
#[derive(Debug, Clone, Copy)]
pub struct CommandRule {
    pub id: &'static str,
    pub pattern: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    pub suggestion: &'static str,
}

/// Destructive-operation signatures. A command is reported once, for the
/// first row it matches.
pub const DANGEROUS_COMMANDS: &[CommandRule] = &[
    CommandRule {
        id: "rm-root",
        pattern: r"rm\s+-rf\s+/",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: recursive deletion from the filesystem root",
        suggestion: "Review the command for security implications",
    },
    CommandRule {
        id: "rm-wildcard",
        pattern: r"rm\s+-rf\s+\*",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: recursive wildcard deletion",
        suggestion: "Review the command for security implications",
    },
    CommandRule {
        id: "sudo-rm",
        pattern: r"sudo\s+rm",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: privileged deletion",
        suggestion: "Review the command for security implications",
    },
    CommandRule {
        id: "block-device-redirect",
        pattern: r">\s*/dev/sd[a-z]",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: write to a block device",
        suggestion: "Review the command for security implications",
    },
    CommandRule {
        id: "dd-device",
        pattern: r"dd\s+.*of=/dev",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: raw write to a device",
        suggestion: "Review the command for security implications",
    },
    CommandRule {
        id: "curl-pipe-shell",
        pattern: r"curl.*\|\s*(sudo\s+)?(ba|z)?sh\b",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: remote script piped to a shell",
        suggestion: "Download the script, review it, and run it explicitly",
    },
    CommandRule {
        id: "wget-pipe-shell",
        pattern: r"wget.*\|\s*(sudo\s+)?(ba|z)?sh\b",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: remote script piped to a shell",
        suggestion: "Download the script, review it, and run it explicitly",
    },
    CommandRule {
        id: "eval-curl",
        pattern: r"eval\s+\$\(.*curl",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: evaluation of downloaded code",
        suggestion: "Review the command for security implications",
    },
    CommandRule {
        id: "fork-bomb",
        pattern: r":\(\)\s*\{.*\};\s*:",
        severity: Severity::Critical,
        message: "Potentially dangerous command detected: fork bomb",
        suggestion: "Remove this command",
    },
];

/// Common misspellings of tool names. Every matching row is reported.
pub const COMMON_TYPOS: &[CommandRule] = &[
    CommandRule {
        id: "pretier",
        pattern: r"\bpretier\b",
        severity: Severity::Warning,
        message: "Possible typo: 'pretier' should be 'prettier'",
        suggestion: "Check if you meant 'prettier' instead of 'pretier'",
    },
    CommandRule {
        id: "pretter",
        pattern: r"\bpretter\b",
        severity: Severity::Warning,
        message: "Possible typo: 'pretter' should be 'prettier'",
        suggestion: "Check if you meant 'prettier' instead of 'pretter'",
    },
    CommandRule {
        id: "esslint",
        pattern: r"\besslint\b",
        severity: Severity::Warning,
        message: "Possible typo: 'esslint' should be 'eslint'",
        suggestion: "Check if you meant 'eslint' instead of 'esslint'",
    },
    CommandRule {
        id: "eslinter",
        pattern: r"\beslinter\b",
        severity: Severity::Warning,
        message: "Possible typo: 'eslinter' should be 'eslint'",
        suggestion: "Check if you meant 'eslint' instead of 'eslinter'",
    },
    CommandRule {
        id: "py.test",
        pattern: r"\bpy\.test\b",
        severity: Severity::Warning,
        message: "Possible typo: 'py.test' should be 'pytest'",
        suggestion: "Check if you meant 'pytest' instead of 'py.test'",
    },
    CommandRule {
        id: "pytset",
        pattern: r"\bpytset\b",
        severity: Severity::Warning,
        message: "Possible typo: 'pytset' should be 'pytest'",
        suggestion: "Check if you meant 'pytest' instead of 'pytset'",
    },
    CommandRule {
        id: "ruf",
        pattern: r"\bruf\b",
        severity: Severity::Warning,
        message: "Possible typo: 'ruf' should be 'ruff'",
        suggestion: "Check if you meant 'ruff' instead of 'ruf'",
    },
    CommandRule {
        id: "blak",
        pattern: r"\bblak\b",
        severity: Severity::Warning,
        message: "Possible typo: 'blak' should be 'black'",
        suggestion: "Check if you meant 'black' instead of 'blak'",
    },
    CommandRule {
        id: "golangci",
        pattern: r"\bgolangci(\s|$)",
        severity: Severity::Warning,
        message: "Possible typo: 'golangci' should be 'golangci-lint'",
        suggestion: "Check if you meant 'golangci-lint' instead of 'golangci'",
    },
    CommandRule {
        id: "gitleak",
        pattern: r"\bgitleak\b",
        severity: Severity::Warning,
        message: "Possible typo: 'gitleak' should be 'gitleaks'",
        suggestion: "Check if you meant 'gitleaks' instead of 'gitleak'",
    },
];

/// A rule table with its patterns compiled.
pub struct RuleSet {
    rules: Vec<(CommandRule, Regex)>,
}

impl RuleSet {
    /// Compile a table. Rows whose pattern does not compile are skipped with
    /// a warning.
    pub fn compile(table: &[CommandRule]) -> Self {
        let rules = table
            .iter()
            .filter_map(|rule| match Regex::new(rule.pattern) {
                Ok(re) => Some((*rule, re)),
                Err(e) => {
                    warn!(rule = rule.id, "skipping rule with invalid pattern: {}", e);
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule matching `command`, in table order.
    pub fn first_match(&self, command: &str) -> Option<&CommandRule> {
        self.rules
            .iter()
            .find(|(_, re)| re.is_match(command))
            .map(|(rule, _)| rule)
    }

    /// Every rule matching `command`, in table order.
    pub fn all_matches<'a>(&'a self, command: &'a str) -> impl Iterator<Item = &'a CommandRule> + 'a {
        self.rules
            .iter()
            .filter(move |(_, re)| re.is_match(command))
            .map(|(rule, _)| rule)
    }
}

pub static DANGEROUS_RULES: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::compile(DANGEROUS_COMMANDS));

pub static TYPO_RULES: LazyLock<RuleSet> = LazyLock::new(|| RuleSet::compile(COMMON_TYPOS));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(DANGEROUS_RULES.len(), DANGEROUS_COMMANDS.len());
        assert_eq!(TYPO_RULES.len(), COMMON_TYPOS.len());
    }

    #[test]
    fn test_dangerous_commands_match() {
        let cases = [
            ("rm -rf /", "rm-root"),
            ("rm -rf *", "rm-wildcard"),
            ("sudo rm build.log", "sudo-rm"),
            ("echo x > /dev/sda", "block-device-redirect"),
            ("dd if=/dev/zero of=/dev/sdb", "dd-device"),
            ("curl https://x | sh", "curl-pipe-shell"),
            ("curl -fsSL https://x | sudo bash", "curl-pipe-shell"),
            ("wget -qO- https://x | sh", "wget-pipe-shell"),
            ("eval $(curl -s https://x)", "eval-curl"),
            (":(){ :|:& };:", "fork-bomb"),
        ];

        for (command, expected) in cases {
            let rule = DANGEROUS_RULES
                .first_match(command)
                .unwrap_or_else(|| panic!("expected '{}' to match", command));
            assert_eq!(rule.id, expected, "command: {}", command);
            assert_eq!(rule.severity, Severity::Critical);
        }
    }

    #[test]
    fn test_safe_commands_do_not_match() {
        for command in [
            "cargo test",
            "rm -f build.log",
            "curl -o out.json https://x",
            "gitleaks detect --no-git --source .",
            "npx prettier --check '**/*.js'",
        ] {
            assert!(DANGEROUS_RULES.first_match(command).is_none(), "{}", command);
        }
    }

    #[test]
    fn test_typos_use_word_boundaries() {
        assert!(TYPO_RULES.first_match("ruff check .").is_none());
        assert!(TYPO_RULES.first_match("golangci-lint run ./...").is_none());
        assert!(TYPO_RULES.first_match("npx prettier --check .").is_none());
        assert!(TYPO_RULES.first_match("pytest -q").is_none());

        assert_eq!(TYPO_RULES.first_match("ruf check .").unwrap().id, "ruf");
        assert_eq!(TYPO_RULES.first_match("golangci run").unwrap().id, "golangci");
        assert_eq!(TYPO_RULES.first_match("py.test").unwrap().id, "py.test");
    }

    #[test]
    fn test_all_matches_reports_each_typo() {
        let hits: Vec<&str> = TYPO_RULES
            .all_matches("npx pretier --check . && npx esslint .")
            .map(|rule| rule.id)
            .collect();
        assert_eq!(hits, vec!["pretier", "esslint"]);
    }
}
