//! Starter `quality.yml` generation.
//!
//! [`generate_config`] is a pure function of the [`ProjectStructure`]: tools
//! and groups follow the structure's recorded order plus a fixed order within
//! each language, and the YAML is rendered line by line, so equal input gives
//! byte-identical text.

use tracing::debug;

use crate::detection::{Framework, Language, ProjectStructure};

/// Failure message attached to every generated format check.
pub const FORMAT_FAILURE_MESSAGE: &str =
    "Code formatting issues detected. Run 'qgate --fix pre-commit' to format.";

/// Hook type every generated group registers under.
const HOOK_TYPE: &str = "pre-commit";

#[derive(Debug, Clone, Copy)]
struct ToolTemplate {
    name: &'static str,
    check_command: &'static str,
    install_command: &'static str,
}

const fn tool(
    name: &'static str,
    check_command: &'static str,
    install_command: &'static str,
) -> ToolTemplate {
    ToolTemplate {
        name,
        check_command,
        install_command,
    }
}

#[derive(Debug, Clone)]
struct CommandTemplate {
    name: &'static str,
    command: String,
    fix_command: Option<String>,
    show_on: &'static str,
    on_failure_message: Option<&'static str>,
}

impl CommandTemplate {
    fn format(name: &'static str, command: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            name,
            command: command.into(),
            fix_command: Some(fix.into()),
            show_on: "failure",
            on_failure_message: Some(FORMAT_FAILURE_MESSAGE),
        }
    }

    fn lint(name: &'static str, command: impl Into<String>) -> Self {
        Self {
            name,
            command: command.into(),
            fix_command: None,
            show_on: "failure",
            on_failure_message: None,
        }
    }

    fn test(name: &'static str, command: impl Into<String>) -> Self {
        Self {
            show_on: "always",
            ..Self::lint(name, command)
        }
    }

    fn with_message(mut self, message: &'static str) -> Self {
        self.on_failure_message = Some(message);
        self
    }
}

#[derive(Debug, Clone)]
struct GroupTemplate {
    name: &'static str,
    description: &'static str,
    commands: Vec<CommandTemplate>,
}

const GITLEAKS: ToolTemplate = tool(
    "Gitleaks",
    "gitleaks version",
    "go install github.com/gitleaks/gitleaks/v8@latest",
);

const GO_TOOLS: &[ToolTemplate] = &[
    tool(
        "Gofmt",
        "command -v gofmt",
        "# gofmt ships with the Go toolchain: https://go.dev/dl/",
    ),
    tool(
        "Golangci-lint",
        "golangci-lint --version",
        "go install github.com/golangci/golangci-lint/cmd/golangci-lint@latest",
    ),
    tool("Go", "go version", "# Install Go from https://go.dev/dl/"),
];

const PYTHON_TOOLS: &[ToolTemplate] = &[
    tool("Black", "black --version", "pip install black"),
    tool("Ruff", "ruff --version", "pip install ruff"),
    tool("Pytest", "pytest --version", "pip install pytest"),
];

const JS_TOOLS: &[ToolTemplate] = &[
    tool(
        "Prettier",
        "npx prettier --version",
        "npm install --save-dev prettier",
    ),
    tool("ESLint", "npx eslint --version", "npm install --save-dev eslint"),
    tool("npm", "npm --version", "# Install Node.js from https://nodejs.org/"),
];

const RUST_TOOLS: &[ToolTemplate] = &[
    tool("Rustfmt", "rustfmt --version", "rustup component add rustfmt"),
    tool("Clippy", "cargo clippy --version", "rustup component add clippy"),
    tool("Cargo", "cargo --version", "# Install Rust via https://rustup.rs"),
];

const PHP_TOOLS: &[ToolTemplate] = &[
    tool(
        "PHP CS Fixer",
        "php-cs-fixer --version",
        "composer global require friendsofphp/php-cs-fixer",
    ),
    tool(
        "PHPStan",
        "phpstan --version",
        "composer require --dev phpstan/phpstan",
    ),
    tool(
        "PHPUnit",
        "phpunit --version",
        "composer require --dev phpunit/phpunit",
    ),
];

const JAVA_TOOLS: &[ToolTemplate] = &[
    tool(
        "google-java-format",
        "google-java-format --version",
        "# Download from https://github.com/google/google-java-format/releases",
    ),
    tool(
        "Checkstyle",
        "checkstyle --version",
        "# Install via your package manager or the Maven plugin",
    ),
    tool("Maven", "mvn --version", "# Install Maven from https://maven.apache.org/"),
];

const DOCKER_TOOLS: &[ToolTemplate] = &[tool("Hadolint", "hadolint --version", "brew install hadolint")];

fn language_tools(language: Language) -> &'static [ToolTemplate] {
    match language {
        Language::Go => GO_TOOLS,
        Language::Python => PYTHON_TOOLS,
        Language::Node | Language::TypeScript => JS_TOOLS,
        Language::Rust => RUST_TOOLS,
        Language::Php => PHP_TOOLS,
        Language::Java => JAVA_TOOLS,
        Language::Docker => DOCKER_TOOLS,
    }
}

fn framework_tools(framework: Framework) -> &'static [ToolTemplate] {
    const REACT: &[ToolTemplate] = &[tool(
        "eslint-plugin-react",
        "npm ls eslint-plugin-react",
        "npm install --save-dev eslint-plugin-react",
    )];
    const VUE: &[ToolTemplate] = &[tool(
        "eslint-plugin-vue",
        "npm ls eslint-plugin-vue",
        "npm install --save-dev eslint-plugin-vue",
    )];
    const LARAVEL: &[ToolTemplate] = &[tool(
        "Laravel Pint",
        "pint --version",
        "composer require laravel/pint --dev",
    )];

    match framework {
        Framework::React => REACT,
        Framework::Vue => VUE,
        Framework::Laravel => LARAVEL,
        Framework::Angular | Framework::Django | Framework::FastApi | Framework::Flask => &[],
    }
}

fn security_group() -> GroupTemplate {
    GroupTemplate {
        name: "security",
        description: "Secret scanning for every project",
        commands: vec![
            CommandTemplate::lint(
                "🔒 Secret Detection (Gitleaks)",
                "gitleaks detect --no-git --source . --verbose",
            )
            .with_message("⚠️  Secret leak detected! Review your code before committing."),
        ],
    }
}

fn language_group(language: Language, structure: &ProjectStructure) -> GroupTemplate {
    match language {
        Language::Go => GroupTemplate {
            name: "go-backend",
            description: "Quality checks for Go projects",
            commands: vec![
                CommandTemplate::format("🎨 Format Check (gofmt)", "gofmt -l .", "gofmt -w ."),
                CommandTemplate::lint("🔍 Lint (golangci-lint)", "golangci-lint run ./..."),
                CommandTemplate::test("🧪 Tests (go test)", "go test ./..."),
            ],
        },
        Language::Python => GroupTemplate {
            name: "python-backend",
            description: "Quality checks for Python projects",
            commands: vec![
                CommandTemplate::format("🎨 Format Check (Black)", "black --check .", "black ."),
                CommandTemplate::lint("🔍 Lint (Ruff)", "ruff check ."),
                CommandTemplate::test("🧪 Tests (pytest)", "pytest"),
            ],
        },
        Language::Node | Language::TypeScript => js_group(structure),
        Language::Rust => GroupTemplate {
            name: "rust-backend",
            description: "Quality checks for Rust projects",
            commands: vec![
                CommandTemplate::format("🎨 Format Check (rustfmt)", "cargo fmt -- --check", "cargo fmt"),
                CommandTemplate::lint("🔍 Lint (Clippy)", "cargo clippy -- -D warnings"),
                CommandTemplate::test("🧪 Tests (cargo test)", "cargo test"),
            ],
        },
        Language::Php => GroupTemplate {
            name: "php-backend",
            description: "Quality checks for PHP projects",
            commands: vec![
                CommandTemplate::format(
                    "🎨 Format Check (PHP CS Fixer)",
                    "php-cs-fixer fix --dry-run --diff",
                    "php-cs-fixer fix",
                ),
                CommandTemplate::lint("🔍 Static Analysis (PHPStan)", "phpstan analyse"),
                CommandTemplate::test("🧪 Tests (PHPUnit)", "phpunit"),
            ],
        },
        Language::Java => GroupTemplate {
            name: "java-backend",
            description: "Quality checks for Java projects",
            commands: vec![
                CommandTemplate::format(
                    "🎨 Format Check (google-java-format)",
                    "google-java-format --dry-run --set-exit-if-changed $(git ls-files '*.java')",
                    "google-java-format --replace $(git ls-files '*.java')",
                ),
                CommandTemplate::lint("🔍 Lint (Checkstyle)", "mvn -q checkstyle:check"),
                CommandTemplate::test("🧪 Tests (Maven)", "mvn -q test"),
            ],
        },
        Language::Docker => GroupTemplate {
            name: "docker",
            description: "Dockerfile linting",
            commands: vec![CommandTemplate::lint(
                "🐳 Dockerfile Lint (hadolint)",
                "hadolint Dockerfile",
            )],
        },
    }
}

/// One group covers both plain Node and TypeScript projects.
fn js_group(structure: &ProjectStructure) -> GroupTemplate {
    let typed = structure.has_language(Language::TypeScript);

    let mut patterns = vec!["'**/*.js'"];
    if typed {
        patterns.extend(["'**/*.ts'", "'**/*.tsx'"]);
    }
    if structure.has_framework(Framework::React) {
        patterns.push("'**/*.jsx'");
    }
    let patterns = patterns.join(" ");

    GroupTemplate {
        name: if typed { "typescript-frontend" } else { "node-frontend" },
        description: "Quality checks for Node.js/TypeScript projects",
        commands: vec![
            CommandTemplate::format(
                "🎨 Format Check (Prettier)",
                format!("npx prettier --check {patterns}"),
                format!("npx prettier --write {patterns}"),
            ),
            CommandTemplate::lint("🔍 Lint (ESLint)", format!("npx eslint {patterns}")),
            CommandTemplate::test("🧪 Tests", "npm test"),
        ],
    }
}

fn framework_group(framework: Framework) -> Option<GroupTemplate> {
    let group = match framework {
        Framework::React => GroupTemplate {
            name: "react-frontend",
            description: "Additional checks for React projects",
            commands: vec![CommandTemplate::lint(
                "⚛️ React Lint",
                "npx eslint --ext .jsx,.tsx .",
            )],
        },
        Framework::Vue => GroupTemplate {
            name: "vue-frontend",
            description: "Additional checks for Vue projects",
            commands: vec![CommandTemplate::lint("🟩 Vue Lint", "npx eslint --ext .vue .")],
        },
        Framework::Django => GroupTemplate {
            name: "django-backend",
            description: "Additional checks for Django projects",
            commands: vec![
                CommandTemplate::test("🔍 Django Check", "python manage.py check"),
                CommandTemplate::lint(
                    "🗄️ Migration Check",
                    "python manage.py makemigrations --dry-run --check",
                ),
            ],
        },
        Framework::Laravel => GroupTemplate {
            name: "laravel-backend",
            description: "Additional checks for Laravel projects",
            commands: vec![CommandTemplate::format(
                "🎨 Format Check (Laravel Pint)",
                "pint --test",
                "pint",
            )],
        },
        Framework::Angular | Framework::FastApi | Framework::Flask => return None,
    };
    Some(group)
}

fn collect_tools(structure: &ProjectStructure) -> Vec<ToolTemplate> {
    let mut tools = vec![GITLEAKS];
    let mut seen = vec![GITLEAKS.name.to_lowercase()];

    let candidates = structure
        .languages
        .iter()
        .flat_map(|&language| language_tools(language))
        .chain(
            structure
                .frameworks
                .iter()
                .flat_map(|&framework| framework_tools(framework)),
        );

    for candidate in candidates {
        let key = candidate.name.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            tools.push(*candidate);
        }
    }
    tools
}

fn collect_groups(structure: &ProjectStructure) -> Vec<GroupTemplate> {
    let mut groups = vec![security_group()];

    let candidates = structure
        .languages
        .iter()
        .map(|&language| Some(language_group(language, structure)))
        .chain(structure.frameworks.iter().map(|&f| framework_group(f)))
        .flatten();

    for group in candidates {
        if groups.iter().all(|g| g.name != group.name) {
            groups.push(group);
        }
    }
    groups
}

/// Render a starter `quality.yml` for the detected stack.
///
/// The secret-scanning tool and `security` group are always present, even
/// for an empty structure.
pub fn generate_config(structure: &ProjectStructure) -> String {
    let tools = collect_tools(structure);
    let groups = collect_groups(structure);
    debug!(
        tools = tools.len(),
        groups = groups.len(),
        "generating configuration"
    );

    let mut lines = header_lines(structure);
    lines.push(String::new());
    lines.extend(tools_section(&tools));
    lines.extend(hooks_section(&groups));

    let mut document = lines.join("\n");
    document.push('\n');
    document
}

fn header_lines(structure: &ProjectStructure) -> Vec<String> {
    fn list<T: ToString>(items: &[T]) -> String {
        if items.is_empty() {
            return "none".to_string();
        }
        items.iter().map(T::to_string).collect::<Vec<_>>().join(", ")
    }

    vec![
        "# quality.yml generated by 'qgate --init'".to_string(),
        format!("# Detected languages: {}", list(&structure.languages)),
        format!("# Detected frameworks: {}", list(&structure.frameworks)),
    ]
}

fn tools_section(tools: &[ToolTemplate]) -> Vec<String> {
    let mut lines = vec!["tools:".to_string()];
    for tool in tools {
        lines.push(format!("  - name: {}", quote(tool.name)));
        lines.push(format!("    check_command: {}", quote(tool.check_command)));
        lines.push(format!("    install_command: {}", quote(tool.install_command)));
        lines.push(String::new());
    }
    lines
}

fn hooks_section(groups: &[GroupTemplate]) -> Vec<String> {
    let mut lines = vec!["hooks:".to_string()];
    for group in groups {
        lines.push(format!("  {}:", group.name));
        lines.push(format!("    # {}", group.description));
        lines.push(format!("    {HOOK_TYPE}:"));

        for command in &group.commands {
            lines.push(format!("      - name: {}", quote(command.name)));
            lines.push(format!("        command: {}", quote(&command.command)));
            if let Some(fix) = &command.fix_command {
                lines.push(format!("        fix_command: {}", quote(fix)));
            }
            lines.push("        output_rules:".to_string());
            lines.push(format!("          show_on: {}", quote(command.show_on)));
            if let Some(message) = command.on_failure_message {
                lines.push(format!("          on_failure_message: {}", quote(message)));
            }
            lines.push(String::new());
        }
    }
    lines
}

/// Double-quoted YAML scalar.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
