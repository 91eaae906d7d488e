//! Project stack detection.
//!
//! Walks a project tree once and infers the languages, frameworks, and tool
//! hints used to generate a starter `quality.yml`. Detection is heuristic:
//! manifest files are trusted, file extensions fill in the rest, and a
//! manifest that fails to parse only loses its own signal.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{InitError, Result};

/// A language or platform the generator has a template for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Node,
    Python,
    Rust,
    Php,
    Java,
    Docker,
    TypeScript,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Node => "node",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Java => "java",
            Language::Docker => "docker",
            Language::TypeScript => "typescript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A framework detected from manifest dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    React,
    Vue,
    Angular,
    Django,
    FastApi,
    Flask,
    Laravel,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Vue => "vue",
            Framework::Angular => "angular",
            Framework::Django => "django",
            Framework::FastApi => "fastapi",
            Framework::Flask => "flask",
            Framework::Laravel => "laravel",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a scan found. Each list is deduplicated and keeps first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStructure {
    pub languages: Vec<Language>,
    pub frameworks: Vec<Framework>,
    /// Tool hints taken from manifest dependencies (e.g. `eslint`, `pytest`).
    pub tools: Vec<String>,
    /// Manifest files per language, relative to the scanned root.
    pub structure: BTreeMap<Language, Vec<PathBuf>>,
}

impl ProjectStructure {
    /// A structure with the given languages and nothing else.
    pub fn with_languages(languages: impl IntoIterator<Item = Language>) -> Self {
        let mut structure = Self::default();
        for language in languages {
            structure.add_language(language);
        }
        structure
    }

    pub fn has_language(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    pub fn has_framework(&self, framework: Framework) -> bool {
        self.frameworks.contains(&framework)
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.frameworks.is_empty()
    }

    /// Returns false if the language was already recorded.
    pub fn add_language(&mut self, language: Language) -> bool {
        if self.has_language(language) {
            return false;
        }
        self.languages.push(language);
        true
    }

    pub fn add_framework(&mut self, framework: Framework) -> bool {
        if self.has_framework(framework) {
            return false;
        }
        self.frameworks.push(framework);
        true
    }

    pub fn add_tool(&mut self, tool: &str) -> bool {
        if self.tools.iter().any(|t| t == tool) {
            return false;
        }
        self.tools.push(tool.to_string());
        true
    }

    fn record_path(&mut self, language: Language, path: PathBuf) {
        self.structure.entry(language).or_default().push(path);
    }
}

/// Files whose name alone identifies a language.
const MANIFESTS: &[(&str, Language)] = &[
    ("go.mod", Language::Go),
    ("go.sum", Language::Go),
    ("package.json", Language::Node),
    ("package-lock.json", Language::Node),
    ("yarn.lock", Language::Node),
    ("pnpm-lock.yaml", Language::Node),
    ("requirements.txt", Language::Python),
    ("setup.py", Language::Python),
    ("pyproject.toml", Language::Python),
    ("Pipfile", Language::Python),
    ("poetry.lock", Language::Python),
    ("Cargo.toml", Language::Rust),
    ("Cargo.lock", Language::Rust),
    ("composer.json", Language::Php),
    ("composer.lock", Language::Php),
    ("pom.xml", Language::Java),
    ("build.gradle", Language::Java),
    ("gradle.properties", Language::Java),
    ("Dockerfile", Language::Docker),
    ("docker-compose.yml", Language::Docker),
    ("docker-compose.yaml", Language::Docker),
];

/// Directories never descended into. Hidden directories are skipped too.
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "venv",
    "__pycache__",
    "dist",
    "build",
];

const NODE_FRAMEWORKS: &[(&str, Framework)] = &[
    ("react", Framework::React),
    ("vue", Framework::Vue),
    ("@angular/core", Framework::Angular),
];

const NODE_TOOLS: &[(&str, &str)] = &[
    ("eslint", "eslint"),
    ("prettier", "prettier"),
    ("jest", "jest"),
    ("vitest", "vitest"),
    ("cypress", "cypress"),
    ("playwright", "playwright"),
    ("@playwright/test", "playwright"),
];

const PYTHON_FRAMEWORKS: &[(&str, Framework)] = &[
    ("django", Framework::Django),
    ("fastapi", Framework::FastApi),
    ("flask", Framework::Flask),
];

const PYTHON_TOOLS: &[&str] = &["black", "ruff", "flake8", "mypy", "pytest", "isort"];

const COMPOSER_TOOLS: &[(&str, &str)] = &[
    ("phpunit/phpunit", "phpunit"),
    ("squizlabs/php_codesniffer", "phpcs"),
    ("friendsofphp/php-cs-fixer", "php-cs-fixer"),
    ("phpstan/phpstan", "phpstan"),
    ("psalm/phar", "psalm"),
];

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerJson {
    #[serde(default)]
    require: BTreeMap<String, Value>,
    #[serde(default, rename = "require-dev")]
    require_dev: BTreeMap<String, Value>,
}

/// Scans a project directory.
#[derive(Debug, Clone)]
pub struct ProjectAnalyzer {
    root: PathBuf,
}

impl ProjectAnalyzer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and build a [`ProjectStructure`].
    ///
    /// Only an unreadable root is an error; unreadable entries below it are
    /// skipped.
    pub fn scan(&self) -> Result<ProjectStructure> {
        let files = self.collect_files()?;
        let mut structure = ProjectStructure::default();

        // Manifests first, so extension matches can defer to them.
        for path in &files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(&(_, language)) = MANIFESTS.iter().find(|(manifest, _)| *manifest == name)
            else {
                continue;
            };

            structure.add_language(language);
            structure.record_path(language, self.relative(path));

            match name {
                "package.json" => analyze_package_json(path, &mut structure),
                "requirements.txt" => analyze_requirements(path, &mut structure),
                "composer.json" => analyze_composer_json(path, &mut structure),
                _ => {}
            }
        }

        // Plain JavaScript in a TypeScript project is not a separate stack.
        let typed = structure.has_language(Language::TypeScript)
            || files
                .iter()
                .any(|p| extension_language(p) == Some(Language::TypeScript));

        for path in &files {
            match extension_language(path) {
                Some(Language::Node) if typed => {}
                Some(language) => {
                    structure.add_language(language);
                }
                None => {}
            }
        }

        info!(
            root = %self.root.display(),
            languages = ?structure.languages,
            frameworks = ?structure.frameworks,
            "project scanned"
        );
        Ok(structure)
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_skipped_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(InitError::Scan {
                        path: self.root.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        debug!(count = files.len(), "collected project files");
        Ok(files)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    let name: &str = &name;
    name.starts_with('.') || SKIP_DIRS.contains(&name)
}

fn extension_language(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "ts" | "tsx" => Some(Language::TypeScript),
        "js" | "jsx" | "mjs" => Some(Language::Node),
        "py" => Some(Language::Python),
        "go" => Some(Language::Go),
        "rs" => Some(Language::Rust),
        "php" => Some(Language::Php),
        "java" | "kt" | "scala" => Some(Language::Java),
        _ => None,
    }
}

fn read_manifest<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            debug!("Ignoring malformed manifest {}: {}", path.display(), e);
            None
        }
    }
}

fn analyze_package_json(path: &Path, structure: &mut ProjectStructure) {
    let Some(manifest) = read_manifest::<PackageJson>(path) else {
        return;
    };
    let has = |dep: &str| {
        manifest.dependencies.contains_key(dep) || manifest.dev_dependencies.contains_key(dep)
    };

    if has("typescript") {
        structure.add_language(Language::TypeScript);
    }
    for &(dep, framework) in NODE_FRAMEWORKS {
        if has(dep) {
            structure.add_framework(framework);
        }
    }
    for &(dep, tool) in NODE_TOOLS {
        if has(dep) {
            structure.add_tool(tool);
        }
    }
}

fn analyze_requirements(path: &Path, structure: &mut ProjectStructure) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            return;
        }
    };

    for line in content.lines() {
        let line = line.trim().to_lowercase();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        let package = line
            .split(|c: char| "=<>!~;[ ".contains(c))
            .next()
            .unwrap_or_default();
        if package.is_empty() {
            continue;
        }

        if let Some(&(_, framework)) = PYTHON_FRAMEWORKS
            .iter()
            .find(|(name, _)| package.contains(name))
        {
            structure.add_framework(framework);
        }
        for tool in PYTHON_TOOLS {
            if package.contains(tool) {
                structure.add_tool(tool);
            }
        }
    }
}

fn analyze_composer_json(path: &Path, structure: &mut ProjectStructure) {
    let Some(manifest) = read_manifest::<ComposerJson>(path) else {
        return;
    };
    let has = |dep: &str| manifest.require.contains_key(dep) || manifest.require_dev.contains_key(dep);

    if has("laravel/framework") {
        structure.add_framework(Framework::Laravel);
    }
    for &(dep, tool) in COMPOSER_TOOLS {
        if has(dep) {
            structure.add_tool(tool);
        }
    }
}
