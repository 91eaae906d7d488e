//! The `--init` flow: scan a project, generate `quality.yml`, write it.

use std::fs;
use std::path::{Path, PathBuf};

use qgate_config::DEFAULT_CONFIG_FILE;
use tracing::{info, instrument};

use crate::detection::{ProjectAnalyzer, ProjectStructure};
use crate::error::{InitError, Result};
use crate::generator::generate_config;

/// Inputs to [`init`] and [`preview`], built by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOptions {
    /// Directory to scan.
    pub project_root: PathBuf,
    /// Where the generated file is written.
    pub output_path: PathBuf,
    /// Overwrite an existing file.
    pub force: bool,
}

impl InitOptions {
    /// Scan `project_root` and write `quality.yml` inside it.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let output_path = project_root.join(DEFAULT_CONFIG_FILE);
        Self {
            project_root,
            output_path,
            force: false,
        }
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// What [`init`] did.
#[derive(Debug, Clone)]
pub struct InitReport {
    pub structure: ProjectStructure,
    pub output_path: PathBuf,
    /// True when an existing file was replaced.
    pub overwritten: bool,
}

/// Scan the project and return the generated document without writing it.
pub fn preview(options: &InitOptions) -> Result<String> {
    let structure = ProjectAnalyzer::new(&options.project_root).scan()?;
    Ok(generate_config(&structure))
}

/// Scan the project and write the generated document.
///
/// An existing file at `output_path` is left alone unless `force` is set.
#[instrument(skip(options), fields(root = %options.project_root.display()))]
pub fn init(options: &InitOptions) -> Result<InitReport> {
    let existed = options.output_path.exists();
    if existed && !options.force {
        return Err(InitError::ConfigExists {
            path: options.output_path.clone(),
        });
    }

    let structure = ProjectAnalyzer::new(&options.project_root).scan()?;
    let content = generate_config(&structure);
    write_config(&options.output_path, &content)?;

    info!(
        path = %options.output_path.display(),
        overwritten = existed,
        "configuration written"
    );
    Ok(InitReport {
        structure,
        output_path: options.output_path.clone(),
        overwritten: existed,
    })
}

fn write_config(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| InitError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
