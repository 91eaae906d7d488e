//! Git hook integration: installs `pre-commit` and `pre-push` scripts that
//! call back into `qgate`.

use std::fs;
use std::path::{Path, PathBuf};

use qgate_core::{QgateError, Result};
use tracing::{debug, info};

/// Marker line identifying scripts written by qgate.
pub const MARKER: &str = "# installed by qgate";

/// Hook types that get a script.
pub const INSTALLED_HOOKS: &[&str] = &["pre-commit", "pre-push"];

/// Find the git directory for `start` or any of its ancestors.
///
/// Handles both a `.git` directory and a `.git` file pointing elsewhere
/// (`gitdir: <path>`, as worktrees and submodules use).
pub fn find_git_dir(start: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(".git");
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if candidate.is_file() {
            let content = fs::read_to_string(&candidate)
                .map_err(|e| QgateError::io("read", &candidate, e))?;
            if let Some(target) = content.trim().strip_prefix("gitdir:") {
                let target = Path::new(target.trim());
                return Ok(if target.is_absolute() {
                    target.to_path_buf()
                } else {
                    dir.join(target)
                });
            }
        }
    }
    Err(QgateError::GitDirNotFound {
        start: start.to_path_buf(),
    })
}

/// Script body for `hook_type`.
pub fn hook_script(hook_type: &str) -> String {
    format!("#!/bin/sh\n{MARKER}\nexec qgate {hook_type} \"$@\"\n")
}

/// Write a script for each of [`INSTALLED_HOOKS`] into the repository that
/// contains `start`. Existing scripts are overwritten.
///
/// Returns the paths written.
pub fn install_git_hooks(start: &Path) -> Result<Vec<PathBuf>> {
    let hooks_dir = find_git_dir(start)?.join("hooks");
    fs::create_dir_all(&hooks_dir).map_err(|source| QgateError::DirectoryCreation {
        path: hooks_dir.clone(),
        source,
    })?;

    let mut written = Vec::with_capacity(INSTALLED_HOOKS.len());
    for hook_type in INSTALLED_HOOKS {
        let path = hooks_dir.join(hook_type);
        if path.exists() {
            debug!(path = %path.display(), "replacing existing hook");
        }
        fs::write(&path, hook_script(hook_type))
            .map_err(|e| QgateError::io("write", &path, e))?;
        make_executable(&path)?;
        written.push(path);
    }

    info!(dir = %hooks_dir.display(), "git hooks installed");
    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| QgateError::io("set permissions on", path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
