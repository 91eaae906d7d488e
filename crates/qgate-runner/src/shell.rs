//! Shell command execution.
//!
//! The hook engine and tool installer only see the [`ShellRunner`] trait.
//! [`SystemShell`] is the real implementation: it runs each command through
//! `$SHELL -c` on a single-threaded tokio runtime, with an optional deadline
//! after which the child is killed.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use qgate_core::{QgateError, Result};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Shells tried in order when `$SHELL` is unset.
const FALLBACK_SHELLS: &[&str] = &["/bin/zsh", "/bin/bash", "/bin/sh"];

/// Captured result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output followed by standard error.
    pub output: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn new(output: impl Into<String>, exit_code: i32) -> Self {
        Self {
            output: output.into(),
            exit_code: Some(exit_code),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// `exit status 2`, or a note that a signal ended the process.
    pub fn status_description(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs a command line and reports its output and exit status.
///
/// `Err` means the command could not be run at all (spawn failure, deadline
/// exceeded). A command that ran and exited non-zero is `Ok` with a
/// non-success [`CommandOutput`].
pub trait ShellRunner: Send + Sync {
    fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands through the user's shell.
#[derive(Debug, Clone)]
pub struct SystemShell {
    shell: PathBuf,
    timeout: Option<Duration>,
    working_dir: Option<PathBuf>,
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemShell {
    /// Use `$SHELL`, falling back to the first of zsh, bash, sh that exists.
    pub fn new() -> Self {
        Self {
            shell: detect_shell(),
            timeout: None,
            working_dir: None,
        }
    }

    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Kill any command still running after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    async fn run_async(&self, command: &str) -> Result<CommandOutput> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        debug!(shell = %self.shell.display(), command, "running command");

        let result = match self.timeout {
            Some(limit) => timeout(limit, cmd.output()).await.map_err(|_| {
                warn!(command, timeout_secs = limit.as_secs(), "command timed out");
                QgateError::CommandTimeout {
                    command: command.to_string(),
                    timeout_secs: limit.as_secs(),
                }
            })?,
            None => cmd.output().await,
        };
        let output = result.map_err(|e| QgateError::command_spawn(command, e))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        debug!(command, exit_code = ?output.status.code(), "command finished");
        Ok(CommandOutput {
            output: text,
            exit_code: output.status.code(),
        })
    }
}

impl ShellRunner for SystemShell {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| QgateError::internal(format!("failed to start runtime: {e}")))?;
        runtime.block_on(self.run_async(command))
    }
}

fn detect_shell() -> PathBuf {
    if let Some(shell) = std::env::var_os("SHELL").filter(|s| !s.is_empty()) {
        return PathBuf::from(shell);
    }
    FALLBACK_SHELLS
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .unwrap_or(Path::new("/bin/sh"))
        .to_path_buf()
}
