//! Errors returned by the installer, hook engine, and orchestrator.

use qgate_core::QgateError;
use thiserror::Error;

use crate::orchestrator::RunReport;

/// Why a run or fix did not succeed.
#[derive(Debug, Error)]
pub enum GateError {
    /// A tool's install command failed; nothing after it was attempted.
    #[error("failed to install {tool}: {reason}")]
    ToolInstall {
        tool: String,
        reason: String,
        output: String,
    },

    /// At least one hook failed. Every hook still ran; `report` has them all.
    #[error("one or more hooks failed ({} of {})", .report.failed().count(), .report.results.len())]
    HooksFailed { report: RunReport },

    /// A fix command failed; later fixes were not attempted.
    #[error("failed to run fix command for hook {hook}: {reason}")]
    FixFailed {
        hook: String,
        reason: String,
        output: String,
    },

    #[error("no fix command defined for hook: {hook}")]
    MissingFixCommand { hook: String },

    #[error("unknown hook type '{hook_type}'")]
    UnknownHookType { hook_type: String },

    #[error(transparent)]
    Core(#[from] QgateError),
}

impl GateError {
    /// Captured command output attached to the failure, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::ToolInstall { output, .. } | Self::FixFailed { output, .. }
                if !output.trim().is_empty() =>
            {
                Some(output.as_str())
            }
            _ => None,
        }
    }

    /// The run report, when the failure came from hook results.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::HooksFailed { report } => Some(report),
            _ => None,
        }
    }
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, GateError>;
