//! Error types for qgate operations.
//!
//! This module defines [`QgateError`], the error enum shared by every qgate
//! crate. Errors are returned as values; nothing in the library crates exits
//! the process. Mapping an error to an exit code is the binary's job.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`QgateError`].
pub type Result<T> = std::result::Result<T, QgateError>;

/// Error type for qgate operations.
#[derive(Debug, Error)]
pub enum QgateError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No git repository above the starting directory
    #[error("No .git directory found above {start}")]
    GitDirNotFound { start: PathBuf },

    // =========================================================================
    // Command Errors
    // =========================================================================
    /// The shell could not be started for a command
    #[error("Failed to start `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran past its deadline and was killed
    #[error("`{command}` timed out after {timeout_secs}s")]
    CommandTimeout { command: String, timeout_secs: u64 },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Logging could not be initialized
    #[error("Failed to initialize logging: {message}")]
    LoggingInit { message: String },

    /// Internal error (bug in qgate)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl QgateError {
    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigNotFound error with source
    pub fn config_not_found_with_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a ConfigInvalid error
    pub fn config_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a command spawn error
    pub fn command_spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandSpawn {
            command: command.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Error classification helpers
    // =========================================================================

    /// Returns true if the user can reasonably retry the same invocation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CommandTimeout { .. })
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => Some("Run 'qgate --init' to create quality.yml"),
            Self::ConfigInvalid { .. } => {
                Some("Check YAML syntax - try 'qgate --validate' to see detailed errors")
            }
            Self::GitDirNotFound { .. } => Some("Run qgate from inside a git repository"),
            Self::CommandTimeout { .. } => {
                Some("Raise --command-timeout or check why the command hangs")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_error() {
        let err = QgateError::config_not_found("/repo/quality.yml");
        assert!(err.to_string().contains("Configuration not found"));
        assert!(err.is_config_error());
        assert!(!err.is_recoverable());
        assert!(err.guidance().is_some());
    }

    #[test]
    fn test_command_timeout_is_recoverable() {
        let err = QgateError::CommandTimeout {
            command: "sleep 100".into(),
            timeout_secs: 5,
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("sleep 100"));
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_error_guidance() {
        let err = QgateError::GitDirNotFound {
            start: "/tmp/project".into(),
        };
        assert_eq!(err.guidance(), Some("Run qgate from inside a git repository"));
        assert!(QgateError::internal("bug").guidance().is_none());
    }
}
