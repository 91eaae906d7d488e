//! Test doubles for the [`ShellRunner`] seam.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use qgate_core::{QgateError, Result};

use crate::shell::{CommandOutput, ShellRunner};

#[derive(Debug, Clone)]
enum Response {
    Output(CommandOutput),
    SpawnError,
}

/// A [`ShellRunner`] with scripted responses.
///
/// Commands without a scripted response succeed with empty output. Every
/// call is recorded in order.
#[derive(Debug, Default)]
pub struct MockShell {
    responses: HashMap<String, Response>,
    calls: Mutex<Vec<String>>,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, command: &str, output: &str, exit_code: i32) -> Self {
        self.responses.insert(
            command.to_string(),
            Response::Output(CommandOutput::new(output, exit_code)),
        );
        self
    }

    /// Make `command` fail to start at all.
    pub fn with_spawn_error(mut self, command: &str) -> Self {
        self.responses
            .insert(command.to_string(), Response::SpawnError);
        self
    }

    /// Commands run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl ShellRunner for MockShell {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.to_string());
        }
        match self.responses.get(command) {
            Some(Response::Output(out)) => Ok(out.clone()),
            Some(Response::SpawnError) => Err(QgateError::command_spawn(
                command,
                io::Error::new(io::ErrorKind::NotFound, "shell not found"),
            )),
            None => Ok(CommandOutput::new("", 0)),
        }
    }
}
