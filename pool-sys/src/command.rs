// SPDX-License-Identifier: GPL-3.0-only

//! External tool invocation
//!
//! Commands run to completion on the calling thread with stdout and stderr
//! captured in full. There is no timeout.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::{Result, SysError};

/// A program and its arguments, prepared but not yet run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Human-readable form used in logs and error context.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Captured output of a command that exited successfully.
///
/// Stdout is kept as raw bytes; callers decide how strictly to decode it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Capability to run an external command and capture its output.
///
/// A launch failure or a non-zero exit is an error.
pub trait CommandRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        (**self).run(invocation)
    }
}

/// Runs commands on the host with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        let rendered = invocation.render();
        debug!("Running {}", rendered);

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| SysError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SysError::CommandFailed {
                command: rendered,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Resolve a tool name to an executable path.
///
/// Absolute or relative paths are checked as given; bare names are searched
/// for in `PATH`.
pub fn locate_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| SysError::ToolNotFound(name.to_string()))
}
