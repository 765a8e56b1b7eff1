//! External process execution.
//!
//! Build, test and CLI probes all go through [`CommandRunner`] so the
//! integrator and tester can be exercised without spawning real processes.
use async_trait::async_trait;
use log::*;
use std::{
    fmt,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};
use tokio::{process::Command, time::timeout};

use crate::error::{ReleasewatchError, Result};

/// A program invocation with optional working directory and time limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ShellCommand {
    /// Build a command from configured `[program, args...]` parts.
    pub fn from_parts(parts: &[String]) -> Result<Self> {
        let (program, args) = parts.split_first().ok_or_else(|| {
            ReleasewatchError::invalid_config("command must not be empty")
        })?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: None,
            timeout: None,
        })
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.args.iter() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Convert a non-zero exit into an error carrying stderr.
    pub fn into_result(self, command: &ShellCommand) -> Result<Self> {
        if self.success {
            return Ok(self);
        }

        let reason = match self.code {
            Some(code) => format!("exit code {}: {}", code, self.stderr.trim()),
            None => format!("terminated by signal: {}", self.stderr.trim()),
        };

        Err(ReleasewatchError::command_failed(command.to_string(), reason))
    }
}

/// Runs external programs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion. Spawn failures and timeouts are errors; a
    /// non-zero exit is reported through [`CommandOutput::success`].
    async fn run(&self, command: &ShellCommand) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ShellCommand) -> Result<CommandOutput> {
        debug!("running command: {}", command);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = &command.cwd {
            cmd.current_dir(cwd);
        }

        let output = match command.timeout {
            Some(limit) => timeout(limit, cmd.output()).await.map_err(|_| {
                ReleasewatchError::command_failed(
                    command.to_string(),
                    format!("timed out after {}s", limit.as_secs()),
                )
            })??,
            None => cmd.output().await?,
        };

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
