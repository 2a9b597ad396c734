//! Child-process stages and shell-compatible exit statuses.
//!
//! Stdio is inherited: whatever the child prints is what the user sees.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Instant;

use crate::activation::ActiveEnvironment;
use crate::error::StepFailure;

/// Status for a program that could not be found (as in `sh`).
pub const STATUS_NOT_FOUND: i32 = 127;
/// Status for a program that was found but could not be executed.
pub const STATUS_NOT_EXECUTABLE: i32 = 126;

/// One child process run inside the activated environment.
#[derive(Debug, Clone)]
pub struct Stage {
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
}

/// Finished stage, as a shell would report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageOutcome {
    pub status: i32,
}

impl StageOutcome {
    /// `code` when the child exited, `128 + signal` when it was killed.
    pub fn from_exit_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self { status: code };
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self {
                    status: 128 + signal,
                };
            }
        }
        Self { status: 1 }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Status for a child that could not be started.
pub fn spawn_status(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::NotFound => STATUS_NOT_FOUND,
        _ => STATUS_NOT_EXECUTABLE,
    }
}

impl Stage {
    pub fn new(label: impl Into<String>, program: impl Into<PathBuf>, cwd: &Path) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command this stage runs, with the activation overlay applied.
    pub fn command(&self, env: &ActiveEnvironment) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        env.apply(&mut cmd);
        cmd
    }

    /// Run to completion. Spawn failures become [`StepFailure::Spawn`].
    pub fn run(&self, env: &ActiveEnvironment) -> Result<StageOutcome, StepFailure> {
        tracing::info!(
            stage = %self.label,
            program = %self.program.display(),
            args = ?self.args,
            "running stage"
        );
        let start = Instant::now();
        let status = self
            .command(env)
            .status()
            .map_err(|source| StepFailure::Spawn {
                stage: self.label.clone(),
                program: self.program.display().to_string(),
                status: spawn_status(&source),
                source,
            })?;
        let outcome = StageOutcome::from_exit_status(status);
        tracing::debug!(
            stage = %self.label,
            status = outcome.status,
            duration_ms = start.elapsed().as_millis() as u64,
            "stage finished"
        );
        Ok(outcome)
    }

    /// Run and fail on any non-zero status.
    pub fn run_checked(&self, env: &ActiveEnvironment) -> Result<(), StepFailure> {
        let outcome = self.run(env)?;
        if outcome.success() {
            Ok(())
        } else {
            Err(StepFailure::Exited {
                stage: self.label.clone(),
                status: outcome.status,
            })
        }
    }
}

/// Run stages in order; the first failing stage fails the whole sequence.
pub fn run_all(stages: &[Stage], env: &ActiveEnvironment) -> Result<(), StepFailure> {
    for stage in stages {
        stage.run_checked(env)?;
    }
    Ok(())
}
