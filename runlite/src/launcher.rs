//! The launcher: four fail-fast steps, strictly in order.
//!
//! `Start → DirectoryResolved → EnvironmentActive → DependenciesSynced →
//! PipelineRunning → {Success | Failure}`. The first failing step ends the run;
//! nothing is retried and no state is revisited.

use std::fmt;
use std::time::Instant;

use runlite_core::config::{EnvSource, LaunchConfig};
use runlite_core::observability;
use runlite_env::installer::{installer_for, sync};
use runlite_env::{ActiveEnvironment, DependencyManifest, LaunchError, PipelineEntry, WorkingDir};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Start,
    DirectoryResolved,
    EnvironmentActive,
    DependenciesSynced,
    PipelineRunning,
    Success,
    Failure,
}

impl LaunchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::DirectoryResolved => "directory_resolved",
            Self::EnvironmentActive => "environment_active",
            Self::DependenciesSynced => "dependencies_synced",
            Self::PipelineRunning => "pipeline_running",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct Launcher {
    state: LaunchState,
    /// Last non-terminal state reached; tells where a failed run stopped.
    reached: LaunchState,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher {
    pub fn new() -> Self {
        Self {
            state: LaunchState::Start,
            reached: LaunchState::Start,
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    pub fn reached(&self) -> LaunchState {
        self.reached
    }

    /// Full run from the launcher's own location: resolves and enters the
    /// directory, loads `.env` from it, then runs the remaining steps.
    pub fn run(&mut self) -> Result<(), LaunchError> {
        let result = self.resolve_directory().and_then(|workdir| {
            let source = EnvSource::with_dotenv(workdir.path())?;
            self.run_steps(&workdir, &source)
        });
        self.finish(result)
    }

    /// Steps 2–4 against an already resolved directory. Leaves the process cwd alone.
    pub fn run_in(&mut self, workdir: &WorkingDir, source: &EnvSource) -> Result<(), LaunchError> {
        self.advance(LaunchState::DirectoryResolved);
        let result = self.run_steps(workdir, source);
        self.finish(result)
    }

    /// Step 1. Audit records for it are written only once the directory is
    /// known, so a relative `RUNLITE_AUDIT_LOG` is anchored there first.
    fn resolve_directory(&mut self) -> Result<WorkingDir, LaunchError> {
        let start = Instant::now();
        let result = LaunchConfig::root_override(&EnvSource::process())
            .map_err(LaunchError::from)
            .and_then(|root| {
                let workdir = WorkingDir::resolve(root.as_deref())?;
                workdir.enter()?;
                Ok(workdir)
            });
        match &result {
            Ok(workdir) => observability::anchor_audit_log(workdir.path()),
            Err(_) => {
                if let Ok(cwd) = std::env::current_dir() {
                    observability::anchor_audit_log(&cwd);
                }
            }
        }
        observability::audit_step_started("directory_resolution", "current executable");
        let status = result.as_ref().map_or_else(LaunchError::exit_code, |_| 0);
        observability::audit_step_finished(
            "directory_resolution",
            status,
            start.elapsed().as_millis() as u64,
        );
        let workdir = result?;
        self.advance(LaunchState::DirectoryResolved);
        Ok(workdir)
    }

    fn run_steps(&mut self, workdir: &WorkingDir, source: &EnvSource) -> Result<(), LaunchError> {
        let root = workdir.path();
        let cfg = LaunchConfig::from_source(root, source)?;
        tracing::debug!(?cfg, "launch configuration");

        let env_detail = cfg.env_dir.display().to_string();
        let env = timed("environment_activation", &env_detail, || {
            ActiveEnvironment::activate(&cfg.env_dir)
        })?;
        self.advance(LaunchState::EnvironmentActive);

        if cfg.skip_sync {
            tracing::info!("dependency sync skipped (RUNLITE_SKIP_SYNC)");
        } else {
            let manifest_detail = cfg.manifest.display().to_string();
            timed("dependency_sync", &manifest_detail, || {
                let manifest =
                    DependencyManifest::open(&cfg.manifest).map_err(LaunchError::DependencySync)?;
                let installer = installer_for(&cfg);
                sync(installer.as_ref(), &manifest, &env, root).map_err(LaunchError::DependencySync)
            })?;
        }
        self.advance(LaunchState::DependenciesSynced);

        let entry = PipelineEntry::new(cfg.entry_point.as_str());
        self.advance(LaunchState::PipelineRunning);
        timed("pipeline", entry.as_str(), || {
            entry.run(&env, root).map_err(LaunchError::PipelineExecution)
        })
    }

    fn advance(&mut self, next: LaunchState) {
        tracing::debug!(from = %self.state, to = %next, "launch state");
        self.state = next;
        self.reached = next;
    }

    fn finish(&mut self, result: Result<(), LaunchError>) -> Result<(), LaunchError> {
        self.state = if result.is_ok() {
            LaunchState::Success
        } else {
            LaunchState::Failure
        };
        result
    }
}

/// Run one step, recording its start, status and duration in the audit log.
fn timed<T>(
    step: &str,
    detail: &str,
    f: impl FnOnce() -> Result<T, LaunchError>,
) -> Result<T, LaunchError> {
    observability::audit_step_started(step, detail);
    let start = Instant::now();
    let result = f();
    let status = result.as_ref().map_or_else(LaunchError::exit_code, |_| 0);
    observability::audit_step_finished(step, status, start.elapsed().as_millis() as u64);
    result
}
