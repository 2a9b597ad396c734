use std::io;
use std::path::PathBuf;

use runlite_core::ConfigError;
use thiserror::Error;

/// Fatal launch failures, one variant per step (plus configuration).
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("cannot resolve launcher directory ({what})")]
    DirectoryResolution {
        what: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("runtime environment {} is not usable: {reason}", path.display())]
    EnvironmentActivation { path: PathBuf, reason: String },

    #[error("dependency sync failed")]
    DependencySync(#[source] StepFailure),

    #[error("pipeline failed")]
    PipelineExecution(#[source] StepFailure),
}

/// Why a process-running step failed.
#[derive(Debug, Error)]
pub enum StepFailure {
    /// The child ran and reported failure; its own output is the diagnostic.
    #[error("'{stage}' exited with status {status}")]
    Exited { stage: String, status: i32 },

    #[error("cannot start '{program}' for '{stage}'")]
    Spawn {
        stage: String,
        program: String,
        status: i32,
        #[source]
        source: io::Error,
    },

    #[error("{} is unavailable", path.display())]
    Unavailable {
        path: PathBuf,
        status: i32,
        #[source]
        source: anyhow::Error,
    },
}

impl StepFailure {
    pub fn status(&self) -> i32 {
        match self {
            Self::Exited { status, .. }
            | Self::Spawn { status, .. }
            | Self::Unavailable { status, .. } => *status,
        }
    }
}

impl LaunchError {
    /// Process exit status for this failure: the failing child's status when a
    /// child ran, 1 for failures inside the launcher itself.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DirectoryResolution { .. }
            | Self::Config(_)
            | Self::EnvironmentActivation { .. } => 1,
            Self::DependencySync(f) | Self::PipelineExecution(f) => f.status(),
        }
    }

    /// True when a child process already printed its own diagnostics.
    pub fn reported_by_child(&self) -> bool {
        matches!(
            self,
            Self::DependencySync(StepFailure::Exited { .. })
                | Self::PipelineExecution(StepFailure::Exited { .. })
        )
    }
}
