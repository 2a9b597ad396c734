//! The four launch steps as standalone primitives.
//!
//! `workdir` resolves and enters the launcher directory, `activation` scopes an
//! existing virtual environment, `installer` synchronizes the dependency manifest,
//! `pipeline` runs the entry point. Every child process goes through `stage`.

pub mod activation;
pub mod error;
pub mod installer;
pub mod pipeline;
pub mod runtime_resolver;
pub mod stage;
pub mod workdir;

pub use activation::{ActiveEnvironment, RuntimePaths};
pub use error::LaunchError;
pub use installer::{CommandInstaller, DependencyInstaller, DependencyManifest, PipInstaller};
pub use pipeline::PipelineEntry;
pub use stage::{Stage, StageOutcome};
pub use workdir::WorkingDir;
