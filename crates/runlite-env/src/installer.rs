//! Step 3: synchronize the dependency manifest into the activated environment.
//!
//! The installer itself is a black box. The built-in [`PipInstaller`] runs
//! `python -m pip install -r <manifest>`; [`CommandInstaller`] runs a
//! configured command template instead (e.g. `uv pip sync {manifest}`).
//! Either may add a `pip check` verification stage.

use std::path::{Path, PathBuf};

use anyhow::Context;
use runlite_core::config::LaunchConfig;

use crate::activation::ActiveEnvironment;
use crate::error::StepFailure;
use crate::runtime_resolver::resolve_program;
use crate::stage::{run_all, Stage};

/// The dependency manifest. Read, never written.
#[derive(Debug, Clone)]
pub struct DependencyManifest {
    path: PathBuf,
    declared: usize,
}

impl DependencyManifest {
    /// Open an existing manifest. Missing or unreadable fails the sync step.
    pub fn open(path: &Path) -> Result<Self, StepFailure> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Read dependency manifest {}", path.display()))
            .map_err(|source| StepFailure::Unavailable {
                path: path.to_path_buf(),
                status: 1,
                source,
            })?;
        let declared = declared_entries(&content).count();
        tracing::debug!(manifest = %path.display(), declared, "dependency manifest loaded");
        Ok(Self {
            path: path.to_path_buf(),
            declared,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of non-empty, non-comment lines.
    pub fn declared(&self) -> usize {
        self.declared
    }
}

/// Non-empty lines that are not `#` comments.
pub fn declared_entries(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

/// Produces the stages that bring the environment in line with the manifest.
pub trait DependencyInstaller {
    fn name(&self) -> &str;

    /// Stages in order. Sync succeeds only if every stage succeeds.
    fn stages(
        &self,
        manifest: &DependencyManifest,
        env: &ActiveEnvironment,
        cwd: &Path,
    ) -> Vec<Stage>;
}

/// `python -m pip install -r <manifest>` with the environment's interpreter.
#[derive(Debug, Clone, Default)]
pub struct PipInstaller {
    pub index_url: Option<String>,
    pub verify: bool,
}

impl DependencyInstaller for PipInstaller {
    fn name(&self) -> &str {
        "pip"
    }

    fn stages(
        &self,
        manifest: &DependencyManifest,
        env: &ActiveEnvironment,
        cwd: &Path,
    ) -> Vec<Stage> {
        let mut install = Stage::new("pip install", env.python(), cwd)
            .args(["-m", "pip", "install", "--disable-pip-version-check", "-r"])
            .arg(manifest.path());
        if let Some(ref url) = self.index_url {
            install = install.args(["--index-url", url.as_str()]);
        }
        let mut stages = vec![install];
        if self.verify {
            stages.push(pip_check(env, cwd));
        }
        stages
    }
}

/// Whitespace-separated command template. `{manifest}` and `{python}` are
/// substituted per token; quoting is not supported.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    pub template: String,
    pub verify: bool,
}

impl DependencyInstaller for CommandInstaller {
    fn name(&self) -> &str {
        &self.template
    }

    fn stages(
        &self,
        manifest: &DependencyManifest,
        env: &ActiveEnvironment,
        cwd: &Path,
    ) -> Vec<Stage> {
        let manifest_str = manifest.path().display().to_string();
        let python_str = env.python().display().to_string();
        let mut tokens = self.template.split_whitespace().map(|t| {
            t.replace("{manifest}", &manifest_str)
                .replace("{python}", &python_str)
        });

        let mut stages = Vec::new();
        if let Some(program) = tokens.next() {
            let program = resolve_program(&program, env.path_var(), cwd);
            stages.push(Stage::new("install", program, cwd).args(tokens));
        }
        if self.verify {
            stages.push(pip_check(env, cwd));
        }
        stages
    }
}

fn pip_check(env: &ActiveEnvironment, cwd: &Path) -> Stage {
    Stage::new("pip check", env.python(), cwd).args(["-m", "pip", "check"])
}

/// Installer selected by configuration: the command template when set, pip otherwise.
pub fn installer_for(cfg: &LaunchConfig) -> Box<dyn DependencyInstaller> {
    match cfg.install_cmd {
        Some(ref template) => Box::new(CommandInstaller {
            template: template.clone(),
            verify: cfg.verify_deps,
        }),
        None => Box::new(PipInstaller {
            index_url: cfg.pip_index_url.clone(),
            verify: cfg.verify_deps,
        }),
    }
}

/// Run every installer stage against the manifest. Fails on the first failing stage.
pub fn sync(
    installer: &dyn DependencyInstaller,
    manifest: &DependencyManifest,
    env: &ActiveEnvironment,
    cwd: &Path,
) -> Result<(), StepFailure> {
    let stages = installer.stages(manifest, env, cwd);
    tracing::info!(
        installer = installer.name(),
        manifest = %manifest.path().display(),
        declared = manifest.declared(),
        stages = stages.len(),
        "synchronizing dependencies"
    );
    run_all(&stages, env)
}
