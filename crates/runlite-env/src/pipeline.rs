//! Step 4: run the pipeline entry point inside the activated environment.

use std::path::Path;

use anyhow::anyhow;

use crate::activation::ActiveEnvironment;
use crate::error::StepFailure;
use crate::runtime_resolver::{detect_language, resolve_program, RuntimeResolver};
use crate::stage::{Stage, STATUS_NOT_FOUND};

/// The external ingest/export program. Invoked with no arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineEntry {
    raw: String,
}

impl PipelineEntry {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Build the stage: scripts run under the environment's interpreter,
    /// anything else is executed directly.
    pub fn stage(&self, env: &ActiveEnvironment, root: &Path) -> Result<Stage, StepFailure> {
        let Some(language) = detect_language(&self.raw) else {
            let program = resolve_program(&self.raw, env.path_var(), root);
            return Ok(Stage::new(self.raw.as_str(), program, root));
        };

        let script = root.join(&self.raw);
        if !script.is_file() {
            return Err(StepFailure::Unavailable {
                path: script,
                status: STATUS_NOT_FOUND,
                source: anyhow!("pipeline script not found"),
            });
        }
        let runtime = env.paths().resolve(language).ok_or_else(|| StepFailure::Unavailable {
            path: script.clone(),
            status: STATUS_NOT_FOUND,
            source: anyhow!("no interpreter for {language}"),
        })?;
        Ok(Stage::new(self.raw.as_str(), runtime.interpreter, root).arg(self.raw.as_str()))
    }

    /// Run to completion; any non-zero status is a failure carrying that status.
    pub fn run(&self, env: &ActiveEnvironment, root: &Path) -> Result<(), StepFailure> {
        self.stage(env, root)?.run_checked(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::tests::fake_env;
    use std::fs;

    #[test]
    fn test_python_entry_runs_under_env_interpreter() {
        let tmp = tempfile::tempdir().unwrap();
        let env = ActiveEnvironment::activate(&fake_env(tmp.path())).unwrap();
        fs::write(tmp.path().join("ingest_and_export.py"), "print('hi')\n").unwrap();

        let stage = PipelineEntry::new("ingest_and_export.py")
            .stage(&env, tmp.path())
            .unwrap();
        assert_eq!(stage.program, env.python());
        assert_eq!(stage.args, vec![std::ffi::OsString::from("ingest_and_export.py")]);
        assert_eq!(stage.cwd, tmp.path());
    }

    #[test]
    fn test_missing_script_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let env = ActiveEnvironment::activate(&fake_env(tmp.path())).unwrap();
        let err = PipelineEntry::new("ingest_and_export.py")
            .stage(&env, tmp.path())
            .unwrap_err();
        assert_eq!(err.status(), STATUS_NOT_FOUND);
    }

    #[test]
    fn test_executable_entry_has_no_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        let env = ActiveEnvironment::activate(&fake_env(tmp.path())).unwrap();
        let stage = PipelineEntry::new("bin/etl").stage(&env, tmp.path()).unwrap();
        assert_eq!(stage.program, tmp.path().join("bin/etl"));
        assert!(stage.args.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_found_on_activated_path() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let env_dir = fake_env(tmp.path());
        let tool = env_dir.join("bin").join("ingest-export");
        fs::write(&tool, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        let env = ActiveEnvironment::activate(&env_dir).unwrap();

        let stage = PipelineEntry::new("ingest-export").stage(&env, tmp.path()).unwrap();
        assert_eq!(stage.program, tool);
    }
}
