//! Step 2: activate a pre-existing virtual environment.
//!
//! Activation never touches the launcher's own environment variables. The
//! [`ActiveEnvironment`] handle carries the overlay (`VIRTUAL_ENV`, `PATH`,
//! no `PYTHONHOME`) and applies it to every child command; dropping the handle
//! ends the scope.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::LaunchError;

/// Interpreter layout inside an environment directory.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Path to the environment's Python interpreter
    pub python: PathBuf,
    /// `bin/` (unix) or `Scripts/` (Windows); prepended to `PATH`
    pub bin_dir: PathBuf,
    /// Environment root, exported as `VIRTUAL_ENV`
    pub env_dir: PathBuf,
}

/// Interpreter locations checked in order.
const INTERPRETERS: &[(&str, &str)] = &[
    ("bin", "python"),
    ("bin", "python3"),
    ("Scripts", "python.exe"),
];

impl RuntimePaths {
    /// Locate the interpreter of an existing environment; `None` if there is none.
    pub fn locate(env_dir: &Path) -> Option<Self> {
        INTERPRETERS.iter().find_map(|(bin, exe)| {
            let python = env_dir.join(bin).join(exe);
            python.is_file().then(|| Self {
                python,
                bin_dir: env_dir.join(bin),
                env_dir: env_dir.to_path_buf(),
            })
        })
    }
}

/// Exclusively owned, scoped handle to the activated environment.
#[derive(Debug)]
pub struct ActiveEnvironment {
    paths: RuntimePaths,
    path_var: OsString,
}

impl ActiveEnvironment {
    /// Activate `env_dir` on top of the inherited `PATH`. The environment must
    /// already exist; it is never created here.
    pub fn activate(env_dir: &Path) -> Result<Self, LaunchError> {
        Self::activate_with_path(env_dir, std::env::var_os("PATH"))
    }

    pub fn activate_with_path(
        env_dir: &Path,
        inherited_path: Option<OsString>,
    ) -> Result<Self, LaunchError> {
        let fail = |reason: &str| LaunchError::EnvironmentActivation {
            path: env_dir.to_path_buf(),
            reason: reason.to_string(),
        };

        if !env_dir.exists() {
            return Err(fail("directory does not exist"));
        }
        if !env_dir.is_dir() {
            return Err(fail("not a directory"));
        }
        let paths = RuntimePaths::locate(env_dir)
            .ok_or_else(|| fail("no Python interpreter under bin/ or Scripts/"))?;

        let mut dirs = vec![paths.bin_dir.clone()];
        if let Some(ref inherited) = inherited_path {
            dirs.extend(std::env::split_paths(inherited));
        }
        let path_var = std::env::join_paths(dirs).map_err(|e| fail(&e.to_string()))?;

        tracing::debug!(
            env = %paths.env_dir.display(),
            python = %paths.python.display(),
            "environment activated"
        );
        Ok(Self { paths, path_var })
    }

    pub fn paths(&self) -> &RuntimePaths {
        &self.paths
    }

    pub fn python(&self) -> &Path {
        &self.paths.python
    }

    /// `PATH` as seen by children: the environment's bin dir first.
    pub fn path_var(&self) -> &OsStr {
        &self.path_var
    }

    /// Apply the activation overlay to a child command.
    pub fn apply(&self, cmd: &mut Command) {
        cmd.env("VIRTUAL_ENV", &self.paths.env_dir)
            .env("PATH", &self.path_var)
            .env_remove("PYTHONHOME");
    }
}

impl Drop for ActiveEnvironment {
    fn drop(&mut self) {
        tracing::debug!(env = %self.paths.env_dir.display(), "environment released");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    /// Environment directory with an (empty) `bin/python`.
    pub(crate) fn fake_env(root: &Path) -> PathBuf {
        let env_dir = root.join(".venv");
        fs::create_dir_all(env_dir.join("bin")).unwrap();
        fs::write(env_dir.join("bin").join("python"), b"").unwrap();
        env_dir
    }

    #[test]
    fn test_activate_missing_env_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ActiveEnvironment::activate(&tmp.path().join(".venv")).unwrap_err();
        match err {
            LaunchError::EnvironmentActivation { reason, .. } => {
                assert_eq!(reason, "directory does not exist")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_activate_does_not_create_env() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = tmp.path().join(".venv");
        let _ = ActiveEnvironment::activate(&env_dir);
        assert!(!env_dir.exists());
    }

    #[test]
    fn test_activate_without_interpreter_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = tmp.path().join(".venv");
        fs::create_dir_all(env_dir.join("bin")).unwrap();
        let err = ActiveEnvironment::activate(&env_dir).unwrap_err();
        assert!(err.to_string().contains("no Python interpreter"));
    }

    #[test]
    fn test_activate_prepends_bin_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = fake_env(tmp.path());
        let inherited = std::env::join_paths(["/usr/local/bin", "/usr/bin"]).unwrap();

        let env = ActiveEnvironment::activate_with_path(&env_dir, Some(inherited)).unwrap();
        let dirs: Vec<PathBuf> = std::env::split_paths(env.path_var()).collect();
        assert_eq!(dirs[0], env_dir.join("bin"));
        assert_eq!(dirs[1], PathBuf::from("/usr/local/bin"));
        assert_eq!(dirs.len(), 3);
        assert_eq!(env.python(), env_dir.join("bin").join("python"));
    }

    #[test]
    fn test_locate_falls_back_to_python3() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = tmp.path().join("env");
        fs::create_dir_all(env_dir.join("bin")).unwrap();
        fs::write(env_dir.join("bin").join("python3"), b"").unwrap();
        let paths = RuntimePaths::locate(&env_dir).unwrap();
        assert!(paths.python.ends_with("bin/python3"));
    }

    #[test]
    fn test_apply_sets_overlay() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = fake_env(tmp.path());
        let env = ActiveEnvironment::activate_with_path(&env_dir, None).unwrap();

        let mut cmd = Command::new("true");
        env.apply(&mut cmd);
        let vars: Vec<(&OsStr, Option<&OsStr>)> = cmd.get_envs().collect();
        assert!(vars.contains(&(OsStr::new("VIRTUAL_ENV"), Some(env_dir.as_os_str()))));
        assert!(vars.contains(&(OsStr::new("PYTHONHOME"), None)));
        assert!(vars.iter().any(|(k, _)| *k == OsStr::new("PATH")));
    }
}
