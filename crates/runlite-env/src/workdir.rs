//! Step 1: resolve the launcher's own directory and make it the working directory.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::LaunchError;

/// The launcher directory. Resolved once, canonical, never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDir {
    path: PathBuf,
}

impl WorkingDir {
    /// Directory of the running executable, or `root_override` when given.
    pub fn resolve(root_override: Option<&Path>) -> Result<Self, LaunchError> {
        let exe = std::env::current_exe().map_err(|source| LaunchError::DirectoryResolution {
            what: "current executable".to_string(),
            source,
        })?;
        Self::resolve_from(&exe, root_override)
    }

    /// Like [`WorkingDir::resolve`] for a known executable path. A relative override
    /// is taken relative to the executable's directory, never the caller's cwd.
    pub fn resolve_from(exe: &Path, root_override: Option<&Path>) -> Result<Self, LaunchError> {
        let exe_dir = Self::from_executable(exe)?;
        match root_override {
            None => Ok(exe_dir),
            Some(root) if root.is_absolute() => Self::from_dir(root),
            Some(root) => Self::from_dir(&exe_dir.path.join(root)),
        }
    }

    /// Directory containing `exe`, with symlinks resolved.
    pub fn from_executable(exe: &Path) -> Result<Self, LaunchError> {
        let exe = exe
            .canonicalize()
            .map_err(|source| resolution_error(exe, source))?;
        let dir = exe.parent().ok_or_else(|| {
            resolution_error(&exe, io::Error::other("executable has no parent directory"))
        })?;
        Self::from_dir(dir)
    }

    pub fn from_dir(dir: &Path) -> Result<Self, LaunchError> {
        let path = dir
            .canonicalize()
            .map_err(|source| resolution_error(dir, source))?;
        if !path.is_dir() {
            return Err(resolution_error(&path, io::Error::other("not a directory")));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make this the process working directory.
    pub fn enter(&self) -> Result<(), LaunchError> {
        std::env::set_current_dir(&self.path).map_err(|source| resolution_error(&self.path, source))?;
        tracing::debug!(dir = %self.path.display(), "entered launcher directory");
        Ok(())
    }
}

fn resolution_error(path: &Path, source: io::Error) -> LaunchError {
    LaunchError::DirectoryResolution {
        what: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_from_executable_uses_parent_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("runlite");
        fs::write(&exe, b"").unwrap();
        let wd = WorkingDir::from_executable(&exe).unwrap();
        assert_eq!(wd.path(), tmp.path().canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_from_executable_follows_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("project");
        let bin = tmp.path().join("bin");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&bin).unwrap();
        fs::write(project.join("runlite"), b"").unwrap();
        std::os::unix::fs::symlink(project.join("runlite"), bin.join("runlite")).unwrap();

        let wd = WorkingDir::from_executable(&bin.join("runlite")).unwrap();
        assert_eq!(wd.path(), project.canonicalize().unwrap());
    }

    #[test]
    fn test_relative_override_is_relative_to_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("runlite");
        fs::write(&exe, b"").unwrap();
        fs::create_dir_all(tmp.path().join("pipeline")).unwrap();

        let wd = WorkingDir::resolve_from(&exe, Some(Path::new("pipeline"))).unwrap();
        assert_eq!(wd.path(), tmp.path().join("pipeline").canonicalize().unwrap());
    }

    #[test]
    fn test_absolute_override() {
        let tmp = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let exe = tmp.path().join("runlite");
        fs::write(&exe, b"").unwrap();

        let wd = WorkingDir::resolve_from(&exe, Some(other.path())).unwrap();
        assert_eq!(wd.path(), other.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = WorkingDir::from_dir(&tmp.path().join("gone")).unwrap_err();
        assert!(matches!(err, LaunchError::DirectoryResolution { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file");
        fs::write(&file, b"").unwrap();
        assert!(WorkingDir::from_dir(&file).is_err());
    }
}
