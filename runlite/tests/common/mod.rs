//! Fake project shared by the launcher integration tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Project root with a `.venv/bin/python` shell script that logs every call
/// as `<args> | cwd=<pwd> | venv=<VIRTUAL_ENV>` and exits 0.
pub struct Project {
    dir: tempfile::TempDir,
    log: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let log = root.join("calls.log");
        let bin = root.join(".venv").join("bin");
        fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python");
        fs::write(
            &python,
            format!(
                "#!/bin/sh\n\
                 echo \"$* | cwd=$(pwd) | venv=$VIRTUAL_ENV\" >> '{}'\n\
                 exit 0\n",
                log.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(root.join("requirements.txt"), "pandas\n").unwrap();
        fs::write(root.join("ingest_and_export.py"), "print('ok')\n").unwrap();
        Self { dir, log }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().unwrap()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|c| c.lines().map(String::from).collect())
            .unwrap_or_default()
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|c| c.lines().map(String::from).collect())
        .unwrap_or_default()
}
