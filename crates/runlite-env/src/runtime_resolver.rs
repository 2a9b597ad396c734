//! RuntimeResolver trait: maps an entry point's language to the interpreter
//! inside the activated environment.
//!
//! Implement this trait to run other kinds of entry points (e.g. a Node script)
//! without touching the pipeline step.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::activation::RuntimePaths;

/// Resolved runtime for a given language.
#[derive(Debug, Clone)]
pub struct ResolvedRuntime {
    /// Path (or bare name) of the interpreter executable
    pub interpreter: PathBuf,
}

/// Extension point for resolving interpreters by language.
pub trait RuntimeResolver {
    /// Returns `None` if the language is not supported.
    fn resolve(&self, language: &str) -> Option<ResolvedRuntime>;
}

impl RuntimeResolver for RuntimePaths {
    fn resolve(&self, language: &str) -> Option<ResolvedRuntime> {
        match language {
            "python" => Some(ResolvedRuntime {
                interpreter: self.python.clone(),
            }),
            "bash" => Some(ResolvedRuntime {
                interpreter: PathBuf::from("bash"),
            }),
            _ => None,
        }
    }
}

/// Language of a script entry point by extension; `None` means "run it directly".
pub fn detect_language(entry: &str) -> Option<&'static str> {
    match Path::new(entry).extension().and_then(OsStr::to_str) {
        Some("py") => Some("python"),
        Some("sh") => Some("bash"),
        _ => None,
    }
}

/// Whether `name` is a path (resolved against the working dir) rather than a
/// bare command name (looked up on `PATH`).
pub fn is_path_like(name: &str) -> bool {
    let p = Path::new(name);
    p.is_absolute() || p.components().count() > 1
}

/// Look up a bare executable name on the activated `PATH`.
pub fn find_executable(name: &str, path_var: &OsStr, cwd: &Path) -> Option<PathBuf> {
    which::which_in(name, Some(path_var), cwd).ok()
}

/// Resolve a program token: paths against `cwd`, bare names on `path_var`.
/// Unresolvable names are returned unchanged so the spawn reports them.
pub fn resolve_program(name: &str, path_var: &OsStr, cwd: &Path) -> PathBuf {
    if is_path_like(name) {
        cwd.join(name)
    } else {
        find_executable(name, path_var, cwd).unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("ingest_and_export.py"), Some("python"));
        assert_eq!(detect_language("scripts/run.sh"), Some("bash"));
        assert_eq!(detect_language("etl"), None);
        assert_eq!(detect_language("bin/etl.exe"), None);
    }

    #[test]
    fn test_is_path_like() {
        assert!(is_path_like("./etl"));
        assert!(is_path_like("bin/etl"));
        assert!(is_path_like("/usr/bin/etl"));
        assert!(!is_path_like("etl"));
    }

    #[test]
    fn test_runtime_paths_resolve() {
        let paths = RuntimePaths {
            python: PathBuf::from("/p/.venv/bin/python"),
            bin_dir: PathBuf::from("/p/.venv/bin"),
            env_dir: PathBuf::from("/p/.venv"),
        };
        assert_eq!(
            paths.resolve("python").unwrap().interpreter,
            PathBuf::from("/p/.venv/bin/python")
        );
        assert!(paths.resolve("ruby").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_program_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let bin = tmp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let tool = bin.join("etl-tool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let found = resolve_program("etl-tool", bin.as_os_str(), tmp.path());
        assert_eq!(found, tool);
        let missing = resolve_program("no-such-tool", bin.as_os_str(), tmp.path());
        assert_eq!(missing, PathBuf::from("no-such-tool"));
        assert_eq!(
            resolve_program("bin/etl-tool", bin.as_os_str(), tmp.path()),
            tmp.path().join("bin/etl-tool")
        );
    }
}
