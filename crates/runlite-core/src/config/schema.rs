//! 按领域分组的配置结构体
//!
//! 从 [`EnvSource`] 加载，统一 fallback 与 `$VAR` 展开逻辑。

use std::path::{Path, PathBuf};

use super::env_keys::{install, observability as obv_keys, paths};
use super::loader::{env_bool, env_optional, env_or, expand_vars, lookup, EnvSource};
use crate::error::ConfigError;

/// Paths and commands used by the four launch steps.
///
/// Every path is already joined onto `root`; absolute settings are kept as is.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub root: PathBuf,
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    /// Kept unresolved: it may name an executable on the activated `PATH`.
    pub entry_point: String,
    pub install_cmd: Option<String>,
    pub pip_index_url: Option<String>,
    pub verify_deps: bool,
    pub skip_sync: bool,
}

impl LaunchConfig {
    pub fn from_source(root: &Path, src: &EnvSource) -> Result<Self, ConfigError> {
        let env_dir = setting(
            src,
            paths::RUNLITE_ENV_DIR,
            paths::ENV_DIR_ALIASES,
            paths::DEFAULT_ENV_DIR,
        )?;
        let manifest = setting(
            src,
            paths::RUNLITE_MANIFEST,
            paths::MANIFEST_ALIASES,
            paths::DEFAULT_MANIFEST,
        )?;
        let entry_point = setting(
            src,
            paths::RUNLITE_ENTRY_POINT,
            paths::ENTRY_POINT_ALIASES,
            paths::DEFAULT_ENTRY_POINT,
        )?;

        Ok(Self {
            root: root.to_path_buf(),
            env_dir: root.join(env_dir),
            manifest: root.join(manifest),
            entry_point,
            install_cmd: optional_setting(src, install::RUNLITE_INSTALL_CMD, &[])?,
            pip_index_url: optional_setting(
                src,
                install::RUNLITE_PIP_INDEX_URL,
                install::PIP_INDEX_URL_ALIASES,
            )?,
            verify_deps: env_bool(src, install::RUNLITE_VERIFY_DEPS, &[], false)?,
            skip_sync: env_bool(src, install::RUNLITE_SKIP_SYNC, &[], false)?,
        })
    }

    /// `RUNLITE_ROOT`, expanded. `None` means "use the launcher's own directory".
    pub fn root_override(src: &EnvSource) -> Result<Option<PathBuf>, ConfigError> {
        Ok(optional_setting(src, paths::RUNLITE_ROOT, &[])?.map(PathBuf::from))
    }
}

fn optional_setting(
    src: &EnvSource,
    primary: &str,
    aliases: &[&str],
) -> Result<Option<String>, ConfigError> {
    let Some((key, raw)) = lookup(src, primary, aliases) else {
        return Ok(None);
    };
    let value = expand_vars(key, &raw, src)?;
    if value.trim().is_empty() {
        return Err(ConfigError::Empty {
            key: key.to_string(),
        });
    }
    Ok(Some(value))
}

fn setting(
    src: &EnvSource,
    primary: &str,
    aliases: &[&str],
    default: &str,
) -> Result<String, ConfigError> {
    Ok(optional_setting(src, primary, aliases)?.unwrap_or_else(|| default.to_string()))
}

/// 可观测性配置：quiet、log_level、log_json、audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Invalid booleans fall back to their defaults.
    pub fn from_source(src: &EnvSource) -> Self {
        let quiet = env_bool(src, obv_keys::RUNLITE_QUIET, &[], false).unwrap_or(false);
        let log_level = env_or(src, obv_keys::RUNLITE_LOG_LEVEL, &[], || {
            obv_keys::DEFAULT_LOG_LEVEL.to_string()
        });
        let log_json = env_bool(src, obv_keys::RUNLITE_LOG_JSON, &[], false).unwrap_or(false);
        let audit_log = env_optional(src, obv_keys::RUNLITE_AUDIT_LOG, &[]).map(PathBuf::from);
        Self {
            quiet,
            log_level,
            log_json,
            audit_log,
        }
    }

    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| Self::from_source(&EnvSource::process()))
    }
}
