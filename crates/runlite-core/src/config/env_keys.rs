//! 环境变量 key 常量与别名定义
//!
//! 主变量使用 `RUNLITE_*`，别名按顺序作为 fallback。

/// 工作目录、运行环境、依赖清单、流水线入口
pub mod paths {
    /// Overrides the launcher's own directory. Read from the process environment only,
    /// since `.env` lives inside the directory it would select.
    pub const RUNLITE_ROOT: &str = "RUNLITE_ROOT";

    pub const RUNLITE_ENV_DIR: &str = "RUNLITE_ENV_DIR";
    pub const ENV_DIR_ALIASES: &[&str] = &["RUNLITE_VENV"];
    pub const DEFAULT_ENV_DIR: &str = ".venv";

    pub const RUNLITE_MANIFEST: &str = "RUNLITE_MANIFEST";
    pub const MANIFEST_ALIASES: &[&str] = &["RUNLITE_REQUIREMENTS"];
    pub const DEFAULT_MANIFEST: &str = "requirements.txt";

    pub const RUNLITE_ENTRY_POINT: &str = "RUNLITE_ENTRY_POINT";
    pub const ENTRY_POINT_ALIASES: &[&str] = &["RUNLITE_PIPELINE"];
    pub const DEFAULT_ENTRY_POINT: &str = "ingest_and_export.py";
}

/// 依赖同步
pub mod install {
    /// Installer command template. `{manifest}` and `{python}` are substituted.
    pub const RUNLITE_INSTALL_CMD: &str = "RUNLITE_INSTALL_CMD";

    pub const RUNLITE_PIP_INDEX_URL: &str = "RUNLITE_PIP_INDEX_URL";
    pub const PIP_INDEX_URL_ALIASES: &[&str] = &["PYPI_MIRROR_URL"];

    /// Run `pip check` after install as a second sync stage.
    pub const RUNLITE_VERIFY_DEPS: &str = "RUNLITE_VERIFY_DEPS";

    pub const RUNLITE_SKIP_SYNC: &str = "RUNLITE_SKIP_SYNC";
}

/// 可观测性与日志
pub mod observability {
    pub const RUNLITE_QUIET: &str = "RUNLITE_QUIET";
    pub const RUNLITE_LOG_LEVEL: &str = "RUNLITE_LOG_LEVEL";
    pub const DEFAULT_LOG_LEVEL: &str = "runlite=warn";
    pub const RUNLITE_LOG_JSON: &str = "RUNLITE_LOG_JSON";
    pub const RUNLITE_AUDIT_LOG: &str = "RUNLITE_AUDIT_LOG";
}
