//! runlite 统一配置层
//!
//! 所有环境变量读取集中在此模块，启动器通过结构化配置访问，避免直接 `std::env::var`。
//!
//! - `loader`：EnvSource、.env 解析、env_or / env_optional / env_bool、`$VAR` 严格展开
//! - `schema`：LaunchConfig、ObservabilityConfig
//! - `env_keys`：key 常量与别名

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{
    env_bool, env_optional, env_or, expand_vars, load_dotenv_from_dir, parse_dotenv, EnvSource,
};
pub use schema::{LaunchConfig, ObservabilityConfig};
