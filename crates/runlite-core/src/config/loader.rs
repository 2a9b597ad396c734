//! 统一环境变量加载逻辑
//!
//! 变量来源分两层：进程环境优先，工作目录下的 `.env` 兜底。
//! `.env` 只解析为 map，不写回进程环境。

use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::error::ConfigError;

/// Layered variable lookup: the process environment first, then `.env` values.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    use_process: bool,
    fallback: HashMap<String, String>,
}

impl EnvSource {
    /// Process environment only.
    pub fn process() -> Self {
        Self {
            use_process: true,
            fallback: HashMap::new(),
        }
    }

    /// Process environment layered over `dir/.env`. A missing `.env` is not an error.
    pub fn with_dotenv(dir: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            use_process: true,
            fallback: load_dotenv_from_dir(dir)?,
        })
    }

    /// Fixed variables, isolated from the process environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            use_process: false,
            fallback: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if self.use_process {
            if let Ok(v) = env::var(key) {
                return Some(v);
            }
        }
        self.fallback.get(key).cloned()
    }
}

/// 解析 `.env` 内容：支持 `export ` 前缀、引号、行内 `#` 注释
pub fn parse_dotenv(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        // Strip inline comment (# not inside quotes)
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            vars.insert(key.to_string(), value.to_string());
        }
    }
    vars
}

/// 读取 `dir/.env`；文件不存在时返回空 map
pub fn load_dotenv_from_dir(dir: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let path = dir.join(".env");
    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let vars = parse_dotenv(&content);
            tracing::debug!(path = %path.display(), count = vars.len(), "loaded .env");
            Ok(vars)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(source) => Err(ConfigError::DotenvRead { path, source }),
    }
}

/// 从主变量或别名链读取，返回命中的 key 和值（空值视为未设置）
pub(crate) fn lookup<'k>(
    src: &EnvSource,
    primary: &'k str,
    aliases: &[&'k str],
) -> Option<(&'k str, String)> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .find_map(|k| {
            src.get(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| (k, v))
        })
}

/// 从主变量或别名链读取环境变量，失败时使用默认值
pub fn env_or<F>(src: &EnvSource, primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    lookup(src, primary, aliases)
        .map(|(_, v)| v)
        .unwrap_or_else(default)
}

/// 从主变量或别名链读取，返回 Option
pub fn env_optional(src: &EnvSource, primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(src, primary, aliases).map(|(_, v)| v)
}

/// 解析布尔型环境变量：1/true/yes/on 与 0/false/no/off，其他值报错
pub fn env_bool(
    src: &EnvSource,
    primary: &str,
    aliases: &[&str],
    default: bool,
) -> Result<bool, ConfigError> {
    let Some((key, value)) = lookup(src, primary, aliases) else {
        return Ok(default);
    };
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value,
        }),
    }
}

/// Expand `$NAME` / `${NAME}` references in `value` from `src`.
///
/// A reference to an unset variable is an error; a set-but-empty variable
/// expands to the empty string. `$$` is a literal `$`, and a `$` not followed
/// by a name is kept as is.
pub fn expand_vars(key: &str, value: &str, src: &EnvSource) -> Result<String, ConfigError> {
    let resolve = |name: &str| {
        src.get(name).ok_or_else(|| ConfigError::UnsetVariable {
            key: key.to_string(),
            name: name.to_string(),
        })
    };
    let bad_reference = || ConfigError::BadReference {
        key: key.to_string(),
        value: value.to_string(),
    };

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed || !is_var_name(&name) {
                    return Err(bad_reference());
                }
                out.push_str(&resolve(&name)?);
            }
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '_' || c.is_ascii_alphanumeric() {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&resolve(&name)?);
            }
            _ => out.push('$'),
        }
    }
    Ok(out)
}

fn is_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
