use std::path::PathBuf;

use thiserror::Error;

/// Configuration failures. All of them abort the launch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}: ${name} is not set")]
    UnsetVariable { key: String, name: String },

    #[error("{key}: malformed variable reference in '{value}'")]
    BadReference { key: String, value: String },

    #[error("{key}: expected a boolean (1/0, true/false, yes/no, on/off), got '{value}'")]
    InvalidBool { key: String, value: String },

    #[error("{key} is set but empty")]
    Empty { key: String },

    #[error("failed to read {}", path.display())]
    DotenvRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
