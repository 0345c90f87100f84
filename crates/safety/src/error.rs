use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or checking ride files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ride file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read ride file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse ride file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid safety config: {0}")]
    Validation(String),
}
