use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid sequence number '{0}'")]
    InvalidSequence(String),
    #[error("unknown gender '{0}'")]
    InvalidGender(String),
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
