use std::path::PathBuf;

use channel_playlist::{FetchError, SourceError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid source: {0}")]
    Source(#[from] SourceError),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] FetchError),

    #[error("Initialization error: {0}")]
    Initialization(String),
}
