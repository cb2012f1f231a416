use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced while retrieving and decoding a remote resource.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status code {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("failed to decompress gzip body: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("response body is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl FetchError {
    /// Network failures: connection, timeout or a non-2xx status.
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Http(_) | FetchError::Status { .. })
    }

    /// Body could not be turned into text or parsed as JSON.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            FetchError::Gzip(_) | FetchError::Utf8(_) | FetchError::Json(_)
        )
    }
}

/// The fetched document does not have the shape of a channel catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("expected a JSON document, got raw content")]
    NotJson,

    #[error("catalog has no top-level \"channels\" field")]
    MissingChannels,

    #[error("invalid channel entry \"{id}\": {source}")]
    InvalidChannel {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("\"channels\" is not an object keyed by channel id")]
    ChannelsNotAMap,
}

/// Why a source produced no playlist.
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("unusable catalog: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SortError {
    #[error("channel \"{id}\" has a non-numeric channel number: {value}")]
    InvalidChannelNumber { id: String, value: String },
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SourceError {
    #[error("source name must not be empty")]
    EmptyName,

    #[error("source name {0:?} is not a plain file name")]
    InvalidName(String),

    #[error("duplicate source name: {0}")]
    DuplicateName(String),

    #[error("invalid {field} for source {name}: {reason}")]
    InvalidUrl {
        name: String,
        field: &'static str,
        reason: String,
    },

    #[error("stream url template for source {0} has no {{id}} placeholder")]
    MissingPlaceholder(String),
}
