//! Error types for tileset walking.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a tileset or processing one of its tiles.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("access token is not a valid header value")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("cannot resolve {uri} against {base}")]
    Resolve { base: String, uri: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid tileset: {0}")]
    Tileset(#[source] serde_json::Error),

    #[error("{uri}: {source}")]
    Decode {
        uri: String,
        source: b3dm_decode::FormatError,
    },

    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for tileset operations.
pub type Result<T> = std::result::Result<T, Error>;
