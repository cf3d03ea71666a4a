use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarvestError {
    /// The author menu on the root page was missing or empty. Nothing useful
    /// can be crawled without it.
    #[error("no authors found in the navigation menu of {url}")]
    NoAuthors { url: String },

    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid comment token {token:?}: {source}")]
    CommentToken {
        token: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

pub type Result<T> = std::result::Result<T, HarvestError>;
