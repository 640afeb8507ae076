use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Search request failed ({}): {context}", status_label(.status))]
    SearchFailed {
        status: Option<StatusCode>,
        context: String,
    },
    #[error("Malformed response from {context}: {source}")]
    ResponseParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Storage IO error at '{}': {source}", .path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Stored data at '{}' is not a vacancy list: {source}", .path.display())]
    StorageFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),
    #[error("Invalid vacancy: {0}")]
    InvalidVacancy(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn status_label(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "no response".to_string(),
    }
}

impl Error {
    pub(crate) fn storage_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::StorageIo {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by a `SearchFailed`, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::SearchFailed { status, .. } => *status,
            _ => None,
        }
    }
}
