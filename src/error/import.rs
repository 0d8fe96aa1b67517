use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// A channel reference that does not name a channel. Per row, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("invalid channel URL {input:?}: {reason}")]
pub struct ExtractionError {
    pub input: String,
    pub reason: String,
}

impl ExtractionError {
    pub(crate) fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// A rejected subscribe call. Per row, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ApiError {
    #[error(
        "YouTube API returned {status}: {message} (reason: {})",
        .reason.as_deref().unwrap_or("unknown")
    )]
    Status {
        status: StatusCode,
        reason: Option<String>,
        message: String,
    },

    #[error("YouTube API request failed: {0}")]
    Transport(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// The input file as a whole could not be read. Fatal, raised before any subscribe call.
#[derive(Debug, ThisError)]
pub enum InputError {
    #[error("unable to open input file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to read input file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
