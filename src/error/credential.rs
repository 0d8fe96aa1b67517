use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Why no usable credential could be loaded (or one could not be stored).
///
/// Load-side variants are not fatal: they send the process into the authorization flow.
#[derive(Debug, ThisError)]
pub enum CredentialError {
    #[error("credential file {} not found", .0.display())]
    NotFound(PathBuf),

    #[error("unable to read credential file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file {} is invalid: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("unable to write credential file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to serialize credential: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("token response did not contain a usable access token")]
    EmptyAccessToken,
}
