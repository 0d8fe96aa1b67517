use thiserror::Error as ThisError;

use super::{ConfigError, CredentialError, InputError, OauthError};

/// Fatal errors that end the process with a non-zero exit code.
#[derive(Debug, ThisError)]
pub enum TubeportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Authorization(#[from] OauthError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
