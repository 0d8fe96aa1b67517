use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Problems with configuration or the client secret. Always fatal, and always raised
/// before any network activity.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid configuration value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("unable to read client secret file {}: {source}", .path.display())]
    ClientSecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse client secret file {}: {message}", .path.display())]
    ClientSecretParse { path: PathBuf, message: String },

    #[error("invalid OAuth endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Extract(Box::new(e))
    }
}
