mod config;
mod credential;
mod import;
mod oauth;
mod tubeport;

pub use config::ConfigError;
pub use credential::CredentialError;
pub use import::{ApiError, ExtractionError, InputError};
pub use oauth::OauthError;
pub use tubeport::TubeportError;
