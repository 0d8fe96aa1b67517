use super::CredentialError;
use axum::http::StatusCode;
use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Failures of the authorization handshake. All of them end the current flow attempt.
#[derive(Debug, ThisError)]
pub enum OauthError {
    #[error(
        "authorization code not found in callback (provider error: {})",
        .provider_error.as_deref().unwrap_or("none")
    )]
    MissingCode { provider_error: Option<String> },

    #[error("callback state does not match the authorization request")]
    StateMismatch,

    #[error("authorization already handled")]
    AlreadyHandled,

    #[error("credential has no refresh token")]
    MissingRefreshToken,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("OAuth2 request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OAuth2 server response error: {error}")]
    ServerResponse {
        error: String,
        description: Option<String>,
    },

    #[error("OAuth2 token endpoint parse error: {message}. Body: {body}")]
    Parse { message: String, body: String },

    #[error("failed to bind callback listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("callback listener stopped unexpectedly: {0}")]
    Listener(String),

    #[error("callback listener did not shut down within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("OAuth2 unexpected error: {message}")]
    Other { message: String },
}

impl OauthError {
    /// Status returned to the browser when this error ends a callback.
    pub fn status_code(&self) -> StatusCode {
        match self {
            OauthError::MissingCode { .. } | OauthError::StateMismatch => StatusCode::BAD_REQUEST,
            OauthError::AlreadyHandled => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

type PkgsRequestTokenError = RequestTokenError<
    HttpClientError<ReqwestClientError>,
    StandardErrorResponse<BasicErrorResponseType>,
>;

impl From<PkgsRequestTokenError> for OauthError {
    fn from(e: PkgsRequestTokenError) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => OauthError::ServerResponse {
                error: err.error().to_string(),
                description: err.error_description().cloned(),
            },
            RequestTokenError::Request(wrapper) => match wrapper {
                HttpClientError::Reqwest(real_err) => OauthError::Request(*real_err),
                other => OauthError::Other {
                    message: format!("HttpClientError: {:?}", other),
                },
            },
            RequestTokenError::Parse(parse_err, body) => {
                let body_str = String::from_utf8_lossy(&body);
                let body = body_str
                    .char_indices()
                    .nth(100)
                    .map(|(idx, _)| format!("{}...<truncated>", &body_str[..idx]))
                    .unwrap_or_else(|| body_str.into_owned());
                OauthError::Parse {
                    message: parse_err.to_string(),
                    body,
                }
            }
            RequestTokenError::Other(s) => OauthError::Other { message: s },
        }
    }
}
