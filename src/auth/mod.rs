mod callback;
mod flow;
mod google;

pub use flow::{AuthorizationFlow, CallbackSession, FlowContinuation, FlowState, NoopContinuation};
pub use google::GoogleAuthorizer;

use crate::credential::Credential;
use crate::error::OauthError;
use async_trait::async_trait;
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeVerifier};
use url::Url;

/// One handshake attempt: the URL shown to the operator plus the secrets needed to finish it.
#[derive(Debug)]
pub struct PendingAuthorization {
    pub url: Url,
    /// Anti-forgery value echoed back by the provider in the `state` query parameter.
    pub state: CsrfToken,
    pub pkce_verifier: Option<PkceCodeVerifier>,
}

/// The delegated-authorization capability: builds consent URLs, redeems codes and refreshes
/// access tokens.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Start a new attempt with a fresh `state` (and PKCE verifier, when supported).
    fn authorize(&self) -> PendingAuthorization;

    /// Exchange an authorization code for a credential.
    async fn exchange_code(
        &self,
        code: AuthorizationCode,
        pkce_verifier: Option<PkceCodeVerifier>,
    ) -> Result<Credential, OauthError>;

    /// Trade the credential's refresh token for a new access token.
    ///
    /// The returned credential keeps the old refresh token when the server does not rotate it.
    async fn refresh(&self, credential: &Credential) -> Result<Credential, OauthError>;
}
