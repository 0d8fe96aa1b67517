use super::{Authorizer, PendingAuthorization};
use crate::config::{ClientSecret, OauthResolvedConfig};
use crate::credential::Credential;
use crate::error::{ConfigError, OauthError};
use crate::oauth_utils::{OauthTokenResponse, StandardOauth2Client, build_oauth2_client};
use async_trait::async_trait;
use oauth2::{
    AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, RefreshToken, Scope,
};
use tracing::{info, warn};

/// [`Authorizer`] backed by Google's OAuth 2.0 endpoints from the downloaded client secret.
pub struct GoogleAuthorizer {
    client: StandardOauth2Client,
    scope: Scope,
    http_client: reqwest::Client,
}

impl GoogleAuthorizer {
    pub fn new(
        secret: &ClientSecret,
        oauth: &OauthResolvedConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, ConfigError> {
        if !secret.redirect_uris.is_empty() && !secret.allows_redirect(&oauth.redirect_url) {
            warn!(
                redirect_url = %oauth.redirect_url,
                registered = ?secret.redirect_uris,
                "redirect URL is not registered for this OAuth client; consent may be rejected"
            );
        }

        Ok(Self {
            client: build_oauth2_client(secret, &oauth.redirect_url)?,
            scope: Scope::new(oauth.scope.clone()),
            http_client,
        })
    }
}

#[async_trait]
impl Authorizer for GoogleAuthorizer {
    fn authorize(&self) -> PendingAuthorization {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(self.scope.clone())
            .set_pkce_challenge(challenge)
            // offline + consent so Google issues a refresh token every time.
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();

        PendingAuthorization {
            url,
            state,
            pkce_verifier: Some(verifier),
        }
    }

    async fn exchange_code(
        &self,
        code: AuthorizationCode,
        pkce_verifier: Option<PkceCodeVerifier>,
    ) -> Result<Credential, OauthError> {
        let mut request = self.client.exchange_code(code);
        if let Some(verifier) = pkce_verifier {
            request = request.set_pkce_verifier(verifier);
        }

        let token: OauthTokenResponse = request.request_async(&self.http_client).await?;
        info!("OAuth2 code exchange completed successfully");

        let credential = Credential::from_token_response(&token)?;
        if credential.refresh_token.is_none() {
            warn!("token response has no refresh_token; re-authorization will be needed once it expires");
        }
        Ok(credential)
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, OauthError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or(OauthError::MissingRefreshToken)?;

        let token: OauthTokenResponse = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http_client)
            .await?;
        info!("access token refreshed successfully");

        let mut refreshed = Credential::from_token_response(&token)?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token.to_string());
        }
        Ok(refreshed)
    }
}
