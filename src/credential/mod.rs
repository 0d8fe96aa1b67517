mod store;

pub use store::CredentialStore;

use crate::error::CredentialError;
use crate::oauth_utils::OauthTokenResponse;
use chrono::{DateTime, Datelike, Duration, Utc};
use oauth2::{TokenResponse, basic::BasicTokenType};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Bearer/refresh token pair issued by the authorization server.
///
/// The JSON layout (`access_token`, `token_type`, `refresh_token`, `expiry`) is the one other
/// OAuth tooling writes to `token.json`, so an existing file is picked up as-is.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_non_empty"
    )]
    pub refresh_token: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_expiry"
    )]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential from a token endpoint response.
    pub(crate) fn from_token_response(token: &OauthTokenResponse) -> Result<Self, CredentialError> {
        let access_token = token.access_token().secret().to_string();
        if access_token.trim().is_empty() {
            return Err(CredentialError::EmptyAccessToken);
        }
        let token_type = match token.token_type() {
            BasicTokenType::Bearer => default_token_type(),
            BasicTokenType::Mac => "MAC".to_string(),
            BasicTokenType::Extension(other) => other.clone(),
        };
        let expiry = token
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);

        Ok(Self {
            access_token,
            token_type,
            refresh_token: token
                .refresh_token()
                .map(|t| t.secret().to_string())
                .filter(|t| !t.trim().is_empty()),
            expiry,
        })
    }

    /// True once the recorded expiry has passed. A credential without expiry never expires.
    pub fn is_expired(&self) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= Utc::now())
    }

    /// Minimal structural check applied when loading from disk.
    pub(crate) fn is_usable(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expiry", &self.expiry)
            .finish()
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

// Zero timestamps ("0001-01-01T00:00:00Z") mean "no expiry".
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|dt| dt.year() > 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_token_files_written_by_other_oauth_tooling() {
        let cred: Credential = serde_json::from_value(json!({
            "access_token": "ya29.a0",
            "token_type": "Bearer",
            "refresh_token": "1//0g",
            "expiry": "2024-05-01T10:20:30.123456789+02:00",
            "expires_in": 3599
        }))
        .expect("parses");

        assert_eq!(cred.access_token, "ya29.a0");
        assert_eq!(cred.refresh_token.as_deref(), Some("1//0g"));
        assert_eq!(
            cred.expiry.map(|e| e.to_rfc3339()),
            Some("2024-05-01T08:20:30.123456789+00:00".to_string())
        );
        assert!(cred.is_expired());
    }

    #[test]
    fn zero_expiry_and_empty_refresh_token_are_absent() {
        let cred: Credential = serde_json::from_value(json!({
            "access_token": "at",
            "refresh_token": "",
            "expiry": "0001-01-01T00:00:00Z"
        }))
        .expect("parses");

        assert_eq!(cred.token_type, "Bearer");
        assert_eq!(cred.refresh_token, None);
        assert_eq!(cred.expiry, None);
        assert!(!cred.is_expired());
    }

    #[test]
    fn from_token_response_computes_expiry() {
        let token: OauthTokenResponse = serde_json::from_value(json!({
            "access_token": "at-1",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt-1",
            "scope": "https://www.googleapis.com/auth/youtube.force-ssl"
        }))
        .expect("token response deserializes");

        let before = Utc::now();
        let cred = Credential::from_token_response(&token).expect("credential");
        assert_eq!(cred.access_token, "at-1");
        assert_eq!(cred.token_type, "Bearer");
        assert_eq!(cred.refresh_token.as_deref(), Some("rt-1"));
        let expiry = cred.expiry.expect("expiry set");
        assert!(expiry >= before + Duration::seconds(3600));
        assert!(expiry <= Utc::now() + Duration::seconds(3600));
    }

    #[test]
    fn debug_never_prints_tokens() {
        let cred = Credential {
            access_token: "secret-access".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("secret-refresh".to_string()),
            expiry: None,
        };
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains("secret-access"));
        assert!(!dbg.contains("secret-refresh"));
    }
}
