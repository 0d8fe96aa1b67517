use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use url::Url;

/// OAuth client credentials as downloaded from the Google Cloud console.
///
/// Both the "Desktop app" (`installed`) and "Web application" (`web`) layouts are accepted.
#[derive(Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: Url,

    #[serde(default = "default_token_uri")]
    pub token_uri: Url,

    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Read and validate the client secret file. Any failure here is fatal.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ClientSecretRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&contents).map_err(|message| ConfigError::ClientSecretParse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self, String> {
        let file: ClientSecretFile = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        let secret = file
            .installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" client entry".to_string())?;
        if secret.client_id.trim().is_empty() {
            return Err("client_id is empty".to_string());
        }
        Ok(secret)
    }

    /// True when the client lists `redirect` explicitly, or lists a bare loopback URI.
    ///
    /// Google accepts any port and path on a registered `http://localhost` desktop client.
    pub fn allows_redirect(&self, redirect: &Url) -> bool {
        self.redirect_uris.iter().any(|uri| {
            let Ok(registered) = Url::parse(uri) else {
                return false;
            };
            if registered == *redirect {
                return true;
            }
            registered.scheme() == redirect.scheme()
                && registered.host() == redirect.host()
                && registered.port().is_none()
                && registered.path() == "/"
        })
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("auth_uri", &self.auth_uri.as_str())
            .field("token_uri", &self.token_uri.as_str())
            .field("redirect_uris", &self.redirect_uris)
            .finish()
    }
}

fn default_auth_uri() -> Url {
    Url::parse("https://accounts.google.com/o/oauth2/auth")
        .expect("default Google auth_uri must be a valid URL")
}

fn default_token_uri() -> Url {
    Url::parse("https://oauth2.googleapis.com/token")
        .expect("default Google token_uri must be a valid URL")
}
