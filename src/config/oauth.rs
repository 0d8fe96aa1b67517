use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use url::{Host, Url};

/// Loopback authorization flow configuration managed by Figment.
///
/// The redirect URL must match one registered for the OAuth client exactly; the listener
/// binds to its host and port and serves its path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OauthConfig {
    /// TOML: `oauth.redirect_url`. Default: `http://localhost:8080/oauth/callback`.
    #[serde(default = "default_redirect_url")]
    pub redirect_url: Url,

    /// The single scope requested. Subscribing needs write access to the account.
    /// TOML: `oauth.scope`. Default: `https://www.googleapis.com/auth/youtube.force-ssl`.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Grace period for the callback listener to finish its last response.
    /// TOML: `oauth.shutdown_grace_secs`. Default: `5`.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone)]
pub struct OauthResolvedConfig {
    pub redirect_url: Url,
    pub listen_addr: SocketAddr,
    pub callback_path: String,
    pub scope: String,
    pub shutdown_grace: Duration,
}

impl OauthConfig {
    pub fn resolve(&self) -> Result<OauthResolvedConfig, ConfigError> {
        let invalid = |message: &str| ConfigError::Invalid {
            field: "oauth.redirect_url",
            message: message.to_string(),
        };

        if self.redirect_url.scheme() != "http" {
            return Err(invalid("loopback redirect must use http"));
        }
        let ip: IpAddr = match self.redirect_url.host() {
            Some(Host::Domain(domain)) if domain.eq_ignore_ascii_case("localhost") => {
                Ipv4Addr::LOCALHOST.into()
            }
            Some(Host::Ipv4(ip)) if ip.is_loopback() => ip.into(),
            Some(Host::Ipv6(ip)) if ip.is_loopback() => ip.into(),
            _ => return Err(invalid("host must be localhost or a loopback address")),
        };
        let port = self
            .redirect_url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;

        if self.scope.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "oauth.scope",
                message: "must not be empty".to_string(),
            });
        }
        if self.shutdown_grace_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "oauth.shutdown_grace_secs",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(OauthResolvedConfig {
            redirect_url: self.redirect_url.clone(),
            listen_addr: SocketAddr::new(ip, port),
            callback_path: self.redirect_url.path().to_string(),
            scope: self.scope.trim().to_string(),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
        })
    }
}

impl Default for OauthConfig {
    fn default() -> Self {
        Self {
            redirect_url: default_redirect_url(),
            scope: default_scope(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

fn default_redirect_url() -> Url {
    Url::parse("http://localhost:8080/oauth/callback")
        .expect("default oauth redirect_url must be a valid URL")
}

fn default_scope() -> String {
    "https://www.googleapis.com/auth/youtube.force-ssl".to_string()
}

fn default_shutdown_grace_secs() -> u64 {
    5
}
