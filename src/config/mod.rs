mod basic;
mod client_secret;
mod files;
mod oauth;
mod youtube;

pub use basic::BasicConfig;
pub use client_secret::ClientSecret;
pub use files::FilesConfig;
pub use oauth::{OauthConfig, OauthResolvedConfig};
pub use youtube::YoutubeConfig;

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Logging (see `basic` table in tubeport.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Well-known file locations (see `files` table).
    #[serde(default)]
    pub files: FilesConfig,

    /// Loopback authorization flow (see `oauth` table).
    #[serde(default)]
    pub oauth: OauthConfig,

    /// YouTube Data API client (see `youtube` table).
    #[serde(default)]
    pub youtube: YoutubeConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "tubeport.toml";
const ENV_PREFIX: &str = "TUBEPORT_";

impl Config {
    /// Builds a Figment that merges defaults, an optional TOML file and `TUBEPORT_*` env vars.
    ///
    /// Nested keys use `__` in env names, e.g. `TUBEPORT_OAUTH__REDIRECT_URL`.
    pub fn figment(config_file: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if config_file.is_file() {
            figment = figment.merge(Toml::file(config_file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from `tubeport.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(config_file: &Path) -> Result<Self, ConfigError> {
        let cfg: Self = Self::figment(config_file).extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values that would only fail later, after the operator already acted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.oauth.resolve()?;
        if self.youtube.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "youtube.request_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_match_the_conventional_file_names() {
        let cfg = Config::default();
        assert_eq!(cfg.files.client_secret, Path::new("client_secret.json"));
        assert_eq!(cfg.files.token, Path::new("token.json"));
        assert_eq!(cfg.files.subscriptions, Path::new("subscriptions.csv"));
        assert_eq!(
            cfg.oauth.redirect_url.as_str(),
            "http://localhost:8080/oauth/callback"
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tubeport.toml");
        fs::write(
            &path,
            r#"
[files]
token = "state/token.json"

[oauth]
redirect_url = "http://127.0.0.1:9090/cb"
shutdown_grace_secs = 2
"#,
        )
        .expect("write config");

        let cfg = Config::load_from(&path).expect("config loads");
        assert_eq!(cfg.files.token, Path::new("state/token.json"));
        assert_eq!(cfg.files.subscriptions, Path::new("subscriptions.csv"));

        let resolved = cfg.oauth.resolve().expect("resolves");
        assert_eq!(resolved.listen_addr.to_string(), "127.0.0.1:9090");
        assert_eq!(resolved.callback_path, "/cb");
        assert_eq!(resolved.shutdown_grace.as_secs(), 2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tubeport.toml");
        fs::write(&path, "[oauth]\nredirect_uri = \"http://localhost:1/\"\n").expect("write");

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Extract(_))
        ));
    }
}
