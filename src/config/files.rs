use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    /// OAuth client downloaded from the Google Cloud console.
    /// TOML: `files.client_secret`. Default: `client_secret.json`.
    #[serde(default = "default_client_secret")]
    pub client_secret: PathBuf,

    /// Persisted credential.
    /// TOML: `files.token`. Default: `token.json`.
    #[serde(default = "default_token")]
    pub token: PathBuf,

    /// Exported subscriptions; the channel URL is the second column.
    /// TOML: `files.subscriptions`. Default: `subscriptions.csv`.
    #[serde(default = "default_subscriptions")]
    pub subscriptions: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            client_secret: default_client_secret(),
            token: default_token(),
            subscriptions: default_subscriptions(),
        }
    }
}

fn default_client_secret() -> PathBuf {
    PathBuf::from("client_secret.json")
}

fn default_token() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_subscriptions() -> PathBuf {
    PathBuf::from("subscriptions.csv")
}
