use serde::{Deserialize, Serialize};
use url::Url;

/// YouTube Data API client configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct YoutubeConfig {
    /// Base URL of the Data API.
    /// TOML: `youtube.api_url`. Default: `https://www.googleapis.com/youtube/v3`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Optional upstream HTTP proxy, used for both the token endpoint and the Data API.
    /// TOML: `youtube.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Per-request timeout.
    /// TOML: `youtube.request_timeout_secs`. Default: `30`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on subscribe calls per second. Values below 1 are treated as 1.
    /// TOML: `youtube.requests_per_second`. Default: `2`.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            proxy: None,
            request_timeout_secs: default_request_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://www.googleapis.com/youtube/v3")
        .expect("default youtube api_url must be a valid URL")
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    2
}
