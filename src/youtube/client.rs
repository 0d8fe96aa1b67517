use super::types::{GoogleErrorBody, SubscriptionInsert};
use super::{ChannelSubscriber, SubscriberFactory};
use crate::config::YoutubeConfig;
use crate::credential::Credential;
use crate::error::{ApiError, ConfigError};
use crate::import::ChannelId;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::StatusCode;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;
use url::Url;

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// YouTube Data API v3 client bound to one access token.
pub struct YoutubeClient {
    http_client: reqwest::Client,
    subscriptions_url: Url,
    access_token: String,
    limiter: Arc<DefaultDirectRateLimiter>,
}

#[async_trait]
impl ChannelSubscriber for YoutubeClient {
    async fn subscribe(&self, channel: &ChannelId) -> Result<(), ApiError> {
        self.limiter.until_ready().await;

        let resp = self
            .http_client
            .post(self.subscriptions_url.clone())
            .bearer_auth(&self.access_token)
            .json(&SubscriptionInsert::for_channel(channel))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        let body_preview = format!("{:.len$}", body, len = ERROR_BODY_PREVIEW_CHARS);
        debug!(
            %status,
            channel_id = %channel,
            body = %body_preview,
            "subscriptions.insert rejected"
        );
        Err(api_error_from_body(status, &body))
    }
}

fn api_error_from_body(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(parsed) => ApiError::Status {
            status,
            reason: parsed.error.errors.into_iter().find_map(|d| d.reason),
            message: parsed.error.message,
        },
        Err(_) => ApiError::Status {
            status,
            reason: None,
            message: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
        },
    }
}

/// Shares one HTTP client and one rate limiter across every subscriber it builds.
pub struct YoutubeClientFactory {
    http_client: reqwest::Client,
    subscriptions_url: Url,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl YoutubeClientFactory {
    pub fn new(cfg: &YoutubeConfig, http_client: reqwest::Client) -> Result<Self, ConfigError> {
        let mut subscriptions_url = Url::parse(&format!(
            "{}/subscriptions",
            cfg.api_url.as_str().trim_end_matches('/')
        ))?;
        subscriptions_url
            .query_pairs_mut()
            .append_pair("part", "snippet");

        let per_second = NonZeroU32::new(cfg.requests_per_second.max(1)).unwrap_or(NonZeroU32::MIN);
        Ok(Self {
            http_client,
            subscriptions_url,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
        })
    }

    pub fn subscriptions_url(&self) -> &Url {
        &self.subscriptions_url
    }
}

impl SubscriberFactory for YoutubeClientFactory {
    fn for_credential(&self, credential: &Credential) -> Box<dyn ChannelSubscriber> {
        Box::new(YoutubeClient {
            http_client: self.http_client.clone(),
            subscriptions_url: self.subscriptions_url.clone(),
            access_token: credential.access_token.clone(),
            limiter: self.limiter.clone(),
        })
    }
}
