mod client;
mod types;

pub use client::{YoutubeClient, YoutubeClientFactory};

use crate::credential::Credential;
use crate::error::ApiError;
use crate::import::ChannelId;
use async_trait::async_trait;

/// The remote "subscribe(channel)" capability.
#[async_trait]
pub trait ChannelSubscriber: Send + Sync {
    async fn subscribe(&self, channel: &ChannelId) -> Result<(), ApiError>;
}

/// Builds a subscriber that acts on behalf of a credential.
pub trait SubscriberFactory: Send + Sync {
    fn for_credential(&self, credential: &Credential) -> Box<dyn ChannelSubscriber>;
}
