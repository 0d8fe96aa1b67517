use serde::{Deserialize, Serialize};

use crate::import::ChannelId;

/// Body of `subscriptions.insert` with `part=snippet`.
#[derive(Debug, Serialize)]
pub(crate) struct SubscriptionInsert<'a> {
    snippet: SubscriptionSnippet<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionSnippet<'a> {
    resource_id: ResourceId<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId<'a> {
    kind: &'static str,
    channel_id: &'a str,
}

impl<'a> SubscriptionInsert<'a> {
    pub(crate) fn for_channel(channel: &'a ChannelId) -> Self {
        Self {
            snippet: SubscriptionSnippet {
                resource_id: ResourceId {
                    kind: "youtube#channel",
                    channel_id: channel.as_str(),
                },
            },
        }
    }
}

/// Google API error envelope: `{"error": {"code", "message", "errors": [{"reason", ...}]}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorBody {
    pub error: GoogleErrorObject,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorObject {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleErrorDetail {
    pub reason: Option<String>,
}
