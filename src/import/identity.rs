use crate::error::ExtractionError;
use std::fmt;
use url::Url;

/// Canonical channel id, e.g. `UC_x5XG1OV2P6uZZ5FSM9Ttw`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(candidate: &str) -> bool {
        !candidate.is_empty()
            && candidate
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the channel id from a `/channel/<id>` URL.
///
/// Fails closed: handles (`/@name`), legacy `/user/` and `/c/` URLs are rejected rather than
/// resolved, since resolving them would need an API call.
pub fn extract_channel_id(channel_url: &str) -> Result<ChannelId, ExtractionError> {
    let url = Url::parse(channel_url.trim())
        .map_err(|e| ExtractionError::new(channel_url, format!("not a URL ({e})")))?;

    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty());

    match (segments.next(), segments.next()) {
        (Some("channel"), Some(id)) if ChannelId::is_valid(id) => Ok(ChannelId(id.to_string())),
        (Some("channel"), Some(_)) => Err(ExtractionError::new(
            channel_url,
            "channel id contains unexpected characters",
        )),
        (Some("channel"), None) => Err(ExtractionError::new(channel_url, "missing channel id")),
        _ => Err(ExtractionError::new(
            channel_url,
            "invalid channel URL format, expected /channel/<id>",
        )),
    }
}
