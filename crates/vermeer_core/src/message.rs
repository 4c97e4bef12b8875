//! Captured message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An attachment payload: a reference URL, or inlined base64 bytes when
/// capture was configured for image inlining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentPayload {
    /// Reference URL on the remote host
    Url(String),
    /// Base64-encoded bytes
    Inline(String),
}

/// A message attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Attachment file name
    pub name: String,
    /// Attachment content
    pub payload: AttachmentPayload,
}

/// A captured message.
///
/// Messages whose cleaned content exceeds 2000 characters are never
/// captured; they are dropped, not truncated, and do not count toward the
/// per-channel cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Id of the message on the source space
    pub old_id: String,
    /// Id of the original author
    pub author_id: String,
    /// Username of the original author at capture time
    pub username: String,
    /// Avatar URL of the original author at capture time
    pub avatar_url: String,
    /// Message text content
    pub content: String,
    /// Rich embeds, passed through verbatim
    #[serde(default)]
    pub embeds: Vec<serde_json::Value>,
    /// Interactive components, passed through verbatim
    #[serde(default)]
    pub components: Vec<serde_json::Value>,
    /// Attachments
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Whether the message was pinned
    #[serde(default)]
    pub pinned: bool,
    /// Original send timestamp
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// True when the message carries nothing worth replaying.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.embeds.is_empty() && self.attachments.is_empty()
    }
}
