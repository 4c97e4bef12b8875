//! The top-level snapshot document.

use crate::{AutoModRule, Ban, ChannelTree, Emoji, Member, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A captured media asset.
///
/// The reference URL is always recorded. An inlined base64 payload is added
/// only when capture is configured for inlining; the reference-only path
/// degrades if the remote host later purges the asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
    /// Live reference URL of the asset
    pub url: String,
    /// Base64-encoded asset bytes, present only when capture inlined them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl MediaPayload {
    /// A payload holding only a reference URL.
    pub fn by_reference(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            base64: None,
        }
    }
}

/// AFK configuration: the designated channel (by name) and idle timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfkSettings {
    /// Name of the AFK voice channel
    pub channel_name: String,
    /// Idle timeout in seconds
    pub timeout_secs: u32,
}

/// Widget configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    /// Whether the widget is enabled
    pub enabled: bool,
    /// Widget channel, by name; `None` when no channel is designated
    #[serde(default)]
    pub channel_name: Option<String>,
}

/// System channel reference and its notification-suppression flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemChannelSettings {
    /// Name of the system channel
    pub name: String,
    /// System channel flag bits
    pub flags: u64,
}

/// A point-in-time snapshot of a community space.
///
/// Immutable once written; created wholly by one capture run. Cross-entity
/// references inside the document are stored by *name* (permission
/// overwrites, AFK/widget/system channels) or as old-id/name pairs
/// (auto-moderation exemptions), because entity ids do not survive
/// reconstruction on a target instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Snapshot id, either supplied at capture or generated
    pub id: String,
    /// Id of the space the snapshot was captured from
    pub source_space_id: String,
    /// Capture timestamp
    pub created_at: DateTime<Utc>,
    /// The per-channel message cap in force during capture
    pub messages_per_channel: usize,

    /// Space name
    pub name: String,
    /// Verification level
    pub verification_level: u8,
    /// Explicit content filter level
    pub explicit_content_filter: u8,
    /// Default notification setting
    pub default_notifications: u8,
    /// AFK channel and timeout, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afk: Option<AfkSettings>,
    /// Widget settings
    #[serde(default)]
    pub widget: WidgetSettings,
    /// System channel reference and flags, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_channel: Option<SystemChannelSettings>,
    /// Whether the boost progress bar is enabled
    #[serde(default)]
    pub progress_bar_enabled: bool,

    /// Space icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<MediaPayload>,
    /// Invite splash image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash: Option<MediaPayload>,
    /// Banner image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<MediaPayload>,

    /// Auto-moderation rules
    #[serde(default)]
    pub auto_moderation_rules: Vec<AutoModRule>,
    /// Channel hierarchy
    #[serde(default)]
    pub channels: ChannelTree,
    /// Roles, in descending-position order as captured
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Bans
    #[serde(default)]
    pub bans: Vec<Ban>,
    /// Emojis (at most 50)
    #[serde(default)]
    pub emojis: Vec<Emoji>,
    /// Members, present only when member capture was opted in
    #[serde(default)]
    pub members: Vec<Member>,
}
