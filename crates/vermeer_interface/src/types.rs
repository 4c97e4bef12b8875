//! Live entity views and write specifications.
//!
//! Views describe what the remote directory currently holds; spec types
//! describe what the engine asks it to create. Ids are opaque strings
//! minted by the remote side — a restored entity always carries a brand-new
//! id, which is why the snapshot document cross-references by name instead.

use crate::{Capability, PremiumTier};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use vermeer_core::Attachment;

/// Live profile of a space.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceProfile {
    /// Space id
    pub id: String,
    /// Space name
    pub name: String,
    /// Verification level
    pub verification_level: u8,
    /// Explicit content filter level
    pub explicit_content_filter: u8,
    /// Default notification setting
    pub default_notifications: u8,
    /// Name of the AFK voice channel, when configured
    pub afk_channel_name: Option<String>,
    /// AFK idle timeout in seconds
    pub afk_timeout_secs: u32,
    /// Whether the widget is enabled
    pub widget_enabled: bool,
    /// Widget channel name, when designated
    pub widget_channel_name: Option<String>,
    /// System channel name, when configured
    pub system_channel_name: Option<String>,
    /// System channel flag bits
    pub system_channel_flags: u64,
    /// Whether the boost progress bar is enabled
    pub progress_bar_enabled: bool,
    /// Icon URL, when set
    pub icon_url: Option<String>,
    /// Invite splash URL, when set
    pub splash_url: Option<String>,
    /// Banner URL, when set
    pub banner_url: Option<String>,
    /// Quality tier
    pub premium_tier: PremiumTier,
    /// Capability flags
    pub capabilities: HashSet<Capability>,
}

impl SpaceProfile {
    /// True when the space has the given capability.
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Live view of a role.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleView {
    /// Role id
    pub id: String,
    /// Role name
    pub name: String,
    /// RGB color as a packed integer
    pub color: u32,
    /// Role icon URL, when set
    pub icon_url: Option<String>,
    /// Whether members are listed separately under this role
    pub hoist: bool,
    /// Permission bits
    pub permissions: u64,
    /// Whether the role can be mentioned
    pub mentionable: bool,
    /// Hierarchy position
    pub position: i32,
    /// Whether the role is owned by an integration and cannot be recreated
    pub managed: bool,
    /// Whether the acting account may edit or delete the role
    pub editable: bool,
    /// Whether this is the built-in base role
    pub is_everyone: bool,
}

/// A role-keyed permission overwrite on a live channel, and the shape the
/// engine submits when applying overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOverwrite {
    /// Id of the role the overwrite applies to
    pub role_id: String,
    /// Allowed permission bits
    pub allow: u64,
    /// Denied permission bits
    pub deny: u64,
}

/// Kind discriminant for live channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ChannelKind {
    /// Grouping category
    Category,
    /// Plain text channel
    Text,
    /// Announcement channel
    Announcement,
    /// Voice channel
    Voice,
    /// Stage channel
    Stage,
}

/// Live view of a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelView {
    /// Channel id
    pub id: String,
    /// Channel name
    pub name: String,
    /// Channel kind
    pub kind: ChannelKind,
    /// Sort position among siblings
    pub position: i32,
    /// Parent category id, when categorized
    pub parent_id: Option<String>,
    /// Topic, for text-like kinds
    pub topic: Option<String>,
    /// Age-restricted flag
    pub nsfw: bool,
    /// Slow-mode interval in seconds
    pub slow_mode_secs: Option<u32>,
    /// Audio bitrate, for voice-like kinds
    pub bitrate: Option<u32>,
    /// User limit, for voice-like kinds
    pub user_limit: Option<u32>,
    /// Role-keyed permission overwrites
    pub overwrites: Vec<RoleOverwrite>,
    /// Whether the acting account may delete the channel
    pub deletable: bool,
}

/// Live view of a thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadView {
    /// Thread id
    pub id: String,
    /// Thread name
    pub name: String,
    /// Whether the thread is archived
    pub archived: bool,
    /// Auto-archive duration in minutes
    pub auto_archive_minutes: Option<u32>,
    /// Whether the thread is locked
    pub locked: bool,
    /// Slow-mode interval in seconds
    pub slow_mode_secs: Option<u32>,
}

/// Resolved author of a live message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorView {
    /// User id
    pub id: String,
    /// Username
    pub username: String,
    /// Display avatar URL
    pub avatar_url: String,
}

/// Live view of a message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    /// Message id
    pub id: String,
    /// Message author; `None` when the author can no longer be resolved
    pub author: Option<AuthorView>,
    /// Cleaned text content
    pub content: String,
    /// Rich embeds
    pub embeds: Vec<serde_json::Value>,
    /// Interactive components
    pub components: Vec<serde_json::Value>,
    /// Attachment names and reference URLs
    pub attachments: Vec<(String, String)>,
    /// Whether the message is pinned
    pub pinned: bool,
    /// Send timestamp
    pub sent_at: DateTime<Utc>,
}

/// Live view of a member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberView {
    /// User id
    pub user_id: String,
    /// Username
    pub username: String,
    /// Legacy discriminator
    pub discriminator: Option<String>,
    /// Avatar URL, when set
    pub avatar_url: Option<String>,
    /// Join timestamp
    pub joined_at: Option<DateTime<Utc>>,
    /// Ids of the member's roles
    pub role_ids: Vec<String>,
    /// Whether the account is a bot
    pub bot: bool,
}

/// Live view of a ban.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanView {
    /// Id of the banned user
    pub user_id: String,
    /// Ban reason, when recorded
    pub reason: Option<String>,
}

/// Live view of an emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiView {
    /// Emoji id
    pub id: String,
    /// Emoji name
    pub name: String,
    /// Image URL
    pub url: String,
}

/// One action of a live auto-moderation rule, and the shape submitted when
/// recreating a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoModActionView {
    /// Action type discriminant
    pub action_type: u8,
    /// Free-form action metadata
    pub metadata: serde_json::Value,
}

/// Live view of an auto-moderation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoModRuleView {
    /// Rule id
    pub id: String,
    /// Rule name
    pub name: String,
    /// Event type discriminant
    pub event_type: u8,
    /// Trigger type discriminant
    pub trigger_type: u8,
    /// Free-form trigger metadata
    pub trigger_metadata: serde_json::Value,
    /// Actions taken on trigger
    pub actions: Vec<AutoModActionView>,
    /// Whether the rule is enabled
    pub enabled: bool,
    /// Ids of exempted roles
    pub exempt_role_ids: Vec<String>,
    /// Ids of exempted channels
    pub exempt_channel_ids: Vec<String>,
}

/// Live view of a proxy identity bound to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyView {
    /// Proxy id
    pub id: String,
    /// Proxy display name
    pub name: String,
    /// Id of the channel the proxy is bound to
    pub channel_id: String,
}

/// Image content supplied to a write: a reference URL the remote side
/// fetches itself, or raw bytes uploaded directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Reference URL
    Url(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

/// Specification for creating a role.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRole {
    /// Role name
    pub name: String,
    /// RGB color as a packed integer
    pub color: u32,
    /// Role icon, when captured
    pub icon: Option<ImageInput>,
    /// Whether members are listed separately under this role
    pub hoist: bool,
    /// Permission bits
    pub permissions: u64,
    /// Whether the role can be mentioned
    pub mentionable: bool,
    /// Requested hierarchy position
    pub position: i32,
}

/// Specification for editing the built-in base role in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRole {
    /// Permission bits
    pub permissions: u64,
    /// Whether the role can be mentioned
    pub mentionable: bool,
}

/// Specification for creating a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateChannel {
    /// Channel name
    pub name: String,
    /// Channel kind
    pub kind: ChannelKind,
    /// Parent category id, when categorized
    pub parent_id: Option<String>,
    /// Topic, for text-like kinds
    pub topic: Option<String>,
    /// Age-restricted flag
    pub nsfw: bool,
    /// Slow-mode interval in seconds
    pub slow_mode_secs: Option<u32>,
    /// Audio bitrate, for voice-like kinds
    pub bitrate: Option<u32>,
    /// User limit, for voice-like kinds
    pub user_limit: Option<u32>,
}

impl CreateChannel {
    /// A bare spec with only a name and kind.
    pub fn bare(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent_id: None,
            topic: None,
            nsfw: false,
            slow_mode_secs: None,
            bitrate: None,
            user_limit: None,
        }
    }
}

/// Specification for creating a thread under a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateThread {
    /// Thread name
    pub name: String,
    /// Auto-archive duration in minutes
    pub auto_archive_minutes: Option<u32>,
}

/// Specification for recreating an auto-moderation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAutoModRule {
    /// Rule name
    pub name: String,
    /// Event type discriminant
    pub event_type: u8,
    /// Trigger type discriminant
    pub trigger_type: u8,
    /// Free-form trigger metadata
    pub trigger_metadata: serde_json::Value,
    /// Actions taken on trigger
    pub actions: Vec<AutoModActionView>,
    /// Whether the rule is enabled
    pub enabled: bool,
    /// Ids of exempted roles
    pub exempt_role_ids: Vec<String>,
    /// Ids of exempted channels
    pub exempt_channel_ids: Vec<String>,
}

/// A message to send, directly or through a proxy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboundMessage {
    /// Text content; `None` when the message is embeds/attachments only
    pub content: Option<String>,
    /// Rich embeds
    pub embeds: Vec<serde_json::Value>,
    /// Interactive components
    pub components: Vec<serde_json::Value>,
    /// Attachments, by reference or inlined
    pub attachments: Vec<Attachment>,
}

/// Impersonation parameters for a proxy send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyPersona {
    /// Username displayed as the author
    pub username: String,
    /// Avatar URL displayed for the author
    pub avatar_url: String,
    /// Target thread id, when sending into a thread
    pub thread_id: Option<String>,
}

/// Handle to a message that was just sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Id of the new message
    pub id: String,
    /// Id of the channel (or thread) it landed in
    pub channel_id: String,
}
