//! Channel hierarchy types.
//!
//! Channels are a tagged union over the kinds the capture engine
//! understands. Categories hold their children in ascending original
//! position; that order is replayed verbatim at restore time because the
//! target assigns positions by creation order.

use crate::{Message, PermissionMask};
use serde::{Deserialize, Serialize};

/// A permission overwrite, keyed by role **name**.
///
/// Role ids do not survive reconstruction, so overwrites resolve by a name
/// scan over the target's roles at restore time. When two roles share a
/// name the first match wins; see `resolve` in the facade crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOverwrite {
    /// Name of the role the overwrite applies to
    pub role_name: String,
    /// Allowed permission bits, as a decimal string
    pub allow: String,
    /// Denied permission bits, as a decimal string
    pub deny: String,
}

impl PermissionOverwrite {
    /// Allowed bits as a 64-bit mask. Malformed masks read as zero.
    pub fn allow_bits(&self) -> u64 {
        parse_mask(&self.allow)
    }

    /// Denied bits as a 64-bit mask. Malformed masks read as zero.
    pub fn deny_bits(&self) -> u64 {
        parse_mask(&self.deny)
    }
}

/// Decimal-string mask parsing shared by overwrites and roles.
pub(crate) fn parse_mask(mask: &str) -> PermissionMask {
    mask.parse().unwrap_or(0)
}

/// The captured channel hierarchy: categories with their children, plus
/// uncategorized channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTree {
    /// Categories in ascending original position
    pub categories: Vec<Category>,
    /// Channels with no parent category, in ascending original position
    pub others: Vec<Channel>,
}

impl ChannelTree {
    /// Iterate over every non-category channel in the tree.
    pub fn iter_channels(&self) -> impl Iterator<Item = &Channel> {
        self.categories
            .iter()
            .flat_map(|c| c.children.iter())
            .chain(self.others.iter())
    }
}

/// A category and its children, in ascending original position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Id of the category on the source space
    pub old_id: String,
    /// Category name
    pub name: String,
    /// Permission overwrites, by role name
    #[serde(default)]
    pub overwrites: Vec<PermissionOverwrite>,
    /// Child channels in ascending original position
    #[serde(default)]
    pub children: Vec<Channel>,
}

/// A captured channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Channel {
    /// Plain text channel
    Text(TextChannel),
    /// Announcement channel; degrades to text on targets without the
    /// announcement capability
    Announcement(TextChannel),
    /// Voice channel
    Voice(VoiceChannel),
    /// Stage channel; skipped entirely on targets without the community
    /// capability
    Stage(StageChannel),
}

impl Channel {
    /// Id of the channel on the source space.
    pub fn old_id(&self) -> &str {
        match self {
            Channel::Text(c) | Channel::Announcement(c) => &c.old_id,
            Channel::Voice(c) => &c.old_id,
            Channel::Stage(c) => &c.old_id,
        }
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        match self {
            Channel::Text(c) | Channel::Announcement(c) => &c.name,
            Channel::Voice(c) => &c.name,
            Channel::Stage(c) => &c.name,
        }
    }

    /// Permission overwrites, by role name.
    pub fn overwrites(&self) -> &[PermissionOverwrite] {
        match self {
            Channel::Text(c) | Channel::Announcement(c) => &c.overwrites,
            Channel::Voice(c) => &c.overwrites,
            Channel::Stage(c) => &c.overwrites,
        }
    }

    /// Captured messages, for the kinds that carry them.
    pub fn messages(&self) -> &[Message] {
        match self {
            Channel::Text(c) | Channel::Announcement(c) => &c.messages,
            Channel::Voice(_) => &[],
            Channel::Stage(c) => &c.messages,
        }
    }
}

/// A text or announcement channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChannel {
    /// Id of the channel on the source space
    pub old_id: String,
    /// Channel name
    pub name: String,
    /// Permission overwrites, by role name
    #[serde(default)]
    pub overwrites: Vec<PermissionOverwrite>,
    /// Channel topic
    #[serde(default)]
    pub topic: Option<String>,
    /// Age-restricted flag
    #[serde(default)]
    pub nsfw: bool,
    /// Slow-mode interval in seconds
    #[serde(default)]
    pub slow_mode_secs: Option<u32>,
    /// Captured messages, newest first
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Captured threads
    #[serde(default)]
    pub threads: Vec<Thread>,
}

/// A voice channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceChannel {
    /// Id of the channel on the source space
    pub old_id: String,
    /// Channel name
    pub name: String,
    /// Permission overwrites, by role name
    #[serde(default)]
    pub overwrites: Vec<PermissionOverwrite>,
    /// Audio bitrate in bits per second
    pub bitrate: u32,
    /// Maximum simultaneous users; `None` for unlimited
    #[serde(default)]
    pub user_limit: Option<u32>,
}

/// A stage channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChannel {
    /// Id of the channel on the source space
    pub old_id: String,
    /// Channel name
    pub name: String,
    /// Permission overwrites, by role name
    #[serde(default)]
    pub overwrites: Vec<PermissionOverwrite>,
    /// Stage topic
    #[serde(default)]
    pub topic: Option<String>,
    /// Age-restricted flag
    #[serde(default)]
    pub nsfw: bool,
    /// Slow-mode interval in seconds
    #[serde(default)]
    pub slow_mode_secs: Option<u32>,
    /// Audio bitrate in bits per second
    pub bitrate: u32,
    /// Maximum simultaneous users; `None` for unlimited
    #[serde(default)]
    pub user_limit: Option<u32>,
    /// Captured messages, newest first
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// A thread under a text or announcement channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Thread name
    pub name: String,
    /// Auto-archive duration in minutes
    #[serde(default)]
    pub auto_archive_minutes: Option<u32>,
    /// Whether the thread was archived at capture time
    #[serde(default)]
    pub archived: bool,
    /// Whether the thread was locked at capture time
    #[serde(default)]
    pub locked: bool,
    /// Slow-mode interval in seconds
    #[serde(default)]
    pub slow_mode_secs: Option<u32>,
    /// Captured messages, newest first
    #[serde(default)]
    pub messages: Vec<Message>,
}
