//! Auto-moderation rule types.

use serde::{Deserialize, Serialize};

/// An old-id/name pair for an exempted role or channel.
///
/// Both halves are kept so restore can resolve the reference against the
/// target: a live entity qualifies only when its name matches *and* the
/// remap table maps the old id to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExemptRef {
    /// Id on the source space
    pub id: String,
    /// Name at capture time
    pub name: String,
}

/// A single action taken when a rule triggers.
///
/// The metadata is free-form; capture rewrites any channel-id reference in
/// it to a channel-name reference, since ids are not portable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoModAction {
    /// Action type discriminant
    pub action_type: u8,
    /// Action metadata, passed through with channel references rewritten
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A captured auto-moderation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoModRule {
    /// Rule name
    pub name: String,
    /// Event type discriminant
    pub event_type: u8,
    /// Trigger type discriminant
    pub trigger_type: u8,
    /// Trigger metadata, passed through verbatim
    #[serde(default)]
    pub trigger_metadata: serde_json::Value,
    /// Actions taken on trigger
    #[serde(default)]
    pub actions: Vec<AutoModAction>,
    /// Whether the rule is enabled
    pub enabled: bool,
    /// Roles exempt from the rule
    #[serde(default)]
    pub exempt_roles: Vec<ExemptRef>,
    /// Channels exempt from the rule
    #[serde(default)]
    pub exempt_channels: Vec<ExemptRef>,
}
