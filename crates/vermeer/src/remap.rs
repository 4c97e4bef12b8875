//! The old-identity-to-new-entity remap table.

use std::collections::HashMap;
use vermeer_interface::{ChannelView, RoleView};

/// Maps source-space entity ids to the entities created for them during
/// one restore run.
///
/// Every recreated entity gets a brand-new id on the target; the remap
/// table is what lets cross-references (rule exemptions, role assignments)
/// survive that identity discontinuity. It is scoped to a single run and
/// never persisted. Each old id holds at most one mapping — the first
/// recorded entry wins.
#[derive(Debug, Default)]
pub struct RemapTable {
    roles: HashMap<String, RoleView>,
    channels: HashMap<String, ChannelView>,
}

impl RemapTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the entity created for an old role id.
    pub fn record_role(&mut self, old_id: impl Into<String>, role: RoleView) {
        self.roles.entry(old_id.into()).or_insert(role);
    }

    /// Record the entity created for an old channel id.
    pub fn record_channel(&mut self, old_id: impl Into<String>, channel: ChannelView) {
        self.channels.entry(old_id.into()).or_insert(channel);
    }

    /// Look up the role created for an old id.
    pub fn role(&self, old_id: &str) -> Option<&RoleView> {
        self.roles.get(old_id)
    }

    /// Look up the channel created for an old id.
    pub fn channel(&self, old_id: &str) -> Option<&ChannelView> {
        self.channels.get(old_id)
    }

    /// Number of role mappings.
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Number of channel mappings.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
