//! Name-based cross-reference resolution.
//!
//! The snapshot document references roles and channels by name, because
//! ids do not survive reconstruction. Duplicate names therefore collide;
//! the observable behavior is that the first match in the scanned
//! collection wins. That ambiguity is a structural fragility of name-based
//! referencing, so every name scan in the engine goes through this module
//! — nothing else resolves names on its own.

use crate::RemapTable;
use vermeer_core::PermissionOverwrite;
use vermeer_interface::{ChannelKind, ChannelView, RoleOverwrite, RoleView};

/// First role with the given name, in collection order.
pub fn role_by_name<'a>(roles: &'a [RoleView], name: &str) -> Option<&'a RoleView> {
    roles.iter().find(|role| role.name == name)
}

/// First channel with the given name, in collection order.
pub fn channel_by_name<'a>(channels: &'a [ChannelView], name: &str) -> Option<&'a ChannelView> {
    channels.iter().find(|channel| channel.name == name)
}

/// First channel with the given name and kind, in collection order.
pub fn channel_by_name_and_kind<'a>(
    channels: &'a [ChannelView],
    name: &str,
    kind: ChannelKind,
) -> Option<&'a ChannelView> {
    channels
        .iter()
        .find(|channel| channel.kind == kind && channel.name == name)
}

/// Translate captured overwrites into live role-keyed overwrites.
///
/// Each captured overwrite resolves against the target's current roles by
/// name; an overwrite whose role name matches nothing is dropped.
pub fn overwrites_for(roles: &[RoleView], captured: &[PermissionOverwrite]) -> Vec<RoleOverwrite> {
    captured
        .iter()
        .filter_map(|overwrite| {
            role_by_name(roles, &overwrite.role_name).map(|role| RoleOverwrite {
                role_id: role.id.clone(),
                allow: overwrite.allow_bits(),
                deny: overwrite.deny_bits(),
            })
        })
        .collect()
}

/// Resolve an old-id/name channel reference to a live channel id.
///
/// A live channel qualifies only when its name matches *and* the remap
/// table maps the old id to that same channel — a name match alone is not
/// enough, because an unrelated channel may share the name.
pub fn remapped_channel_id(
    channels: &[ChannelView],
    remap: &RemapTable,
    old_id: &str,
    name: &str,
) -> Option<String> {
    let mapped = remap.channel(old_id)?;
    channels
        .iter()
        .find(|channel| channel.name == name && channel.id == mapped.id)
        .map(|channel| channel.id.clone())
}

/// Resolve an old-id/name role reference to a live role id.
pub fn remapped_role_id(
    roles: &[RoleView],
    remap: &RemapTable,
    old_id: &str,
    name: &str,
) -> Option<String> {
    let mapped = remap.role(old_id)?;
    roles
        .iter()
        .find(|role| role.name == name && role.id == mapped.id)
        .map(|role| role.id.clone())
}
