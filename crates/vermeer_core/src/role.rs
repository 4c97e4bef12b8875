//! Role types.

use crate::MediaPayload;
use crate::channel::parse_mask;
use serde::{Deserialize, Serialize};

/// A 64-bit permission bitmask.
pub type PermissionMask = u64;

/// A captured role.
///
/// Roles are captured in descending-position order and that order is
/// replayed verbatim at restore time: the target assigns hierarchy position
/// by creation order, so the sequence of creation calls *is* the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Id of the role on the source space
    pub old_id: String,
    /// Role name
    pub name: String,
    /// RGB color as a packed integer
    pub color: u32,
    /// Role icon, when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<MediaPayload>,
    /// Whether members are listed separately under this role
    pub hoist: bool,
    /// Permission bits, as a decimal string
    pub permissions: String,
    /// Whether the role can be mentioned
    pub mentionable: bool,
    /// Hierarchy position on the source space
    pub position: i32,
    /// Whether this is the built-in base role every member holds
    #[serde(default)]
    pub is_everyone: bool,
}

impl Role {
    /// Permission bits as a 64-bit mask. Malformed masks read as zero.
    pub fn permission_bits(&self) -> PermissionMask {
        parse_mask(&self.permissions)
    }
}
