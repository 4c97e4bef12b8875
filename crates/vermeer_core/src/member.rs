//! Member and ban types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A captured ban.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ban {
    /// Id of the banned user
    pub user_id: String,
    /// Ban reason, when recorded
    #[serde(default)]
    pub reason: Option<String>,
}

/// A captured member.
///
/// Members are captured only when opted in; restore uses them solely for
/// role reassignment, and never assigns roles to bots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// User id, stable across spaces
    pub user_id: String,
    /// Username at capture time
    pub username: String,
    /// Legacy discriminator
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Avatar URL, when set
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Join timestamp on the source space
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    /// Ids of the member's roles on the source space
    #[serde(default)]
    pub role_old_ids: Vec<String>,
    /// Whether the account is a bot
    #[serde(default)]
    pub bot: bool,
}
