//! Emoji types.

use crate::MediaPayload;
use serde::{Deserialize, Serialize};

/// A captured emoji.
///
/// Capture collects at most 50 emojis and discards the remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emoji {
    /// Emoji name
    pub name: String,
    /// Emoji image
    pub payload: MediaPayload,
}
