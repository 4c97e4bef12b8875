//! Capture and restore options.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use vermeer_error::{StructuralError, StructuralErrorKind, VermeerResult};

/// How media assets are saved during capture.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SaveImages {
    /// Do not record media beyond what the document structure requires
    Off,
    /// Record reference URLs only
    #[default]
    ByReference,
    /// Record reference URLs plus inlined base64 payloads
    Inline,
}

impl SaveImages {
    /// True when capture should download and inline asset bytes.
    pub fn inline(&self) -> bool {
        matches!(self, SaveImages::Inline)
    }
}

/// A snapshot section that can be skipped during capture (`do_not_backup`)
/// or restore (`do_not_load`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Section {
    /// Bans
    Bans,
    /// Roles
    Roles,
    /// Emojis
    Emojis,
    /// Channel hierarchy and content
    Channels,
    /// Everything except emojis: profile, bans, roles, channels, rules
    Main,
    /// Member role reassignment (restore only)
    RoleAssignments,
}

fn default_max_messages() -> usize {
    10
}

fn default_speed_ms() -> u64 {
    250
}

fn default_clear() -> bool {
    true
}

/// Options for a capture run.
///
/// # Examples
///
/// ```
/// use vermeer_core::{CaptureOptionsBuilder, SaveImages};
///
/// let options = CaptureOptionsBuilder::default()
///     .max_messages_per_channel(25usize)
///     .save_images(SaveImages::Inline)
///     .build()
///     .unwrap();
/// assert_eq!(*options.max_messages_per_channel(), 25);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[serde(rename_all = "snake_case")]
#[builder(default)]
pub struct CaptureOptions {
    /// Explicit snapshot id; generated when absent
    #[serde(default)]
    backup_id: Option<String>,
    /// Per-channel message cap
    #[serde(default = "default_max_messages")]
    max_messages_per_channel: usize,
    /// Media capture mode
    #[serde(default)]
    save_images: SaveImages,
    /// Whether to capture the member list
    #[serde(default)]
    backup_members: bool,
    /// Sections to skip
    #[serde(default)]
    do_not_backup: HashSet<Section>,
    /// Minimum milliseconds between scheduler dispatches
    #[serde(default = "default_speed_ms")]
    speed_ms: u64,
    /// Enable dispatch event logging
    #[serde(default)]
    verbose: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            backup_id: None,
            max_messages_per_channel: default_max_messages(),
            save_images: SaveImages::default(),
            backup_members: false,
            do_not_backup: HashSet::new(),
            speed_ms: default_speed_ms(),
            verbose: false,
        }
    }
}

impl CaptureOptions {
    /// True when the given section is excluded from capture.
    pub fn skips(&self, section: Section) -> bool {
        self.do_not_backup.contains(&section)
    }

    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns a structural error when the dispatch interval is zero.
    pub fn validate(&self) -> VermeerResult<()> {
        if self.speed_ms == 0 {
            return Err(StructuralError::new(StructuralErrorKind::InvalidOptions(
                "speed_ms must be at least 1".to_string(),
            )))?;
        }
        Ok(())
    }
}

/// Options for a restore run.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[serde(rename_all = "snake_case")]
#[builder(default)]
pub struct RestoreOptions {
    /// Per-channel replay cap; when smaller than the captured count only
    /// the most recent messages are replayed
    #[serde(default = "default_max_messages")]
    max_messages_per_channel: usize,
    /// Whether to clear the target before restoring
    #[serde(default = "default_clear")]
    clear_before_restore: bool,
    /// Sections to skip
    #[serde(default)]
    do_not_load: HashSet<Section>,
    /// Minimum milliseconds between scheduler dispatches
    #[serde(default = "default_speed_ms")]
    speed_ms: u64,
    /// Enable dispatch event logging
    #[serde(default)]
    verbose: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            max_messages_per_channel: default_max_messages(),
            clear_before_restore: default_clear(),
            do_not_load: HashSet::new(),
            speed_ms: default_speed_ms(),
            verbose: false,
        }
    }
}

impl RestoreOptions {
    /// True when the given section is excluded from restore.
    pub fn skips(&self, section: Section) -> bool {
        self.do_not_load.contains(&section)
    }

    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns a structural error when the dispatch interval is zero.
    pub fn validate(&self) -> VermeerResult<()> {
        if self.speed_ms == 0 {
            return Err(StructuralError::new(StructuralErrorKind::InvalidOptions(
                "speed_ms must be at least 1".to_string(),
            )))?;
        }
        Ok(())
    }
}
