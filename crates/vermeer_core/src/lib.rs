//! Core data types for the Vermeer snapshot library.
//!
//! This crate defines the portable snapshot document: a single
//! JSON-serializable value capturing a community space's configuration and
//! durable content at a point in time. It also provides the capture/restore
//! option types and TOML configuration loading.
//!
//! Every 64-bit permission bitmask in the document is serialized as a
//! decimal string to avoid numeric precision loss in JSON consumers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod automod;
mod channel;
mod config;
mod emoji;
mod member;
mod message;
mod options;
mod role;
mod snapshot;
mod telemetry;

pub use automod::{AutoModAction, AutoModRule, ExemptRef};
pub use channel::{
    Category, Channel, ChannelTree, PermissionOverwrite, StageChannel, TextChannel, Thread,
    VoiceChannel,
};
pub use config::{StorageSettings, VermeerConfig};
pub use emoji::Emoji;
pub use member::{Ban, Member};
pub use message::{Attachment, AttachmentPayload, Message};
pub use options::{
    CaptureOptions, CaptureOptionsBuilder, RestoreOptions, RestoreOptionsBuilder, SaveImages,
    Section,
};
pub use role::{PermissionMask, Role};
pub use snapshot::{AfkSettings, MediaPayload, Snapshot, SystemChannelSettings, WidgetSettings};
pub use telemetry::init_telemetry;
