//! Trait seam between the Vermeer engine and the live community space.
//!
//! The engine never talks to a remote API directly. Every read and write it
//! performs is a method on [`RemoteDirectory`], and every media download is
//! a call on [`MediaFetcher`]. Implementations of these traits are external
//! collaborators; the engine only assumes the contracts documented here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod capability;
mod traits;
mod types;

pub use capability::{Capability, PremiumTier};
pub use traits::{MediaFetcher, RemoteDirectory};
pub use types::{
    AuthorView, AutoModActionView, AutoModRuleView, BanView, ChannelKind, ChannelView,
    CreateAutoModRule, CreateChannel, CreateRole, CreateThread, EditRole, EmojiView, ImageInput,
    MemberView, MessageView, OutboundMessage, ProxyPersona, ProxyView, RoleOverwrite, RoleView,
    SentMessage, SpaceProfile, ThreadView,
};
