//! Collaborator trait definitions.

use crate::{
    AutoModRuleView, BanView, ChannelView, CreateAutoModRule, CreateChannel, CreateRole,
    CreateThread, EditRole, EmojiView, ImageInput, MemberView, MessageView, OutboundMessage,
    ProxyPersona, ProxyView, RoleOverwrite, RoleView, SentMessage, SpaceProfile, ThreadView,
};
use async_trait::async_trait;
use vermeer_error::VermeerResult;

/// The remote system hosting the live community space.
///
/// Every method corresponds to one remote call; the engine funnels each one
/// through its scheduler, so implementations should not add their own
/// queueing or retry layers. Write failures are reported through the error
/// taxonomy: a payload over the remote size limit must surface as the
/// distinguished oversize-payload kind, and capability-gated writes (stage
/// channels, announcement channels, explicit-filter changes) are never
/// issued against a target lacking the capability — the engine checks the
/// profile first.
#[async_trait]
pub trait RemoteDirectory: Send + Sync {
    /// Id of the account performing the capture or restore.
    fn acting_user_id(&self) -> String;

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetch the space profile.
    ///
    /// # Errors
    ///
    /// Fails when the target space does not exist or is unreachable; the
    /// engine treats that as structural.
    async fn get_profile(&self) -> VermeerResult<SpaceProfile>;

    /// List every role, including managed roles and the base role.
    async fn list_roles(&self) -> VermeerResult<Vec<RoleView>>;

    /// List every channel, categories included, as a flat collection.
    async fn list_channels(&self) -> VermeerResult<Vec<ChannelView>>;

    /// List the threads under a channel.
    async fn list_threads(&self, channel_id: &str) -> VermeerResult<Vec<ThreadView>>;

    /// Fetch one page of messages, newest first, strictly older than
    /// `before` when given. `limit` is capped at 100 by the remote side.
    async fn fetch_messages(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: usize,
    ) -> VermeerResult<Vec<MessageView>>;

    /// List every ban.
    async fn list_bans(&self) -> VermeerResult<Vec<BanView>>;

    /// List every member.
    async fn list_members(&self) -> VermeerResult<Vec<MemberView>>;

    /// List every emoji.
    async fn list_emojis(&self) -> VermeerResult<Vec<EmojiView>>;

    /// List every auto-moderation rule.
    async fn list_automod_rules(&self) -> VermeerResult<Vec<AutoModRuleView>>;

    /// List every proxy identity on the space.
    async fn list_proxies(&self) -> VermeerResult<Vec<ProxyView>>;

    // ------------------------------------------------------------------
    // Profile writes
    // ------------------------------------------------------------------

    /// Set the space name.
    async fn set_name(&self, name: &str) -> VermeerResult<()>;

    /// Set or clear the space icon.
    async fn set_icon(&self, icon: Option<ImageInput>) -> VermeerResult<()>;

    /// Set or clear the invite splash image.
    async fn set_splash(&self, splash: Option<ImageInput>) -> VermeerResult<()>;

    /// Set or clear the banner image.
    async fn set_banner(&self, banner: Option<ImageInput>) -> VermeerResult<()>;

    /// Set the verification level.
    async fn set_verification_level(&self, level: u8) -> VermeerResult<()>;

    /// Set the default notification setting.
    async fn set_default_notifications(&self, setting: u8) -> VermeerResult<()>;

    /// Set the explicit content filter level.
    async fn set_explicit_content_filter(&self, level: u8) -> VermeerResult<()>;

    /// Set or clear the AFK channel.
    async fn set_afk_channel(&self, channel_id: Option<&str>) -> VermeerResult<()>;

    /// Set the AFK idle timeout in seconds.
    async fn set_afk_timeout(&self, timeout_secs: u32) -> VermeerResult<()>;

    /// Set the widget enabled flag and channel.
    async fn set_widget(&self, enabled: bool, channel_id: Option<&str>) -> VermeerResult<()>;

    /// Set or clear the system channel.
    async fn set_system_channel(&self, channel_id: Option<&str>) -> VermeerResult<()>;

    /// Set the system channel flag bits.
    async fn set_system_channel_flags(&self, flags: u64) -> VermeerResult<()>;

    /// Set the boost progress bar flag.
    async fn set_progress_bar(&self, enabled: bool) -> VermeerResult<()>;

    // ------------------------------------------------------------------
    // Entity writes
    // ------------------------------------------------------------------

    /// Create a role. Hierarchy position is assigned by creation order.
    async fn create_role(&self, spec: CreateRole) -> VermeerResult<RoleView>;

    /// Edit a role in place.
    async fn edit_role(&self, role_id: &str, spec: EditRole) -> VermeerResult<RoleView>;

    /// Delete a role.
    async fn delete_role(&self, role_id: &str) -> VermeerResult<()>;

    /// Create a channel.
    async fn create_channel(&self, spec: CreateChannel) -> VermeerResult<ChannelView>;

    /// Replace a channel's permission overwrites.
    async fn set_overwrites(
        &self,
        channel_id: &str,
        overwrites: Vec<RoleOverwrite>,
    ) -> VermeerResult<()>;

    /// Delete a channel.
    async fn delete_channel(&self, channel_id: &str) -> VermeerResult<()>;

    /// Create a thread under a channel.
    async fn create_thread(
        &self,
        channel_id: &str,
        spec: CreateThread,
    ) -> VermeerResult<ThreadView>;

    /// Create a proxy identity bound to a channel.
    async fn create_proxy(
        &self,
        channel_id: &str,
        name: &str,
        avatar_url: Option<&str>,
    ) -> VermeerResult<ProxyView>;

    /// Delete a proxy identity.
    async fn delete_proxy(&self, proxy_id: &str) -> VermeerResult<()>;

    /// Send a message under the acting identity.
    async fn send_message(
        &self,
        channel_id: &str,
        message: OutboundMessage,
    ) -> VermeerResult<SentMessage>;

    /// Send a message through a proxy, displayed as authored by the persona.
    async fn send_via_proxy(
        &self,
        proxy_id: &str,
        message: OutboundMessage,
        persona: ProxyPersona,
    ) -> VermeerResult<SentMessage>;

    /// Pin a message in its channel.
    async fn pin_message(&self, channel_id: &str, message_id: &str) -> VermeerResult<()>;

    /// Ban a user.
    async fn ban(&self, user_id: &str, reason: Option<&str>) -> VermeerResult<()>;

    /// Revoke a ban.
    async fn unban(&self, user_id: &str) -> VermeerResult<()>;

    /// Create an emoji.
    async fn create_emoji(&self, name: &str, image: ImageInput) -> VermeerResult<EmojiView>;

    /// Delete an emoji.
    async fn delete_emoji(&self, emoji_id: &str) -> VermeerResult<()>;

    /// Create an auto-moderation rule.
    async fn create_automod_rule(
        &self,
        spec: CreateAutoModRule,
    ) -> VermeerResult<AutoModRuleView>;

    /// Delete an auto-moderation rule.
    async fn delete_automod_rule(&self, rule_id: &str) -> VermeerResult<()>;

    /// Replace a member's role set.
    async fn edit_member_roles(&self, user_id: &str, role_ids: Vec<String>) -> VermeerResult<()>;
}

/// Downloader for media assets referenced by URL.
///
/// Media downloads do not go through the call scheduler — the scheduler
/// models the directory's rate limit, and asset hosts are a separate
/// service.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the asset at `url` and return its bytes.
    async fn fetch(&self, url: &str) -> VermeerResult<Vec<u8>>;
}
