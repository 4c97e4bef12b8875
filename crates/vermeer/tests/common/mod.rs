//! In-memory test doubles for the engine's collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use vermeer::{
    AuthorView, AutoModRuleView, BanView, ChannelKind, ChannelView, CreateAutoModRule,
    CreateChannel, CreateRole, CreateThread, DirectoryError, DirectoryErrorKind, EditRole,
    EmojiView, ImageInput, MediaFetcher, MemberView, MessageView, OutboundMessage, ProxyPersona,
    ProxyView, RemoteDirectory, RoleOverwrite, RoleView, Scheduler, SentMessage, SpaceProfile,
    ThreadView, VermeerResult,
};

/// Mutable state of the fake space.
#[derive(Debug, Default)]
pub struct SpaceState {
    pub profile: Option<SpaceProfile>,
    pub roles: Vec<RoleView>,
    pub channels: Vec<ChannelView>,
    /// Threads keyed by parent channel id
    pub threads: HashMap<String, Vec<ThreadView>>,
    /// Messages keyed by channel or thread id, newest first
    pub messages: HashMap<String, Vec<MessageView>>,
    pub bans: Vec<BanView>,
    pub members: Vec<MemberView>,
    pub emojis: Vec<EmojiView>,
    pub rules: Vec<AutoModRuleView>,
    pub proxies: Vec<ProxyView>,
}

/// In-memory [`RemoteDirectory`] implementation.
pub struct InMemoryDirectory {
    pub state: Mutex<SpaceState>,
    pub acting: String,
    next_id: AtomicUsize,
    /// Number of message page fetches served
    pub fetch_calls: AtomicUsize,
    /// Ordered log of entity creations, e.g. `role:Mods`, `channel:text:general`
    pub creation_log: Mutex<Vec<String>>,
    /// Sends whose content contains this fail with the oversize kind
    oversize_marker: Option<String>,
    /// Sends whose content contains this fail with a generic API error
    fail_send_marker: Option<String>,
    /// Pins of messages whose content contains this fail
    fail_pin_marker: Option<String>,
}

impl InMemoryDirectory {
    pub fn new(state: SpaceState) -> Self {
        Self {
            state: Mutex::new(state),
            acting: "acting-user".to_string(),
            next_id: AtomicUsize::new(1000),
            fetch_calls: AtomicUsize::new(0),
            creation_log: Mutex::new(Vec::new()),
            oversize_marker: None,
            fail_send_marker: None,
            fail_pin_marker: None,
        }
    }

    pub fn with_oversize_marker(mut self, marker: &str) -> Self {
        self.oversize_marker = Some(marker.to_string());
        self
    }

    pub fn with_fail_send_marker(mut self, marker: &str) -> Self {
        self.fail_send_marker = Some(marker.to_string());
        self
    }

    pub fn with_fail_pin_marker(mut self, marker: &str) -> Self {
        self.fail_pin_marker = Some(marker.to_string());
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.creation_log.lock().unwrap().clone()
    }

    fn mint(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record(&self, entry: String) {
        self.creation_log.lock().unwrap().push(entry);
    }

    fn api_error(message: &str) -> vermeer::VermeerError {
        DirectoryError::new(DirectoryErrorKind::Api(message.to_string())).into()
    }

    fn not_found(what: &str) -> vermeer::VermeerError {
        DirectoryError::new(DirectoryErrorKind::NotFound(what.to_string())).into()
    }

    fn send_impl(
        &self,
        target: &str,
        author: AuthorView,
        message: OutboundMessage,
    ) -> VermeerResult<SentMessage> {
        let content = message.content.clone().unwrap_or_default();
        if let Some(marker) = &self.oversize_marker {
            if content.contains(marker.as_str()) {
                return Err(DirectoryError::new(DirectoryErrorKind::OversizePayload))?;
            }
        }
        if let Some(marker) = &self.fail_send_marker {
            if content.contains(marker.as_str()) {
                return Err(Self::api_error("send rejected"));
            }
        }

        let id = self.mint("m");
        let view = MessageView {
            id: id.clone(),
            author: Some(author),
            content,
            embeds: message.embeds,
            components: message.components,
            attachments: message
                .attachments
                .iter()
                .map(|a| (a.name.clone(), format!("attachment://{}", a.name)))
                .collect(),
            pinned: false,
            sent_at: Utc::now(),
        };

        let mut state = self.state.lock().unwrap();
        state
            .messages
            .entry(target.to_string())
            .or_default()
            .insert(0, view);

        Ok(SentMessage {
            id,
            channel_id: target.to_string(),
        })
    }
}

#[async_trait]
impl RemoteDirectory for InMemoryDirectory {
    fn acting_user_id(&self) -> String {
        self.acting.clone()
    }

    async fn get_profile(&self) -> VermeerResult<SpaceProfile> {
        self.state
            .lock()
            .unwrap()
            .profile
            .clone()
            .ok_or_else(|| Self::not_found("space"))
    }

    async fn list_roles(&self) -> VermeerResult<Vec<RoleView>> {
        Ok(self.state.lock().unwrap().roles.clone())
    }

    async fn list_channels(&self) -> VermeerResult<Vec<ChannelView>> {
        Ok(self.state.lock().unwrap().channels.clone())
    }

    async fn list_threads(&self, channel_id: &str) -> VermeerResult<Vec<ThreadView>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .threads
            .get(channel_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: usize,
    ) -> VermeerResult<Vec<MessageView>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let Some(messages) = state.messages.get(channel_id) else {
            return Ok(Vec::new());
        };
        let start = match before {
            Some(before) => match messages.iter().position(|m| m.id == before) {
                Some(index) => index + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };
        Ok(messages
            .iter()
            .skip(start)
            .take(limit.min(100))
            .cloned()
            .collect())
    }

    async fn list_bans(&self) -> VermeerResult<Vec<BanView>> {
        Ok(self.state.lock().unwrap().bans.clone())
    }

    async fn list_members(&self) -> VermeerResult<Vec<MemberView>> {
        Ok(self.state.lock().unwrap().members.clone())
    }

    async fn list_emojis(&self) -> VermeerResult<Vec<EmojiView>> {
        Ok(self.state.lock().unwrap().emojis.clone())
    }

    async fn list_automod_rules(&self) -> VermeerResult<Vec<AutoModRuleView>> {
        Ok(self.state.lock().unwrap().rules.clone())
    }

    async fn list_proxies(&self) -> VermeerResult<Vec<ProxyView>> {
        Ok(self.state.lock().unwrap().proxies.clone())
    }

    async fn set_name(&self, name: &str) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.name = name.to_string();
        }
        Ok(())
    }

    async fn set_icon(&self, icon: Option<ImageInput>) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.icon_url = icon.map(image_url);
        }
        Ok(())
    }

    async fn set_splash(&self, splash: Option<ImageInput>) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.splash_url = splash.map(image_url);
        }
        Ok(())
    }

    async fn set_banner(&self, banner: Option<ImageInput>) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.banner_url = banner.map(image_url);
        }
        Ok(())
    }

    async fn set_verification_level(&self, level: u8) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.verification_level = level;
        }
        Ok(())
    }

    async fn set_default_notifications(&self, setting: u8) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.default_notifications = setting;
        }
        Ok(())
    }

    async fn set_explicit_content_filter(&self, level: u8) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.explicit_content_filter = level;
        }
        Ok(())
    }

    async fn set_afk_channel(&self, channel_id: Option<&str>) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let name = channel_id.and_then(|id| {
            state
                .channels
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
        });
        if let Some(profile) = &mut state.profile {
            profile.afk_channel_name = name;
        }
        Ok(())
    }

    async fn set_afk_timeout(&self, timeout_secs: u32) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.afk_timeout_secs = timeout_secs;
        }
        Ok(())
    }

    async fn set_widget(&self, enabled: bool, channel_id: Option<&str>) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let name = channel_id.and_then(|id| {
            state
                .channels
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
        });
        if let Some(profile) = &mut state.profile {
            profile.widget_enabled = enabled;
            profile.widget_channel_name = name;
        }
        Ok(())
    }

    async fn set_system_channel(&self, channel_id: Option<&str>) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let name = channel_id.and_then(|id| {
            state
                .channels
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
        });
        if let Some(profile) = &mut state.profile {
            profile.system_channel_name = name;
        }
        Ok(())
    }

    async fn set_system_channel_flags(&self, flags: u64) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.system_channel_flags = flags;
        }
        Ok(())
    }

    async fn set_progress_bar(&self, enabled: bool) -> VermeerResult<()> {
        if let Some(profile) = &mut self.state.lock().unwrap().profile {
            profile.progress_bar_enabled = enabled;
        }
        Ok(())
    }

    async fn create_role(&self, spec: CreateRole) -> VermeerResult<RoleView> {
        let view = RoleView {
            id: self.mint("r"),
            name: spec.name.clone(),
            color: spec.color,
            icon_url: spec.icon.map(image_url),
            hoist: spec.hoist,
            permissions: spec.permissions,
            mentionable: spec.mentionable,
            position: spec.position,
            managed: false,
            editable: true,
            is_everyone: false,
        };
        self.record(format!("role:{}", spec.name));
        self.state.lock().unwrap().roles.push(view.clone());
        Ok(view)
    }

    async fn edit_role(&self, role_id: &str, spec: EditRole) -> VermeerResult<RoleView> {
        let mut state = self.state.lock().unwrap();
        let Some(role) = state.roles.iter_mut().find(|r| r.id == role_id) else {
            return Err(Self::not_found(role_id));
        };
        role.permissions = spec.permissions;
        role.mentionable = spec.mentionable;
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: &str) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.roles.len();
        state.roles.retain(|r| r.id != role_id);
        if state.roles.len() == before {
            return Err(Self::not_found(role_id));
        }
        Ok(())
    }

    async fn create_channel(&self, spec: CreateChannel) -> VermeerResult<ChannelView> {
        let position = self.state.lock().unwrap().channels.len() as i32;
        let view = ChannelView {
            id: self.mint("c"),
            name: spec.name.clone(),
            kind: spec.kind,
            position,
            parent_id: spec.parent_id,
            topic: spec.topic,
            nsfw: spec.nsfw,
            slow_mode_secs: spec.slow_mode_secs,
            bitrate: spec.bitrate,
            user_limit: spec.user_limit,
            overwrites: vec![],
            deletable: true,
        };
        self.record(format!("channel:{}:{}", spec.kind, spec.name));
        self.state.lock().unwrap().channels.push(view.clone());
        Ok(view)
    }

    async fn set_overwrites(
        &self,
        channel_id: &str,
        overwrites: Vec<RoleOverwrite>,
    ) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let Some(channel) = state.channels.iter_mut().find(|c| c.id == channel_id) else {
            return Err(Self::not_found(channel_id));
        };
        channel.overwrites = overwrites;
        Ok(())
    }

    async fn delete_channel(&self, channel_id: &str) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.channels.len();
        state.channels.retain(|c| c.id != channel_id);
        if state.channels.len() == before {
            return Err(Self::not_found(channel_id));
        }
        state.messages.remove(channel_id);
        state.threads.remove(channel_id);
        Ok(())
    }

    async fn create_thread(
        &self,
        channel_id: &str,
        spec: CreateThread,
    ) -> VermeerResult<ThreadView> {
        let view = ThreadView {
            id: self.mint("t"),
            name: spec.name.clone(),
            archived: false,
            auto_archive_minutes: spec.auto_archive_minutes,
            locked: false,
            slow_mode_secs: None,
        };
        self.record(format!("thread:{}", spec.name));
        self.state
            .lock()
            .unwrap()
            .threads
            .entry(channel_id.to_string())
            .or_default()
            .push(view.clone());
        Ok(view)
    }

    async fn create_proxy(
        &self,
        channel_id: &str,
        name: &str,
        _avatar_url: Option<&str>,
    ) -> VermeerResult<ProxyView> {
        let view = ProxyView {
            id: self.mint("p"),
            name: name.to_string(),
            channel_id: channel_id.to_string(),
        };
        self.record(format!("proxy:{channel_id}"));
        self.state.lock().unwrap().proxies.push(view.clone());
        Ok(view)
    }

    async fn delete_proxy(&self, proxy_id: &str) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.proxies.len();
        state.proxies.retain(|p| p.id != proxy_id);
        if state.proxies.len() == before {
            return Err(Self::not_found(proxy_id));
        }
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: &str,
        message: OutboundMessage,
    ) -> VermeerResult<SentMessage> {
        let author = AuthorView {
            id: self.acting.clone(),
            username: "acting".to_string(),
            avatar_url: "https://cdn.test/acting.png".to_string(),
        };
        self.send_impl(channel_id, author, message)
    }

    async fn send_via_proxy(
        &self,
        proxy_id: &str,
        message: OutboundMessage,
        persona: ProxyPersona,
    ) -> VermeerResult<SentMessage> {
        let channel_id = {
            let state = self.state.lock().unwrap();
            let Some(proxy) = state.proxies.iter().find(|p| p.id == proxy_id) else {
                return Err(Self::not_found(proxy_id));
            };
            proxy.channel_id.clone()
        };
        let target = persona.thread_id.clone().unwrap_or(channel_id);
        let author = AuthorView {
            id: format!("persona:{}", persona.username),
            username: persona.username,
            avatar_url: persona.avatar_url,
        };
        self.send_impl(&target, author, message)
    }

    async fn pin_message(&self, channel_id: &str, message_id: &str) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let Some(messages) = state.messages.get_mut(channel_id) else {
            return Err(Self::not_found(channel_id));
        };
        let Some(message) = messages.iter_mut().find(|m| m.id == message_id) else {
            return Err(Self::not_found(message_id));
        };
        if let Some(marker) = &self.fail_pin_marker {
            if message.content.contains(marker.as_str()) {
                return Err(Self::api_error("pin rejected"));
            }
        }
        message.pinned = true;
        Ok(())
    }

    async fn ban(&self, user_id: &str, reason: Option<&str>) -> VermeerResult<()> {
        self.state.lock().unwrap().bans.push(BanView {
            user_id: user_id.to_string(),
            reason: reason.map(str::to_string),
        });
        Ok(())
    }

    async fn unban(&self, user_id: &str) -> VermeerResult<()> {
        self.state
            .lock()
            .unwrap()
            .bans
            .retain(|b| b.user_id != user_id);
        Ok(())
    }

    async fn create_emoji(&self, name: &str, image: ImageInput) -> VermeerResult<EmojiView> {
        let view = EmojiView {
            id: self.mint("e"),
            name: name.to_string(),
            url: image_url(image),
        };
        self.record(format!("emoji:{name}"));
        self.state.lock().unwrap().emojis.push(view.clone());
        Ok(view)
    }

    async fn delete_emoji(&self, emoji_id: &str) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.emojis.len();
        state.emojis.retain(|e| e.id != emoji_id);
        if state.emojis.len() == before {
            return Err(Self::not_found(emoji_id));
        }
        Ok(())
    }

    async fn create_automod_rule(
        &self,
        spec: CreateAutoModRule,
    ) -> VermeerResult<AutoModRuleView> {
        let view = AutoModRuleView {
            id: self.mint("rule"),
            name: spec.name.clone(),
            event_type: spec.event_type,
            trigger_type: spec.trigger_type,
            trigger_metadata: spec.trigger_metadata,
            actions: spec.actions,
            enabled: spec.enabled,
            exempt_role_ids: spec.exempt_role_ids,
            exempt_channel_ids: spec.exempt_channel_ids,
        };
        self.record(format!("rule:{}", spec.name));
        self.state.lock().unwrap().rules.push(view.clone());
        Ok(view)
    }

    async fn delete_automod_rule(&self, rule_id: &str) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.rules.len();
        state.rules.retain(|r| r.id != rule_id);
        if state.rules.len() == before {
            return Err(Self::not_found(rule_id));
        }
        Ok(())
    }

    async fn edit_member_roles(&self, user_id: &str, role_ids: Vec<String>) -> VermeerResult<()> {
        let mut state = self.state.lock().unwrap();
        // Unknown role ids make the edit fail outright, like the real
        // backend: the engine must filter unmapped ids first.
        if role_ids
            .iter()
            .any(|id| !state.roles.iter().any(|r| r.id == *id))
        {
            return Err(Self::api_error("unknown role in member edit"));
        }
        let Some(member) = state.members.iter_mut().find(|m| m.user_id == user_id) else {
            return Err(Self::not_found(user_id));
        };
        member.role_ids = role_ids;
        Ok(())
    }
}

fn image_url(image: ImageInput) -> String {
    match image {
        ImageInput::Url(url) => url,
        ImageInput::Bytes(bytes) => format!("mem://inline/{}", bytes.len()),
    }
}

/// Media fetcher returning fixed bytes, or failing when configured.
pub struct StubMediaFetcher {
    pub bytes: Vec<u8>,
    pub fail: bool,
}

impl Default for StubMediaFetcher {
    fn default() -> Self {
        Self {
            bytes: b"image-bytes".to_vec(),
            fail: false,
        }
    }
}

#[async_trait]
impl MediaFetcher for StubMediaFetcher {
    async fn fetch(&self, url: &str) -> VermeerResult<Vec<u8>> {
        if self.fail {
            return Err(InMemoryDirectory::api_error(url));
        }
        Ok(self.bytes.clone())
    }
}

/// A scheduler tuned for tests.
pub fn scheduler() -> Scheduler {
    Scheduler::from_speed_ms(1)
}

/// A bare profile with the given name and no capabilities.
pub fn profile(name: &str) -> SpaceProfile {
    SpaceProfile {
        id: "space-1".to_string(),
        name: name.to_string(),
        verification_level: 0,
        explicit_content_filter: 0,
        default_notifications: 0,
        afk_channel_name: None,
        afk_timeout_secs: 300,
        widget_enabled: false,
        widget_channel_name: None,
        system_channel_name: None,
        system_channel_flags: 0,
        progress_bar_enabled: false,
        icon_url: None,
        splash_url: None,
        banner_url: None,
        premium_tier: vermeer::PremiumTier::None,
        capabilities: Default::default(),
    }
}

pub fn role_view(id: &str, name: &str, position: i32) -> RoleView {
    RoleView {
        id: id.to_string(),
        name: name.to_string(),
        color: 0,
        icon_url: None,
        hoist: false,
        permissions: 0,
        mentionable: false,
        position,
        managed: false,
        editable: true,
        is_everyone: false,
    }
}

pub fn everyone_role(id: &str) -> RoleView {
    RoleView {
        is_everyone: true,
        editable: false,
        position: 0,
        ..role_view(id, "@everyone", 0)
    }
}

pub fn channel_view(
    id: &str,
    name: &str,
    kind: ChannelKind,
    position: i32,
    parent: Option<&str>,
) -> ChannelView {
    ChannelView {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        position,
        parent_id: parent.map(str::to_string),
        topic: None,
        nsfw: false,
        slow_mode_secs: None,
        bitrate: if matches!(kind, ChannelKind::Voice | ChannelKind::Stage) {
            Some(64_000)
        } else {
            None
        },
        user_limit: None,
        overwrites: vec![],
        deletable: true,
    }
}

pub fn message_view(id: &str, author_id: &str, username: &str, content: &str) -> MessageView {
    MessageView {
        id: id.to_string(),
        author: Some(AuthorView {
            id: author_id.to_string(),
            username: username.to_string(),
            avatar_url: format!("https://cdn.test/{username}.png"),
        }),
        content: content.to_string(),
        embeds: vec![],
        components: vec![],
        attachments: vec![],
        pinned: false,
        sent_at: Utc::now(),
    }
}

pub fn member_view(user_id: &str, username: &str, bot: bool, role_ids: &[&str]) -> MemberView {
    MemberView {
        user_id: user_id.to_string(),
        username: username.to_string(),
        discriminator: None,
        avatar_url: None,
        joined_at: Some(Utc::now()),
        role_ids: role_ids.iter().map(|r| r.to_string()).collect(),
        bot,
    }
}

/// A captured message as it would appear in a snapshot document.
pub fn captured_message(
    old_id: &str,
    author_id: &str,
    username: &str,
    content: &str,
) -> vermeer::Message {
    vermeer::Message {
        old_id: old_id.to_string(),
        author_id: author_id.to_string(),
        username: username.to_string(),
        avatar_url: format!("https://cdn.test/{username}.png"),
        content: content.to_string(),
        embeds: vec![],
        components: vec![],
        attachments: vec![],
        pinned: false,
        sent_at: Utc::now(),
    }
}

pub fn emoji_view(id: &str, name: &str) -> EmojiView {
    EmojiView {
        id: id.to_string(),
        name: name.to_string(),
        url: format!("https://cdn.test/emoji/{name}.png"),
    }
}
