//! Snapshot capture.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use vermeer_core::{
    Attachment, AttachmentPayload, AutoModAction, AutoModRule, AfkSettings, Ban, CaptureOptions,
    Category, Channel, ChannelTree, Emoji, ExemptRef, MediaPayload, Member, Message,
    PermissionOverwrite, Role, Section, Snapshot, StageChannel, SystemChannelSettings, TextChannel,
    Thread, VoiceChannel, WidgetSettings,
};
use vermeer_error::{StructuralError, StructuralErrorKind, VermeerResult};
use vermeer_interface::{ChannelKind, ChannelView, MediaFetcher, RemoteDirectory, RoleView};
use vermeer_rate_limit::Scheduler;

/// File extensions treated as inlinable images.
const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "jpe", "jif", "jfif", "jfi"];

/// Messages whose cleaned content exceeds this are dropped, not truncated.
const MAX_CONTENT_CHARS: usize = 2000;

/// Emoji capture stops once this many entries are collected.
const EMOJI_CAP: usize = 50;

/// Largest message page the remote side will serve.
const PAGE_LIMIT: usize = 100;

/// Reads current remote state section by section, producing a normalized
/// [`Snapshot`] document.
///
/// Every remote read goes through the run's scheduler. Message fetch
/// failures degrade to a partial capture of the affected channel; listing
/// failures abort the run.
pub struct SnapshotCapture<'a, D: ?Sized, M: ?Sized> {
    directory: &'a D,
    media: &'a M,
    scheduler: &'a Scheduler,
    options: CaptureOptions,
}

impl<'a, D, M> SnapshotCapture<'a, D, M>
where
    D: RemoteDirectory + ?Sized,
    M: MediaFetcher + ?Sized,
{
    /// Create a capture run over the given collaborators.
    pub fn new(
        directory: &'a D,
        media: &'a M,
        scheduler: &'a Scheduler,
        options: CaptureOptions,
    ) -> Self {
        Self {
            directory,
            media,
            scheduler,
            options,
        }
    }

    /// Capture a snapshot of the space.
    ///
    /// Sections named in `do_not_backup` are skipped; members are captured
    /// only when `backup_members` is set.
    ///
    /// # Errors
    ///
    /// Fails structurally when the options are invalid or the target space
    /// cannot be read at all.
    #[instrument(skip(self), fields(space, roles, channels))]
    pub async fn run(&self) -> VermeerResult<Snapshot> {
        self.options.validate()?;

        let profile = self
            .scheduler
            .schedule("capture::profile", self.directory.get_profile())
            .await
            .map_err(|e| {
                StructuralError::new(StructuralErrorKind::MissingTarget(e.to_string()))
            })?;

        tracing::Span::current().record("space", profile.name.as_str());
        info!("Capturing snapshot");

        let id = self
            .options
            .backup_id()
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

        let icon = self.capture_media(profile.icon_url.as_deref()).await;
        let splash = self.capture_media(profile.splash_url.as_deref()).await;
        let banner = self.capture_media(profile.banner_url.as_deref()).await;

        let mut snapshot = Snapshot {
            id,
            source_space_id: profile.id.clone(),
            created_at: Utc::now(),
            messages_per_channel: *self.options.max_messages_per_channel(),
            name: profile.name.clone(),
            verification_level: profile.verification_level,
            explicit_content_filter: profile.explicit_content_filter,
            default_notifications: profile.default_notifications,
            afk: profile.afk_channel_name.clone().map(|channel_name| AfkSettings {
                channel_name,
                timeout_secs: profile.afk_timeout_secs,
            }),
            widget: WidgetSettings {
                enabled: profile.widget_enabled,
                channel_name: profile.widget_channel_name.clone(),
            },
            system_channel: profile.system_channel_name.clone().map(|name| {
                SystemChannelSettings {
                    name,
                    flags: profile.system_channel_flags,
                }
            }),
            progress_bar_enabled: profile.progress_bar_enabled,
            icon,
            splash,
            banner,
            auto_moderation_rules: vec![],
            channels: ChannelTree::default(),
            roles: vec![],
            bans: vec![],
            emojis: vec![],
            members: vec![],
        };

        // One role listing and one channel listing serve the role section,
        // overwrite naming, and auto-mod reference rewriting.
        let role_views = self
            .scheduler
            .schedule("capture::roles", self.directory.list_roles())
            .await?;
        let channel_views = self
            .scheduler
            .schedule("capture::channels", self.directory.list_channels())
            .await?;

        if !self.options.skips(Section::Roles) {
            snapshot.roles = self.capture_roles(&role_views).await;
        }
        if !self.options.skips(Section::Channels) {
            snapshot.channels = self.capture_channels(&role_views, &channel_views).await;
        }
        if !self.options.skips(Section::Emojis) {
            snapshot.emojis = self.capture_emojis().await?;
        }
        if !self.options.skips(Section::Bans) {
            snapshot.bans = self.capture_bans().await?;
        }
        if *self.options.backup_members() {
            snapshot.members = self.capture_members().await?;
        }
        snapshot.auto_moderation_rules = self
            .capture_automod_rules(&role_views, &channel_views)
            .await?;

        tracing::Span::current().record("roles", snapshot.roles.len());
        tracing::Span::current().record("channels", channel_views.len());
        info!(id = %snapshot.id, "Capture complete");

        Ok(snapshot)
    }

    /// Capture roles in descending-position order, skipping managed roles.
    async fn capture_roles(&self, role_views: &[RoleView]) -> Vec<Role> {
        let mut views: Vec<&RoleView> = role_views.iter().filter(|r| !r.managed).collect();
        views.sort_by(|a, b| b.position.cmp(&a.position));

        let mut captured = Vec::with_capacity(views.len());
        for view in views {
            let icon = self.capture_media(view.icon_url.as_deref()).await;
            captured.push(Role {
                old_id: view.id.clone(),
                name: view.name.clone(),
                color: view.color,
                icon,
                hoist: view.hoist,
                permissions: view.permissions.to_string(),
                mentionable: view.mentionable,
                position: view.position,
                is_everyone: view.is_everyone,
            });
        }
        captured
    }

    /// Capture the channel tree: categories ascending by position, each
    /// category's children ascending by position, uncategorized channels
    /// as `others`.
    async fn capture_channels(
        &self,
        roles: &[RoleView],
        channels: &[ChannelView],
    ) -> ChannelTree {
        let mut tree = ChannelTree::default();

        let mut categories: Vec<&ChannelView> = channels
            .iter()
            .filter(|c| c.kind == ChannelKind::Category)
            .collect();
        categories.sort_by_key(|c| c.position);

        for category in categories {
            let mut children: Vec<&ChannelView> = channels
                .iter()
                .filter(|c| c.parent_id.as_deref() == Some(category.id.as_str()))
                .collect();
            children.sort_by_key(|c| c.position);

            let mut data = Category {
                old_id: category.id.clone(),
                name: category.name.clone(),
                overwrites: capture_overwrites(roles, category),
                children: Vec::with_capacity(children.len()),
            };
            for child in children {
                if let Some(channel) = self.capture_channel(roles, child).await {
                    data.children.push(channel);
                }
            }
            tree.categories.push(data);
        }

        let mut others: Vec<&ChannelView> = channels
            .iter()
            .filter(|c| c.parent_id.is_none() && c.kind != ChannelKind::Category)
            .collect();
        others.sort_by_key(|c| c.position);

        for view in others {
            if let Some(channel) = self.capture_channel(roles, view).await {
                tree.others.push(channel);
            }
        }

        tree
    }

    /// Capture one channel with kind-specific payload.
    async fn capture_channel(&self, roles: &[RoleView], view: &ChannelView) -> Option<Channel> {
        match view.kind {
            ChannelKind::Category => None,
            ChannelKind::Text | ChannelKind::Announcement => {
                let messages = self.capture_messages(&view.id, &view.name).await;
                let threads = self.capture_threads(view).await;
                let data = TextChannel {
                    old_id: view.id.clone(),
                    name: view.name.clone(),
                    overwrites: capture_overwrites(roles, view),
                    topic: view.topic.clone(),
                    nsfw: view.nsfw,
                    slow_mode_secs: view.slow_mode_secs,
                    messages,
                    threads,
                };
                Some(if view.kind == ChannelKind::Announcement {
                    Channel::Announcement(data)
                } else {
                    Channel::Text(data)
                })
            }
            ChannelKind::Voice => Some(Channel::Voice(VoiceChannel {
                old_id: view.id.clone(),
                name: view.name.clone(),
                overwrites: capture_overwrites(roles, view),
                bitrate: view.bitrate.unwrap_or(64_000),
                user_limit: view.user_limit,
            })),
            ChannelKind::Stage => {
                let messages = self.capture_messages(&view.id, &view.name).await;
                Some(Channel::Stage(StageChannel {
                    old_id: view.id.clone(),
                    name: view.name.clone(),
                    overwrites: capture_overwrites(roles, view),
                    topic: view.topic.clone(),
                    nsfw: view.nsfw,
                    slow_mode_secs: view.slow_mode_secs,
                    bitrate: view.bitrate.unwrap_or(64_000),
                    user_limit: view.user_limit,
                    messages,
                }))
            }
        }
    }

    /// Capture a channel's threads, each with its own paginated messages.
    async fn capture_threads(&self, view: &ChannelView) -> Vec<Thread> {
        let thread_views = match self
            .scheduler
            .schedule(
                format!("capture::threads::{}", view.name),
                self.directory.list_threads(&view.id),
            )
            .await
        {
            Ok(threads) => threads,
            Err(e) => {
                warn!(channel = %view.name, error = %e, "Failed to list threads, capturing channel without them");
                return Vec::new();
            }
        };

        let mut threads = Vec::with_capacity(thread_views.len());
        for thread in thread_views {
            let messages = self.capture_messages(&thread.id, &thread.name).await;
            threads.push(Thread {
                name: thread.name,
                auto_archive_minutes: thread.auto_archive_minutes,
                archived: thread.archived,
                locked: thread.locked,
                slow_mode_secs: thread.slow_mode_secs,
                messages,
            });
        }
        threads
    }

    /// Paginate a channel's messages backward from the newest.
    ///
    /// The cursor for each page is the oldest-seen message id of the page
    /// before it. Pagination stops on an empty page, when the cap is
    /// reached, or when a message has no resolvable author. Oversize
    /// content drops the message without charging the cap.
    async fn capture_messages(&self, channel_id: &str, channel_name: &str) -> Vec<Message> {
        let cap = *self.options.max_messages_per_channel();
        if cap == 0 {
            return Vec::new();
        }
        let page_size = cap.min(PAGE_LIMIT);

        let mut collected: Vec<Message> = Vec::new();
        let mut before: Option<String> = None;

        loop {
            let page = match self
                .scheduler
                .schedule(
                    format!("capture::messages::{channel_name}"),
                    self.directory
                        .fetch_messages(channel_id, before.as_deref(), page_size),
                )
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    warn!(channel = %channel_name, error = %e, "Message fetch failed, keeping partial capture");
                    break;
                }
            };
            if page.is_empty() {
                break;
            }
            before = page.last().map(|m| m.id.clone());

            let mut stop = false;
            for view in page {
                if collected.len() >= cap {
                    stop = true;
                    break;
                }
                let Some(author) = view.author else {
                    stop = true;
                    break;
                };
                if view.content.chars().count() > MAX_CONTENT_CHARS {
                    continue;
                }
                let attachments = self.capture_attachments(&view.attachments).await;
                collected.push(Message {
                    old_id: view.id,
                    author_id: author.id,
                    username: author.username,
                    avatar_url: author.avatar_url,
                    content: view.content,
                    embeds: view.embeds,
                    components: view.components,
                    attachments,
                    pinned: view.pinned,
                    sent_at: view.sent_at,
                });
            }
            if stop {
                break;
            }
        }

        collected
    }

    /// Resolve each attachment individually: image-typed attachments are
    /// inlined when configured, everything else is kept by reference URL.
    async fn capture_attachments(&self, attachments: &[(String, String)]) -> Vec<Attachment> {
        let mut captured = Vec::with_capacity(attachments.len());
        for (name, url) in attachments {
            if self.options.save_images().inline() && is_image(url) {
                match self.media.fetch(url).await {
                    Ok(bytes) => {
                        captured.push(Attachment {
                            name: name.clone(),
                            payload: AttachmentPayload::Inline(BASE64.encode(bytes)),
                        });
                        continue;
                    }
                    Err(e) => {
                        warn!(url = %url, error = %e, "Attachment download failed, keeping reference");
                    }
                }
            }
            captured.push(Attachment {
                name: name.clone(),
                payload: AttachmentPayload::Url(url.clone()),
            });
        }
        captured
    }

    /// Capture at most [`EMOJI_CAP`] emojis, discarding any remainder.
    async fn capture_emojis(&self) -> VermeerResult<Vec<Emoji>> {
        let views = self
            .scheduler
            .schedule("capture::emojis", self.directory.list_emojis())
            .await?;

        let mut collected = Vec::new();
        for view in views {
            if collected.len() >= EMOJI_CAP {
                debug!("Emoji cap reached, discarding remainder");
                break;
            }
            let payload = self.media_payload(&view.url).await;
            collected.push(Emoji {
                name: view.name,
                payload,
            });
        }
        Ok(collected)
    }

    async fn capture_bans(&self) -> VermeerResult<Vec<Ban>> {
        let bans = self
            .scheduler
            .schedule("capture::bans", self.directory.list_bans())
            .await?;
        Ok(bans
            .into_iter()
            .map(|ban| Ban {
                user_id: ban.user_id,
                reason: ban.reason,
            })
            .collect())
    }

    async fn capture_members(&self) -> VermeerResult<Vec<Member>> {
        let members = self
            .scheduler
            .schedule("capture::members", self.directory.list_members())
            .await?;
        Ok(members
            .into_iter()
            .map(|member| Member {
                user_id: member.user_id,
                username: member.username,
                discriminator: member.discriminator,
                avatar_url: member.avatar_url,
                joined_at: member.joined_at,
                role_old_ids: member.role_ids,
                bot: member.bot,
            })
            .collect())
    }

    /// Capture auto-moderation rules, rewriting channel-id references in
    /// action metadata to channel names and recording exemptions as
    /// old-id/name pairs for later re-resolution.
    async fn capture_automod_rules(
        &self,
        roles: &[RoleView],
        channels: &[ChannelView],
    ) -> VermeerResult<Vec<AutoModRule>> {
        let rules = self
            .scheduler
            .schedule("capture::automod-rules", self.directory.list_automod_rules())
            .await?;

        let mut collected = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut actions = Vec::with_capacity(rule.actions.len());
            for action in rule.actions {
                let mut metadata = action.metadata;
                let channel_id = metadata
                    .get("channelId")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                match channel_id {
                    Some(channel_id) => {
                        // An action whose channel no longer resolves is dropped.
                        let Some(channel) = channels.iter().find(|c| c.id == channel_id) else {
                            continue;
                        };
                        if let Some(object) = metadata.as_object_mut() {
                            object.insert(
                                "channelName".to_string(),
                                serde_json::Value::String(channel.name.clone()),
                            );
                        }
                        actions.push(AutoModAction {
                            action_type: action.action_type,
                            metadata,
                        });
                    }
                    None => actions.push(AutoModAction {
                        action_type: action.action_type,
                        metadata,
                    }),
                }
            }

            let exempt_roles = rule
                .exempt_role_ids
                .iter()
                .filter_map(|id| {
                    roles.iter().find(|r| r.id == *id).map(|r| ExemptRef {
                        id: id.clone(),
                        name: r.name.clone(),
                    })
                })
                .collect();
            let exempt_channels = rule
                .exempt_channel_ids
                .iter()
                .filter_map(|id| {
                    channels.iter().find(|c| c.id == *id).map(|c| ExemptRef {
                        id: id.clone(),
                        name: c.name.clone(),
                    })
                })
                .collect();

            collected.push(AutoModRule {
                name: rule.name,
                event_type: rule.event_type,
                trigger_type: rule.trigger_type,
                trigger_metadata: rule.trigger_metadata,
                actions,
                enabled: rule.enabled,
                exempt_roles,
                exempt_channels,
            });
        }
        Ok(collected)
    }

    /// Capture one media asset: reference URL always, inlined bytes when
    /// configured.
    async fn media_payload(&self, url: &str) -> MediaPayload {
        let mut payload = MediaPayload::by_reference(url);
        if self.options.save_images().inline() {
            match self.media.fetch(url).await {
                Ok(bytes) => payload.base64 = Some(BASE64.encode(bytes)),
                Err(e) => {
                    warn!(url = %url, error = %e, "Media download failed, keeping reference");
                }
            }
        }
        payload
    }

    async fn capture_media(&self, url: Option<&str>) -> Option<MediaPayload> {
        match url {
            Some(url) => Some(self.media_payload(url).await),
            None => None,
        }
    }
}

/// Translate a live channel's role-keyed overwrites into name-keyed
/// captured overwrites, dropping overwrites whose role no longer exists.
fn capture_overwrites(roles: &[RoleView], view: &ChannelView) -> Vec<PermissionOverwrite> {
    view.overwrites
        .iter()
        .filter_map(|overwrite| {
            roles
                .iter()
                .find(|role| role.id == overwrite.role_id)
                .map(|role| PermissionOverwrite {
                    role_name: role.name.clone(),
                    allow: overwrite.allow.to_string(),
                    deny: overwrite.deny.to_string(),
                })
        })
        .collect()
}

/// Image detection by file extension, mirroring the inlining allow-list.
fn is_image(url: &str) -> bool {
    url.rsplit('.')
        .next()
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
