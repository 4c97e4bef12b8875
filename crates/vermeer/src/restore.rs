//! The ordered multi-phase restore state machine.

use crate::{MessageReplay, RemapTable, resolve};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, error, info, instrument, warn};
use vermeer_core::{Channel, MediaPayload, RestoreOptions, Section, Snapshot};
use vermeer_error::{StructuralError, StructuralErrorKind, VermeerResult};
use vermeer_interface::{
    AutoModActionView, Capability, ChannelKind, ChannelView, CreateAutoModRule, CreateChannel,
    CreateRole, CreateThread, EditRole, ImageInput, RemoteDirectory, RoleView, SpaceProfile,
};
use vermeer_rate_limit::Scheduler;

/// Flags left on the system channel after a clear: suppress join,
/// subscription, and reminder notifications.
const CLEARED_SYSTEM_FLAGS: u64 = 0b111;

/// AFK timeout restored by a clear, in seconds.
const CLEARED_AFK_TIMEOUT: u32 = 300;

/// Default-notification setting restored by a clear (mentions only).
const CLEARED_NOTIFICATIONS: u8 = 1;

/// What a restore run did, per phase.
///
/// Individual entity failures never abort a run; they are logged where
/// they happen and tallied here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Roles created or edited in place
    pub roles_created: usize,
    /// Roles whose create/edit failed
    pub roles_failed: usize,
    /// Channels and categories created
    pub channels_created: usize,
    /// Channels skipped for missing capabilities
    pub channels_skipped: usize,
    /// Channels whose creation failed
    pub channels_failed: usize,
    /// Messages replayed
    pub messages_sent: usize,
    /// Messages whose send failed
    pub messages_failed: usize,
    /// Bans re-issued
    pub bans_issued: usize,
    /// Bans that failed
    pub bans_failed: usize,
    /// Auto-moderation rules recreated
    pub rules_created: usize,
    /// Auto-moderation rules that failed
    pub rules_failed: usize,
    /// Members whose role set was reassigned
    pub members_reassigned: usize,
    /// Members whose reassignment failed
    pub members_failed: usize,
    /// Emojis recreated
    pub emojis_created: usize,
    /// Emojis that failed
    pub emojis_failed: usize,
}

#[derive(Debug, Default)]
struct ChannelCounts {
    created: usize,
    skipped: usize,
    failed: usize,
    messages_sent: usize,
    messages_failed: usize,
}

/// Drives an ordered phase state machine that mutates a target space to
/// match a [`Snapshot`], building a [`RemapTable`] as it goes.
///
/// Phase order: clear (optional) → config + bans → roles → channels →
/// AFK/widget/auto-mod/final settings → role assignments → emojis. A phase
/// is not entered until every unit of work of the previous phase has
/// resolved, successfully or with a logged failure. The two marked phase
/// groups issue their calls concurrently purely to shorten wall-clock
/// time; the scheduler still serializes every underlying call.
pub struct RestoreOrchestrator<'a, D: ?Sized> {
    directory: &'a D,
    scheduler: &'a Scheduler,
    options: RestoreOptions,
}

impl<'a, D: RemoteDirectory + ?Sized> RestoreOrchestrator<'a, D> {
    /// Create a restore run over the given collaborators.
    pub fn new(directory: &'a D, scheduler: &'a Scheduler, options: RestoreOptions) -> Self {
        Self {
            directory,
            scheduler,
            options,
        }
    }

    /// Restore the snapshot onto the target space.
    ///
    /// # Errors
    ///
    /// Fails structurally when the options are invalid or the target space
    /// cannot be read; every other failure is per-entity, logged, and
    /// tallied in the returned report.
    #[instrument(skip(self, snapshot), fields(snapshot = %snapshot.id))]
    pub async fn run(&self, snapshot: &Snapshot) -> VermeerResult<RestoreReport> {
        self.options.validate()?;

        let profile = self
            .scheduler
            .schedule("restore::profile", self.directory.get_profile())
            .await
            .map_err(|e| {
                StructuralError::new(StructuralErrorKind::MissingTarget(e.to_string()))
            })?;

        info!(target = %profile.name, "Restoring snapshot");

        let mut report = RestoreReport::default();
        let mut remap = RemapTable::new();

        if !self.options.skips(Section::Main) {
            if *self.options.clear_before_restore() {
                self.clear_target(&profile).await;
            }

            // Config and bans run concurrently at the orchestration level.
            let ((), bans) =
                tokio::join!(self.apply_config(snapshot, &profile), self.apply_bans(snapshot));
            (report.bans_issued, report.bans_failed) = bans;

            if !self.options.skips(Section::Roles) {
                (report.roles_created, report.roles_failed) =
                    self.apply_roles(snapshot, &mut remap).await;
            }

            if !self.options.skips(Section::Channels) {
                let counts = self.apply_channels(snapshot, &profile, &mut remap).await;
                report.channels_created = counts.created;
                report.channels_skipped = counts.skipped;
                report.channels_failed = counts.failed;
                report.messages_sent = counts.messages_sent;
                report.messages_failed = counts.messages_failed;
            }

            // These all depend on the role and channel phases being done,
            // but not on one another.
            let ((), rules, ()) = tokio::join!(
                self.apply_afk_and_widget(snapshot),
                self.apply_automod_rules(snapshot, &remap),
                self.apply_final_settings(snapshot),
            );
            (report.rules_created, report.rules_failed) = rules;

            if !self.options.skips(Section::RoleAssignments) {
                (report.members_reassigned, report.members_failed) =
                    self.apply_role_assignments(snapshot, &remap).await;
            }
        }

        if !self.options.skips(Section::Emojis) {
            (report.emojis_created, report.emojis_failed) = self.apply_emojis(snapshot).await;
        }

        info!(
            roles = report.roles_created,
            channels = report.channels_created,
            messages = report.messages_sent,
            "Restore complete"
        );

        Ok(report)
    }

    // ------------------------------------------------------------------
    // Phase 1: clear
    // ------------------------------------------------------------------

    /// Delete every deletable entity and reset profile-level settings to
    /// defaults. Each deletion/reset is independently fault-tolerant.
    async fn clear_target(&self, profile: &SpaceProfile) {
        debug!("Clearing target before restore");

        match self
            .scheduler
            .schedule("clear::roles", self.directory.list_roles())
            .await
        {
            Ok(roles) => {
                for role in roles
                    .iter()
                    .filter(|r| !r.managed && r.editable && !r.is_everyone)
                {
                    if let Err(e) = self
                        .scheduler
                        .schedule(
                            format!("clear::role-delete::{}", role.id),
                            self.directory.delete_role(&role.id),
                        )
                        .await
                    {
                        error!(role = %role.name, error = %e, "Error occurred while deleting roles");
                    }
                }
            }
            Err(e) => error!(error = %e, "Failed to list roles for clearing"),
        }

        match self
            .scheduler
            .schedule("clear::channels", self.directory.list_channels())
            .await
        {
            Ok(channels) => {
                for channel in channels.iter().filter(|c| c.deletable) {
                    if let Err(e) = self
                        .scheduler
                        .schedule(
                            format!("clear::channel-delete::{}", channel.id),
                            self.directory.delete_channel(&channel.id),
                        )
                        .await
                    {
                        error!(channel = %channel.name, error = %e, "Error occurred while deleting channels");
                    }
                }
            }
            Err(e) => error!(error = %e, "Failed to list channels for clearing"),
        }

        match self
            .scheduler
            .schedule("clear::emojis", self.directory.list_emojis())
            .await
        {
            Ok(emojis) => {
                for emoji in emojis {
                    if let Err(e) = self
                        .scheduler
                        .schedule(
                            format!("clear::emoji-delete::{}", emoji.id),
                            self.directory.delete_emoji(&emoji.id),
                        )
                        .await
                    {
                        error!(emoji = %emoji.name, error = %e, "Error occurred while deleting emojis");
                    }
                }
            }
            Err(e) => error!(error = %e, "Failed to list emojis for clearing"),
        }

        match self
            .scheduler
            .schedule("clear::proxies", self.directory.list_proxies())
            .await
        {
            Ok(proxies) => {
                for proxy in proxies {
                    if let Err(e) = self
                        .scheduler
                        .schedule(
                            format!("clear::proxy-delete::{}", proxy.id),
                            self.directory.delete_proxy(&proxy.id),
                        )
                        .await
                    {
                        error!(proxy = %proxy.name, error = %e, "Error occurred while deleting proxies");
                    }
                }
            }
            Err(e) => error!(error = %e, "Failed to list proxies for clearing"),
        }

        match self
            .scheduler
            .schedule("clear::bans", self.directory.list_bans())
            .await
        {
            Ok(bans) => {
                for ban in bans {
                    if let Err(e) = self
                        .scheduler
                        .schedule(
                            format!("clear::unban::{}", ban.user_id),
                            self.directory.unban(&ban.user_id),
                        )
                        .await
                    {
                        error!(user = %ban.user_id, error = %e, "Error occurred while revoking bans");
                    }
                }
            }
            Err(e) => error!(error = %e, "Failed to list bans for clearing"),
        }

        // Profile resets, each independently fault-tolerant.
        self.reset("clear::afk-channel", self.directory.set_afk_channel(None))
            .await;
        self.reset(
            "clear::afk-timeout",
            self.directory.set_afk_timeout(CLEARED_AFK_TIMEOUT),
        )
        .await;
        self.reset("clear::icon", self.directory.set_icon(None)).await;
        self.reset("clear::banner", self.directory.set_banner(None))
            .await;
        self.reset("clear::splash", self.directory.set_splash(None))
            .await;
        self.reset(
            "clear::notifications",
            self.directory
                .set_default_notifications(CLEARED_NOTIFICATIONS),
        )
        .await;
        self.reset("clear::widget", self.directory.set_widget(false, None))
            .await;
        if !profile.has(Capability::Community) {
            self.reset(
                "clear::explicit-filter",
                self.directory.set_explicit_content_filter(0),
            )
            .await;
            self.reset(
                "clear::verification",
                self.directory.set_verification_level(0),
            )
            .await;
        }
        self.reset(
            "clear::system-channel",
            self.directory.set_system_channel(None),
        )
        .await;
        self.reset(
            "clear::system-flags",
            self.directory.set_system_channel_flags(CLEARED_SYSTEM_FLAGS),
        )
        .await;
        self.reset("clear::progress-bar", self.directory.set_progress_bar(false))
            .await;

        match self
            .scheduler
            .schedule("clear::automod-rules", self.directory.list_automod_rules())
            .await
        {
            Ok(rules) => {
                for rule in rules {
                    if let Err(e) = self
                        .scheduler
                        .schedule(
                            format!("clear::rule-delete::{}", rule.id),
                            self.directory.delete_automod_rule(&rule.id),
                        )
                        .await
                    {
                        error!(rule = %rule.name, error = %e, "Error occurred while deleting auto-mod rules");
                    }
                }
            }
            Err(e) => error!(error = %e, "Failed to list auto-mod rules for clearing"),
        }
    }

    /// Schedule one profile reset, logging any failure.
    async fn reset<F>(&self, job_id: &str, work: F)
    where
        F: std::future::Future<Output = VermeerResult<()>> + Send,
    {
        if let Err(e) = self.scheduler.schedule(job_id, work).await {
            error!(job_id, error = %e, "Profile reset failed");
        }
    }

    // ------------------------------------------------------------------
    // Phase 2: config + bans
    // ------------------------------------------------------------------

    /// Apply profile fields from the snapshot.
    async fn apply_config(&self, snapshot: &Snapshot, profile: &SpaceProfile) {
        self.reset(
            "config::name",
            self.directory.set_name(&snapshot.name),
        )
        .await;

        if let Some(icon) = &snapshot.icon {
            self.reset("config::icon", self.directory.set_icon(Some(image_input(icon))))
                .await;
        }
        if let Some(splash) = &snapshot.splash {
            self.reset(
                "config::splash",
                self.directory.set_splash(Some(image_input(splash))),
            )
            .await;
        }
        if let Some(banner) = &snapshot.banner {
            self.reset(
                "config::banner",
                self.directory.set_banner(Some(image_input(banner))),
            )
            .await;
        }

        self.reset(
            "config::verification",
            self.directory
                .set_verification_level(snapshot.verification_level),
        )
        .await;
        self.reset(
            "config::notifications",
            self.directory
                .set_default_notifications(snapshot.default_notifications),
        )
        .await;

        // Explicit-filter changes are gated on the community capability.
        if profile.has(Capability::Community) {
            self.reset(
                "config::explicit-filter",
                self.directory
                    .set_explicit_content_filter(snapshot.explicit_content_filter),
            )
            .await;
        }
    }

    /// Re-issue every captured ban.
    async fn apply_bans(&self, snapshot: &Snapshot) -> (usize, usize) {
        if self.options.skips(Section::Bans) {
            return (0, 0);
        }

        let mut issued = 0;
        let mut failed = 0;
        for ban in &snapshot.bans {
            match self
                .scheduler
                .schedule(
                    format!("bans::issue::{}", ban.user_id),
                    self.directory.ban(&ban.user_id, ban.reason.as_deref()),
                )
                .await
            {
                Ok(()) => issued += 1,
                Err(e) => {
                    failed += 1;
                    error!(user = %ban.user_id, error = %e, "Failed to re-issue ban");
                }
            }
        }
        (issued, failed)
    }

    // ------------------------------------------------------------------
    // Phase 3: roles
    // ------------------------------------------------------------------

    /// Recreate roles in captured (descending-position) order, recording a
    /// remap entry per old id. The base role is edited in place and mapped
    /// to the target's pre-existing equivalent.
    async fn apply_roles(&self, snapshot: &Snapshot, remap: &mut RemapTable) -> (usize, usize) {
        let mut created = 0;
        let mut failed = 0;

        let everyone: Option<RoleView> = match self
            .scheduler
            .schedule("roles::list", self.directory.list_roles())
            .await
        {
            Ok(roles) => roles.into_iter().find(|r| r.is_everyone),
            Err(e) => {
                error!(error = %e, "Failed to list roles before the role phase");
                None
            }
        };

        for role in &snapshot.roles {
            if role.is_everyone {
                let Some(base) = &everyone else {
                    failed += 1;
                    error!(role = %role.name, "No base role on the target to edit");
                    continue;
                };
                match self
                    .scheduler
                    .schedule(
                        "roles::edit-everyone",
                        self.directory.edit_role(
                            &base.id,
                            EditRole {
                                permissions: role.permission_bits(),
                                mentionable: role.mentionable,
                            },
                        ),
                    )
                    .await
                {
                    Ok(view) => {
                        remap.record_role(role.old_id.clone(), view);
                        created += 1;
                    }
                    Err(e) => {
                        failed += 1;
                        error!(role = %role.name, error = %e, "Failed to edit the base role");
                    }
                }
            } else {
                let spec = CreateRole {
                    name: role.name.clone(),
                    color: role.color,
                    icon: role.icon.as_ref().map(image_input),
                    hoist: role.hoist,
                    permissions: role.permission_bits(),
                    mentionable: role.mentionable,
                    position: role.position,
                };
                match self
                    .scheduler
                    .schedule(
                        format!("roles::create::{}", role.name),
                        self.directory.create_role(spec),
                    )
                    .await
                {
                    Ok(view) => {
                        remap.record_role(role.old_id.clone(), view);
                        created += 1;
                    }
                    Err(e) => {
                        failed += 1;
                        error!(role = %role.name, error = %e, "Failed to create role");
                    }
                }
            }
        }

        (created, failed)
    }

    // ------------------------------------------------------------------
    // Phase 4: channels
    // ------------------------------------------------------------------

    /// Create categories, then their children in original order, applying
    /// permission overwrites by role-name lookup and replaying captured
    /// content.
    async fn apply_channels(
        &self,
        snapshot: &Snapshot,
        profile: &SpaceProfile,
        remap: &mut RemapTable,
    ) -> ChannelCounts {
        let mut counts = ChannelCounts::default();

        // Overwrites resolve against the live role list, not the remap
        // table: a name scan over current target roles.
        let live_roles = match self
            .scheduler
            .schedule("channels::roles", self.directory.list_roles())
            .await
        {
            Ok(roles) => roles,
            Err(e) => {
                error!(error = %e, "Failed to list roles before the channel phase");
                Vec::new()
            }
        };

        for category in &snapshot.channels.categories {
            let created = match self
                .scheduler
                .schedule(
                    format!("channels::create-category::{}", category.name),
                    self.directory.create_channel(CreateChannel::bare(
                        category.name.as_str(),
                        ChannelKind::Category,
                    )),
                )
                .await
            {
                Ok(view) => view,
                Err(e) => {
                    counts.failed += 1;
                    error!(category = %category.name, error = %e, "Failed to create category, skipping its children");
                    continue;
                }
            };

            let overwrites = resolve::overwrites_for(&live_roles, &category.overwrites);
            if let Err(e) = self
                .scheduler
                .schedule(
                    format!("channels::overwrites::{}", category.name),
                    self.directory.set_overwrites(&created.id, overwrites),
                )
                .await
            {
                error!(category = %category.name, error = %e, "Failed to apply category overwrites");
            }

            remap.record_channel(category.old_id.clone(), created.clone());
            counts.created += 1;

            for child in &category.children {
                self.create_channel_from(
                    child,
                    Some(created.id.as_str()),
                    profile,
                    &live_roles,
                    remap,
                    &mut counts,
                )
                .await;
            }
        }

        for channel in &snapshot.channels.others {
            self.create_channel_from(channel, None, profile, &live_roles, remap, &mut counts)
                .await;
        }

        counts
    }

    /// Create one channel with kind-specific attributes, apply its
    /// overwrites, and replay its captured content.
    async fn create_channel_from(
        &self,
        channel: &Channel,
        parent_id: Option<&str>,
        profile: &SpaceProfile,
        live_roles: &[RoleView],
        remap: &mut RemapTable,
        counts: &mut ChannelCounts,
    ) {
        let tier_max = profile.premium_tier.max_bitrate();
        let spec = match channel {
            Channel::Text(c) => CreateChannel {
                name: c.name.clone(),
                kind: ChannelKind::Text,
                parent_id: parent_id.map(str::to_string),
                topic: c.topic.clone(),
                nsfw: c.nsfw,
                slow_mode_secs: c.slow_mode_secs,
                bitrate: None,
                user_limit: None,
            },
            Channel::Announcement(c) => CreateChannel {
                name: c.name.clone(),
                // Announcement channels degrade to plain text on targets
                // lacking the capability.
                kind: if profile.has(Capability::Announcements) {
                    ChannelKind::Announcement
                } else {
                    ChannelKind::Text
                },
                parent_id: parent_id.map(str::to_string),
                topic: c.topic.clone(),
                nsfw: c.nsfw,
                slow_mode_secs: c.slow_mode_secs,
                bitrate: None,
                user_limit: None,
            },
            Channel::Voice(c) => CreateChannel {
                name: c.name.clone(),
                kind: ChannelKind::Voice,
                parent_id: parent_id.map(str::to_string),
                topic: None,
                nsfw: false,
                slow_mode_secs: None,
                bitrate: Some(c.bitrate.min(tier_max)),
                user_limit: c.user_limit,
            },
            Channel::Stage(c) => {
                if !profile.has(Capability::Community) {
                    // No entity, no remap entry.
                    counts.skipped += 1;
                    debug!(channel = %c.name, "Skipping stage channel, target lacks the community capability");
                    return;
                }
                CreateChannel {
                    name: c.name.clone(),
                    kind: ChannelKind::Stage,
                    parent_id: parent_id.map(str::to_string),
                    topic: c.topic.clone(),
                    nsfw: c.nsfw,
                    slow_mode_secs: c.slow_mode_secs,
                    bitrate: Some(c.bitrate.min(tier_max)),
                    user_limit: c.user_limit,
                }
            }
        };

        let created = match self
            .scheduler
            .schedule(
                format!("channels::create::{}", channel.name()),
                self.directory.create_channel(spec),
            )
            .await
        {
            Ok(view) => view,
            Err(e) => {
                counts.failed += 1;
                error!(channel = %channel.name(), error = %e, "Failed to create channel");
                return;
            }
        };

        let overwrites = resolve::overwrites_for(live_roles, channel.overwrites());
        if let Err(e) = self
            .scheduler
            .schedule(
                format!("channels::overwrites::{}", channel.name()),
                self.directory.set_overwrites(&created.id, overwrites),
            )
            .await
        {
            error!(channel = %channel.name(), error = %e, "Failed to apply channel overwrites");
        }

        remap.record_channel(channel.old_id().to_string(), created.clone());
        counts.created += 1;

        self.replay_content(channel, &created, counts).await;
    }

    /// Replay captured messages and threads into a newly created channel.
    async fn replay_content(
        &self,
        channel: &Channel,
        created: &ChannelView,
        counts: &mut ChannelCounts,
    ) {
        let cap = *self.options.max_messages_per_channel();
        match channel {
            Channel::Text(c) | Channel::Announcement(c) => {
                let mut replay =
                    MessageReplay::new(self.directory, self.scheduler, cap, created);
                if !c.messages.is_empty() {
                    let outcome = replay.replay(&c.messages).await;
                    counts.messages_sent += outcome.sent;
                    counts.messages_failed += outcome.failed;
                }
                for thread in &c.threads {
                    let thread_view = match self
                        .scheduler
                        .schedule(
                            format!("channels::create-thread::{}", thread.name),
                            self.directory.create_thread(
                                &created.id,
                                CreateThread {
                                    name: thread.name.clone(),
                                    auto_archive_minutes: thread.auto_archive_minutes,
                                },
                            ),
                        )
                        .await
                    {
                        Ok(view) => view,
                        Err(e) => {
                            error!(thread = %thread.name, error = %e, "Failed to create thread");
                            continue;
                        }
                    };
                    if !thread.messages.is_empty() {
                        let outcome = replay.replay_thread(&thread_view, &thread.messages).await;
                        counts.messages_sent += outcome.sent;
                        counts.messages_failed += outcome.failed;
                    }
                }
            }
            Channel::Stage(c) => {
                if !c.messages.is_empty() {
                    let mut replay =
                        MessageReplay::new(self.directory, self.scheduler, cap, created);
                    let outcome = replay.replay(&c.messages).await;
                    counts.messages_sent += outcome.sent;
                    counts.messages_failed += outcome.failed;
                }
            }
            Channel::Voice(_) => {}
        }
    }

    // ------------------------------------------------------------------
    // Phase 5: AFK + widget + auto-mod rules + final settings
    // ------------------------------------------------------------------

    /// Set the AFK channel (by name among voice channels) and timeout, and
    /// the widget flag and channel (by name).
    async fn apply_afk_and_widget(&self, snapshot: &Snapshot) {
        if snapshot.afk.is_none() && snapshot.widget.channel_name.is_none() {
            return;
        }

        let channels = match self
            .scheduler
            .schedule("afk-widget::channels", self.directory.list_channels())
            .await
        {
            Ok(channels) => channels,
            Err(e) => {
                error!(error = %e, "Failed to list channels for AFK/widget restore");
                return;
            }
        };

        if let Some(afk) = &snapshot.afk {
            let target = resolve::channel_by_name_and_kind(
                &channels,
                &afk.channel_name,
                ChannelKind::Voice,
            );
            self.reset(
                "afk::channel",
                self.directory.set_afk_channel(target.map(|c| c.id.as_str())),
            )
            .await;
            self.reset(
                "afk::timeout",
                self.directory.set_afk_timeout(afk.timeout_secs),
            )
            .await;
        }

        if let Some(widget_channel) = &snapshot.widget.channel_name {
            let target = resolve::channel_by_name(&channels, widget_channel);
            self.reset(
                "widget::settings",
                self.directory
                    .set_widget(snapshot.widget.enabled, target.map(|c| c.id.as_str())),
            )
            .await;
        }
    }

    /// Recreate auto-moderation rules, re-resolving name-based references
    /// through the remap table. An unresolved reference is dropped from
    /// that rule only, never the whole rule.
    async fn apply_automod_rules(
        &self,
        snapshot: &Snapshot,
        remap: &RemapTable,
    ) -> (usize, usize) {
        if snapshot.auto_moderation_rules.is_empty() {
            return (0, 0);
        }

        let live_roles = match self
            .scheduler
            .schedule("automod::roles", self.directory.list_roles())
            .await
        {
            Ok(roles) => roles,
            Err(e) => {
                error!(error = %e, "Failed to list roles for auto-mod restore");
                return (0, snapshot.auto_moderation_rules.len());
            }
        };
        let live_channels = match self
            .scheduler
            .schedule("automod::channels", self.directory.list_channels())
            .await
        {
            Ok(channels) => channels,
            Err(e) => {
                error!(error = %e, "Failed to list channels for auto-mod restore");
                return (0, snapshot.auto_moderation_rules.len());
            }
        };

        let mut created = 0;
        let mut failed = 0;

        for rule in &snapshot.auto_moderation_rules {
            let mut actions = Vec::with_capacity(rule.actions.len());
            for action in &rule.actions {
                let mut metadata = action.metadata.clone();
                let channel_name = metadata
                    .get("channelName")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                match channel_name {
                    Some(name) => {
                        let old_id = metadata
                            .get("channelId")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string();
                        let Some(new_id) =
                            resolve::remapped_channel_id(&live_channels, remap, &old_id, &name)
                        else {
                            continue;
                        };
                        if let Some(object) = metadata.as_object_mut() {
                            object.insert(
                                "channelId".to_string(),
                                serde_json::Value::String(new_id),
                            );
                            object.remove("channelName");
                        }
                        actions.push(AutoModActionView {
                            action_type: action.action_type,
                            metadata,
                        });
                    }
                    None => actions.push(AutoModActionView {
                        action_type: action.action_type,
                        metadata,
                    }),
                }
            }

            let exempt_role_ids = rule
                .exempt_roles
                .iter()
                .filter_map(|e| resolve::remapped_role_id(&live_roles, remap, &e.id, &e.name))
                .collect();
            let exempt_channel_ids = rule
                .exempt_channels
                .iter()
                .filter_map(|e| {
                    resolve::remapped_channel_id(&live_channels, remap, &e.id, &e.name)
                })
                .collect();

            let spec = CreateAutoModRule {
                name: rule.name.clone(),
                event_type: rule.event_type,
                trigger_type: rule.trigger_type,
                trigger_metadata: rule.trigger_metadata.clone(),
                actions,
                enabled: rule.enabled,
                exempt_role_ids,
                exempt_channel_ids,
            };

            match self
                .scheduler
                .schedule(
                    format!("automod::create::{}", rule.name),
                    self.directory.create_automod_rule(spec),
                )
                .await
            {
                Ok(_) => created += 1,
                Err(e) => {
                    failed += 1;
                    error!(rule = %rule.name, error = %e, "Failed to recreate auto-mod rule");
                }
            }
        }

        (created, failed)
    }

    /// Set the final system channel (by name) and flags, and the boost
    /// progress bar flag.
    async fn apply_final_settings(&self, snapshot: &Snapshot) {
        if let Some(system) = &snapshot.system_channel {
            let channels = match self
                .scheduler
                .schedule("final::channels", self.directory.list_channels())
                .await
            {
                Ok(channels) => channels,
                Err(e) => {
                    error!(error = %e, "Failed to list channels for final settings");
                    return;
                }
            };
            if let Some(channel) = resolve::channel_by_name(&channels, &system.name) {
                self.reset(
                    "final::system-channel",
                    self.directory.set_system_channel(Some(&channel.id)),
                )
                .await;
                self.reset(
                    "final::system-flags",
                    self.directory.set_system_channel_flags(system.flags),
                )
                .await;
            }
        }

        if snapshot.progress_bar_enabled {
            self.reset("final::progress-bar", self.directory.set_progress_bar(true))
                .await;
        }
    }

    // ------------------------------------------------------------------
    // Phase 6: role assignments
    // ------------------------------------------------------------------

    /// Replace the role set of every captured non-bot member still present
    /// on the target with the remapped ids. Ids with no remap entry are
    /// filtered out before the edit; bots are never touched.
    async fn apply_role_assignments(
        &self,
        snapshot: &Snapshot,
        remap: &RemapTable,
    ) -> (usize, usize) {
        if snapshot.members.is_empty() {
            return (0, 0);
        }

        let members = match self
            .scheduler
            .schedule("assign::members", self.directory.list_members())
            .await
        {
            Ok(members) => members,
            Err(e) => {
                error!(error = %e, "Failed to list members for role assignment");
                return (0, 0);
            }
        };

        let mut reassigned = 0;
        let mut failed = 0;

        for captured in &snapshot.members {
            if captured.bot {
                continue;
            }
            if !members.iter().any(|m| m.user_id == captured.user_id) {
                continue;
            }

            let role_ids: Vec<String> = captured
                .role_old_ids
                .iter()
                .filter_map(|old_id| remap.role(old_id).map(|role| role.id.clone()))
                .collect();

            match self
                .scheduler
                .schedule(
                    format!("assign::member::{}", captured.user_id),
                    self.directory.edit_member_roles(&captured.user_id, role_ids),
                )
                .await
            {
                Ok(()) => reassigned += 1,
                Err(e) => {
                    failed += 1;
                    error!(user = %captured.user_id, error = %e, "Failed to reassign member roles");
                }
            }
        }

        (reassigned, failed)
    }

    // ------------------------------------------------------------------
    // Phase 7: emojis
    // ------------------------------------------------------------------

    /// Recreate emojis, from inline data when present, else from the
    /// reference URL.
    async fn apply_emojis(&self, snapshot: &Snapshot) -> (usize, usize) {
        let mut created = 0;
        let mut failed = 0;

        for emoji in &snapshot.emojis {
            let image = image_input(&emoji.payload);
            match self
                .scheduler
                .schedule(
                    format!("emojis::create::{}", emoji.name),
                    self.directory.create_emoji(&emoji.name, image),
                )
                .await
            {
                Ok(_) => created += 1,
                Err(e) => {
                    failed += 1;
                    error!(emoji = %emoji.name, error = %e, "Failed to recreate emoji");
                }
            }
        }

        (created, failed)
    }
}

/// Prefer inlined bytes over the reference URL; a payload whose base64
/// fails to decode degrades to the URL.
fn image_input(payload: &MediaPayload) -> ImageInput {
    if let Some(encoded) = &payload.base64 {
        match BASE64.decode(encoded) {
            Ok(bytes) => return ImageInput::Bytes(bytes),
            Err(e) => {
                warn!(url = %payload.url, error = %e, "Malformed inline payload, using reference URL");
            }
        }
    }
    ImageInput::Url(payload.url.clone())
}
