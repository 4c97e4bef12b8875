//! Tests for the restore phase state machine.

mod common;

use chrono::Utc;
use common::{
    InMemoryDirectory, SpaceState, StubMediaFetcher, channel_view, emoji_view, everyone_role,
    member_view, profile, role_view, scheduler,
};
use vermeer::{
    AfkSettings, AutoModAction, AutoModRule, Ban, BanView, Capability, CaptureOptionsBuilder,
    Category, Channel, ChannelKind, ChannelTree, Emoji, ExemptRef, MediaPayload, Member,
    PermissionOverwrite, PremiumTier, ProxyView, RestoreOptionsBuilder, RestoreOrchestrator,
    Section, Snapshot, SnapshotCapture, StageChannel, SystemChannelSettings, TextChannel,
    VoiceChannel, WidgetSettings,
};

fn overwrite(role_name: &str) -> PermissionOverwrite {
    PermissionOverwrite {
        role_name: role_name.to_string(),
        allow: "1024".to_string(),
        deny: "2048".to_string(),
    }
}

fn base_snapshot() -> Snapshot {
    Snapshot {
        id: "snap-1".to_string(),
        source_space_id: "source-space".to_string(),
        created_at: Utc::now(),
        messages_per_channel: 10,
        name: "Restored Space".to_string(),
        verification_level: 2,
        explicit_content_filter: 1,
        default_notifications: 1,
        afk: Some(AfkSettings {
            channel_name: "Lounge".to_string(),
            timeout_secs: 600,
        }),
        widget: WidgetSettings {
            enabled: true,
            channel_name: Some("general".to_string()),
        },
        system_channel: Some(SystemChannelSettings {
            name: "general".to_string(),
            flags: 5,
        }),
        progress_bar_enabled: true,
        icon: Some(MediaPayload::by_reference("https://cdn.test/icon.png")),
        splash: None,
        banner: None,
        auto_moderation_rules: vec![AutoModRule {
            name: "no spam".to_string(),
            event_type: 1,
            trigger_type: 3,
            trigger_metadata: serde_json::json!({"mentionTotalLimit": 5}),
            actions: vec![AutoModAction {
                action_type: 2,
                metadata: serde_json::json!({
                    "channelId": "old-general",
                    "channelName": "general",
                }),
            }],
            enabled: true,
            exempt_roles: vec![ExemptRef {
                id: "old-mods".to_string(),
                name: "Mods".to_string(),
            }],
            exempt_channels: vec![ExemptRef {
                id: "old-stage".to_string(),
                name: "Stage Hall".to_string(),
            }],
        }],
        channels: ChannelTree {
            categories: vec![Category {
                old_id: "old-cat".to_string(),
                name: "Community".to_string(),
                overwrites: vec![overwrite("Mods")],
                children: vec![
                    Channel::Text(TextChannel {
                        old_id: "old-general".to_string(),
                        name: "general".to_string(),
                        overwrites: vec![overwrite("Mods"), overwrite("Nobody")],
                        topic: Some("chat".to_string()),
                        nsfw: false,
                        slow_mode_secs: Some(5),
                        messages: vec![],
                        threads: vec![],
                    }),
                    Channel::Voice(VoiceChannel {
                        old_id: "old-lounge".to_string(),
                        name: "Lounge".to_string(),
                        overwrites: vec![],
                        bitrate: 384_000,
                        user_limit: Some(5),
                    }),
                ],
            }],
            others: vec![
                Channel::Announcement(TextChannel {
                    old_id: "old-news".to_string(),
                    name: "news".to_string(),
                    overwrites: vec![],
                    topic: None,
                    nsfw: false,
                    slow_mode_secs: None,
                    messages: vec![],
                    threads: vec![],
                }),
                Channel::Stage(StageChannel {
                    old_id: "old-stage".to_string(),
                    name: "Stage Hall".to_string(),
                    overwrites: vec![],
                    topic: Some("events".to_string()),
                    nsfw: false,
                    slow_mode_secs: None,
                    bitrate: 384_000,
                    user_limit: None,
                    messages: vec![],
                }),
            ],
        },
        roles: vec![
            vermeer::Role {
                old_id: "old-mods".to_string(),
                name: "Mods".to_string(),
                color: 0xFF0000,
                icon: None,
                hoist: true,
                permissions: "8192".to_string(),
                mentionable: true,
                position: 2,
                is_everyone: false,
            },
            vermeer::Role {
                old_id: "old-crew".to_string(),
                name: "Crew".to_string(),
                color: 0x00FF00,
                icon: None,
                hoist: false,
                permissions: "1024".to_string(),
                mentionable: false,
                position: 1,
                is_everyone: false,
            },
            vermeer::Role {
                old_id: "old-everyone".to_string(),
                name: "@everyone".to_string(),
                color: 0,
                icon: None,
                hoist: false,
                permissions: "1024".to_string(),
                mentionable: true,
                position: 0,
                is_everyone: true,
            },
        ],
        bans: vec![Ban {
            user_id: "banned-1".to_string(),
            reason: Some("spam".to_string()),
        }],
        emojis: vec![Emoji {
            name: "party".to_string(),
            payload: MediaPayload::by_reference("https://cdn.test/emoji/party.png"),
        }],
        members: vec![
            Member {
                user_id: "u-alice".to_string(),
                username: "alice".to_string(),
                discriminator: None,
                avatar_url: None,
                joined_at: Some(Utc::now()),
                role_old_ids: vec!["old-mods".to_string(), "old-ghost".to_string()],
                bot: false,
            },
            Member {
                user_id: "u-bot".to_string(),
                username: "helper".to_string(),
                discriminator: None,
                avatar_url: None,
                joined_at: Some(Utc::now()),
                role_old_ids: vec!["old-mods".to_string()],
                bot: true,
            },
        ],
    }
}

fn target_state(capabilities: &[Capability]) -> SpaceState {
    let mut space = profile("Blank Target");
    space.capabilities = capabilities.iter().copied().collect();
    SpaceState {
        profile: Some(space),
        roles: vec![everyone_role("target-everyone")],
        members: vec![
            member_view("u-alice", "alice", false, &[]),
            member_view("u-bot", "helper", true, &[]),
        ],
        ..Default::default()
    }
}

fn options() -> vermeer::RestoreOptions {
    RestoreOptionsBuilder::default().speed_ms(1u64).build().unwrap()
}

#[tokio::test]
async fn test_missing_target_is_structural() {
    let directory = InMemoryDirectory::new(SpaceState::default());
    let scheduler = scheduler();

    let result = RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await;

    assert!(result.unwrap_err().is_structural());
}

#[tokio::test]
async fn test_zero_speed_is_structural() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();
    let options = RestoreOptionsBuilder::default().speed_ms(0u64).build().unwrap();

    let result = RestoreOrchestrator::new(&directory, &scheduler, options)
        .run(&base_snapshot())
        .await;

    assert!(result.unwrap_err().is_structural());
}

#[tokio::test]
async fn test_roles_created_in_captured_order_everyone_edited_in_place() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();

    let report = RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    // Captured (descending-position) order is replayed verbatim: position
    // on the target is assigned by creation order.
    let role_log: Vec<_> = directory
        .log()
        .into_iter()
        .filter(|entry| entry.starts_with("role:"))
        .collect();
    assert_eq!(role_log, vec!["role:Mods", "role:Crew"]);

    let state = directory.state.lock().unwrap();
    // The base role is edited in place, never duplicated.
    let everyone: Vec<_> = state.roles.iter().filter(|r| r.is_everyone).collect();
    assert_eq!(everyone.len(), 1);
    assert_eq!(everyone[0].id, "target-everyone");
    assert_eq!(everyone[0].permissions, 1024);
    assert!(everyone[0].mentionable);
    assert_eq!(state.roles.len(), 3);
    drop(state);

    assert_eq!(report.roles_created, 3);
    assert_eq!(report.roles_failed, 0);
}

#[tokio::test]
async fn test_stage_skipped_without_community_capability() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();

    let report = RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    assert!(!state.channels.iter().any(|c| c.name == "Stage Hall"));
    drop(state);
    assert_eq!(report.channels_skipped, 1);

    // With no remap entry for the stage channel, the rule's exempt-channel
    // reference is dropped from that rule only; the rule itself survives.
    let state = directory.state.lock().unwrap();
    assert_eq!(state.rules.len(), 1);
    assert!(state.rules[0].exempt_channel_ids.is_empty());
    assert_eq!(state.rules[0].exempt_role_ids.len(), 1);
}

#[tokio::test]
async fn test_stage_and_announcement_created_with_capabilities() {
    let directory = InMemoryDirectory::new(target_state(&[
        Capability::Community,
        Capability::Announcements,
    ]));
    let scheduler = scheduler();

    let report = RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    let stage = state.channels.iter().find(|c| c.name == "Stage Hall").unwrap();
    assert_eq!(stage.kind, ChannelKind::Stage);
    // Tier None clamps the captured 384k bitrate to 64k.
    assert_eq!(stage.bitrate, Some(64_000));

    let news = state.channels.iter().find(|c| c.name == "news").unwrap();
    assert_eq!(news.kind, ChannelKind::Announcement);
    drop(state);

    assert_eq!(report.channels_skipped, 0);
}

#[tokio::test]
async fn test_announcement_degrades_to_text_without_capability() {
    let directory = InMemoryDirectory::new(target_state(&[Capability::Community]));
    let scheduler = scheduler();

    RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    let news = state.channels.iter().find(|c| c.name == "news").unwrap();
    assert_eq!(news.kind, ChannelKind::Text);
}

#[tokio::test]
async fn test_voice_bitrate_clamped_to_tier_maximum() {
    let mut state = target_state(&[]);
    state.profile.as_mut().unwrap().premium_tier = PremiumTier::Tier2;
    let directory = InMemoryDirectory::new(state);
    let scheduler = scheduler();

    RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    let lounge = state.channels.iter().find(|c| c.name == "Lounge").unwrap();
    // 384k captured, tier 2 allows 256k.
    assert_eq!(lounge.bitrate, Some(256_000));
    assert_eq!(lounge.user_limit, Some(5));
    assert_eq!(lounge.kind, ChannelKind::Voice);
}

#[tokio::test]
async fn test_overwrites_resolved_by_role_name() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();

    RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    let mods_id = state.roles.iter().find(|r| r.name == "Mods").unwrap().id.clone();

    let category = state.channels.iter().find(|c| c.name == "Community").unwrap();
    assert_eq!(category.overwrites.len(), 1);
    assert_eq!(category.overwrites[0].role_id, mods_id);
    assert_eq!(category.overwrites[0].allow, 1024);
    assert_eq!(category.overwrites[0].deny, 2048);

    // The overwrite naming a role that does not exist is dropped.
    let general = state.channels.iter().find(|c| c.name == "general").unwrap();
    assert_eq!(general.overwrites.len(), 1);
    assert_eq!(general.overwrites[0].role_id, mods_id);
    assert_eq!(general.parent_id.as_deref(), Some(category.id.as_str()));
    assert_eq!(general.topic.as_deref(), Some("chat"));
    assert_eq!(general.slow_mode_secs, Some(5));
}

#[tokio::test]
async fn test_afk_widget_system_and_progress_settings() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();

    RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    let space = state.profile.as_ref().unwrap();
    assert_eq!(space.name, "Restored Space");
    assert_eq!(space.verification_level, 2);
    // AFK resolves by name among voice channels.
    assert_eq!(space.afk_channel_name.as_deref(), Some("Lounge"));
    assert_eq!(space.afk_timeout_secs, 600);
    assert!(space.widget_enabled);
    assert_eq!(space.widget_channel_name.as_deref(), Some("general"));
    assert_eq!(space.system_channel_name.as_deref(), Some("general"));
    assert_eq!(space.system_channel_flags, 5);
    assert!(space.progress_bar_enabled);
    // Explicit filter requires the community capability; this target
    // lacks it, so the clear-phase default stands.
    assert_eq!(space.explicit_content_filter, 0);
}

#[tokio::test]
async fn test_explicit_filter_applied_with_community_capability() {
    let directory = InMemoryDirectory::new(target_state(&[Capability::Community]));
    let scheduler = scheduler();

    RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    assert_eq!(state.profile.as_ref().unwrap().explicit_content_filter, 1);
}

#[tokio::test]
async fn test_automod_action_channel_rebound_to_new_id() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();

    RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    let general_id = state.channels.iter().find(|c| c.name == "general").unwrap().id.clone();
    let rule = &state.rules[0];
    assert_eq!(rule.actions.len(), 1);
    assert_eq!(
        rule.actions[0].metadata.get("channelId").and_then(|v| v.as_str()),
        Some(general_id.as_str())
    );
    assert!(rule.actions[0].metadata.get("channelName").is_none());

    // Exempt role resolved through the remap table.
    let mods_id = state.roles.iter().find(|r| r.name == "Mods").unwrap().id.clone();
    assert_eq!(rule.exempt_role_ids, vec![mods_id]);
}

#[tokio::test]
async fn test_role_assignments_filter_unmapped_and_skip_bots() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();

    let report = RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    let mods_id = state.roles.iter().find(|r| r.name == "Mods").unwrap().id.clone();
    let alice = state.members.iter().find(|m| m.user_id == "u-alice").unwrap();
    // old-ghost has no remap entry and was filtered before the edit.
    assert_eq!(alice.role_ids, vec![mods_id]);
    let bot = state.members.iter().find(|m| m.user_id == "u-bot").unwrap();
    assert!(bot.role_ids.is_empty());
    drop(state);

    assert_eq!(report.members_reassigned, 1);
    assert_eq!(report.members_failed, 0);
}

#[tokio::test]
async fn test_bans_and_emojis_recreated() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();

    let report = RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    assert!(state.bans.iter().any(|b| b.user_id == "banned-1"));
    let party = state.emojis.iter().find(|e| e.name == "party").unwrap();
    assert_eq!(party.url, "https://cdn.test/emoji/party.png");
    drop(state);

    assert_eq!(report.bans_issued, 1);
    assert_eq!(report.emojis_created, 1);
}

#[tokio::test]
async fn test_clear_removes_existing_entities() {
    let mut state = target_state(&[]);
    state.roles.push(role_view("stale-role", "Old Guard", 1));
    state.roles.push({
        let mut r = role_view("managed-role", "Integration", 2);
        r.managed = true;
        r
    });
    state
        .channels
        .push(channel_view("stale-channel", "old-town", ChannelKind::Text, 0, None));
    state.emojis.push(emoji_view("stale-emoji", "old_emoji"));
    state.bans.push(BanView {
        user_id: "old-banned".to_string(),
        reason: None,
    });
    state.proxies.push(ProxyView {
        id: "stale-proxy".to_string(),
        name: "OldProxy".to_string(),
        channel_id: "stale-channel".to_string(),
    });
    let directory = InMemoryDirectory::new(state);
    let scheduler = scheduler();

    RestoreOrchestrator::new(&directory, &scheduler, options())
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    assert!(!state.roles.iter().any(|r| r.id == "stale-role"));
    // Managed roles and the base role survive the clear.
    assert!(state.roles.iter().any(|r| r.id == "managed-role"));
    assert!(state.roles.iter().any(|r| r.id == "target-everyone"));
    assert!(!state.channels.iter().any(|c| c.id == "stale-channel"));
    assert!(!state.emojis.iter().any(|e| e.id == "stale-emoji"));
    assert!(!state.bans.iter().any(|b| b.user_id == "old-banned"));
    assert!(!state.proxies.iter().any(|p| p.id == "stale-proxy"));
}

#[tokio::test]
async fn test_clear_disabled_keeps_existing_entities() {
    let mut state = target_state(&[]);
    state
        .channels
        .push(channel_view("keep-channel", "old-town", ChannelKind::Text, 0, None));
    let directory = InMemoryDirectory::new(state);
    let scheduler = scheduler();
    let options = RestoreOptionsBuilder::default()
        .speed_ms(1u64)
        .clear_before_restore(false)
        .build()
        .unwrap();

    RestoreOrchestrator::new(&directory, &scheduler, options)
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    assert!(state.channels.iter().any(|c| c.id == "keep-channel"));
    assert!(state.channels.iter().any(|c| c.name == "general"));
}

#[tokio::test]
async fn test_do_not_load_main_still_loads_emojis() {
    let directory = InMemoryDirectory::new(target_state(&[]));
    let scheduler = scheduler();
    let options = RestoreOptionsBuilder::default()
        .speed_ms(1u64)
        .do_not_load([Section::Main].into_iter().collect())
        .build()
        .unwrap();

    let report = RestoreOrchestrator::new(&directory, &scheduler, options)
        .run(&base_snapshot())
        .await
        .unwrap();

    let state = directory.state.lock().unwrap();
    assert!(state.channels.is_empty());
    assert_eq!(state.roles.len(), 1);
    assert_eq!(state.emojis.len(), 1);
    drop(state);

    assert_eq!(report.channels_created, 0);
    assert_eq!(report.emojis_created, 1);
}

#[tokio::test]
async fn test_round_trip_counts_match() {
    // Capture a populated source, restore onto a blank target with the
    // same capabilities, capture the target again: role, channel, and
    // emoji counts match the original snapshot.
    let mut source = target_state(&[Capability::Community, Capability::Announcements]);
    source.profile.as_mut().unwrap().name = "Source".to_string();
    source.roles.push(role_view("src-mods", "Mods", 2));
    source.roles.push(role_view("src-crew", "Crew", 1));
    source
        .channels
        .push(channel_view("src-cat", "Community", ChannelKind::Category, 0, None));
    source
        .channels
        .push(channel_view("src-general", "general", ChannelKind::Text, 0, Some("src-cat")));
    source
        .channels
        .push(channel_view("src-lounge", "Lounge", ChannelKind::Voice, 1, Some("src-cat")));
    source
        .channels
        .push(channel_view("src-news", "news", ChannelKind::Announcement, 0, None));
    source
        .channels
        .push(channel_view("src-stage", "Stage Hall", ChannelKind::Stage, 1, None));
    source.emojis.push(emoji_view("src-party", "party"));

    let source_directory = InMemoryDirectory::new(source);
    let fetcher = StubMediaFetcher::default();
    let capture_options = CaptureOptionsBuilder::default().speed_ms(1u64).build().unwrap();

    let run_scheduler = scheduler();
    let snapshot = SnapshotCapture::new(&source_directory, &fetcher, &run_scheduler, capture_options.clone())
        .run()
        .await
        .unwrap();

    let target_directory = InMemoryDirectory::new(target_state(&[
        Capability::Community,
        Capability::Announcements,
    ]));
    let run_scheduler = scheduler();
    RestoreOrchestrator::new(&target_directory, &run_scheduler, options())
        .run(&snapshot)
        .await
        .unwrap();

    let run_scheduler = scheduler();
    let replica = SnapshotCapture::new(&target_directory, &fetcher, &run_scheduler, capture_options)
        .run()
        .await
        .unwrap();

    assert_eq!(replica.roles.len(), snapshot.roles.len());
    assert_eq!(
        replica.channels.categories.len(),
        snapshot.channels.categories.len()
    );
    assert_eq!(
        replica.channels.categories[0].children.len(),
        snapshot.channels.categories[0].children.len()
    );
    assert_eq!(replica.channels.others.len(), snapshot.channels.others.len());
    assert_eq!(replica.emojis.len(), snapshot.emojis.len());
    assert_eq!(replica.name, snapshot.name);
}
