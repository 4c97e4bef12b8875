//! Channel and thread message replay.

use tracing::{debug, error, warn};
use vermeer_core::Message;
use vermeer_interface::{
    ChannelView, OutboundMessage, ProxyPersona, ProxyView, RemoteDirectory, ThreadView,
};
use vermeer_rate_limit::Scheduler;
use vermeer_error::VermeerResult;

/// Display name of the proxy identity used for replayed messages.
const PROXY_NAME: &str = "MessagesBackup";

/// Upper bound on replayable message content, in characters.
const MAX_CONTENT_CHARS: usize = 2000;

/// What happened while replaying one message list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Messages sent
    pub sent: usize,
    /// Messages skipped (empty or over the content bound)
    pub skipped: usize,
    /// Messages whose send failed (logged, replay continued)
    pub failed: usize,
    /// Whether an oversize payload curtailed the remainder of the list
    pub curtailed: bool,
}

impl ReplayOutcome {
    /// Fold another outcome into this one.
    pub fn absorb(&mut self, other: ReplayOutcome) {
        self.sent += other.sent;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.curtailed |= other.curtailed;
    }
}

/// Replays captured messages into one channel and its threads.
///
/// One replayer is created per channel. It lazily acquires a single proxy
/// identity on the first message that needs impersonation and reuses it
/// for the channel and every thread replayed under it.
pub struct MessageReplay<'a, D: ?Sized> {
    directory: &'a D,
    scheduler: &'a Scheduler,
    max_messages: usize,
    acting_user_id: String,
    channel_id: String,
    channel_name: String,
    proxy: Option<ProxyView>,
}

impl<'a, D: RemoteDirectory + ?Sized> MessageReplay<'a, D> {
    /// Create a replayer for the given (newly created) channel.
    pub fn new(
        directory: &'a D,
        scheduler: &'a Scheduler,
        max_messages: usize,
        channel: &ChannelView,
    ) -> Self {
        let acting_user_id = directory.acting_user_id();
        Self {
            directory,
            scheduler,
            max_messages,
            acting_user_id,
            channel_id: channel.id.clone(),
            channel_name: channel.name.clone(),
            proxy: None,
        }
    }

    /// Replay a message list into the channel itself.
    pub async fn replay(&mut self, messages: &[Message]) -> ReplayOutcome {
        self.replay_into(None, messages).await
    }

    /// Replay a message list into a thread under the channel, reusing the
    /// channel's proxy identity.
    pub async fn replay_thread(
        &mut self,
        thread: &ThreadView,
        messages: &[Message],
    ) -> ReplayOutcome {
        self.replay_into(Some(thread.id.clone()), messages).await
    }

    async fn replay_into(&mut self, thread_id: Option<String>, messages: &[Message]) -> ReplayOutcome {
        let mut outcome = ReplayOutcome::default();

        // Captured order is newest-first; replay runs oldest-first. When
        // the cap is smaller than the captured count, only the most recent
        // messages survive the cut.
        let mut ordered: Vec<&Message> = messages.iter().filter(|m| !m.is_empty()).collect();
        ordered.reverse();
        if self.max_messages < ordered.len() {
            let excess = ordered.len() - self.max_messages;
            ordered.drain(..excess);
        }

        for message in ordered {
            if message.content.chars().count() > MAX_CONTENT_CHARS {
                outcome.skipped += 1;
                continue;
            }

            let outbound = OutboundMessage {
                content: (!message.content.is_empty()).then(|| message.content.clone()),
                embeds: message.embeds.clone(),
                components: message.components.clone(),
                attachments: message.attachments.clone(),
            };

            let sent = if message.author_id == self.acting_user_id {
                // The original author is the acting restore identity, so
                // the message goes out directly under it.
                let target = thread_id.as_deref().unwrap_or(&self.channel_id);
                self.scheduler
                    .schedule(
                        format!("replay::send::{}", self.channel_name),
                        self.directory.send_message(target, outbound),
                    )
                    .await
            } else {
                let proxy = match self.ensure_proxy().await {
                    Ok(proxy) => proxy,
                    Err(e) => {
                        error!(channel = %self.channel_name, error = %e, "Failed to acquire proxy identity");
                        return outcome;
                    }
                };
                let persona = ProxyPersona {
                    username: message.username.clone(),
                    avatar_url: message.avatar_url.clone(),
                    thread_id: thread_id.clone(),
                };
                self.scheduler
                    .schedule(
                        format!("replay::proxy-send::{}", self.channel_name),
                        self.directory.send_via_proxy(&proxy.id, outbound, persona),
                    )
                    .await
            };

            match sent {
                Ok(sent) => {
                    outcome.sent += 1;
                    if message.pinned {
                        if let Err(e) = self
                            .scheduler
                            .schedule(
                                format!("replay::pin::{}", self.channel_name),
                                self.directory.pin_message(&sent.channel_id, &sent.id),
                            )
                            .await
                        {
                            warn!(channel = %self.channel_name, error = %e, "Failed to pin replayed message");
                        }
                    }
                }
                Err(e) if e.is_oversize_payload() => {
                    // Silently halt the remainder of this channel's list:
                    // earlier sends are retained, no retry, no log.
                    outcome.curtailed = true;
                    return outcome;
                }
                Err(e) => {
                    outcome.failed += 1;
                    error!(channel = %self.channel_name, error = %e, "Failed to replay message");
                }
            }
        }

        outcome
    }

    /// The channel's proxy identity, created on first use.
    async fn ensure_proxy(&mut self) -> VermeerResult<ProxyView> {
        if let Some(proxy) = &self.proxy {
            return Ok(proxy.clone());
        }

        let proxy = self
            .scheduler
            .schedule(
                format!("replay::create-proxy::{}", self.channel_name),
                self.directory.create_proxy(&self.channel_id, PROXY_NAME, None),
            )
            .await?;

        debug!(channel = %self.channel_name, proxy = %proxy.id, "Created proxy identity");
        self.proxy = Some(proxy.clone());
        Ok(proxy)
    }
}
