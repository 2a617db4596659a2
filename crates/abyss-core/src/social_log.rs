//! Time-windowed record of social actions, chat, feeds, and deaths.
//!
//! Records are immutable once appended. [`EventLog::prune`] drops every
//! record whose age has reached its retention window; nothing in the core
//! reads the formatted text, which exists for presentation only.

use std::collections::VecDeque;

use abyss_agents::BioBit;
use abyss_types::{
    ChatMessage, DeathEvent, EventId, FeedEvent, SocialActionType, SocialEvent,
};

use crate::config::RetentionConfig;

/// How many formatted entries the recent social log shows.
pub const RECENT_SOCIAL_LOG_LEN: usize = 10;

/// Extra fields for [`create_social_event`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocialExtras {
    /// Spoken text.
    pub message: Option<String>,
    /// Energy moved by the action.
    pub energy_transfer: Option<f64>,
}

/// Stamp a new social event with `now` and the actor's current position.
pub fn create_social_event(
    id: EventId,
    kind: SocialActionType,
    actor: &BioBit,
    target: Option<&BioBit>,
    extras: SocialExtras,
    now: u64,
) -> SocialEvent {
    SocialEvent {
        id,
        kind,
        actor_id: actor.id(),
        actor_name: actor.name().to_owned(),
        target_id: target.map(BioBit::id),
        target_name: target.map(|t| t.name().to_owned()),
        message: extras.message,
        energy_transfer: extras.energy_transfer,
        position: actor.position(),
        timestamp: now,
    }
}

/// Render an event as a one-line, human-readable string.
pub fn format_social_event(event: &SocialEvent) -> String {
    let actor = &event.actor_name;
    let target = event.target_name.as_deref().unwrap_or("someone");
    let transfer = event.energy_transfer.unwrap_or(0.0);
    match event.kind {
        SocialActionType::Speak => {
            format!("{actor}: \"{}\"", event.message.as_deref().unwrap_or(""))
        }
        SocialActionType::Attack => {
            let sign = if transfer > 0.0 { "+" } else { "" };
            format!("⚔️ {actor} attacked {target} ({sign}{transfer:.0} energy)")
        }
        SocialActionType::Share => {
            format!("🤝 {actor} shared energy with {target} (+{transfer:.0} energy)")
        }
        SocialActionType::Flee => format!("🏃 {actor} fled from {target}"),
        SocialActionType::Befriend => format!("💜 {actor} befriended {target}"),
        SocialActionType::Betray => format!("🗡️ {actor} betrayed {target}!"),
    }
}

/// Whether `message`, published with intention `intention`, misrepresents
/// it. Matching is case-insensitive.
pub fn is_lie(intention: abyss_types::DecisionIntent, message: &str) -> bool {
    use abyss_types::DecisionIntent;

    let lowered = message.to_lowercase();
    match intention {
        DecisionIntent::Attack => !lowered.contains("attack"),
        DecisionIntent::Flee => lowered.contains("friend") || lowered.contains("stay"),
        DecisionIntent::Hunt | DecisionIntent::Socialize => false,
    }
}

/// The four time-windowed event queues, oldest first.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    feeds: VecDeque<FeedEvent>,
    social: VecDeque<SocialEvent>,
    chats: VecDeque<ChatMessage>,
    deaths: VecDeque<DeathEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            feeds: VecDeque::new(),
            social: VecDeque::new(),
            chats: VecDeque::new(),
            deaths: VecDeque::new(),
        }
    }

    /// Append a feed event.
    pub fn push_feed(&mut self, event: FeedEvent) {
        self.feeds.push_back(event);
    }

    /// Append a social event.
    pub fn push_social(&mut self, event: SocialEvent) {
        self.social.push_back(event);
    }

    /// Append a chat message.
    pub fn push_chat(&mut self, message: ChatMessage) {
        self.chats.push_back(message);
    }

    /// Append a death event.
    pub fn push_death(&mut self, event: DeathEvent) {
        self.deaths.push_back(event);
    }

    /// Recent feeds.
    pub fn feeds(&self) -> impl Iterator<Item = &FeedEvent> {
        self.feeds.iter()
    }

    /// Recent social events.
    pub fn social(&self) -> impl Iterator<Item = &SocialEvent> {
        self.social.iter()
    }

    /// Recent chat messages.
    pub fn chats(&self) -> impl Iterator<Item = &ChatMessage> {
        self.chats.iter()
    }

    /// Recent deaths.
    pub fn deaths(&self) -> impl Iterator<Item = &DeathEvent> {
        self.deaths.iter()
    }

    /// Drop every record whose age at `now` has reached its window.
    pub fn prune(&mut self, now: u64, retention: &RetentionConfig) {
        let fresh = |timestamp: u64, window: u64| now.saturating_sub(timestamp) < window;
        self.feeds.retain(|e| fresh(e.timestamp, retention.feed_ms));
        self.social.retain(|e| fresh(e.timestamp, retention.social_ms));
        self.chats.retain(|e| fresh(e.timestamp, retention.chat_ms));
        self.deaths.retain(|e| fresh(e.timestamp, retention.death_ms));
    }

    /// The last [`RECENT_SOCIAL_LOG_LEN`] social events formatted, newest
    /// first.
    pub fn recent_social_log(&self) -> Vec<String> {
        self.social
            .iter()
            .rev()
            .take(RECENT_SOCIAL_LOG_LEN)
            .map(format_social_event)
            .collect()
    }
}
