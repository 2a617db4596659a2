//! Read-only snapshots exported to renderers and the observer API.
//!
//! Snapshots are plain data computed on demand from simulation state. They
//! never hold references back into the simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Intention, NutrientKind, Personality, Relation, VisualEffect};
use crate::geometry::{Bounds, MoveDirection, Position};
use crate::ids::{AgentId, NutrientId};
use crate::records::{ChatMessage, DeathEvent, FeedEvent, MemoryEntry, SocialEvent};

/// One directional relationship held by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RelationEntry {
    /// The other agent.
    pub agent_id: AgentId,
    /// How the owning agent regards them.
    pub relation: Relation,
}

/// Full exported state of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// Agent id.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Fixed archetype.
    pub personality: Personality,
    /// Current position.
    pub position: Position,
    /// Current energy in `[0, 100]`.
    pub energy: f64,
    /// Current intention.
    pub intention: Intention,
    /// Most recent private thought.
    pub internal_monologue: String,
    /// Most recent public message.
    pub public_message: String,
    /// Whether the public message is still within its display window.
    pub message_active: bool,
    /// Current visual effect, if not expired.
    pub effect: Option<VisualEffect>,
    /// Current pursuit target.
    pub target_id: Option<AgentId>,
    /// Time of death, if dead.
    pub died_at: Option<u64>,
    /// Final words, if dead.
    pub last_words: Option<String>,
    /// Directional relations, ordered by agent id.
    pub relations: Vec<RelationEntry>,
    /// Memory log, oldest first.
    pub memories: Vec<MemoryEntry>,
    /// Last movement bias from a decision.
    pub last_direction: MoveDirection,
    /// Display color derived from state.
    pub color: String,
    /// Glow intensity derived from energy.
    pub glow_intensity: f64,
    /// `true` while energy is above zero.
    pub is_alive: bool,
    /// `true` while energy is in `(0, 20)`.
    pub is_starving: bool,
}

/// Exported state of one nutrient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NutrientSnapshot {
    /// Nutrient id.
    pub id: NutrientId,
    /// Nutrient type.
    pub kind: NutrientKind,
    /// Field position.
    pub position: Position,
    /// Remaining energy (negative for toxic).
    pub energy: f64,
    /// Fill color for the type.
    pub color: String,
    /// Glow color for the type.
    pub glow: String,
    /// Cosmetic pulse phase in radians.
    pub pulse_phase: f64,
    /// Creation time.
    pub created_at: u64,
}

/// Counters accumulated over the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LifetimeStats {
    /// Agents that have died.
    pub total_deaths: u64,
    /// Nutrients consumed.
    pub total_feeds: u64,
    /// Attacks plus successful shares.
    pub total_interactions: u64,
}

/// Diagnostics reported by the decision oracle adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OracleStats {
    /// Whether the oracle accepts requests.
    pub ready: bool,
    /// Backend name.
    pub backend: String,
    /// Responses that produced a decision (parsed or recovered).
    pub generations: u64,
    /// Responses whose payload could not be parsed as a decision.
    pub parse_failures: u64,
    /// Transport or inference failures replaced by a random decision.
    pub fallbacks: u64,
}

/// A complete, self-contained view of the world at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Simulation clock time of the snapshot.
    pub timestamp: u64,
    /// Whether ticks are suspended.
    pub paused: bool,
    /// Metabolism multiplier.
    pub entropy: f64,
    /// Spawn-rate multiplier.
    pub abundance: f64,
    /// Arena extent.
    pub bounds: Bounds,
    /// Living agents, in creation order.
    pub alive: Vec<AgentSnapshot>,
    /// Corpses still on display, in creation order.
    pub dead: Vec<AgentSnapshot>,
    /// Nutrients on the field.
    pub nutrients: Vec<NutrientSnapshot>,
    /// Recent feeds.
    pub feed_events: Vec<FeedEvent>,
    /// Recent social events.
    pub social_events: Vec<SocialEvent>,
    /// Recent chat messages.
    pub chat_messages: Vec<ChatMessage>,
    /// Recent deaths.
    pub death_events: Vec<DeathEvent>,
    /// Last few social events rendered as text, newest first.
    pub recent_social_log: Vec<String>,
    /// Currently selected agent.
    pub selected: Option<AgentId>,
    /// Agent whose decision is in flight.
    pub thinking: Option<AgentId>,
    /// Lifetime counters.
    pub stats: LifetimeStats,
}
