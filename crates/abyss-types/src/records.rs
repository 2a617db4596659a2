//! Immutable, timestamped records produced as side effects of agent actions.
//!
//! All timestamps are milliseconds on the simulation clock.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DecisionIntent, NutrientKind, Personality, SocialActionType};
use crate::geometry::Position;
use crate::ids::{AgentId, EventId};

/// One entry in an agent's bounded memory log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemoryEntry {
    /// When the event happened.
    pub timestamp: u64,
    /// Human-readable description.
    pub event: String,
    /// The other agent involved, if any.
    pub target_id: Option<AgentId>,
}

/// A recorded social interaction between agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SocialEvent {
    /// Unique event id.
    pub id: EventId,
    /// What kind of interaction happened.
    pub kind: SocialActionType,
    /// Acting agent.
    pub actor_id: AgentId,
    /// Acting agent's name at the time of the event.
    pub actor_name: String,
    /// Target agent, if any.
    pub target_id: Option<AgentId>,
    /// Target agent's name, if any.
    pub target_name: Option<String>,
    /// Spoken text, for `speak` events.
    pub message: Option<String>,
    /// Energy moved by the action. Attacks carry the stolen amount negated.
    pub energy_transfer: Option<f64>,
    /// Actor position at the time of the event.
    pub position: Position,
    /// Creation time.
    pub timestamp: u64,
}

/// A public message published by an agent after a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Unique message id.
    pub id: EventId,
    /// Speaking agent.
    pub sender_id: AgentId,
    /// Speaking agent's name.
    pub sender_name: String,
    /// Message text.
    pub message: String,
    /// Whether the message contradicts the speaker's actual intention.
    pub is_lie: bool,
    /// The intention the speaker actually holds.
    pub true_intention: DecisionIntent,
    /// Speaker position.
    pub position: Position,
    /// Creation time.
    pub timestamp: u64,
}

/// An agent consumed a nutrient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeedEvent {
    /// The eating agent.
    pub agent_id: AgentId,
    /// What it ate.
    pub nutrient_kind: NutrientKind,
    /// Signed energy delta of the nutrient (negative for toxic).
    pub energy_gained: f64,
    /// Where the nutrient was.
    pub position: Position,
    /// Creation time.
    pub timestamp: u64,
}

/// An agent died.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeathEvent {
    /// The deceased.
    pub agent_id: AgentId,
    /// Name of the deceased.
    pub name: String,
    /// Personality of the deceased.
    pub personality: Personality,
    /// Final words chosen at death.
    pub last_words: String,
    /// Where the death occurred.
    pub position: Position,
    /// Time of death.
    pub timestamp: u64,
}
