//! Shared type definitions for the Abyss organism simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Abyss workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for renderers and the observer dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Integer id newtypes and the injectable [`IdSource`]
//! - [`enums`] -- Intentions, personalities, effects, relations, nutrient kinds
//! - [`geometry`] -- Positions, arena bounds, movement vectors
//! - [`records`] -- Immutable social, chat, feed, death, and memory records
//! - [`decision`] -- The sanitized oracle decision
//! - [`snapshot`] -- Read-only state exports

pub mod decision;
pub mod enums;
pub mod geometry;
pub mod ids;
pub mod records;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use decision::{Decision, MAX_MESSAGE_CHARS, MAX_MONOLOGUE_CHARS, truncate_chars};
pub use enums::{
    ClickMode, DecisionIntent, Intention, NutrientKind, Personality, PowerEvent, Relation,
    SocialActionType, VisualEffect,
};
pub use geometry::{Bounds, MoveDirection, Position};
pub use ids::{AgentId, EventId, IdSource, NutrientId};
pub use records::{ChatMessage, DeathEvent, FeedEvent, MemoryEntry, SocialEvent};
pub use snapshot::{
    AgentSnapshot, LifetimeStats, NutrientSnapshot, OracleStats, RelationEntry, WorldSnapshot,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::NutrientId::export_all();
        let _ = crate::ids::EventId::export_all();

        // Enums
        let _ = crate::enums::Intention::export_all();
        let _ = crate::enums::DecisionIntent::export_all();
        let _ = crate::enums::Personality::export_all();
        let _ = crate::enums::VisualEffect::export_all();
        let _ = crate::enums::Relation::export_all();
        let _ = crate::enums::NutrientKind::export_all();
        let _ = crate::enums::SocialActionType::export_all();
        let _ = crate::enums::ClickMode::export_all();
        let _ = crate::enums::PowerEvent::export_all();

        // Geometry and records
        let _ = crate::geometry::Position::export_all();
        let _ = crate::geometry::Bounds::export_all();
        let _ = crate::geometry::MoveDirection::export_all();
        let _ = crate::records::MemoryEntry::export_all();
        let _ = crate::records::SocialEvent::export_all();
        let _ = crate::records::ChatMessage::export_all();
        let _ = crate::records::FeedEvent::export_all();
        let _ = crate::records::DeathEvent::export_all();
        let _ = crate::decision::Decision::export_all();

        // Snapshots
        let _ = crate::snapshot::RelationEntry::export_all();
        let _ = crate::snapshot::AgentSnapshot::export_all();
        let _ = crate::snapshot::NutrientSnapshot::export_all();
        let _ = crate::snapshot::LifetimeStats::export_all();
        let _ = crate::snapshot::OracleStats::export_all();
        let _ = crate::snapshot::WorldSnapshot::export_all();
    }
}
