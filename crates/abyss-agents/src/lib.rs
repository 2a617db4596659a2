//! BioBit agents for the Abyss simulation.
//!
//! This crate contains the logic layer for agents -- everything that operates
//! on agent state without touching I/O or the clock. It sits between
//! `abyss-types` (which defines the data structures) and `abyss-core` (which
//! drives the tick loop).
//!
//! # Modules
//!
//! - [`biobit`] -- The [`BioBit`] entity: movement, energy, death, social actions
//! - [`error`] -- Error types for roster operations ([`AgentError`])
//! - [`memory`] -- Bounded FIFO memory log ([`MemoryLog`])
//! - [`personality`] -- Personality-keyed data tables
//! - [`relations`] -- Directional relationship map ([`Relations`])
//! - [`roster`] -- Id-keyed agent store ([`Roster`])

pub mod biobit;
pub mod error;
pub mod memory;
pub mod personality;
pub mod relations;
pub mod roster;

// Re-export primary types at crate root for convenience.
pub use biobit::{
    ATTACK_EFFICIENCY, BioBit, DEFAULT_MESSAGE_DURATION_MS, INITIAL_ENERGY, MAX_ENERGY, MOVE_COST,
    SHARE_RESERVE, STARVING_THRESHOLD, THINKING_COST, colors,
};
pub use error::AgentError;
pub use memory::{MEMORY_CAPACITY, MemoryLog};
pub use personality::{PersonalityProfile, choose_last_words, profile, random_personality};
pub use relations::Relations;
pub use roster::Roster;
