//! Nutrient field for the Abyss simulation.
//!
//! Nutrients are the only resource in the arena. This crate owns their
//! per-type configuration, creation, linear decay, depletion rule, and the
//! nearest-nutrient query used by foraging.
//!
//! # Modules
//!
//! - [`error`] -- Error types for field operations ([`WorldError`])
//! - [`field`] -- Id-keyed nutrient store ([`NutrientField`])
//! - [`nutrient`] -- Nutrient items, kind profiles, weighted type draw

pub mod error;
pub mod field;
pub mod nutrient;

pub use error::WorldError;
pub use field::NutrientField;
pub use nutrient::{KindProfile, Nutrient, SpawnWeights, create_nutrient, kind_profile};
