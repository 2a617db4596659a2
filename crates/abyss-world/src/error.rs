//! Error types for the `abyss-world` crate.

use abyss_types::NutrientId;

/// Errors that can occur during nutrient field operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// A nutrient was not found on the field.
    #[error("nutrient not found: {0}")]
    NutrientNotFound(NutrientId),

    /// Spawn weights must be finite, non-negative, and not all zero.
    #[error("invalid spawn weights: {reason}")]
    InvalidSpawnWeights {
        /// Which constraint failed.
        reason: String,
    },
}
