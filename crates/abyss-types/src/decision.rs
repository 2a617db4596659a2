//! The sanitized decision record returned by the decision oracle.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DecisionIntent;
use crate::geometry::MoveDirection;

/// Maximum characters kept from an internal monologue.
pub const MAX_MONOLOGUE_CHARS: usize = 100;

/// Maximum characters kept from a public message.
pub const MAX_MESSAGE_CHARS: usize = 50;

/// A validated behavioral decision for one agent.
///
/// Every value of this type satisfies the oracle contract: the intention is
/// choosable, text fields are length-bounded, and each direction axis lies in
/// `[-1, 1]`. Use [`Decision::new`] to enforce the bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Decision {
    /// What the agent will try to do.
    pub intention: DecisionIntent,
    /// Private thought, at most [`MAX_MONOLOGUE_CHARS`] characters.
    pub internal_monologue: String,
    /// Public statement, at most [`MAX_MESSAGE_CHARS`] characters.
    pub public_message: String,
    /// Movement bias.
    pub move_direction: MoveDirection,
}

impl Decision {
    /// Build a decision, truncating text and clamping the direction.
    pub fn new(
        intention: DecisionIntent,
        internal_monologue: &str,
        public_message: &str,
        move_direction: MoveDirection,
    ) -> Self {
        Self {
            intention,
            internal_monologue: truncate_chars(internal_monologue, MAX_MONOLOGUE_CHARS),
            public_message: truncate_chars(public_message, MAX_MESSAGE_CHARS),
            move_direction: MoveDirection::clamped(move_direction.x, move_direction.y),
        }
    }
}

/// Keep at most `max` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_enforces_bounds() {
        let long = "x".repeat(300);
        let decision = Decision::new(
            DecisionIntent::Flee,
            &long,
            &long,
            MoveDirection { x: -4.0, y: 0.5 },
        );
        assert_eq!(decision.internal_monologue.chars().count(), MAX_MONOLOGUE_CHARS);
        assert_eq!(decision.public_message.chars().count(), MAX_MESSAGE_CHARS);
        assert!((decision.move_direction.x + 1.0).abs() < f64::EPSILON);
        assert!((decision.move_direction.y - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
    }
}
