//! Enumeration types for the Abyss simulation.
//!
//! All enums serialize as lowercase strings so the wire format matches the
//! vocabulary used in decision prompts and oracle responses.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Agent state
// ---------------------------------------------------------------------------

/// An agent's current behavioral goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Intention {
    /// Search for food.
    Hunt,
    /// Run away from danger.
    Flee,
    /// Approach others peacefully, maybe share energy.
    Socialize,
    /// Steal energy from others.
    Attack,
    /// Terminal state entered at death.
    Dying,
}

impl Intention {
    /// The lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hunt => "hunt",
            Self::Flee => "flee",
            Self::Socialize => "socialize",
            Self::Attack => "attack",
            Self::Dying => "dying",
        }
    }
}

impl core::fmt::Display for Intention {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intention the decision oracle may choose.
///
/// This is [`Intention`] without `Dying`: the oracle can never kill an agent
/// by decree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DecisionIntent {
    /// Search for food.
    Hunt,
    /// Run away from danger.
    Flee,
    /// Approach others peacefully, maybe share energy.
    Socialize,
    /// Steal energy from others.
    Attack,
}

impl DecisionIntent {
    /// Every choosable intent, in prompt order.
    pub const ALL: [Self; 4] = [Self::Hunt, Self::Flee, Self::Socialize, Self::Attack];

    /// The lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hunt => "hunt",
            Self::Flee => "flee",
            Self::Socialize => "socialize",
            Self::Attack => "attack",
        }
    }

    /// Parse a wire name, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|intent| intent.as_str() == lowered)
    }
}

impl From<DecisionIntent> for Intention {
    fn from(intent: DecisionIntent) -> Self {
        match intent {
            DecisionIntent::Hunt => Self::Hunt,
            DecisionIntent::Flee => Self::Flee,
            DecisionIntent::Socialize => Self::Socialize,
            DecisionIntent::Attack => Self::Attack,
        }
    }
}

/// A fixed trait archetype assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Personality {
    /// Trusts no one.
    Paranoid,
    /// Helps others.
    Altruist,
    /// Says friendly things, plans attacks.
    Manipulator,
    /// Adapts to the situation.
    Neutral,
}

impl Personality {
    /// Every personality, in table order.
    pub const ALL: [Self; 4] = [Self::Paranoid, Self::Altruist, Self::Manipulator, Self::Neutral];

    /// The lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paranoid => "paranoid",
            Self::Altruist => "altruist",
            Self::Manipulator => "manipulator",
            Self::Neutral => "neutral",
        }
    }
}

impl core::fmt::Display for Personality {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient (or, for `Starving` and `Dying`, sticky) visual state tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum VisualEffect {
    /// Just gained energy.
    Eating,
    /// Energy below the starvation threshold.
    Starving,
    /// Spent energy on an oracle query.
    Thinking,
    /// Energy reached zero.
    Dying,
    /// Just stole energy.
    Attacking,
    /// Just gave energy away.
    Sharing,
    /// Just published a message.
    Speaking,
}

/// How one agent regards another. Directional: A's view of B is independent
/// of B's view of A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Relation {
    /// Shared energy with (or received energy from).
    Friend,
    /// Was attacked by.
    Enemy,
    /// Attacked.
    Victim,
    /// No interaction yet.
    Unknown,
}

impl Relation {
    /// The lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Friend => "friend",
            Self::Enemy => "enemy",
            Self::Victim => "victim",
            Self::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Nutrients
// ---------------------------------------------------------------------------

/// The four nutrient types spawned on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum NutrientKind {
    /// Plentiful, modest energy.
    Common,
    /// Less common, more energy.
    Rich,
    /// Negative energy: eating one hurts.
    Toxic,
    /// Rare and very rewarding, decays quickly.
    Golden,
}

impl NutrientKind {
    /// Every nutrient kind, in weighted-draw order.
    pub const ALL: [Self; 4] = [Self::Common, Self::Rich, Self::Toxic, Self::Golden];

    /// The lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rich => "rich",
            Self::Toxic => "toxic",
            Self::Golden => "golden",
        }
    }
}

impl core::fmt::Display for NutrientKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Social interaction and controls
// ---------------------------------------------------------------------------

/// Kind of a recorded social interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum SocialActionType {
    /// Public message.
    Speak,
    /// Energy theft.
    Attack,
    /// Energy gift.
    Share,
    /// Escape from a neighbour.
    Flee,
    /// Friendship declared.
    Befriend,
    /// Friendship broken.
    Betray,
}

/// What a click on the arena does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ClickMode {
    /// Select the nearest living agent under the cursor.
    #[default]
    Select,
    /// Drop a nutrient at the cursor.
    Food,
    /// Strike the first living agent near the cursor.
    Lightning,
}

/// A timed global power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum PowerEvent {
    /// Entropy drops to a crawl, then restores to 1.
    Freeze,
    /// Every living agent turns aggressive, then returns to hunting.
    Frenzy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_intent_parse_is_case_insensitive() {
        assert_eq!(DecisionIntent::parse("ATTACK"), Some(DecisionIntent::Attack));
        assert_eq!(DecisionIntent::parse(" socialize "), Some(DecisionIntent::Socialize));
        assert_eq!(DecisionIntent::parse("dying"), None);
        assert_eq!(DecisionIntent::parse(""), None);
    }

    #[test]
    fn decision_intent_maps_to_intention() {
        for intent in DecisionIntent::ALL {
            let intention = Intention::from(intent);
            assert_eq!(intention.as_str(), intent.as_str());
        }
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&NutrientKind::Golden).ok().as_deref(),
            Some("\"golden\"")
        );
        assert_eq!(
            serde_json::to_string(&VisualEffect::Speaking).ok().as_deref(),
            Some("\"speaking\"")
        );
        let parsed: Result<ClickMode, _> = serde_json::from_str("\"lightning\"");
        assert_eq!(parsed.ok(), Some(ClickMode::Lightning));
    }
}
