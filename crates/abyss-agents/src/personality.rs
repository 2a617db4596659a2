//! Personality data tables.
//!
//! Everything that varies by [`Personality`] lives here as a lookup keyed by
//! the enum, so adding an archetype means adding one row per table.

use abyss_types::Personality;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

/// Per-personality flavor used by the prompt builder and at death.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonalityProfile {
    /// One-line behavioral framing for decision prompts.
    pub core_trait: &'static str,
    /// Candidate final words, one chosen uniformly at death.
    pub last_words: [&'static str; 3],
}

const PARANOID: PersonalityProfile = PersonalityProfile {
    core_trait: "You trust no one. Flee from threats, attack if cornered.",
    last_words: [
        "I knew they would get me...",
        "Trust no one...",
        "They were all against me...",
    ],
};

const ALTRUIST: PersonalityProfile = PersonalityProfile {
    core_trait: "You help others, share energy, and build friendships.",
    last_words: [
        "I hope I helped someone...",
        "Be kind to each other...",
        "The light fades...",
    ],
};

const MANIPULATOR: PersonalityProfile = PersonalityProfile {
    core_trait: "You deceive others. Say friendly things but plan to attack.",
    last_words: [
        "My plans... unfinished...",
        "I almost had it all...",
        "Betrayed by fate...",
    ],
};

const NEUTRAL: PersonalityProfile = PersonalityProfile {
    core_trait: "You are balanced. Adapt based on situation.",
    last_words: [
        "So this is the end...",
        "Energy depleted...",
        "Goodbye, world...",
    ],
};

/// Look up the profile for a personality.
pub const fn profile(personality: Personality) -> &'static PersonalityProfile {
    match personality {
        Personality::Paranoid => &PARANOID,
        Personality::Altruist => &ALTRUIST,
        Personality::Manipulator => &MANIPULATOR,
        Personality::Neutral => &NEUTRAL,
    }
}

/// Pick final words for `personality` uniformly at random.
pub fn choose_last_words(personality: Personality, rng: &mut dyn RngCore) -> &'static str {
    profile(personality)
        .last_words
        .choose(rng)
        .copied()
        .unwrap_or("...")
}

/// Pick a personality uniformly at random.
pub fn random_personality(rng: &mut dyn RngCore) -> Personality {
    let index = rng.random_range(0..Personality::ALL.len());
    Personality::ALL
        .get(index)
        .copied()
        .unwrap_or(Personality::Neutral)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn last_words_come_from_the_personality_table() {
        let mut rng = StdRng::seed_from_u64(11);
        for personality in Personality::ALL {
            for _ in 0..20 {
                let words = choose_last_words(personality, &mut rng);
                assert!(profile(personality).last_words.contains(&words));
            }
        }
    }

    #[test]
    fn random_personality_covers_all_archetypes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(random_personality(&mut rng));
        }
        assert_eq!(seen.len(), Personality::ALL.len());
    }
}
