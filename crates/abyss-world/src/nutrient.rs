//! Nutrient items and their per-type configuration.
//!
//! Each [`NutrientKind`] has a fixed color pair, an energy range sampled once
//! at creation, a linear decay rate, and a default spawn weight. Toxic
//! nutrients carry negative energy, never decay, and are never considered
//! depleted: they stay on the field until something eats them.

use std::f64::consts::TAU;

use abyss_types::{NutrientId, NutrientKind, NutrientSnapshot, Position};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// Per-kind configuration
// ---------------------------------------------------------------------------

/// Static properties of one nutrient type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindProfile {
    /// Fill color.
    pub color: &'static str,
    /// Glow color.
    pub glow: &'static str,
    /// Lowest energy a fresh nutrient can carry (inclusive).
    pub energy_min: f64,
    /// Highest energy a fresh nutrient can carry (exclusive).
    pub energy_max: f64,
    /// Energy lost per second.
    pub decay_rate: f64,
    /// Default weight in the random type draw.
    pub spawn_weight: f64,
}

const COMMON: KindProfile = KindProfile {
    color: "#4ade80",
    glow: "#22c55e",
    energy_min: 15.0,
    energy_max: 30.0,
    decay_rate: 0.01,
    spawn_weight: 60.0,
};

const RICH: KindProfile = KindProfile {
    color: "#60a5fa",
    glow: "#3b82f6",
    energy_min: 35.0,
    energy_max: 50.0,
    decay_rate: 0.02,
    spawn_weight: 25.0,
};

const TOXIC: KindProfile = KindProfile {
    color: "#f472b6",
    glow: "#ec4899",
    energy_min: -20.0,
    energy_max: -10.0,
    decay_rate: 0.005,
    spawn_weight: 10.0,
};

const GOLDEN: KindProfile = KindProfile {
    color: "#fbbf24",
    glow: "#f59e0b",
    energy_min: 60.0,
    energy_max: 80.0,
    decay_rate: 0.05,
    spawn_weight: 5.0,
};

/// Look up the profile for a nutrient kind.
pub const fn kind_profile(kind: NutrientKind) -> &'static KindProfile {
    match kind {
        NutrientKind::Common => &COMMON,
        NutrientKind::Rich => &RICH,
        NutrientKind::Toxic => &TOXIC,
        NutrientKind::Golden => &GOLDEN,
    }
}

// ---------------------------------------------------------------------------
// Spawn weights
// ---------------------------------------------------------------------------

/// Relative weights for the random nutrient type draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnWeights {
    /// Weight of `common`.
    #[serde(default = "default_common_weight")]
    pub common: f64,
    /// Weight of `rich`.
    #[serde(default = "default_rich_weight")]
    pub rich: f64,
    /// Weight of `toxic`.
    #[serde(default = "default_toxic_weight")]
    pub toxic: f64,
    /// Weight of `golden`.
    #[serde(default = "default_golden_weight")]
    pub golden: f64,
}

const fn default_common_weight() -> f64 {
    COMMON.spawn_weight
}
const fn default_rich_weight() -> f64 {
    RICH.spawn_weight
}
const fn default_toxic_weight() -> f64 {
    TOXIC.spawn_weight
}
const fn default_golden_weight() -> f64 {
    GOLDEN.spawn_weight
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            common: default_common_weight(),
            rich: default_rich_weight(),
            toxic: default_toxic_weight(),
            golden: default_golden_weight(),
        }
    }
}

impl SpawnWeights {
    /// The weight assigned to `kind`.
    pub const fn weight(&self, kind: NutrientKind) -> f64 {
        match kind {
            NutrientKind::Common => self.common,
            NutrientKind::Rich => self.rich,
            NutrientKind::Toxic => self.toxic,
            NutrientKind::Golden => self.golden,
        }
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        NutrientKind::ALL.iter().map(|&k| self.weight(k)).sum()
    }

    /// Check the weights can drive a draw.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidSpawnWeights`] for negative or
    /// non-finite weights, or when every weight is zero.
    pub fn validate(&self) -> Result<(), WorldError> {
        for kind in NutrientKind::ALL {
            let weight = self.weight(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(WorldError::InvalidSpawnWeights {
                    reason: format!("{kind} weight must be a finite non-negative number, got {weight}"),
                });
            }
        }
        if self.total() <= 0.0 {
            return Err(WorldError::InvalidSpawnWeights {
                reason: "at least one weight must be positive".to_owned(),
            });
        }
        Ok(())
    }

    /// Draw a kind. Rolls `random * total`, subtracts each positive weight
    /// in [`NutrientKind::ALL`] order, and returns the first kind that brings
    /// the roll to 0 or below. Zero-weight kinds are never drawn; rounding
    /// leftovers go to the last positively weighted kind.
    pub fn select(&self, rng: &mut dyn RngCore) -> NutrientKind {
        let mut roll = rng.random::<f64>() * self.total();
        let mut last = NutrientKind::Common;
        for kind in NutrientKind::ALL {
            let weight = self.weight(kind);
            if weight <= 0.0 {
                continue;
            }
            last = kind;
            roll -= weight;
            if roll <= 0.0 {
                return kind;
            }
        }
        last
    }
}

// ---------------------------------------------------------------------------
// Nutrient
// ---------------------------------------------------------------------------

/// A resource item on the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Nutrient {
    /// Unique handle.
    pub id: NutrientId,
    /// Field position.
    pub position: Position,
    /// Nutrient type.
    pub kind: NutrientKind,
    /// Remaining energy. Strictly negative for toxic items.
    pub energy: f64,
    /// Cosmetic pulse phase in `[0, 2pi)`.
    pub pulse_phase: f64,
    /// Creation time.
    pub created_at: u64,
    /// Energy lost per second.
    pub decay_rate: f64,
}

impl Nutrient {
    /// Apply `dt_seconds` of decay. Toxic nutrients are unchanged.
    pub fn update(&mut self, dt_seconds: f64) {
        if self.kind != NutrientKind::Toxic {
            self.energy -= self.decay_rate * dt_seconds;
        }
    }

    /// Toxic nutrients are never depleted; others are once `|energy| < 1`.
    pub fn is_depleted(&self) -> bool {
        self.kind != NutrientKind::Toxic && self.energy.abs() < 1.0
    }

    /// Exported state.
    pub fn snapshot(&self) -> NutrientSnapshot {
        let profile = kind_profile(self.kind);
        NutrientSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            energy: self.energy,
            color: profile.color.to_owned(),
            glow: profile.glow.to_owned(),
            pulse_phase: self.pulse_phase,
            created_at: self.created_at,
        }
    }
}

/// Create a nutrient at `position`. When `kind` is `None` the type is drawn
/// from `weights`. Energy is sampled uniformly from the type's range.
pub fn create_nutrient(
    id: NutrientId,
    position: Position,
    kind: Option<NutrientKind>,
    weights: &SpawnWeights,
    now: u64,
    rng: &mut dyn RngCore,
) -> Nutrient {
    let kind = kind.unwrap_or_else(|| weights.select(rng));
    let profile = kind_profile(kind);
    let span = profile.energy_max - profile.energy_min;
    Nutrient {
        id,
        position,
        kind,
        energy: rng.random::<f64>().mul_add(span, profile.energy_min),
        pulse_phase: rng.random::<f64>() * TAU,
        created_at: now,
        decay_rate: profile.decay_rate,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn make(kind: NutrientKind, rng: &mut StdRng) -> Nutrient {
        create_nutrient(
            NutrientId(1),
            Position::new(10.0, 10.0),
            Some(kind),
            &SpawnWeights::default(),
            0,
            rng,
        )
    }

    #[test]
    fn energy_falls_in_kind_range() {
        let mut rng = StdRng::seed_from_u64(8);
        for kind in NutrientKind::ALL {
            let profile = kind_profile(kind);
            for _ in 0..50 {
                let n = make(kind, &mut rng);
                assert!(n.energy >= profile.energy_min && n.energy < profile.energy_max);
                assert!(n.pulse_phase >= 0.0 && n.pulse_phase < TAU);
            }
        }
    }

    #[test]
    fn toxic_is_negative_and_never_decays() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut n = make(NutrientKind::Toxic, &mut rng);
        assert!(n.energy >= -20.0 && n.energy < -10.0);
        let before = n.energy;
        n.update(1_000_000.0);
        assert!((n.energy - before).abs() < f64::EPSILON);
        assert!(!n.is_depleted());
    }

    #[test]
    fn small_toxic_is_still_not_depleted() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut n = make(NutrientKind::Toxic, &mut rng);
        n.energy = -0.5;
        assert!(!n.is_depleted());
    }

    #[test]
    fn common_decays_linearly_until_depleted() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut n = make(NutrientKind::Common, &mut rng);
        n.energy = 2.0;
        n.update(50.0);
        assert!((n.energy - 1.5).abs() < 1e-9);
        assert!(!n.is_depleted());
        n.update(60.0);
        assert!(n.is_depleted());
    }

    #[test]
    fn weighted_draw_respects_zero_weights() {
        let mut rng = StdRng::seed_from_u64(8);
        let weights = SpawnWeights {
            common: 0.0,
            rich: 0.0,
            toxic: 0.0,
            golden: 1.0,
        };
        for _ in 0..100 {
            assert_eq!(weights.select(&mut rng), NutrientKind::Golden);
        }
    }

    /// Always rolls exactly 0.0.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn zero_roll_skips_zero_weight_kinds() {
        let weights = SpawnWeights {
            common: 0.0,
            ..SpawnWeights::default()
        };
        assert_eq!(weights.select(&mut ZeroRng), NutrientKind::Rich);

        let only_golden = SpawnWeights {
            common: 0.0,
            rich: 0.0,
            toxic: 0.0,
            golden: 2.0,
        };
        assert_eq!(only_golden.select(&mut ZeroRng), NutrientKind::Golden);
    }

    #[test]
    fn weighted_draw_favors_common() {
        let mut rng = StdRng::seed_from_u64(21);
        let weights = SpawnWeights::default();
        let commons = (0..2000)
            .filter(|_| weights.select(&mut rng) == NutrientKind::Common)
            .count();
        assert!(commons > 1000 && commons < 1400, "got {commons}");
    }

    #[test]
    fn validate_rejects_bad_weights() {
        let negative = SpawnWeights {
            toxic: -1.0,
            ..SpawnWeights::default()
        };
        assert!(negative.validate().is_err());
        let zero = SpawnWeights {
            common: 0.0,
            rich: 0.0,
            toxic: 0.0,
            golden: 0.0,
        };
        assert!(zero.validate().is_err());
        assert!(SpawnWeights::default().validate().is_ok());
    }

    #[test]
    fn weights_deserialize_with_defaults() {
        let parsed: Result<SpawnWeights, _> = serde_yml::from_str("golden: 50\n");
        let weights = parsed.unwrap_or_default();
        assert!((weights.golden - 50.0).abs() < f64::EPSILON);
        assert!((weights.common - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_carries_kind_colors() {
        let mut rng = StdRng::seed_from_u64(8);
        let snap = make(NutrientKind::Rich, &mut rng).snapshot();
        assert_eq!(snap.color, "#60a5fa");
        assert_eq!(snap.glow, "#3b82f6");
    }
}
