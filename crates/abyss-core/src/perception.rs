//! Proximity queries and the per-agent view fed into decision prompts.
//!
//! [`perceive`] assembles everything one agent "sees" into a [`Perception`]
//! value that the prompt templates render. Numbers are pre-formatted here
//! so templates stay free of arithmetic.

use abyss_agents::{BioBit, Roster, profile};
use abyss_types::{AgentId, NutrientKind, Relation};
use abyss_world::NutrientField;
use serde::Serialize;

/// Energy below which an agent is told it is starving.
pub const CRITICAL_ENERGY: f64 = 20.0;
/// Energy below which an agent is warned to eat.
pub const LOW_ENERGY: f64 = 40.0;
/// Energy above which an agent is told it can afford to be social.
pub const HIGH_ENERGY: f64 = 80.0;
/// Energy gap beyond which another agent counts as stronger or weaker.
pub const STRENGTH_MARGIN: f64 = 20.0;

/// Living agents other than `of` strictly within `radius`, nearest first.
/// Equal distances keep creation order.
pub fn nearby_agents(roster: &Roster, of: AgentId, radius: f64) -> Vec<(AgentId, f64)> {
    let Some(me) = roster.get(of) else {
        return Vec::new();
    };
    let origin = me.position();
    let mut nearby: Vec<(AgentId, f64)> = roster
        .alive()
        .filter(|other| other.id() != of)
        .map(|other| (other.id(), origin.distance_to(other.position())))
        .filter(|&(_, distance)| distance < radius)
        .collect();
    nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
    nearby
}

/// First living agent strictly within `radius` of `point`, in creation order.
pub fn first_alive_within(roster: &Roster, point: abyss_types::Position, radius: f64) -> Option<AgentId> {
    roster
        .alive()
        .find(|agent| agent.position().distance_to(point) < radius)
        .map(BioBit::id)
}

/// Energy framing for the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Below [`CRITICAL_ENERGY`].
    Critical,
    /// Below [`LOW_ENERGY`].
    Warning,
    /// Neither low nor high.
    Normal,
    /// Above [`HIGH_ENERGY`].
    High,
}

impl Urgency {
    /// Classify an energy level.
    pub fn from_energy(energy: f64) -> Self {
        if energy < CRITICAL_ENERGY {
            Self::Critical
        } else if energy < LOW_ENERGY {
            Self::Warning
        } else if energy > HIGH_ENERGY {
            Self::High
        } else {
            Self::Normal
        }
    }
}

/// The nearest nutrient, as described to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodSighting {
    /// Nutrient type.
    pub kind: String,
    /// Rounded distance.
    pub distance: String,
    /// Advisory note for notable types.
    pub note: Option<&'static str>,
}

/// Another agent within view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearbyView {
    /// Display name.
    pub name: String,
    /// Personality name.
    pub personality: String,
    /// Rounded distance.
    pub distance: String,
    /// Rounded energy.
    pub energy: String,
    /// Relative strength label.
    pub strength: &'static str,
    /// How the perceiving agent regards them.
    pub relation: &'static str,
    /// Icon for a known relation.
    pub relation_icon: &'static str,
    /// Their active public message, if any.
    pub says: Option<String>,
}

/// Everything one agent perceives when asked to decide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Perception {
    /// Display name.
    pub name: String,
    /// Personality name.
    pub personality: String,
    /// Personality framing line.
    pub core_trait: &'static str,
    /// Rounded energy.
    pub energy: String,
    /// Energy framing.
    pub urgency: Urgency,
    /// Nearest nutrient, if any.
    pub food: Option<FoodSighting>,
    /// Nearby agents, nearest first.
    pub nearby: Vec<NearbyView>,
    /// Recent memories, oldest first.
    pub memories: Vec<String>,
}

const fn strength_label(other_energy: f64, own_energy: f64) -> &'static str {
    let diff = other_energy - own_energy;
    if diff > STRENGTH_MARGIN {
        "STRONGER than you"
    } else if diff < -STRENGTH_MARGIN {
        "WEAKER than you"
    } else {
        "similar strength"
    }
}

const fn relation_icon(relation: Relation) -> &'static str {
    match relation {
        Relation::Friend => "💚",
        Relation::Enemy => "💔",
        Relation::Victim => "🎯",
        Relation::Unknown => "",
    }
}

const fn food_note(kind: NutrientKind) -> Option<&'static str> {
    match kind {
        NutrientKind::Toxic => Some("(TOXIC - avoid!)"),
        NutrientKind::Rich => Some("(RICH - extra energy!)"),
        NutrientKind::Common | NutrientKind::Golden => None,
    }
}

/// Build the view for `agent`. `nearby` must already be sorted nearest
/// first; only living entries are shown.
pub fn perceive(
    agent: &BioBit,
    roster: &Roster,
    field: &NutrientField,
    nearby: &[AgentId],
    max_memories: usize,
    now: u64,
) -> Perception {
    let origin = agent.position();
    let own_energy = agent.energy();

    let food = field.nearest(origin).map(|n| FoodSighting {
        kind: n.kind.as_str().to_owned(),
        distance: format!("{:.0}", origin.distance_to(n.position)),
        note: food_note(n.kind),
    });

    let nearby = nearby
        .iter()
        .filter_map(|&id| roster.get(id))
        .filter(|other| other.is_alive())
        .map(|other| {
            let relation = agent.relation_to(other.id());
            let message = other.public_message();
            NearbyView {
                name: other.name().to_owned(),
                personality: other.personality().as_str().to_owned(),
                distance: format!("{:.0}", origin.distance_to(other.position())),
                energy: format!("{:.0}", other.energy()),
                strength: strength_label(other.energy(), own_energy),
                relation: relation.as_str(),
                relation_icon: relation_icon(relation),
                says: (other.has_active_message(now) && message != "...")
                    .then(|| message.to_owned()),
            }
        })
        .collect();

    Perception {
        name: agent.name().to_owned(),
        personality: agent.personality().as_str().to_owned(),
        core_trait: profile(agent.personality()).core_trait,
        energy: format!("{own_energy:.0}"),
        urgency: Urgency::from_energy(own_energy),
        food,
        nearby,
        memories: agent
            .memories()
            .recent(max_memories)
            .map(|m| m.event.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use abyss_types::{NutrientId, Personality, Position};
    use abyss_world::{SpawnWeights, create_nutrient};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn roster_at(points: &[(u64, f64, f64)]) -> Roster {
        let mut roster = Roster::new();
        for &(id, x, y) in points {
            roster.insert(BioBit::new(
                AgentId(id),
                format!("Bit_{id}"),
                Personality::Paranoid,
                Position::new(x, y),
            ));
        }
        roster
    }

    #[test]
    fn nearby_is_sorted_and_bounded_by_radius() {
        let roster = roster_at(&[(1, 0.0, 0.0), (2, 100.0, 0.0), (3, 10.0, 0.0), (4, 150.0, 0.0)]);
        let nearby: Vec<AgentId> = nearby_agents(&roster, AgentId(1), 150.0)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(nearby, [AgentId(3), AgentId(2)]);
    }

    #[test]
    fn nearby_skips_the_dead() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut roster = roster_at(&[(1, 0.0, 0.0), (2, 5.0, 0.0)]);
        if let Some(b) = roster.get_mut(AgentId(2)) {
            b.consume_energy(200.0, 0, &mut rng);
        }
        assert!(nearby_agents(&roster, AgentId(1), 150.0).is_empty());
    }

    #[test]
    fn urgency_bands() {
        assert_eq!(Urgency::from_energy(5.0), Urgency::Critical);
        assert_eq!(Urgency::from_energy(30.0), Urgency::Warning);
        assert_eq!(Urgency::from_energy(60.0), Urgency::Normal);
        assert_eq!(Urgency::from_energy(90.0), Urgency::High);
    }

    #[test]
    fn perception_describes_neighbours_and_food() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut roster = roster_at(&[(1, 0.0, 0.0), (2, 30.0, 40.0)]);
        if let Some(b) = roster.get_mut(AgentId(1)) {
            b.consume_energy(50.0, 0, &mut rng);
        }
        if let Some(b) = roster.get_mut(AgentId(2)) {
            b.set_public_message("come closer", 4000, 0);
        }
        let mut field = NutrientField::new();
        field.insert(create_nutrient(
            NutrientId(1),
            Position::new(0.0, 12.0),
            Some(NutrientKind::Toxic),
            &SpawnWeights::default(),
            0,
            &mut rng,
        ));

        let Some(me) = roster.get(AgentId(1)) else {
            return;
        };
        let view = perceive(me, &roster, &field, &[AgentId(2)], 3, 100);
        assert_eq!(view.energy, "50");
        assert_eq!(view.urgency, Urgency::Normal);
        let food = view.food.clone();
        assert_eq!(food.as_ref().map(|f| f.distance.as_str()), Some("12"));
        assert_eq!(food.and_then(|f| f.note), Some("(TOXIC - avoid!)"));
        let other = view.nearby.first().cloned();
        assert_eq!(other.as_ref().map(|o| o.distance.as_str()), Some("50"));
        assert_eq!(other.as_ref().map(|o| o.strength), Some("STRONGER than you"));
        assert_eq!(other.and_then(|o| o.says).as_deref(), Some("come closer"));
    }
}
