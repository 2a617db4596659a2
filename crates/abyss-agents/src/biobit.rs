//! The [`BioBit`] agent entity.
//!
//! A biobit owns its energy, position, intention, relations, memory, and
//! visual-effect state. All mutation goes through the methods here so the
//! energy invariant (`0 <= energy <= 100`) and the once-only death transition
//! hold no matter which code path drains energy.
//!
//! Time is passed in explicitly as `now` (milliseconds on the simulation
//! clock). Transient effects are stored with an expiry timestamp and read
//! back against `now`; nothing here depends on timers or callbacks.

use abyss_types::{
    AgentId, AgentSnapshot, Bounds, Intention, MoveDirection, Personality, Position, Relation,
    VisualEffect,
};
use rand::RngCore;

use crate::memory::MemoryLog;
use crate::personality::choose_last_words;
use crate::relations::Relations;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Energy a freshly spawned biobit starts with.
pub const INITIAL_ENERGY: f64 = 100.0;

/// Upper energy bound.
pub const MAX_ENERGY: f64 = 100.0;

/// Energy below which a living biobit is starving.
pub const STARVING_THRESHOLD: f64 = 20.0;

/// Flat cost of a single `move_by`, independent of distance.
pub const MOVE_COST: f64 = 0.1;

/// Cost of one oracle query.
pub const THINKING_COST: f64 = 2.0;

/// Fraction of stolen energy an attacker keeps.
pub const ATTACK_EFFICIENCY: f64 = 0.8;

/// Energy a giver always keeps back when sharing.
pub const SHARE_RESERVE: f64 = 10.0;

/// Default time a public message stays active.
pub const DEFAULT_MESSAGE_DURATION_MS: u64 = 4000;

/// Placeholder monologue before the first decision.
pub const DEFAULT_MONOLOGUE: &str = "...";

/// Memory recorded at the moment of death.
pub const DEATH_MEMORY: &str = "I have died.";

const EATING_MS: u64 = 500;
const ATTACKING_MS: u64 = 500;
const SHARING_MS: u64 = 500;
const THINKING_MS: u64 = 1000;
const SPEAKING_MS: u64 = 1000;

/// Display colors derived from state.
pub mod colors {
    /// Dead biobit.
    pub const DEAD: &str = "#555555";
    /// Living, starving biobit.
    pub const STARVING: &str = "#ff6b6b";
    /// Intention `attack`.
    pub const ATTACK: &str = "#ef4444";
    /// Intention `hunt`.
    pub const HUNT: &str = "#22c55e";
    /// Intention `socialize`.
    pub const SOCIALIZE: &str = "#a855f7";
    /// Intention `flee`.
    pub const FLEE: &str = "#eab308";
    /// Intention `dying`.
    pub const DYING: &str = "#666666";
}

// ---------------------------------------------------------------------------
// Effect slot
// ---------------------------------------------------------------------------

/// A visual effect with an optional expiry. `None` expiry means sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EffectSlot {
    effect: VisualEffect,
    expires_at: Option<u64>,
}

impl EffectSlot {
    const fn active_at(self, now: u64) -> Option<VisualEffect> {
        match self.expires_at {
            Some(expires_at) if now >= expires_at => None,
            _ => Some(self.effect),
        }
    }
}

// ---------------------------------------------------------------------------
// BioBit
// ---------------------------------------------------------------------------

/// An autonomous organism in the arena.
#[derive(Debug, Clone)]
pub struct BioBit {
    id: AgentId,
    name: String,
    personality: Personality,
    position: Position,
    energy: f64,
    intention: Intention,
    internal_monologue: String,
    public_message: String,
    message_expires_at: u64,
    relations: Relations,
    memories: MemoryLog,
    effect: Option<EffectSlot>,
    target: Option<AgentId>,
    died_at: Option<u64>,
    last_words: Option<String>,
    last_direction: MoveDirection,
}

impl BioBit {
    /// Create a living biobit with full energy and the `hunt` intention.
    pub fn new(id: AgentId, name: impl Into<String>, personality: Personality, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            personality,
            position,
            energy: INITIAL_ENERGY,
            intention: Intention::Hunt,
            internal_monologue: DEFAULT_MONOLOGUE.to_owned(),
            public_message: String::new(),
            message_expires_at: 0,
            relations: Relations::new(),
            memories: MemoryLog::new(),
            effect: None,
            target: None,
            died_at: None,
            last_words: None,
            last_direction: MoveDirection::default(),
        }
    }

    // -- identity and plain state ------------------------------------------

    /// Agent id.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed archetype.
    pub const fn personality(&self) -> Personality {
        self.personality
    }

    /// Current position.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current energy.
    pub const fn energy(&self) -> f64 {
        self.energy
    }

    /// Current intention.
    pub const fn intention(&self) -> Intention {
        self.intention
    }

    /// Latest private thought.
    pub fn internal_monologue(&self) -> &str {
        &self.internal_monologue
    }

    /// Latest public message, active or not.
    pub fn public_message(&self) -> &str {
        &self.public_message
    }

    /// Directional relations held by this agent.
    pub const fn relations(&self) -> &Relations {
        &self.relations
    }

    /// How this agent regards `other`.
    pub fn relation_to(&self, other: AgentId) -> Relation {
        self.relations.get(other)
    }

    /// Memory log.
    pub const fn memories(&self) -> &MemoryLog {
        &self.memories
    }

    /// Current pursuit target.
    pub const fn target(&self) -> Option<AgentId> {
        self.target
    }

    /// Time of death, if dead.
    pub const fn died_at(&self) -> Option<u64> {
        self.died_at
    }

    /// Final words, if dead.
    pub fn last_words(&self) -> Option<&str> {
        self.last_words.as_deref()
    }

    /// Last movement bias from a decision.
    pub const fn last_direction(&self) -> MoveDirection {
        self.last_direction
    }

    // -- derived queries ----------------------------------------------------

    /// `true` while energy is above zero.
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    /// `true` while energy is in `(0, 20)`.
    pub fn is_starving(&self) -> bool {
        self.energy > 0.0 && self.energy < STARVING_THRESHOLD
    }

    /// Whether the public message is non-empty and not yet expired.
    pub fn has_active_message(&self, now: u64) -> bool {
        !self.public_message.is_empty() && now < self.message_expires_at
    }

    /// The visual effect in force at `now`, if any.
    pub fn effect(&self, now: u64) -> Option<VisualEffect> {
        self.effect.and_then(|slot| slot.active_at(now))
    }

    /// Display color derived from alive/starving/intention.
    pub fn color(&self) -> &'static str {
        if !self.is_alive() {
            return colors::DEAD;
        }
        if self.is_starving() {
            return colors::STARVING;
        }
        match self.intention {
            Intention::Attack => colors::ATTACK,
            Intention::Hunt => colors::HUNT,
            Intention::Socialize => colors::SOCIALIZE,
            Intention::Flee => colors::FLEE,
            Intention::Dying => colors::DYING,
        }
    }

    /// `0.1` when dead, otherwise `0.3 + 0.7 * energy / 100`.
    pub fn glow_intensity(&self) -> f64 {
        if self.is_alive() {
            (self.energy / MAX_ENERGY).mul_add(0.7, 0.3)
        } else {
            0.1
        }
    }

    /// Milliseconds since death, or 0 while alive.
    pub const fn time_since_death(&self, now: u64) -> u64 {
        match self.died_at {
            Some(died_at) => now.saturating_sub(died_at),
            None => 0,
        }
    }

    // -- movement -----------------------------------------------------------

    /// Translate by `(dx, dy)`, clamped to `bounds`. Always costs a flat
    /// [`MOVE_COST`] regardless of distance.
    pub fn move_by(&mut self, dx: f64, dy: f64, bounds: Bounds, now: u64, rng: &mut dyn RngCore) {
        self.position = bounds.clamp(Position::new(self.position.x + dx, self.position.y + dy));
        self.consume_energy(MOVE_COST, now, rng);
    }

    /// Step toward `target` by `min(speed, distance)`. No-op at distance 0.
    pub fn move_to(&mut self, target: Position, speed: f64, bounds: Bounds, now: u64, rng: &mut dyn RngCore) {
        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let distance = dx.hypot(dy);
        if distance > 0.0 {
            let ratio = speed.min(distance) / distance;
            self.move_by(dx * ratio, dy * ratio, bounds, now, rng);
        }
    }

    /// Step away from `target` by `speed`. No-op at distance 0.
    pub fn flee_from(&mut self, target: Position, speed: f64, bounds: Bounds, now: u64, rng: &mut dyn RngCore) {
        let dx = self.position.x - target.x;
        let dy = self.position.y - target.y;
        let distance = dx.hypot(dy);
        if distance > 0.0 {
            let ratio = speed / distance;
            self.move_by(dx * ratio, dy * ratio, bounds, now, rng);
        }
    }

    /// Teleport without cost, clamped to `bounds`.
    pub const fn set_position(&mut self, position: Position, bounds: Bounds) {
        self.position = bounds.clamp(position);
    }

    // -- energy -------------------------------------------------------------

    /// Drain energy, clamped at 0. Returns `true` if this call killed the
    /// biobit. Death side effects happen at most once per lifetime. Negative
    /// or non-finite amounts are ignored.
    pub fn consume_energy(&mut self, amount: f64, now: u64, rng: &mut dyn RngCore) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            return false;
        }
        let was_alive = self.is_alive();
        self.energy = (self.energy - amount).clamp(0.0, MAX_ENERGY);

        let died = was_alive && !self.is_alive();
        if died {
            self.die(now, rng);
        }
        if self.is_starving() {
            self.set_effect(VisualEffect::Starving, None);
        }
        died
    }

    /// Add energy, clamped at [`MAX_ENERGY`], and flash `eating`. No effect
    /// on a dead biobit, and only finite positive amounts count. Losses go
    /// through [`BioBit::consume_energy`].
    pub fn gain_energy(&mut self, amount: f64, now: u64) {
        if !self.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return;
        }
        self.energy = (self.energy + amount).min(MAX_ENERGY);
        self.set_effect(VisualEffect::Eating, Some(now.saturating_add(EATING_MS)));
    }

    /// Pay the fixed cost of an oracle query. Returns `true` if the cost was
    /// fatal; a fatal query does not show `thinking`.
    pub fn consume_thinking_energy(&mut self, now: u64, rng: &mut dyn RngCore) -> bool {
        let died = self.consume_energy(THINKING_COST, now, rng);
        if !died {
            self.set_effect(VisualEffect::Thinking, Some(now.saturating_add(THINKING_MS)));
        }
        died
    }

    fn die(&mut self, now: u64, rng: &mut dyn RngCore) {
        if self.died_at.is_some() {
            return;
        }
        let words = choose_last_words(self.personality, rng);
        self.died_at = Some(now);
        self.intention = Intention::Dying;
        self.target = None;
        self.set_effect(VisualEffect::Dying, None);
        self.last_words = Some(words.to_owned());
        self.memories.add(now, DEATH_MEMORY, None);
        tracing::debug!(
            agent_id = %self.id,
            name = %self.name,
            personality = %self.personality,
            last_words = words,
            "biobit died"
        );
    }

    // -- social actions -----------------------------------------------------

    /// Steal up to `damage` energy from `target`. The attacker keeps
    /// [`ATTACK_EFFICIENCY`] of what it steals. Returns the amount stolen.
    pub fn attack_target(&mut self, target: &mut Self, damage: f64, now: u64, rng: &mut dyn RngCore) -> f64 {
        let stolen = target.energy.min(damage).max(0.0);
        target.consume_energy(stolen, now, rng);
        self.gain_energy(stolen * ATTACK_EFFICIENCY, now);

        self.set_effect(VisualEffect::Attacking, Some(now.saturating_add(ATTACKING_MS)));
        self.relations.set(target.id, Relation::Victim);
        target.relations.set(self.id, Relation::Enemy);

        self.memories.add(
            now,
            format!("Attacked {}, stole {stolen:.0} energy", target.name),
            Some(target.id),
        );
        target.memories.add(
            now,
            format!("Was attacked by {}, lost {stolen:.0} energy", self.name),
            Some(self.id),
        );
        stolen
    }

    /// Give up to `amount` energy to `target`, never dipping below
    /// [`SHARE_RESERVE`]. Returns the amount shared; 0 means nothing moved.
    pub fn share_energy(&mut self, target: &mut Self, amount: f64, now: u64, rng: &mut dyn RngCore) -> f64 {
        let shared = (self.energy - SHARE_RESERVE).min(amount);
        if shared <= 0.0 {
            return 0.0;
        }
        self.consume_energy(shared, now, rng);
        target.gain_energy(shared, now);

        self.set_effect(VisualEffect::Sharing, Some(now.saturating_add(SHARING_MS)));
        self.relations.set(target.id, Relation::Friend);
        target.relations.set(self.id, Relation::Friend);

        self.memories.add(
            now,
            format!("Shared {shared:.0} energy with {}", target.name),
            Some(target.id),
        );
        target.memories.add(
            now,
            format!("Received {shared:.0} energy from {}", self.name),
            Some(self.id),
        );
        shared
    }

    // -- cognition ----------------------------------------------------------

    /// Overwrite the intention. A dead biobit stays `dying`.
    pub fn set_intention(&mut self, intention: Intention) {
        if self.is_alive() {
            self.intention = intention;
        }
    }

    /// Overwrite the private thought.
    pub fn set_monologue(&mut self, text: impl Into<String>) {
        self.internal_monologue = text.into();
    }

    /// Publish a message active for `duration_ms` and flash `speaking`.
    pub fn set_public_message(&mut self, text: impl Into<String>, duration_ms: u64, now: u64) {
        self.public_message = text.into();
        self.message_expires_at = now.saturating_add(duration_ms);
        self.set_effect(VisualEffect::Speaking, Some(now.saturating_add(SPEAKING_MS)));
    }

    /// Set or clear the pursuit target.
    pub const fn set_target(&mut self, target: Option<AgentId>) {
        self.target = target;
    }

    /// Remember the movement bias of the latest decision.
    pub const fn set_last_direction(&mut self, direction: MoveDirection) {
        self.last_direction = direction;
    }

    /// Record an arbitrary memory.
    pub fn add_memory(&mut self, now: u64, event: impl Into<String>, target: Option<AgentId>) {
        self.memories.add(now, event, target);
    }

    const fn set_effect(&mut self, effect: VisualEffect, expires_at: Option<u64>) {
        self.effect = Some(EffectSlot { effect, expires_at });
    }

    // -- export -------------------------------------------------------------

    /// Full exported state at `now`.
    pub fn snapshot(&self, now: u64) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            name: self.name.clone(),
            personality: self.personality,
            position: self.position,
            energy: self.energy,
            intention: self.intention,
            internal_monologue: self.internal_monologue.clone(),
            public_message: self.public_message.clone(),
            message_active: self.has_active_message(now),
            effect: self.effect(now),
            target_id: self.target,
            died_at: self.died_at,
            last_words: self.last_words.clone(),
            relations: self.relations.to_entries(),
            memories: self.memories.to_vec(),
            last_direction: self.last_direction,
            color: self.color().to_owned(),
            glow_intensity: self.glow_intensity(),
            is_alive: self.is_alive(),
            is_starving: self.is_starving(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::memory::MEMORY_CAPACITY;

    fn bit(id: u64, name: &str) -> BioBit {
        BioBit::new(AgentId(id), name, Personality::Neutral, Position::new(100.0, 100.0))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Drain `bit` to an exact energy level without killing it.
    fn set_energy(bit: &mut BioBit, energy: f64, rng: &mut StdRng) {
        let delta = bit.energy() - energy;
        bit.consume_energy(delta, 0, rng);
    }

    #[test]
    fn new_biobit_is_healthy_hunter() {
        let b = bit(1, "Bit_1");
        assert!(close(b.energy(), 100.0));
        assert_eq!(b.intention(), Intention::Hunt);
        assert!(b.is_alive());
        assert!(b.died_at().is_none());
        assert!(b.last_words().is_none());
    }

    #[test]
    fn move_costs_flat_energy_and_clamps() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = bit(1, "a");
        let bounds = Bounds::new(150.0, 150.0);
        b.move_by(500.0, -500.0, bounds, 0, &mut rng);
        assert!(close(b.position().x, 150.0));
        assert!(close(b.position().y, 0.0));
        assert!(close(b.energy(), 99.9));

        b.move_by(0.01, 0.0, bounds, 0, &mut rng);
        assert!(close(b.energy(), 99.8));
    }

    #[test]
    fn move_to_never_overshoots() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = bit(1, "a");
        b.move_to(Position::new(100.3, 100.0), 5.0, Bounds::default(), 0, &mut rng);
        assert!(close(b.position().x, 100.3));
    }

    #[test]
    fn move_to_same_point_is_free() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = bit(1, "a");
        b.move_to(Position::new(100.0, 100.0), 5.0, Bounds::default(), 0, &mut rng);
        b.flee_from(Position::new(100.0, 100.0), 5.0, Bounds::default(), 0, &mut rng);
        assert!(close(b.energy(), 100.0));
    }

    #[test]
    fn flee_moves_full_speed_away() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = bit(1, "a");
        b.flee_from(Position::new(90.0, 100.0), 2.0, Bounds::default(), 0, &mut rng);
        assert!(close(b.position().x, 102.0));
        assert!(close(b.position().y, 100.0));
    }

    #[test]
    fn death_happens_exactly_once() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = bit(1, "a");
        assert!(b.consume_energy(150.0, 1000, &mut rng));
        assert!(close(b.energy(), 0.0));
        assert!(!b.is_alive());
        assert_eq!(b.died_at(), Some(1000));
        assert_eq!(b.intention(), Intention::Dying);
        let words = b.last_words().map(str::to_owned);
        assert!(words.is_some());
        let memories_after_death = b.memories().len();

        assert!(!b.consume_energy(10.0, 5000, &mut rng));
        assert_eq!(b.died_at(), Some(1000));
        assert_eq!(b.last_words().map(str::to_owned), words);
        assert_eq!(b.memories().len(), memories_after_death);
        assert_eq!(b.memories().last().map(|m| m.event.as_str()), Some(DEATH_MEMORY));
    }

    #[test]
    fn dead_biobit_cannot_be_revived() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = bit(1, "a");
        b.consume_energy(100.0, 0, &mut rng);
        b.gain_energy(50.0, 10);
        b.set_intention(Intention::Attack);
        assert!(!b.is_alive());
        assert_eq!(b.intention(), Intention::Dying);
        assert_eq!(b.effect(10), Some(VisualEffect::Dying));
    }

    #[test]
    fn negative_gain_never_drains() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = bit(1, "a");
        set_energy(&mut b, 1.0, &mut rng);
        b.gain_energy(-1.5, 10);
        b.gain_energy(f64::NAN, 10);
        assert!(close(b.energy(), 1.0));
        assert!(b.is_alive());
        assert_eq!(b.effect(10), Some(VisualEffect::Starving));
    }

    #[test]
    fn invalid_drain_amounts_are_ignored() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = bit(1, "a");
        set_energy(&mut b, 40.0, &mut rng);
        assert!(!b.consume_energy(f64::NAN, 0, &mut rng));
        assert!(!b.consume_energy(f64::INFINITY, 0, &mut rng));
        assert!(!b.consume_energy(-30.0, 0, &mut rng));
        assert!(close(b.energy(), 40.0));
        assert!(b.died_at().is_none());
    }

    #[test]
    fn starving_effect_is_sticky() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = bit(1, "a");
        b.consume_energy(85.0, 0, &mut rng);
        assert!(b.is_starving());
        assert_eq!(b.effect(1_000_000), Some(VisualEffect::Starving));
        assert_eq!(b.color(), colors::STARVING);
    }

    #[test]
    fn eating_effect_expires_after_half_a_second() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = bit(1, "a");
        set_energy(&mut b, 50.0, &mut rng);
        b.gain_energy(80.0, 1000);
        assert!(close(b.energy(), 100.0));
        assert_eq!(b.effect(1499), Some(VisualEffect::Eating));
        assert_eq!(b.effect(1500), None);
    }

    #[test]
    fn thinking_costs_two_and_flashes() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = bit(1, "a");
        assert!(!b.consume_thinking_energy(0, &mut rng));
        assert!(close(b.energy(), 98.0));
        assert_eq!(b.effect(999), Some(VisualEffect::Thinking));
        assert_eq!(b.effect(1000), None);
    }

    #[test]
    fn fatal_thinking_shows_dying() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = bit(1, "a");
        set_energy(&mut b, 1.5, &mut rng);
        assert!(b.consume_thinking_energy(100, &mut rng));
        assert_eq!(b.effect(100), Some(VisualEffect::Dying));
    }

    #[test]
    fn attack_steals_at_most_target_energy() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut attacker = bit(1, "a");
        let mut target = bit(2, "t");
        set_energy(&mut attacker, 50.0, &mut rng);
        set_energy(&mut target, 30.0, &mut rng);

        let stolen = attacker.attack_target(&mut target, 40.0, 0, &mut rng);
        assert!(close(stolen, 30.0));
        assert!(close(target.energy(), 0.0));
        assert!(!target.is_alive());
        assert!(close(attacker.energy(), 74.0));
        assert_eq!(attacker.relation_to(AgentId(2)), Relation::Victim);
        assert_eq!(target.relation_to(AgentId(1)), Relation::Enemy);
        assert_eq!(attacker.effect(499), Some(VisualEffect::Attacking));
        assert_eq!(
            attacker.memories().last().map(|m| m.event.as_str()),
            Some("Attacked t, stole 30 energy")
        );
        assert_eq!(
            target.memories().last().map(|m| m.event.as_str()),
            Some("Was attacked by a, lost 30 energy")
        );
    }

    #[test]
    fn share_keeps_reserve() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut giver = bit(1, "g");
        let mut target = bit(2, "t");
        set_energy(&mut giver, 40.0, &mut rng);
        set_energy(&mut target, 50.0, &mut rng);

        let shared = giver.share_energy(&mut target, 20.0, 0, &mut rng);
        assert!(close(shared, 20.0));
        assert!(close(giver.energy(), 20.0));
        assert!(close(target.energy(), 70.0));
        assert_eq!(giver.relation_to(AgentId(2)), Relation::Friend);
        assert_eq!(target.relation_to(AgentId(1)), Relation::Friend);
        assert_eq!(giver.effect(0), Some(VisualEffect::Sharing));
    }

    #[test]
    fn share_is_limited_by_reserve() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut giver = bit(1, "g");
        let mut target = bit(2, "t");
        set_energy(&mut giver, 15.0, &mut rng);
        set_energy(&mut target, 50.0, &mut rng);
        assert!(close(giver.share_energy(&mut target, 10.0, 0, &mut rng), 5.0));
        assert!(close(giver.energy(), 10.0));
    }

    #[test]
    fn share_below_reserve_is_noop() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut giver = bit(1, "g");
        let mut target = bit(2, "t");
        set_energy(&mut giver, 9.0, &mut rng);
        set_energy(&mut target, 50.0, &mut rng);
        assert!(close(giver.share_energy(&mut target, 10.0, 0, &mut rng), 0.0));
        assert!(close(giver.energy(), 9.0));
        assert!(close(target.energy(), 50.0));
        assert_eq!(giver.relation_to(AgentId(2)), Relation::Unknown);
    }

    #[test]
    fn public_message_expiry_is_independent_of_speaking() {
        let mut b = bit(1, "a");
        b.set_public_message("hello", DEFAULT_MESSAGE_DURATION_MS, 1000);
        assert!(b.has_active_message(4999));
        assert!(!b.has_active_message(5000));
        assert_eq!(b.effect(1999), Some(VisualEffect::Speaking));
        assert_eq!(b.effect(2000), None);
    }

    #[test]
    fn empty_message_is_never_active() {
        let mut b = bit(1, "a");
        b.set_public_message("", 4000, 0);
        assert!(!b.has_active_message(1));
    }

    #[test]
    fn glow_tracks_energy() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut b = bit(1, "a");
        assert!(close(b.glow_intensity(), 1.0));
        set_energy(&mut b, 50.0, &mut rng);
        assert!(close(b.glow_intensity(), 0.65));
        b.consume_energy(60.0, 0, &mut rng);
        assert!(close(b.glow_intensity(), 0.1));
    }

    #[test]
    fn color_follows_intention() {
        let mut b = bit(1, "a");
        assert_eq!(b.color(), colors::HUNT);
        b.set_intention(Intention::Attack);
        assert_eq!(b.color(), colors::ATTACK);
        b.set_intention(Intention::Socialize);
        assert_eq!(b.color(), colors::SOCIALIZE);
        b.set_intention(Intention::Flee);
        assert_eq!(b.color(), colors::FLEE);
    }

    #[test]
    fn memory_stays_bounded_under_repeated_attacks() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut attacker = bit(1, "a");
        let mut target = bit(2, "t");
        for tick in 0..10_u64 {
            attacker.attack_target(&mut target, 1.0, tick, &mut rng);
        }
        assert_eq!(attacker.memories().len(), MEMORY_CAPACITY);
        assert_eq!(target.memories().len(), MEMORY_CAPACITY);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut b = bit(7, "Bit_7");
        b.set_public_message("hi", 4000, 0);
        let snap = b.snapshot(100);
        assert_eq!(snap.id, AgentId(7));
        assert_eq!(snap.name, "Bit_7");
        assert!(snap.message_active);
        assert_eq!(snap.effect, Some(VisualEffect::Speaking));
        assert!(snap.is_alive);
        assert_eq!(snap.color, colors::HUNT);
    }
}
