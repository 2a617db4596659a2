//! The simulation orchestrator.
//!
//! [`Simulation`] exclusively owns every agent, nutrient, and event record.
//! The driver calls [`Simulation::tick`] once per frame; when a decision
//! window opens the tick hands back a [`ThoughtRequest`], and the driver
//! later feeds the oracle's answer to [`Simulation::resolve_thought`] at a
//! tick boundary. Only one thought is ever in flight.
//!
//! # Tick order
//!
//! 1. Fire due power reverts (even while paused).
//! 2. Nutrient decay and probabilistic spawn.
//! 3. Per living agent: metabolic decay, then foraging or jitter.
//! 4. Death recording, corpse pruning, event-log pruning.
//! 5. Decision window gate.

mod actions;
mod commands;

use std::collections::BTreeSet;
use std::path::Path;

use abyss_agents::{BioBit, Roster};
use abyss_types::{
    AgentId, Bounds, ClickMode, DeathEvent, Decision, FeedEvent, IdSource, Intention, LifetimeStats,
    NutrientKind, PowerEvent, Position, WorldSnapshot,
};
use abyss_world::{Nutrient, NutrientField, create_nutrient};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};

pub use commands::{Command, CommandOutcome};

use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::perception::{nearby_agents, perceive};
use crate::prompt::PromptEngine;
use crate::social_log::EventLog;

/// Distance at which an agent eats the nutrient it is foraging toward.
pub const EAT_RADIUS: f64 = 20.0;
/// Foraging speed.
pub const FORAGE_SPEED: f64 = 0.5;
/// Foraging speed while starving.
pub const STARVING_FORAGE_SPEED: f64 = 0.8;
/// Lower bound for entropy and abundance.
pub const MIN_MULTIPLIER: f64 = 0.1;
/// Upper bound for entropy and abundance.
pub const MAX_MULTIPLIER: f64 = 3.0;

/// A decision request for the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThoughtRequest {
    /// Ticket to hand back with the answer.
    pub ticket: u64,
    /// The thinking agent.
    pub agent_id: AgentId,
    /// Its display name.
    pub agent_name: String,
    /// Rendered user prompt.
    pub prompt: String,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Time of the tick.
    pub now: u64,
    /// Milliseconds simulated.
    pub dt_ms: u64,
    /// Whether the tick was skipped because the simulation is paused.
    pub paused: bool,
    /// Agents whose deaths were recorded this tick.
    pub deaths: Vec<AgentId>,
    /// Corpses removed this tick.
    pub pruned: Vec<AgentId>,
    /// A newly opened decision window.
    pub thought: Option<ThoughtRequest>,
}

/// Outcome of [`Simulation::resolve_thought`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The decision was applied.
    Applied {
        /// The deciding agent.
        agent_id: AgentId,
        /// Its new intention.
        intention: Intention,
    },
    /// The oracle had no decision.
    NoDecision,
    /// The agent died or was removed while the thought was in flight.
    Stale,
    /// The ticket does not match the thought in flight.
    UnknownTicket,
}

#[derive(Debug, Clone)]
struct PendingThought {
    ticket: u64,
    agent_id: AgentId,
    nearby: Vec<AgentId>,
}

#[derive(Debug, Clone, Copy)]
struct PowerRevert {
    due: u64,
    event: PowerEvent,
}

/// The single owner of simulation state.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    clock: Box<dyn Clock>,
    rng: StdRng,
    ids: IdSource,
    agents: Roster,
    nutrients: NutrientField,
    log: EventLog,
    prompts: PromptEngine,
    bounds: Bounds,
    entropy: f64,
    abundance: f64,
    paused: bool,
    click_mode: ClickMode,
    selected: Option<AgentId>,
    stats: LifetimeStats,
    last_update: u64,
    last_think: Option<u64>,
    pending: Option<PendingThought>,
    next_ticket: u64,
    mourned: BTreeSet<AgentId>,
    reverts: Vec<PowerRevert>,
}

/// Millisecond span as float, saturating at `u32::MAX`.
fn millis_f64(ms: u64) -> f64 {
    f64::from(u32::try_from(ms).unwrap_or(u32::MAX))
}

/// Uniform position inside `bounds`.
fn random_position(bounds: Bounds, rng: &mut dyn RngCore) -> Position {
    Position::new(
        rng.random::<f64>() * bounds.width,
        rng.random::<f64>() * bounds.height,
    )
}

impl Simulation {
    /// Create an empty simulation seeded from the OS.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if the configuration is invalid and
    /// [`SimulationError::Prompt`] if the prompt templates fail to load.
    pub fn new(config: SimulationConfig, clock: Box<dyn Clock>) -> Result<Self, SimulationError> {
        Self::with_rng(config, clock, StdRng::from_os_rng())
    }

    /// Create an empty simulation with a fixed seed.
    ///
    /// # Errors
    ///
    /// Same as [`Simulation::new`].
    pub fn seeded(
        config: SimulationConfig,
        clock: Box<dyn Clock>,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        Self::with_rng(config, clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: SimulationConfig,
        clock: Box<dyn Clock>,
        rng: StdRng,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let prompts = PromptEngine::load(config.cognition.templates_dir.as_deref().map(Path::new))?;
        let now = clock.now_ms();
        Ok(Self {
            bounds: Bounds::new(config.arena.width, config.arena.height),
            entropy: config.metabolism.entropy.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER),
            abundance: config.nutrients.abundance.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER),
            config,
            clock,
            rng,
            ids: IdSource::new(),
            agents: Roster::new(),
            nutrients: NutrientField::new(),
            log: EventLog::new(),
            prompts,
            paused: false,
            click_mode: ClickMode::default(),
            selected: None,
            stats: LifetimeStats::default(),
            last_update: now,
            last_think: None,
            pending: None,
            next_ticket: 1,
            mourned: BTreeSet::new(),
            reverts: Vec::new(),
        })
    }

    /// Spawn the configured initial agents and nutrients.
    pub fn populate(&mut self) {
        for _ in 0..self.config.arena.initial_biobits {
            self.spawn_biobit(None);
        }
        for _ in 0..self.config.arena.initial_nutrients {
            self.spawn_nutrient();
        }
        tracing::info!(
            biobits = self.agents.len(),
            nutrients = self.nutrients.len(),
            "arena populated"
        );
    }

    /// Current clock reading.
    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// The active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// All agents, corpses included.
    pub const fn agents(&self) -> &Roster {
        &self.agents
    }

    /// All nutrients.
    pub const fn nutrients(&self) -> &NutrientField {
        &self.nutrients
    }

    /// The time-windowed event queues.
    pub const fn events(&self) -> &EventLog {
        &self.log
    }

    /// Lifetime counters.
    pub const fn stats(&self) -> LifetimeStats {
        self.stats
    }

    /// Metabolic multiplier.
    pub const fn entropy(&self) -> f64 {
        self.entropy
    }

    /// Spawn-rate multiplier.
    pub const fn abundance(&self) -> f64 {
        self.abundance
    }

    /// Arena extent.
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Whether ticks are suspended.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// The selected agent, if any.
    pub const fn selected(&self) -> Option<AgentId> {
        self.selected
    }

    /// The agent whose decision is in flight.
    pub fn thinking(&self) -> Option<AgentId> {
        self.pending.as_ref().map(|p| p.agent_id)
    }

    /// Advance the simulation to the clock's current time.
    pub fn tick(&mut self, oracle_ready: bool) -> TickReport {
        let now = self.clock.now_ms();
        let dt_ms = now.saturating_sub(self.last_update);
        self.last_update = now;
        self.fire_reverts(now);

        let mut report = TickReport {
            now,
            dt_ms,
            paused: self.paused,
            ..TickReport::default()
        };
        if self.paused {
            return report;
        }

        let dt = millis_f64(dt_ms);
        self.nutrients.decay(dt / 1000.0);
        if self.rng.random::<f64>() < self.config.nutrients.spawn_chance * self.abundance {
            self.spawn_nutrient();
        }

        self.update_biobits(dt, now);
        report.deaths = self.record_deaths();
        report.pruned = self.prune(now);

        if oracle_ready {
            report.thought = self.open_decision_window(now);
            report.deaths.extend(self.record_deaths());
        }
        report
    }

    fn update_biobits(&mut self, dt: f64, now: u64) {
        let metabolism = &self.config.metabolism;
        let decay = metabolism.base_decay * self.entropy * (dt / metabolism.reference_frame_ms);

        for id in self.agents.alive_ids() {
            let Some(agent) = self.agents.get_mut(id) else {
                continue;
            };
            if agent.consume_energy(decay, now, &mut self.rng) {
                continue;
            }

            let target = self.nutrients.nearest(agent.position()).map(|n| (n.id, n.position));
            let Some((nutrient_id, nutrient_pos)) = target else {
                let dx = (self.rng.random::<f64>() - 0.5) * 2.0;
                let dy = (self.rng.random::<f64>() - 0.5) * 2.0;
                agent.move_by(dx, dy, self.bounds, now, &mut self.rng);
                continue;
            };

            let speed = if agent.is_starving() {
                STARVING_FORAGE_SPEED
            } else {
                FORAGE_SPEED
            };
            agent.move_to(nutrient_pos, speed, self.bounds, now, &mut self.rng);
            if !agent.is_alive() || agent.position().distance_to(nutrient_pos) >= EAT_RADIUS {
                continue;
            }
            if let Ok(nutrient) = self.nutrients.remove(nutrient_id) {
                let feed = eat(agent, &nutrient, now, &mut self.rng);
                self.log.push_feed(feed);
                self.stats.total_feeds = self.stats.total_feeds.saturating_add(1);
            }
        }
    }

    /// Record every death not yet recorded. Returns the newly recorded ids.
    fn record_deaths(&mut self) -> Vec<AgentId> {
        let mut recorded = Vec::new();
        for agent in self.agents.dead() {
            if !self.mourned.insert(agent.id()) {
                continue;
            }
            let timestamp = agent.died_at().unwrap_or(self.last_update);
            tracing::info!(
                agent_id = %agent.id(),
                name = agent.name(),
                personality = %agent.personality(),
                "biobit died"
            );
            self.log.push_death(DeathEvent {
                agent_id: agent.id(),
                name: agent.name().to_owned(),
                personality: agent.personality(),
                last_words: agent.last_words().unwrap_or("...").to_owned(),
                position: agent.position(),
                timestamp,
            });
            self.stats.total_deaths = self.stats.total_deaths.saturating_add(1);
            recorded.push(agent.id());
        }
        recorded
    }

    /// Drop expired corpses and event records. Returns the removed agents.
    fn prune(&mut self, now: u64) -> Vec<AgentId> {
        let corpse_ms = self.config.retention.corpse_ms;
        let pruned = self
            .agents
            .retain(|agent| agent.is_alive() || agent.time_since_death(now) < corpse_ms);
        for id in &pruned {
            self.mourned.remove(id);
            if self.selected == Some(*id) {
                self.selected = None;
            }
            tracing::debug!(agent_id = %id, "corpse pruned");
        }
        self.log.prune(now, &self.config.retention);
        pruned
    }

    fn fire_reverts(&mut self, now: u64) {
        let (due, waiting): (Vec<PowerRevert>, Vec<PowerRevert>) =
            std::mem::take(&mut self.reverts)
                .into_iter()
                .partition(|r| r.due <= now);
        self.reverts = waiting;
        for revert in due {
            match revert.event {
                PowerEvent::Freeze => self.entropy = 1.0,
                PowerEvent::Frenzy => {
                    for agent in self.agents.iter_mut() {
                        agent.set_intention(Intention::Hunt);
                    }
                }
            }
            tracing::info!(event = ?revert.event, "power event reverted");
        }
    }

    fn open_decision_window(&mut self, now: u64) -> Option<ThoughtRequest> {
        let interval = self.config.cognition.think_interval_ms;
        if self.pending.is_some()
            || self
                .last_think
                .is_some_and(|last| now.saturating_sub(last) < interval)
        {
            return None;
        }
        let alive = self.agents.alive_ids();
        let &agent_id = alive.choose(&mut self.rng)?;
        self.last_think = Some(now);

        let agent = self.agents.get_mut(agent_id)?;
        if agent.consume_thinking_energy(now, &mut self.rng) {
            tracing::debug!(agent_id = %agent_id, "thinking cost was fatal");
            return None;
        }

        let cognition = &self.config.cognition;
        let nearby: Vec<AgentId> = nearby_agents(&self.agents, agent_id, cognition.nearby_radius)
            .into_iter()
            .take(cognition.max_nearby)
            .map(|(id, _)| id)
            .collect();
        let agent = self.agents.get(agent_id)?;
        let view = perceive(
            agent,
            &self.agents,
            &self.nutrients,
            &nearby,
            cognition.max_prompt_memories,
            now,
        );
        let prompt = match self.prompts.render(&view) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!(agent_id = %agent_id, error = %e, "prompt render failed, skipping window");
                return None;
            }
        };

        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.saturating_add(1);
        let agent_name = agent.name().to_owned();
        tracing::debug!(agent_id = %agent_id, ticket, nearby = nearby.len(), "decision requested");
        self.pending = Some(PendingThought {
            ticket,
            agent_id,
            nearby,
        });
        Some(ThoughtRequest {
            ticket,
            agent_id,
            agent_name,
            prompt,
        })
    }

    /// Apply the oracle's answer to the thought in flight.
    ///
    /// A decision for an agent that died or was removed meanwhile is
    /// discarded. Either way the decision window reopens one think interval
    /// from now.
    pub fn resolve_thought(&mut self, ticket: u64, decision: Option<Decision>) -> Resolution {
        let now = self.clock.now_ms();
        let Some(pending) = self.pending.take_if(|p| p.ticket == ticket) else {
            tracing::warn!(ticket, "resolution for unknown ticket");
            return Resolution::UnknownTicket;
        };
        self.last_think = Some(now);

        let Some(decision) = decision else {
            tracing::debug!(agent_id = %pending.agent_id, "oracle returned no decision");
            return Resolution::NoDecision;
        };
        if !self.agents.get(pending.agent_id).is_some_and(BioBit::is_alive) {
            tracing::debug!(agent_id = %pending.agent_id, "discarding stale decision");
            return Resolution::Stale;
        }

        let intention = self.apply_decision(pending.agent_id, &pending.nearby, &decision, now);
        self.record_deaths();
        Resolution::Applied {
            agent_id: pending.agent_id,
            intention,
        }
    }

    /// Render-ready copy of the whole world.
    pub fn snapshot(&self) -> WorldSnapshot {
        let now = self.clock.now_ms();
        WorldSnapshot {
            timestamp: now,
            paused: self.paused,
            entropy: self.entropy,
            abundance: self.abundance,
            bounds: self.bounds,
            alive: self.agents.alive().map(|a| a.snapshot(now)).collect(),
            dead: self.agents.dead().map(|a| a.snapshot(now)).collect(),
            nutrients: self.nutrients.snapshot(),
            feed_events: self.log.feeds().cloned().collect(),
            social_events: self.log.social().cloned().collect(),
            chat_messages: self.log.chats().cloned().collect(),
            death_events: self.log.deaths().cloned().collect(),
            recent_social_log: self.log.recent_social_log(),
            selected: self.selected,
            thinking: self.thinking(),
            stats: self.stats,
        }
    }

    fn spawn_nutrient_at_position(&mut self, position: Position) -> abyss_types::NutrientId {
        let now = self.clock.now_ms();
        let id = self.ids.issue();
        let nutrient = create_nutrient(
            id,
            self.bounds.clamp(position),
            None,
            &self.config.nutrients.spawn_weights,
            now,
            &mut self.rng,
        );
        tracing::trace!(nutrient_id = %id, kind = %nutrient.kind, "nutrient spawned");
        self.nutrients.insert(nutrient);
        id
    }
}

/// Feed `agent` one nutrient and describe what happened.
fn eat(agent: &mut BioBit, nutrient: &Nutrient, now: u64, rng: &mut dyn RngCore) -> FeedEvent {
    let energy = nutrient.energy;
    if nutrient.kind == NutrientKind::Toxic {
        let damage = energy.abs();
        agent.consume_energy(damage, now, rng);
        agent.add_memory(now, format!("Ate toxic food! Lost {damage:.0} energy"), None);
    } else if energy <= 0.0 {
        // Decayed past zero within one long frame.
        let damage = energy.abs();
        agent.consume_energy(damage, now, rng);
        agent.add_memory(now, format!("Ate spoiled {} food! Lost {damage:.0} energy", nutrient.kind), None);
    } else {
        agent.gain_energy(energy, now);
        agent.add_memory(
            now,
            format!("Consumed {} nutrient (+{energy:.0} energy)", nutrient.kind),
            None,
        );
    }
    tracing::trace!(agent_id = %agent.id(), kind = %nutrient.kind, energy, "nutrient consumed");
    FeedEvent {
        agent_id: agent.id(),
        nutrient_kind: nutrient.kind,
        energy_gained: energy,
        position: agent.position(),
        timestamp: now,
    }
}
