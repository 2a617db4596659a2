//! The command surface: every mutation an outside controller may request.
//!
//! Controls never touch entity internals. They send a [`Command`] (or call
//! the matching method directly) and the simulation applies it between
//! ticks.

use abyss_agents::{BioBit, random_personality};
use abyss_types::{AgentId, ClickMode, Intention, NutrientId, Personality, PowerEvent, Position};
use abyss_world::Nutrient;
use serde::{Deserialize, Serialize};

use super::{MAX_MULTIPLIER, MIN_MULTIPLIER, PowerRevert, Simulation, random_position};
use crate::error::SimulationError;
use crate::perception::first_alive_within;

/// A request from an outside controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Spawn an agent with a random personality.
    SpawnBiobit {
        /// Display name; defaults to `Bit_<n>`.
        #[serde(default)]
        name: Option<String>,
    },
    /// Spawn an agent with a chosen personality.
    SpawnBiobitWithPersonality {
        /// The personality.
        personality: Personality,
    },
    /// Spawn a nutrient at a random position.
    SpawnNutrient,
    /// Spawn a nutrient at a point.
    SpawnNutrientAt {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// Set the metabolic multiplier.
    SetEntropy {
        /// New value, clamped to `[0.1, 3]`.
        value: f64,
    },
    /// Set the spawn-rate multiplier.
    SetAbundance {
        /// New value, clamped to `[0.1, 3]`.
        value: f64,
    },
    /// Suspend or resume ticking.
    TogglePause,
    /// Resize the arena.
    SetBounds {
        /// New width.
        width: f64,
        /// New height.
        height: f64,
    },
    /// Trigger a timed power event.
    TriggerEvent {
        /// Which event.
        event: PowerEvent,
    },
    /// Add energy to every living agent.
    HealAll {
        /// Energy per agent.
        amount: f64,
    },
    /// Remove energy from every living agent.
    DamageAll {
        /// Energy per agent.
        amount: f64,
    },
    /// Move every agent to a random position.
    ShufflePositions,
    /// Strike the first living agent near a point.
    LightningStrike {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// A click on the arena.
    CanvasClick {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
        /// Click interpretation; defaults to the current click mode.
        #[serde(default)]
        mode: Option<ClickMode>,
    },
    /// Change how arena clicks are interpreted.
    SetClickMode {
        /// The new mode.
        mode: ClickMode,
    },
    /// Select an agent, or clear the selection.
    SelectBiobit {
        /// Agent to select.
        #[serde(default)]
        id: Option<AgentId>,
    },
    /// Remove an agent outright.
    RemoveBiobit {
        /// Agent to remove.
        id: AgentId,
    },
    /// Remove a nutrient.
    RemoveNutrient {
        /// Nutrient to remove.
        id: NutrientId,
    },
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Applied with nothing to report.
    Done,
    /// An agent was spawned.
    SpawnedBiobit {
        /// Its handle.
        id: AgentId,
    },
    /// A nutrient was spawned.
    SpawnedNutrient {
        /// Its handle.
        id: NutrientId,
    },
    /// Pause state after toggling.
    Paused {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Lightning result.
    Struck {
        /// The agent hit, if any.
        id: Option<AgentId>,
    },
    /// Selection after the command.
    Selected {
        /// The selected agent, if any.
        id: Option<AgentId>,
    },
    /// Agents that died as a result.
    Deaths {
        /// Newly dead agents.
        ids: Vec<AgentId>,
    },
}

fn finite(value: f64, what: &str) -> Result<f64, SimulationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::InvalidCommand {
            reason: format!("{what} must be a finite number"),
        })
    }
}

fn non_negative(value: f64, what: &str) -> Result<f64, SimulationError> {
    let value = finite(value, what)?;
    if value < 0.0 {
        return Err(SimulationError::InvalidCommand {
            reason: format!("{what} must not be negative"),
        });
    }
    Ok(value)
}

impl Simulation {
    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidCommand`] for non-finite or
    /// out-of-range arguments, and the agent or world error for unknown
    /// handles.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, SimulationError> {
        tracing::debug!(?command, "applying command");
        let outcome = match command {
            Command::SpawnBiobit { name } => CommandOutcome::SpawnedBiobit {
                id: self.spawn_biobit(name),
            },
            Command::SpawnBiobitWithPersonality { personality } => CommandOutcome::SpawnedBiobit {
                id: self.spawn_biobit_with_personality(personality),
            },
            Command::SpawnNutrient => CommandOutcome::SpawnedNutrient {
                id: self.spawn_nutrient(),
            },
            Command::SpawnNutrientAt { x, y } => CommandOutcome::SpawnedNutrient {
                id: self.spawn_nutrient_at(finite(x, "x")?, finite(y, "y")?),
            },
            Command::SetEntropy { value } => {
                self.set_entropy(finite(value, "entropy")?);
                CommandOutcome::Done
            }
            Command::SetAbundance { value } => {
                self.set_abundance(finite(value, "abundance")?);
                CommandOutcome::Done
            }
            Command::TogglePause => CommandOutcome::Paused {
                paused: self.toggle_pause(),
            },
            Command::SetBounds { width, height } => {
                let (width, height) = (finite(width, "width")?, finite(height, "height")?);
                if width <= 0.0 || height <= 0.0 {
                    return Err(SimulationError::InvalidCommand {
                        reason: "bounds must be positive".to_owned(),
                    });
                }
                self.set_bounds(width, height);
                CommandOutcome::Done
            }
            Command::TriggerEvent { event } => {
                self.trigger_event(event);
                CommandOutcome::Done
            }
            Command::HealAll { amount } => {
                self.heal_all(non_negative(amount, "amount")?);
                CommandOutcome::Done
            }
            Command::DamageAll { amount } => CommandOutcome::Deaths {
                ids: self.damage_all(non_negative(amount, "amount")?),
            },
            Command::ShufflePositions => {
                self.shuffle_positions();
                CommandOutcome::Done
            }
            Command::LightningStrike { x, y } => CommandOutcome::Struck {
                id: self.lightning_strike(finite(x, "x")?, finite(y, "y")?),
            },
            Command::CanvasClick { x, y, mode } => {
                let mode = mode.unwrap_or(self.click_mode);
                self.handle_canvas_click(finite(x, "x")?, finite(y, "y")?, mode)
            }
            Command::SetClickMode { mode } => {
                self.click_mode = mode;
                CommandOutcome::Done
            }
            Command::SelectBiobit { id } => CommandOutcome::Selected {
                id: self.select_biobit(id)?,
            },
            Command::RemoveBiobit { id } => {
                self.remove_biobit(id)?;
                CommandOutcome::Done
            }
            Command::RemoveNutrient { id } => {
                self.remove_nutrient(id)?;
                CommandOutcome::Done
            }
        };
        Ok(outcome)
    }

    /// Spawn an agent with a random personality at a random position.
    pub fn spawn_biobit(&mut self, name: Option<String>) -> AgentId {
        let personality = random_personality(&mut self.rng);
        self.spawn_named(name, personality)
    }

    /// Spawn an agent with `personality` at a random position.
    pub fn spawn_biobit_with_personality(&mut self, personality: Personality) -> AgentId {
        self.spawn_named(None, personality)
    }

    fn spawn_named(&mut self, name: Option<String>, personality: Personality) -> AgentId {
        let id: AgentId = self.ids.issue();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Bit_{}", self.agents.len().saturating_add(1)));
        let position = random_position(self.bounds, &mut self.rng);
        tracing::info!(agent_id = %id, name = %name, personality = %personality, "biobit spawned");
        self.agents.insert(BioBit::new(id, name, personality, position));
        id
    }

    /// Spawn a nutrient of a weighted-random type at a random position.
    pub fn spawn_nutrient(&mut self) -> NutrientId {
        let position = random_position(self.bounds, &mut self.rng);
        self.spawn_nutrient_at_position(position)
    }

    /// Spawn a nutrient of a weighted-random type at `(x, y)`, clamped into
    /// the arena.
    pub fn spawn_nutrient_at(&mut self, x: f64, y: f64) -> NutrientId {
        self.spawn_nutrient_at_position(Position::new(x, y))
    }

    /// Set entropy, clamped to `[0.1, 3]`.
    pub const fn set_entropy(&mut self, value: f64) {
        self.entropy = value.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER);
    }

    /// Set abundance, clamped to `[0.1, 3]`.
    pub const fn set_abundance(&mut self, value: f64) {
        self.abundance = value.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER);
    }

    /// Flip the pause flag. Returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        tracing::info!(paused = self.paused, "pause toggled");
        self.paused
    }

    /// Resize the arena used for clamping and random placement.
    pub const fn set_bounds(&mut self, width: f64, height: f64) {
        self.bounds = abyss_types::Bounds::new(width, height);
    }

    /// Start a timed power event.
    ///
    /// Freeze drops entropy to the configured freeze value; frenzy turns
    /// every living agent to attack. Each reverts after the configured
    /// duration (entropy back to 1, intentions back to hunt).
    pub fn trigger_event(&mut self, event: PowerEvent) {
        let now = self.clock.now_ms();
        match event {
            PowerEvent::Freeze => self.set_entropy(self.config.powers.freeze_entropy),
            PowerEvent::Frenzy => {
                for agent in self.agents.iter_mut() {
                    agent.set_intention(Intention::Attack);
                }
            }
        }
        self.reverts.push(PowerRevert {
            due: now.saturating_add(self.config.powers.duration_ms),
            event,
        });
        tracing::info!(event = ?event, "power event triggered");
    }

    /// Add `amount` energy to every living agent.
    pub fn heal_all(&mut self, amount: f64) {
        let now = self.clock.now_ms();
        for agent in self.agents.iter_mut() {
            agent.gain_energy(amount, now);
        }
    }

    /// Remove `amount` energy from every living agent. Returns the agents
    /// this killed.
    pub fn damage_all(&mut self, amount: f64) -> Vec<AgentId> {
        let now = self.clock.now_ms();
        for agent in self.agents.iter_mut() {
            if agent.is_alive() {
                agent.consume_energy(amount, now, &mut self.rng);
            }
        }
        self.record_deaths()
    }

    /// Move every agent, corpses included, to a random position.
    pub fn shuffle_positions(&mut self) {
        for agent in self.agents.iter_mut() {
            let position = random_position(self.bounds, &mut self.rng);
            agent.set_position(position, self.bounds);
        }
    }

    /// Damage the first living agent within the strike radius of `(x, y)`,
    /// in creation order. Returns the agent hit.
    pub fn lightning_strike(&mut self, x: f64, y: f64) -> Option<AgentId> {
        let now = self.clock.now_ms();
        let powers = &self.config.powers;
        let id = first_alive_within(&self.agents, Position::new(x, y), powers.lightning_radius)?;
        let damage = powers.lightning_damage;
        if let Some(agent) = self.agents.get_mut(id) {
            agent.consume_energy(damage, now, &mut self.rng);
        }
        tracing::info!(agent_id = %id, damage, "lightning strike");
        self.record_deaths();
        Some(id)
    }

    /// Interpret a click on the arena according to `mode`.
    pub fn handle_canvas_click(&mut self, x: f64, y: f64, mode: ClickMode) -> CommandOutcome {
        match mode {
            ClickMode::Select => {
                let radius = self.config.powers.select_radius;
                self.selected = first_alive_within(&self.agents, Position::new(x, y), radius);
                CommandOutcome::Selected { id: self.selected }
            }
            ClickMode::Food => CommandOutcome::SpawnedNutrient {
                id: self.spawn_nutrient_at(x, y),
            },
            ClickMode::Lightning => CommandOutcome::Struck {
                id: self.lightning_strike(x, y),
            },
        }
    }

    /// Default interpretation of arena clicks.
    pub const fn click_mode(&self) -> ClickMode {
        self.click_mode
    }

    /// Select an agent, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`abyss_agents::AgentError::AgentNotFound`] for an unknown id.
    pub fn select_biobit(&mut self, id: Option<AgentId>) -> Result<Option<AgentId>, SimulationError> {
        if let Some(missing) = id.filter(|&id| !self.agents.contains(id)) {
            return Err(abyss_agents::AgentError::AgentNotFound(missing).into());
        }
        self.selected = id;
        Ok(id)
    }

    /// Remove an agent, alive or dead.
    ///
    /// # Errors
    ///
    /// Returns [`abyss_agents::AgentError::AgentNotFound`] for an unknown id.
    pub fn remove_biobit(&mut self, id: AgentId) -> Result<BioBit, SimulationError> {
        let agent = self
            .agents
            .remove(id)
            .ok_or(abyss_agents::AgentError::AgentNotFound(id))?;
        self.mourned.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::info!(agent_id = %id, "biobit removed");
        Ok(agent)
    }

    /// Remove a nutrient.
    ///
    /// # Errors
    ///
    /// Returns [`abyss_world::WorldError::NutrientNotFound`] for an unknown
    /// id.
    pub fn remove_nutrient(&mut self, id: NutrientId) -> Result<Nutrient, SimulationError> {
        Ok(self.nutrients.remove(id)?)
    }
}
