//! Clock, configuration, tick loop, and command surface for the Abyss
//! simulation.
//!
//! This crate owns the [`Simulation`] orchestrator. It is synchronous: the
//! only asynchronous step, the oracle call, happens outside it. A tick hands
//! out a [`ThoughtRequest`] and the caller later returns the answer through
//! [`Simulation::resolve_thought`].
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`] trait with wall-clock and manual implementations.
//! - [`config`] -- Loading `abyss-config.yaml` into strongly-typed structs.
//! - [`error`] -- [`SimulationError`].
//! - [`perception`] -- Proximity queries and the per-agent prompt view.
//! - [`prompt`] -- `minijinja` prompt templates.
//! - [`simulation`] -- The orchestrator: tick, decision resolution, commands,
//!   snapshots.
//! - [`social_log`] -- Social event construction, formatting, and the
//!   time-windowed event log.

pub mod clock;
pub mod config;
pub mod error;
pub mod perception;
pub mod prompt;
pub mod simulation;
pub mod social_log;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, OracleSection, SimulationConfig};
pub use error::SimulationError;
pub use prompt::{PromptEngine, PromptError};
pub use simulation::{Command, CommandOutcome, Resolution, Simulation, ThoughtRequest, TickReport};
pub use social_log::{EventLog, format_social_event};
