//! Error types for simulation construction and commands.

use abyss_agents::AgentError;
use abyss_world::WorldError;

use crate::config::ConfigError;
use crate::prompt::PromptError;

/// Errors surfaced by [`Simulation`](crate::Simulation) construction and the
/// command surface. The tick itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Prompt templates failed to load.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Agent lookup or pairing failed.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Nutrient lookup failed.
    #[error(transparent)]
    World(#[from] WorldError),

    /// A command argument was out of range.
    #[error("invalid command: {reason}")]
    InvalidCommand {
        /// What is wrong.
        reason: String,
    },
}
