//! Error types for the abyss-agents crate.

use abyss_types::AgentId;

/// Errors that can occur during roster operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// Agent with the given ID is not in the roster.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// A two-agent action named the same agent on both sides.
    #[error("agent {0} cannot interact with itself")]
    SelfInteraction(AgentId),
}
