//! Id-keyed agent collection.
//!
//! The [`Roster`] is the arena's agent store. Agents are keyed by their
//! [`AgentId`] handle; since handles are issued monotonically, iteration
//! order is creation order. Two-agent actions borrow both sides mutably via
//! [`Roster::with_pair`].

use std::collections::BTreeMap;

use abyss_types::AgentId;

use crate::biobit::BioBit;
use crate::error::AgentError;

/// All agents currently in the arena, alive or awaiting corpse pruning.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    agents: BTreeMap<AgentId, BioBit>,
}

impl Roster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
        }
    }

    /// Add an agent, replacing any agent with the same id.
    pub fn insert(&mut self, agent: BioBit) {
        self.agents.insert(agent.id(), agent);
    }

    /// Remove and return an agent.
    pub fn remove(&mut self, id: AgentId) -> Option<BioBit> {
        self.agents.remove(&id)
    }

    /// Look up an agent.
    pub fn get(&self, id: AgentId) -> Option<&BioBit> {
        self.agents.get(&id)
    }

    /// Look up an agent mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut BioBit> {
        self.agents.get_mut(&id)
    }

    /// Whether an agent with this id is present.
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Total agents, living and dead.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// All agents in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &BioBit> {
        self.agents.values()
    }

    /// All agents in creation order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BioBit> {
        self.agents.values_mut()
    }

    /// Living agents in creation order.
    pub fn alive(&self) -> impl Iterator<Item = &BioBit> {
        self.agents.values().filter(|a| a.is_alive())
    }

    /// Dead agents in creation order.
    pub fn dead(&self) -> impl Iterator<Item = &BioBit> {
        self.agents.values().filter(|a| !a.is_alive())
    }

    /// Ids of living agents in creation order.
    pub fn alive_ids(&self) -> Vec<AgentId> {
        self.alive().map(BioBit::id).collect()
    }

    /// Ids of every agent in creation order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Keep only agents for which `keep` returns `true`; return the ids of
    /// removed agents.
    pub fn retain(&mut self, mut keep: impl FnMut(&BioBit) -> bool) -> Vec<AgentId> {
        let mut removed = Vec::new();
        self.agents.retain(|id, agent| {
            let kept = keep(agent);
            if !kept {
                removed.push(*id);
            }
            kept
        });
        removed
    }

    /// Run `f` with mutable access to two distinct agents.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::SelfInteraction`] if `first == second` and
    /// [`AgentError::AgentNotFound`] if either is missing.
    pub fn with_pair<T>(
        &mut self,
        first: AgentId,
        second: AgentId,
        f: impl FnOnce(&mut BioBit, &mut BioBit) -> T,
    ) -> Result<T, AgentError> {
        if first == second {
            return Err(AgentError::SelfInteraction(first));
        }
        let mut a = self
            .agents
            .remove(&first)
            .ok_or(AgentError::AgentNotFound(first))?;
        let result = match self.agents.get_mut(&second) {
            Some(b) => Ok(f(&mut a, b)),
            None => Err(AgentError::AgentNotFound(second)),
        };
        self.agents.insert(first, a);
        result
    }
}

#[cfg(test)]
mod tests {
    use abyss_types::{Personality, Position};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn roster_of(n: u64) -> Roster {
        let mut roster = Roster::new();
        for i in (1..=n).rev() {
            roster.insert(BioBit::new(
                AgentId(i),
                format!("Bit_{i}"),
                Personality::Altruist,
                Position::new(0.0, 0.0),
            ));
        }
        roster
    }

    #[test]
    fn iteration_is_creation_order() {
        let roster = roster_of(4);
        assert_eq!(roster.ids(), [AgentId(1), AgentId(2), AgentId(3), AgentId(4)]);
    }

    #[test]
    fn with_pair_mutates_both_sides() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut roster = roster_of(2);
        let stolen = roster
            .with_pair(AgentId(1), AgentId(2), |a, b| a.attack_target(b, 10.0, 0, &mut rng))
            .ok();
        assert!(stolen.is_some_and(|s| (s - 10.0).abs() < 1e-9));
        assert!(roster.get(AgentId(2)).is_some_and(|b| (b.energy() - 90.0).abs() < 1e-9));
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn with_pair_rejects_self_and_missing() {
        let mut roster = roster_of(1);
        assert_eq!(
            roster.with_pair(AgentId(1), AgentId(1), |_, _| ()),
            Err(AgentError::SelfInteraction(AgentId(1)))
        );
        assert_eq!(
            roster.with_pair(AgentId(1), AgentId(9), |_, _| ()),
            Err(AgentError::AgentNotFound(AgentId(9)))
        );
        assert!(roster.contains(AgentId(1)));
    }

    #[test]
    fn retain_reports_removed_ids() {
        let mut roster = roster_of(3);
        let removed = roster.retain(|a| a.id() != AgentId(2));
        assert_eq!(removed, [AgentId(2)]);
        assert_eq!(roster.ids(), [AgentId(1), AgentId(3)]);
    }
}
