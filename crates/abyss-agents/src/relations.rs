//! Directional relationship map.
//!
//! `A`'s view of `B` is stored on `A` only. An agent never recorded in the
//! map is [`Relation::Unknown`].

use std::collections::BTreeMap;

use abyss_types::{AgentId, Relation, RelationEntry};

/// How one agent regards every other agent it has interacted with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    map: BTreeMap<AgentId, Relation>,
}

impl Relations {
    /// Create an empty relation map.
    pub const fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// The relation toward `other`, defaulting to [`Relation::Unknown`].
    pub fn get(&self, other: AgentId) -> Relation {
        self.map.get(&other).copied().unwrap_or(Relation::Unknown)
    }

    /// Overwrite the relation toward `other`.
    pub fn set(&mut self, other: AgentId, relation: Relation) {
        self.map.insert(other, relation);
    }

    /// Number of recorded relations.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no relation has been recorded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Export as entries ordered by agent id.
    pub fn to_entries(&self) -> Vec<RelationEntry> {
        self.map
            .iter()
            .map(|(&agent_id, &relation)| RelationEntry { agent_id, relation })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_by_default() {
        let relations = Relations::new();
        assert_eq!(relations.get(AgentId(4)), Relation::Unknown);
        assert!(relations.is_empty());
    }

    #[test]
    fn set_overwrites() {
        let mut relations = Relations::new();
        relations.set(AgentId(4), Relation::Friend);
        relations.set(AgentId(4), Relation::Enemy);
        assert_eq!(relations.get(AgentId(4)), Relation::Enemy);
        assert_eq!(relations.len(), 1);
    }

    #[test]
    fn entries_are_sorted_by_id() {
        let mut relations = Relations::new();
        relations.set(AgentId(9), Relation::Victim);
        relations.set(AgentId(2), Relation::Friend);
        let ids: Vec<AgentId> = relations.to_entries().iter().map(|e| e.agent_id).collect();
        assert_eq!(ids, [AgentId(2), AgentId(9)]);
    }
}
