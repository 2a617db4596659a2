//! Bounded, FIFO memory log.
//!
//! Each agent remembers at most [`MEMORY_CAPACITY`] events. Adding an entry
//! to a full log evicts the oldest one.

use std::collections::VecDeque;

use abyss_types::{AgentId, MemoryEntry};

/// Maximum number of entries an agent remembers.
pub const MEMORY_CAPACITY: usize = 5;

/// An agent's memory log, oldest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLog {
    entries: VecDeque<MemoryEntry>,
}

impl MemoryLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Record an event, evicting the oldest entry if the log is full.
    pub fn add(&mut self, timestamp: u64, event: impl Into<String>, target_id: Option<AgentId>) {
        while self.entries.len() >= MEMORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(MemoryEntry {
            timestamp,
            event: event.into(),
            target_id,
        });
    }

    /// All entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter()
    }

    /// The `count` most recent entries, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &MemoryEntry> {
        self.entries
            .iter()
            .skip(self.entries.len().saturating_sub(count))
    }

    /// The newest entry.
    pub fn last(&self) -> Option<&MemoryEntry> {
        self.entries.back()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy out all entries, oldest first.
    pub fn to_vec(&self) -> Vec<MemoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_log_is_empty() {
        let log = MemoryLog::new();
        assert!(log.is_empty());
        assert!(log.last().is_none());
    }

    #[test]
    fn evicts_oldest_first() {
        let mut log = MemoryLog::new();
        for i in 0..8_u64 {
            log.add(i, format!("event {i}"), None);
        }
        assert_eq!(log.len(), MEMORY_CAPACITY);
        let events: Vec<&str> = log.iter().map(|m| m.event.as_str()).collect();
        assert_eq!(events, ["event 3", "event 4", "event 5", "event 6", "event 7"]);
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut log = MemoryLog::new();
        log.add(1, "a", None);
        log.add(2, "b", Some(AgentId(9)));
        log.add(3, "c", None);
        let recent: Vec<&str> = log.recent(2).map(|m| m.event.as_str()).collect();
        assert_eq!(recent, ["b", "c"]);
        assert_eq!(log.recent(10).count(), 3);
    }

    #[test]
    fn entries_keep_target() {
        let mut log = MemoryLog::new();
        log.add(5, "met", Some(AgentId(2)));
        let last = log.last().cloned();
        assert_eq!(last.and_then(|m| m.target_id), Some(AgentId(2)));
    }
}
