//! Type-safe identifier wrappers and the injectable [`IdSource`].
//!
//! Every entity in the arena has a strongly-typed integer handle to prevent
//! accidental mixing of identifiers at compile time. Handles are issued by an
//! [`IdSource`] owned by the simulation, so a run constructed with the same
//! source and the same random seed produces the same identifiers.
//!
//! Handles are monotonic: ordering by handle is ordering by creation, which
//! the id-keyed collections rely on for stable iteration order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// Return the raw handle value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a biobit (agent) in the arena.
    AgentId
}

define_id! {
    /// Unique identifier for a nutrient item on the field.
    NutrientId
}

define_id! {
    /// Unique identifier for a social event or chat message record.
    EventId
}

/// Monotonic source of entity handles.
///
/// The simulation owns exactly one source and draws every new handle from
/// it. Handles start at 1 and never repeat within a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSource {
    next: u64,
}

impl IdSource {
    /// Create a source whose first handle is `1`.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Create a source whose first handle is `first`.
    pub const fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Issue the next handle as any id type.
    pub fn issue<T: From<u64>>(&mut self) -> T {
        let raw = self.next;
        self.next = self.next.saturating_add(1);
        T::from(raw)
    }

    /// Peek at the raw value the next [`issue`](Self::issue) will return.
    pub const fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_is_monotonic_across_types() {
        let mut ids = IdSource::new();
        let a: AgentId = ids.issue();
        let n: NutrientId = ids.issue();
        let b: AgentId = ids.issue();
        assert_eq!(a.into_inner(), 1);
        assert_eq!(n.into_inner(), 2);
        assert_eq!(b.into_inner(), 3);
        assert!(a < b);
    }

    #[test]
    fn starting_at_offsets_the_first_handle() {
        let mut ids = IdSource::starting_at(100);
        let e: EventId = ids.issue();
        assert_eq!(e, EventId(100));
        assert_eq!(ids.peek(), 101);
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = AgentId(7);
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json.as_deref(), Some("7"));
        let restored: Result<AgentId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_raw_value() {
        assert_eq!(NutrientId(42).to_string(), "42");
    }
}
