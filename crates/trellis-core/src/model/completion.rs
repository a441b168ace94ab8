//! Completion values and the aggregation rule.
//!
//! A task's completion is a single 0-100 integer on disk. In memory it is
//! tagged with how it is maintained: independently settable, or derived from
//! the task's subtasks. The tag is re-derived from subtask presence whenever
//! a task is loaded, so mode transitions (first subtask added, last subtask
//! removed) are explicit at the type level.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Upper bound for completion values and work-log estimates.
pub const MAX_COMPLETION: u8 = 100;

/// A task's completion percentage together with how it is maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Set directly or by the latest work-log estimate.
    Independent(u8),
    /// Mean of the subtask completions; read-only for callers.
    Aggregated(u8),
}

impl Completion {
    /// Re-tag a stored value based on whether the task has subtasks.
    #[must_use]
    pub const fn from_stored(value: u8, has_subtasks: bool) -> Self {
        if has_subtasks {
            Self::Aggregated(value)
        } else {
            Self::Independent(value)
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Independent(v) | Self::Aggregated(v) => v,
        }
    }

    #[must_use]
    pub const fn is_aggregated(self) -> bool {
        matches!(self, Self::Aggregated(_))
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::Independent(0)
    }
}

// The wire format stays a bare integer. Deserialized values start out
// independent; the store re-tags on load.
impl Serialize for Completion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for Completion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u8::deserialize(deserializer).map(Self::Independent)
    }
}

/// Mean of the given completion values, truncated toward zero.
///
/// An empty slice aggregates to 0.
#[must_use]
pub fn aggregate(values: &[u8]) -> u8 {
    if values.is_empty() {
        return 0;
    }
    let sum: usize = values.iter().map(|&v| usize::from(v)).sum();
    u8::try_from(sum / values.len()).unwrap_or(MAX_COMPLETION)
}
