//! Transition history tracking.
//!
//! Sessions record every change of the active state together with what
//! caused it. The history is bounded: once the configured limit is reached
//! the oldest records are dropped.

use super::state::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// What moved the session to a new state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// An enabled transition selected by guard evaluation.
    Guard {
        /// Declaration index of the transition that fired.
        transition: usize,
    },

    /// An explicit external force.
    Forced,
}

/// Record of a single change of the active state.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::core::{StateId, TransitionCause, TransitionRecord};
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: StateId(0),
///     to: StateId(1),
///     cause: TransitionCause::Forced,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, StateId(1));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state being left
    pub from: StateId,
    /// The state being entered
    pub to: StateId,
    pub cause: TransitionCause,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of transitions.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::core::{StateId, TransitionCause, TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::with_limit(8);
/// history.record(TransitionRecord {
///     from: StateId(0),
///     to: StateId(1),
///     cause: TransitionCause::Guard { transition: 0 },
///     timestamp: Utc::now(),
/// });
/// history.record(TransitionRecord {
///     from: StateId(1),
///     to: StateId(2),
///     cause: TransitionCause::Forced,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec![StateId(0), StateId(1), StateId(2)]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    limit: usize,
}

impl Default for TransitionHistory {
    fn default() -> Self {
        Self::with_limit(64)
    }
}

impl TransitionHistory {
    /// Create an empty history keeping at most `limit` records.
    ///
    /// A limit of zero disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.limit == 0 {
            return;
        }
        if self.records.len() == self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` of the oldest retained record, then the `to`
    /// of each record.
    pub fn get_path(&self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    /// Time between the oldest and newest retained records.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    /// Retained records, oldest first.
    pub fn transitions(&self) -> &VecDeque<TransitionRecord> {
        &self.records
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
