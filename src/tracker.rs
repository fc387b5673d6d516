//! Request correlation tracking.
//!
//! A coordinator that issues asynchronous domain actions records one pending
//! request per key and clears it when the response arrives. Checking
//! [`RequestTracker::has_pending`] before issuing suppresses duplicate
//! in-flight requests. The tracker is pure bookkeeping: it has no timeout
//! policy; callers compare [`PendingRequest::elapsed`] against their own
//! limits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;
use uuid::Uuid;

/// Bookkeeping record of one in-flight request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Correlation id, fresh for every insert
    pub id: Uuid,
    /// When the request was recorded
    pub created_at: DateTime<Utc>,
}

impl PendingRequest {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    /// Time since the request was recorded.
    pub fn elapsed(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for PendingRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyed set of pending requests, at most one per key.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::tracker::RequestTracker;
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum Phase { Charge, Release }
///
/// let mut tracker = RequestTracker::new();
/// if !tracker.has_pending(&Phase::Charge) {
///     tracker.add_request(Phase::Charge);
/// }
/// assert!(tracker.has_pending(&Phase::Charge));
/// assert!(!tracker.has_pending(&Phase::Release));
///
/// // Response arrives
/// assert!(tracker.remove_request(&Phase::Charge).is_some());
/// // A late duplicate response is harmless
/// assert!(tracker.remove_request(&Phase::Charge).is_none());
/// ```
#[derive(Clone, Debug)]
pub struct RequestTracker<K> {
    pending: HashMap<K, PendingRequest>,
}

impl<K: Eq + Hash + Debug> RequestTracker<K> {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    pub fn has_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Record a pending request under `key`.
    ///
    /// An existing record for the key is replaced, never duplicated. Call
    /// [`has_pending`](Self::has_pending) first (or use
    /// [`add_if_absent`](Self::add_if_absent)) to suppress duplicates.
    pub fn add_request(&mut self, key: K) -> &PendingRequest {
        let record = PendingRequest::new();
        tracing::trace!(key = ?key, request = %record.id, "request pending");
        match self.pending.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(record);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(record),
        }
    }

    /// Check-then-add as one call. Returns `false` and leaves the existing
    /// record untouched when the key is already pending.
    pub fn add_if_absent(&mut self, key: K) -> bool {
        if self.has_pending(&key) {
            return false;
        }
        self.add_request(key);
        true
    }

    /// Clear the pending record for `key`, returning it if present.
    pub fn remove_request(&mut self, key: &K) -> Option<PendingRequest> {
        let removed = self.pending.remove(key);
        if let Some(record) = &removed {
            tracing::trace!(
                key = ?key,
                request = %record.id,
                elapsed_ms = record.elapsed().as_millis() as u64,
                "request completed"
            );
        }
        removed
    }

    pub fn get(&self, key: &K) -> Option<&PendingRequest> {
        self.pending.get(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &PendingRequest)> {
        self.pending.iter()
    }
}

impl<K: Eq + Hash + Debug> Default for RequestTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_marks_key_pending() {
        let mut tracker = RequestTracker::new();
        assert!(!tracker.has_pending(&1));

        tracker.add_request(1);

        assert!(tracker.has_pending(&1));
        assert!(!tracker.has_pending(&2));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn second_add_replaces_record() {
        let mut tracker = RequestTracker::new();
        let first = tracker.add_request("charge").id;
        let second = tracker.add_request("charge").id;

        assert_ne!(first, second);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get(&"charge").map(|r| r.id), Some(second));

        assert!(tracker.remove_request(&"charge").is_some());
        assert!(!tracker.has_pending(&"charge"));
    }

    #[test]
    fn add_if_absent_keeps_existing_record() {
        let mut tracker = RequestTracker::new();
        assert!(tracker.add_if_absent("fire"));
        let original = tracker.get(&"fire").map(|r| r.id);

        assert!(!tracker.add_if_absent("fire"));
        assert_eq!(tracker.get(&"fire").map(|r| r.id), original);
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let mut tracker: RequestTracker<u8> = RequestTracker::new();
        assert!(tracker.remove_request(&3).is_none());
        assert!(tracker.remove_request(&3).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn remove_returns_record_for_correlation() {
        let mut tracker = RequestTracker::new();
        let id = tracker.add_request('x').id;

        let record = tracker.remove_request(&'x').unwrap();
        assert_eq!(record.id, id);
    }

    #[test]
    fn elapsed_reflects_creation_time() {
        let record = PendingRequest {
            id: Uuid::new_v4(),
            created_at: Utc::now() - chrono::Duration::seconds(5),
        };
        assert!(record.elapsed() >= Duration::from_secs(5));

        let future = PendingRequest {
            id: Uuid::new_v4(),
            created_at: Utc::now() + chrono::Duration::seconds(60),
        };
        assert_eq!(future.elapsed(), Duration::ZERO);
    }

    #[test]
    fn clear_and_iterate() {
        let mut tracker = RequestTracker::new();
        tracker.add_request(1);
        tracker.add_request(2);

        let mut keys: Vec<i32> = tracker.iter().map(|(k, _)| *k).collect();
        keys.sort();
        assert_eq!(keys, vec![1, 2]);

        tracker.clear();
        assert!(tracker.is_empty());
    }
}
