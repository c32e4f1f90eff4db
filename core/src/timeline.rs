//! Virtual-clock scheduler for delayed transitions.

use std::time::Duration;

/// Deterministic scheduler that fires keyed deadlines as simulated time advances.
///
/// Each key has at most one pending deadline. Time only moves through
/// [`Timeline::advance`], so callers can step the clock in tests exactly as the
/// frame loop would.
#[derive(Clone, Debug)]
pub struct Timeline<K> {
    now: Duration,
    next_sequence: u64,
    pending: Vec<Pending<K>>,
}

#[derive(Clone, Debug)]
struct Pending<K> {
    deadline: Duration,
    sequence: u64,
    key: K,
}

impl<K: PartialEq> Timeline<K> {
    /// Creates an empty timeline with the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_sequence: 0,
            pending: Vec::new(),
        }
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `key` to fire after `delay`, replacing any pending deadline
    /// for the same key.
    pub fn schedule(&mut self, delay: Duration, key: K) {
        let _ = self.cancel(&key);
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.pending.push(Pending {
            deadline: self.now.saturating_add(delay),
            sequence,
            key,
        });
    }

    /// Removes the pending deadline for `key`. Returns whether one existed.
    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|pending| &pending.key != key);
        self.pending.len() != before
    }

    /// Reports whether `key` has a pending deadline.
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.iter().any(|pending| &pending.key == key)
    }

    /// Number of pending deadlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every pending deadline without moving the clock.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Moves the clock forward and returns the keys whose deadline passed,
    /// earliest first. Keys sharing a deadline fire in scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<K> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;

        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].deadline <= now {
                due.push(self.pending.swap_remove(index));
            } else {
                index += 1;
            }
        }

        due.sort_by_key(|pending| (pending.deadline, pending.sequence));
        due.into_iter().map(|pending| pending.key).collect()
    }
}

impl<K: PartialEq> Default for Timeline<K> {
    fn default() -> Self {
        Self::new()
    }
}
