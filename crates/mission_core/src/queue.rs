//! Delayed action queue: fire-once deferred actions on the mission clock.
//!
//! Actions are ordered by `(due_ms, id)`; `id` is a monotonically increasing
//! sequence number, so actions due in the same instant fire in the order they
//! were scheduled. There is no cancellation: stale actions are made harmless
//! by the guard flags their handlers check when they fire.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::MissionAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub id: u64,
    pub due_ms: u64,
    pub action: MissionAction,
}

impl PartialOrd for ScheduledAction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledAction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.due_ms
            .cmp(&other.due_ms)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelayedActionQueue {
    pending: BinaryHeap<Reverse<ScheduledAction>>,
    next_id: u64,
}

impl DelayedActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire once the clock reaches `now_ms + delay_ms`.
    ///
    /// A zero delay fires at the next evaluation point, never inside the
    /// caller. Negative delays are treated as zero. Returns the action id.
    pub fn schedule(&mut self, now_ms: u64, action: MissionAction, delay_ms: i64) -> u64 {
        let delay = u64::try_from(delay_ms).unwrap_or_else(|_| {
            tracing::debug!(?action, delay_ms, "negative delay clamped to zero");
            0
        });
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Reverse(ScheduledAction {
            id,
            due_ms: now_ms.saturating_add(delay),
            action,
        }));
        id
    }

    /// Due time of the earliest pending action.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.peek().map(|entry| entry.0.due_ms)
    }

    /// Remove and return the earliest action if it is due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<ScheduledAction> {
        if self.next_due()? > now_ms {
            return None;
        }
        self.pending.pop().map(|entry| entry.0)
    }

    pub fn is_pending(&self, action: MissionAction) -> bool {
        self.pending.iter().any(|entry| entry.0.action == action)
    }

    /// Pending actions in firing order.
    pub fn pending(&self) -> Vec<&ScheduledAction> {
        let mut actions: Vec<&ScheduledAction> = self.pending.iter().map(|entry| &entry.0).collect();
        actions.sort();
        actions
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
