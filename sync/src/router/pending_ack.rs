use std::collections::HashMap;

use netsync_shared::{Instant, RouteId};

use super::RoutedMessage;

/// An in-flight ack expectation
pub struct PendingAck {
    pub routed: RoutedMessage,
    pub sent_at: Instant,
    pub deadline: Instant,
}

/// Ack expectations keyed by route id
pub(crate) struct PendingAcks {
    pending: HashMap<RouteId, PendingAck>,
}

impl PendingAcks {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    pub fn insert(&mut self, pending_ack: PendingAck) {
        self.pending.insert(pending_ack.routed.id, pending_ack);
    }

    pub fn remove(&mut self, id: &RouteId) -> Option<PendingAck> {
        self.pending.remove(id)
    }

    pub fn contains(&self, id: &RouteId) -> bool {
        self.pending.contains_key(id)
    }

    /// Removes and returns every entry whose deadline is at or before `now`,
    /// oldest deadline first
    pub fn take_expired(&mut self, now: &Instant) -> Vec<PendingAck> {
        let expired_ids: Vec<RouteId> = self
            .pending
            .iter()
            .filter(|(_, pending_ack)| !pending_ack.deadline.is_after(now))
            .map(|(id, _)| *id)
            .collect();

        let mut expired: Vec<PendingAck> = expired_ids
            .iter()
            .filter_map(|id| self.pending.remove(id))
            .collect();
        expired.sort_by_key(|pending_ack| pending_ack.deadline);
        expired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
