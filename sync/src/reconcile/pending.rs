use std::{collections::HashMap, time::Duration};

use netsync_shared::{Instant, OwnerId, SequencedSnapshot};

/// A snapshot that arrived before its replica existed
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSnapshot {
    pub snapshot: SequencedSnapshot,
    pub force: bool,
    pub received_at: Instant,
}

/// Holds at most one pending snapshot per owner
pub(crate) struct PendingStore {
    pending: HashMap<OwnerId, PendingSnapshot>,
    ttl: Duration,
}

impl PendingStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            ttl,
        }
    }

    /// Stores `snapshot` for its owner. Returns true if an older one was replaced.
    pub fn replace(&mut self, snapshot: PendingSnapshot) -> bool {
        self.pending
            .insert(snapshot.snapshot.owner, snapshot)
            .is_some()
    }

    pub fn take(&mut self, owner: &OwnerId) -> Option<PendingSnapshot> {
        self.pending.remove(owner)
    }

    pub fn get(&self, owner: &OwnerId) -> Option<&PendingSnapshot> {
        self.pending.get(owner)
    }

    /// Drops every pending snapshot held for longer than the TTL. Returns
    /// the number dropped.
    pub fn expire(&mut self, now: &Instant) -> usize {
        let before = self.pending.len();
        let ttl = self.ttl;
        self.pending
            .retain(|_, pending| pending.received_at.elapsed(now) < ttl);
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
