use std::collections::HashMap;

use netsync_shared::{OwnerId, Snapshot};

/// Something whose live vitality pair can be captured for sending
pub trait SnapshotSource {
    /// Current (maximum, current) pair, `None` while unavailable
    fn vitality(&self) -> Option<(f32, f32)>;
}

/// Local replica of a remotely owned entity that snapshots are applied to
pub trait SnapshotReplica {
    fn maximum(&self) -> f32;
    fn current(&self) -> f32;
    fn set_maximum(&mut self, maximum: f32);
    /// The replica's own setter, which keeps `current` within `maximum`
    fn set_current(&mut self, current: f32);
    /// Writes `current` without clamping
    fn set_current_unclamped(&mut self, current: f32);
    /// Records which owner this replica belongs to, so UI and game logic
    /// can resolve ownership from the replica alone
    fn bind_owner(&mut self, owner: OwnerId);
    /// Notifies dependent displays that the values should be re-read
    fn refresh_display(&mut self);
}

/// Lookup of live replicas by owner
pub trait ReplicaStore {
    type Replica: SnapshotReplica;

    fn replica_mut(&mut self, owner: &OwnerId) -> Option<&mut Self::Replica>;
}

impl<R: SnapshotReplica> ReplicaStore for HashMap<OwnerId, R> {
    type Replica = R;

    fn replica_mut(&mut self, owner: &OwnerId) -> Option<&mut R> {
        self.get_mut(owner)
    }
}

/// Current/maximum pair with a clamping setter, usable both as a local
/// source and as a replica
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vitality {
    maximum: f32,
    current: f32,
    owner: Option<OwnerId>,
    display_refreshes: u32,
}

impl Vitality {
    pub fn new(maximum: f32, current: f32) -> Self {
        let mut vitality = Self {
            maximum,
            ..Self::default()
        };
        vitality.set_current(current);
        vitality
    }

    pub fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    /// Number of display refreshes requested so far
    pub fn display_refreshes(&self) -> u32 {
        self.display_refreshes
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.maximum, self.current)
    }
}

impl SnapshotSource for Vitality {
    fn vitality(&self) -> Option<(f32, f32)> {
        if self.maximum > 0.0 {
            Some((self.maximum, self.current))
        } else {
            None
        }
    }
}

impl SnapshotReplica for Vitality {
    fn maximum(&self) -> f32 {
        self.maximum
    }

    fn current(&self) -> f32 {
        self.current
    }

    fn set_maximum(&mut self, maximum: f32) {
        self.maximum = maximum;
    }

    fn set_current(&mut self, current: f32) {
        self.current = current.clamp(0.0, self.maximum.max(0.0));
    }

    fn set_current_unclamped(&mut self, current: f32) {
        self.current = current;
    }

    fn bind_owner(&mut self, owner: OwnerId) {
        self.owner = Some(owner);
    }

    fn refresh_display(&mut self) {
        self.display_refreshes += 1;
    }
}
