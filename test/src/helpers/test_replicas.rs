use std::collections::HashMap;

use netsync::{ReplicaStore, SnapshotReplica, Vitality};
use netsync_shared::OwnerId;

/// Replica store whose entities are spawned explicitly by the test
#[derive(Default)]
pub struct TestReplicas {
    replicas: HashMap<OwnerId, Vitality>,
}

impl TestReplicas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, owner: OwnerId) -> &mut Vitality {
        self.replicas.entry(owner).or_default()
    }

    pub fn get(&self, owner: &OwnerId) -> Option<&Vitality> {
        self.replicas.get(owner)
    }

    /// (maximum, current) of the replica, if spawned
    pub fn values(&self, owner: &OwnerId) -> Option<(f32, f32)> {
        self.get(owner)
            .map(|replica| (replica.maximum(), replica.current()))
    }
}

impl ReplicaStore for TestReplicas {
    type Replica = Vitality;

    fn replica_mut(&mut self, owner: &OwnerId) -> Option<&mut Vitality> {
        self.replicas.get_mut(owner)
    }
}
