use std::{collections::HashMap, sync::Arc};

use log::debug;

use netsync_shared::{Instant, OwnerId, PacketSender, SequenceNumber, Snapshot};

use crate::{
    config::SyncConfig,
    dispatch::{HandlerError, InboundMessage},
    reconcile::{
        ApplyOutcome, ReconcileError, ReconcileManager, ReconcileStats, SendOutcome,
        SnapshotReplica, SnapshotSource,
    },
    router::Router,
};

/// Engine-thread state. Engine handlers receive it mutably while the
/// dispatcher drains, so they can route messages and reconcile snapshots.
pub struct Session<R: SnapshotReplica> {
    router: Router,
    reconcile: ReconcileManager,
    replicas: HashMap<OwnerId, R>,
    sender: Arc<dyn PacketSender>,
    now: Instant,
}

impl<R: SnapshotReplica> Session<R> {
    pub fn new(config: &SyncConfig, sender: Arc<dyn PacketSender>, now: &Instant) -> Self {
        Self {
            router: Router::new(config.router.clone()),
            reconcile: ReconcileManager::new(config.reconcile.clone()),
            replicas: HashMap::new(),
            sender,
            now: *now,
        }
    }

    /// Time of the tick currently being processed
    pub fn now(&self) -> Instant {
        self.now
    }

    pub(crate) fn set_now(&mut self, now: &Instant) {
        self.now = *now;
    }

    pub fn sender(&self) -> &dyn PacketSender {
        self.sender.as_ref()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Runs the ack-timeout sweep and the retry drain
    pub fn poll_router(&mut self) {
        self.router.poll(&self.now, self.sender.as_ref());
    }

    // Built-in engine handlers

    pub(crate) fn handle_routed(&mut self, message: &InboundMessage) -> Result<(), HandlerError> {
        self.router
            .receive(message.peer(), message.payload(), self.sender.as_ref())
            .map_err(|error| HandlerError::failed(error.to_string()))?;
        Ok(())
    }

    pub(crate) fn handle_route_ack(&mut self, message: &InboundMessage) -> Result<(), HandlerError> {
        self.router
            .receive_ack(message.peer(), message.payload())
            .map_err(|error| HandlerError::failed(error.to_string()))?;
        Ok(())
    }

    pub(crate) fn handle_snapshot(&mut self, message: &InboundMessage) -> Result<(), HandlerError> {
        self.reconcile
            .receive_message(message.payload(), &self.now, &mut self.replicas)
            .map_err(|error| HandlerError::failed(error.to_string()))?;
        Ok(())
    }

    // Reconciliation

    pub fn send_local_snapshot<S: SnapshotSource + ?Sized>(
        &mut self,
        owner: OwnerId,
        source: &S,
        force: bool,
    ) -> Result<SendOutcome, ReconcileError> {
        self.reconcile
            .send_local_snapshot(owner, source, force, &self.now, self.sender.as_ref())
    }

    pub fn receive_snapshot(
        &mut self,
        owner: OwnerId,
        snapshot: Snapshot,
        sequence: SequenceNumber,
        force: bool,
    ) -> ApplyOutcome {
        self.reconcile
            .receive_snapshot(owner, snapshot, sequence, force, &self.now, &mut self.replicas)
    }

    /// Adds the replica for `owner` and applies its pending snapshot, if
    /// any. A replica already spawned for `owner` is replaced and dropped.
    /// Returns whether a pending snapshot was applied.
    pub fn spawn_replica(&mut self, owner: OwnerId, replica: R) -> bool {
        if self.replicas.contains_key(&owner) {
            debug!("Replacing existing replica of {}", owner);
        }
        self.replicas.insert(owner, replica);
        match self.replicas.get_mut(&owner) {
            Some(replica) => self.reconcile.flush_pending(owner, replica),
            None => false,
        }
    }

    /// Applies the pending snapshot of an existing replica
    pub fn flush_pending(&mut self, owner: OwnerId) -> bool {
        match self.replicas.get_mut(&owner) {
            Some(replica) => self.reconcile.flush_pending(owner, replica),
            None => false,
        }
    }

    /// Removes the replica and every piece of reconcile state for `owner`
    pub fn despawn_replica(&mut self, owner: &OwnerId) -> Option<R> {
        self.reconcile.forget_owner(owner);
        self.replicas.remove(owner)
    }

    pub fn replica(&self, owner: &OwnerId) -> Option<&R> {
        self.replicas.get(owner)
    }

    pub fn replica_mut(&mut self, owner: &OwnerId) -> Option<&mut R> {
        self.replicas.get_mut(owner)
    }

    pub fn replicas(&self) -> &HashMap<OwnerId, R> {
        &self.replicas
    }

    pub fn reconcile(&self) -> &ReconcileManager {
        &self.reconcile
    }

    pub(crate) fn expire_pending(&mut self) -> usize {
        self.reconcile.expire_pending(&self.now)
    }

    pub fn reconcile_stats(&self) -> ReconcileStats {
        self.reconcile.stats()
    }
}
