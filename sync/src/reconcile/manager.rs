use std::collections::HashMap;

use log::{debug, trace, warn};

use netsync_shared::{
    ByteReader, Instant, OwnerId, PacketSender, SequenceNumber, SequencedSnapshot, Serde,
    Opcode, Snapshot, SnapshotMessage, StreamWriter, Target,
};

use super::{
    pending::{PendingSnapshot, PendingStore},
    ReconcileError, ReconcileStats, ReplicaStore, SnapshotReplica, SnapshotSource,
};
use crate::config::ReconcileConfig;

/// Result of [`ReconcileManager::send_local_snapshot`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(SequenceNumber),
    /// Inside the cooldown of the previous unforced send
    RateLimited,
    /// The source had no value to capture, nothing was sent
    Invalid,
}

/// Result of [`ReconcileManager::receive_snapshot`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Applied to the live replica
    Applied,
    /// No replica yet, held as the owner's pending snapshot
    Pending { replaced: bool },
    /// Not newer than the last accepted sequence
    Stale,
    /// Invalid values, kept aside and never applied
    Quarantined,
}

#[derive(Default)]
struct OwnerRecord {
    last_sequence: Option<SequenceNumber>,
    cached_maximum: f32,
    applied_once: bool,
}

/// Applies sequenced authoritative snapshots to local replicas and sends
/// rate-limited snapshots of locally owned entities
pub struct ReconcileManager {
    config: ReconcileConfig,
    owners: HashMap<OwnerId, OwnerRecord>,
    pending: PendingStore,
    quarantine: HashMap<OwnerId, SequencedSnapshot>,
    outgoing_sequences: HashMap<OwnerId, SequenceNumber>,
    last_sent: HashMap<OwnerId, Instant>,
    stats: ReconcileStats,
}

impl ReconcileManager {
    pub fn new(config: ReconcileConfig) -> Self {
        let pending = PendingStore::new(config.pending_ttl);
        Self {
            config,
            owners: HashMap::new(),
            pending,
            quarantine: HashMap::new(),
            outgoing_sequences: HashMap::new(),
            last_sent: HashMap::new(),
            stats: ReconcileStats::default(),
        }
    }

    // Sending

    /// Reads the live pair from `source`. Returns an invalid snapshot when
    /// the source has nothing to offer.
    pub fn capture_local_snapshot<S: SnapshotSource + ?Sized>(source: &S) -> Snapshot {
        match source.vitality() {
            Some((maximum, current)) => Snapshot::new(maximum, current),
            None => Snapshot::invalid(),
        }
    }

    /// Captures and broadcasts a snapshot of `owner`. Unforced sends are
    /// limited to one per cooldown.
    pub fn send_local_snapshot<S: SnapshotSource + ?Sized>(
        &mut self,
        owner: OwnerId,
        source: &S,
        force: bool,
        now: &Instant,
        sender: &dyn PacketSender,
    ) -> Result<SendOutcome, ReconcileError> {
        if !force {
            if let Some(last_sent) = self.last_sent.get(&owner) {
                if last_sent.elapsed(now) < self.config.snapshot_cooldown {
                    self.stats.rate_limited += 1;
                    return Ok(SendOutcome::RateLimited);
                }
            }
        }

        let snapshot = Self::capture_local_snapshot(source);
        if !snapshot.is_valid() {
            debug!("No vitality to send for {}", owner);
            return Ok(SendOutcome::Invalid);
        }

        let sequence = self
            .outgoing_sequences
            .entry(owner)
            .or_insert(SequenceNumber::ZERO)
            .increment();

        let message = SnapshotMessage {
            owner,
            sequence,
            force,
            snapshot,
        };
        let mut writer = StreamWriter::new();
        Opcode::VitalitySnapshot.to_byte().ser(&mut writer);
        message.ser(&mut writer);

        sender.send(&Target::Broadcast, writer.as_slice(), self.config.delivery)?;

        self.last_sent.insert(owner, *now);
        self.stats.sent += 1;
        Ok(SendOutcome::Sent(sequence))
    }

    // Receiving

    /// Decodes an `Opcode::VitalitySnapshot` payload and receives it
    pub fn receive_message<S: ReplicaStore>(
        &mut self,
        payload: &[u8],
        now: &Instant,
        replicas: &mut S,
    ) -> Result<ApplyOutcome, ReconcileError> {
        let mut reader = ByteReader::new(payload);
        let message = SnapshotMessage::de(&mut reader)?;
        Ok(self.receive_snapshot(
            message.owner,
            message.snapshot,
            message.sequence,
            message.force,
            now,
            replicas,
        ))
    }

    pub fn receive_snapshot<S: ReplicaStore>(
        &mut self,
        owner: OwnerId,
        snapshot: Snapshot,
        sequence: SequenceNumber,
        force: bool,
        now: &Instant,
        replicas: &mut S,
    ) -> ApplyOutcome {
        let sequenced = SequencedSnapshot::new(owner, sequence, snapshot);

        if !snapshot.is_valid() {
            warn!(
                "Quarantined invalid snapshot for {} at {} (maximum {})",
                owner, sequence, snapshot.maximum
            );
            self.stats.quarantined += 1;
            self.quarantine.insert(owner, sequenced);
            return ApplyOutcome::Quarantined;
        }

        let record = self.owners.entry(owner).or_default();
        let last_sequence = record.last_sequence;
        match last_sequence {
            Some(last) if !force && !sequence.is_newer_than(&last) => {
                trace!("Dropping stale snapshot {} for {} (last {})", sequence, owner, last);
                self.stats.stale_dropped += 1;
                return ApplyOutcome::Stale;
            }
            Some(last) if force => record.last_sequence = Some(last.newest(sequence)),
            _ => record.last_sequence = Some(sequence),
        }

        match replicas.replica_mut(&owner) {
            Some(replica) => {
                // a pending entry is older than what was just accepted
                self.pending.take(&owner);
                Self::apply(record, owner, &snapshot, force, replica);
                self.stats.applied += 1;
                ApplyOutcome::Applied
            }
            None => {
                let replaced = self.pending.replace(PendingSnapshot {
                    snapshot: sequenced,
                    force,
                    received_at: *now,
                });
                if replaced {
                    self.stats.pending_replaced += 1;
                } else {
                    self.stats.pending_stored += 1;
                }
                ApplyOutcome::Pending { replaced }
            }
        }
    }

    /// Applies the pending snapshot for `owner` to its newly created
    /// replica and clears it. Returns whether anything was applied.
    pub fn flush_pending<R: SnapshotReplica + ?Sized>(&mut self, owner: OwnerId, replica: &mut R) -> bool {
        let Some(pending) = self.pending.take(&owner) else {
            return false;
        };

        let record = self.owners.entry(owner).or_default();
        Self::apply(record, owner, &pending.snapshot.snapshot, pending.force, replica);
        self.stats.pending_flushed += 1;
        self.stats.applied += 1;
        true
    }

    fn apply<R: SnapshotReplica + ?Sized>(
        record: &mut OwnerRecord,
        owner: OwnerId,
        snapshot: &Snapshot,
        force: bool,
        replica: &mut R,
    ) {
        replica.bind_owner(owner);

        // unforced writes never shrink the maximum the replica already shows
        let maximum = if force {
            snapshot.maximum
        } else {
            snapshot.maximum.max(record.cached_maximum).max(replica.maximum())
        };
        record.cached_maximum = maximum;

        let changed = replica.maximum() != maximum || replica.current() != snapshot.current;

        replica.set_maximum(maximum);
        if snapshot.current > replica.maximum() {
            replica.set_current_unclamped(snapshot.current);
        } else {
            replica.set_current(snapshot.current);
        }

        if !record.applied_once || changed {
            replica.refresh_display();
        }
        record.applied_once = true;
    }

    // Housekeeping

    /// Discards pending snapshots older than the configured TTL
    pub fn expire_pending(&mut self, now: &Instant) -> usize {
        let expired = self.pending.expire(now);
        if expired > 0 {
            debug!("Expired {} pending snapshots", expired);
            self.stats.pending_expired += expired as u64;
        }
        expired
    }

    /// Drops all state kept for `owner`, e.g. when its entity despawns
    pub fn forget_owner(&mut self, owner: &OwnerId) {
        self.owners.remove(owner);
        self.pending.take(owner);
        self.quarantine.remove(owner);
        self.outgoing_sequences.remove(owner);
        self.last_sent.remove(owner);
    }

    // Queries

    pub fn last_sequence(&self, owner: &OwnerId) -> Option<SequenceNumber> {
        self.owners.get(owner).and_then(|record| record.last_sequence)
    }

    pub fn pending(&self, owner: &OwnerId) -> Option<&PendingSnapshot> {
        self.pending.get(owner)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Latest invalid snapshot received for `owner`
    pub fn quarantined(&self, owner: &OwnerId) -> Option<&SequencedSnapshot> {
        self.quarantine.get(owner)
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }
}
