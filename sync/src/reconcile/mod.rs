//! Sequence-numbered application of authoritative vitality snapshots, with
//! staleness rejection, quarantine of invalid values and a single pending
//! slot per owner for replicas that do not exist yet.

mod error;
mod manager;
mod pending;
mod replica;
mod stats;

pub use error::ReconcileError;
pub use manager::{ApplyOutcome, ReconcileManager, SendOutcome};
pub use pending::PendingSnapshot;
pub use replica::{ReplicaStore, SnapshotReplica, SnapshotSource, Vitality};
pub use stats::ReconcileStats;
