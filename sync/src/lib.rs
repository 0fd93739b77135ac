//! # Netsync
//! Network synchronization core for cooperative multiplayer. Inbound packets
//! are dispatched by opcode to the engine thread or a background worker,
//! outbound application messages are routed by priority with optional
//! acknowledgement and bounded retry, and authoritative vitality snapshots
//! are reconciled against local replicas by sequence number.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use netsync_shared::{
        ByteReader, ByteWrite, ConditionedSender, DeliveryGuarantee, Instant,
        LinkConditionerConfig, LoopbackEndpoint, MessageKind, Opcode, OwnerId, PacketChannel,
        PacketSender, PeerId, ReceivedPacket, RouteId, SendError, SequenceNumber, Serde,
        SerdeErr, Snapshot, StreamWriter, Target, PROTOCOL_VERSION,
    };
}

mod config;
mod error;
mod isolation;
mod net_sync;
mod session;

pub mod dispatch;
pub mod reconcile;
pub mod router;

pub use config::{DispatcherConfig, ReconcileConfig, RouterConfig, SyncConfig};
pub use dispatch::{
    DispatchError, DispatchStats, Dispatcher, ExecutionContext, Handler, HandlerError,
    InboundMessage, Ingress, ShutdownReport,
};
pub use error::NetSyncError;
pub use net_sync::{NetSync, TickReport};
pub use reconcile::{
    ApplyOutcome, ReconcileManager, ReconcileStats, ReplicaStore, SendOutcome, SnapshotReplica,
    SnapshotSource, Vitality,
};
pub use router::{
    OutgoingMessage, Priority, RoutedInbound, Router, RouterError, RouterEvent, SubscriptionId,
};
pub use session::Session;
