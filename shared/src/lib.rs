//! # Netsync Shared
//! Common functionality shared between the netsync dispatcher, router and
//! reconciliation layers: ids, opcodes, wrapping sequence numbers, snapshot
//! types, time, and the transport seam.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub use netsync_serde::{
    ByteReader, ByteWrite, ConstByteLength, Serde, SerdeErr, StreamWriter,
};

mod backends;
mod opcode;
mod snapshot;
mod transport;
mod types;
mod wrapping_number;

pub use backends::{Instant, Timer};
pub use opcode::{Opcode, OpcodeError, OPCODE_COUNT, PROTOCOL_VERSION};
pub use snapshot::{SequencedSnapshot, Snapshot, SnapshotMessage};
pub use transport::{
    error::{RecvError, SendError},
    ConditionedSender, LinkConditionerConfig, LoopbackEndpoint, PacketChannel, PacketSender,
    ReceivedPacket, Target,
};
pub use types::{ChannelIndex, DeliveryGuarantee, MessageKind, OwnerId, PeerId, RouteId};
pub use wrapping_number::{sequence_greater_than, sequence_less_than, wrapping_diff, SequenceNumber};
