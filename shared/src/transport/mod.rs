mod channel;
mod conditioner;
pub mod error;

pub use channel::{LoopbackEndpoint, PacketChannel, ReceivedPacket};
pub use conditioner::{ConditionedSender, LinkConditionerConfig};

use crate::{DeliveryGuarantee, PeerId};
use error::SendError;

/// Destination of an outbound send
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Peer(PeerId),
    Broadcast,
}

/// Outbound half of the transport seam. Implemented by the game's actual
/// networking layer (Steam relay, direct UDP, ...), and by the loopback and
/// conditioned senders in this module.
pub trait PacketSender: Send + Sync {
    /// Sends a fully framed packet (leading opcode byte included)
    fn send(
        &self,
        target: &Target,
        payload: &[u8],
        delivery: DeliveryGuarantee,
    ) -> Result<(), SendError>;
}

impl<S: PacketSender + ?Sized> PacketSender for std::sync::Arc<S> {
    fn send(
        &self,
        target: &Target,
        payload: &[u8],
        delivery: DeliveryGuarantee,
    ) -> Result<(), SendError> {
        self.as_ref().send(target, payload, delivery)
    }
}

impl<S: PacketSender + ?Sized> PacketSender for Box<S> {
    fn send(
        &self,
        target: &Target,
        payload: &[u8],
        delivery: DeliveryGuarantee,
    ) -> Result<(), SendError> {
        self.as_ref().send(target, payload, delivery)
    }
}
