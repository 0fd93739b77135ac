use netsync_shared::{ChannelIndex, DeliveryGuarantee, Opcode, PeerId};

use super::buffer_pool::PooledBuffer;

/// One ingested packet, opcode split off, payload copied into a pooled
/// buffer. The buffer returns to the pool when the message is dropped.
pub struct InboundMessage {
    peer: PeerId,
    opcode: Opcode,
    channel: ChannelIndex,
    delivery: DeliveryGuarantee,
    payload: PooledBuffer,
}

impl InboundMessage {
    pub(crate) fn new(
        peer: PeerId,
        opcode: Opcode,
        channel: ChannelIndex,
        delivery: DeliveryGuarantee,
        payload: PooledBuffer,
    ) -> Self {
        Self {
            peer,
            opcode,
            channel,
            delivery,
            payload,
        }
    }

    pub fn peer(&self) -> PeerId {
        self.peer
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn channel(&self) -> ChannelIndex {
        self.channel
    }

    pub fn delivery(&self) -> DeliveryGuarantee {
        self.delivery
    }

    /// Payload bytes following the opcode
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
