use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

use super::{
    error::{RecvError, SendError},
    PacketSender, Target,
};
use crate::{ChannelIndex, DeliveryGuarantee, PeerId};

/// A packet as handed to the dispatcher's ingest call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedPacket {
    pub peer: PeerId,
    pub payload: Box<[u8]>,
    pub channel: ChannelIndex,
    pub delivery: DeliveryGuarantee,
}

/// In-process link between two peers, for local play and tests
pub struct PacketChannel;

impl PacketChannel {
    /// Creates two connected endpoints. Anything `a` sends to `b` (or
    /// broadcasts) is received by `b`, and vice versa.
    pub fn pair(a: PeerId, b: PeerId) -> (LoopbackEndpoint, LoopbackEndpoint) {
        let (a_sender, a_receiver) = channel::unbounded();
        let (b_sender, b_receiver) = channel::unbounded();
        let endpoint_a = LoopbackEndpoint {
            local: a,
            remote: b,
            outgoing: b_sender,
            incoming: a_receiver,
        };
        let endpoint_b = LoopbackEndpoint {
            local: b,
            remote: a,
            outgoing: a_sender,
            incoming: b_receiver,
        };
        (endpoint_a, endpoint_b)
    }
}

pub struct LoopbackEndpoint {
    local: PeerId,
    remote: PeerId,
    outgoing: Sender<ReceivedPacket>,
    incoming: Receiver<ReceivedPacket>,
}

impl LoopbackEndpoint {
    pub fn local_peer(&self) -> PeerId {
        self.local
    }

    pub fn remote_peer(&self) -> PeerId {
        self.remote
    }

    /// Receives a packet sent by the remote endpoint, if one is waiting
    pub fn receive(&self) -> Result<Option<ReceivedPacket>, RecvError> {
        match self.incoming.try_recv() {
            Ok(packet) => Ok(Some(packet)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(RecvError::ChannelClosed),
        }
    }
}

impl PacketSender for LoopbackEndpoint {
    fn send(
        &self,
        target: &Target,
        payload: &[u8],
        delivery: DeliveryGuarantee,
    ) -> Result<(), SendError> {
        if let Target::Peer(peer) = target {
            if *peer != self.remote {
                return Err(SendError::PeerNotConnected { peer: *peer });
            }
        }
        self.outgoing
            .send(ReceivedPacket {
                peer: self.local,
                payload: payload.into(),
                channel: 0,
                delivery,
            })
            .map_err(|_| SendError::ChannelClosed)
    }
}
