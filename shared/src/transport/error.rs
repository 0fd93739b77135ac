use thiserror::Error;

use crate::PeerId;

/// Errors a transport may report for a single outbound send
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The target peer is not connected
    #[error("Peer {peer} is not connected")]
    PeerNotConnected { peer: PeerId },

    /// The underlying link has been closed
    #[error("Transport channel closed. The remote endpoint has been dropped")]
    ChannelClosed,

    /// The packet was lost by the link (simulated or detected locally)
    #[error("Packet of {length} bytes was dropped by the link")]
    Dropped { length: usize },

    /// Payload exceeds what the transport accepts in one send
    #[error("Payload of {length} bytes exceeds transport limit of {limit} bytes")]
    PayloadTooLarge { length: usize, limit: usize },
}

/// Errors a transport may report while polling for inbound packets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecvError {
    #[error("Transport channel closed. The remote endpoint has been dropped")]
    ChannelClosed,
}
