use netsync_shared::{PeerId, RouteId};

use super::RouterError;

/// Observable outcome of a routed message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouterEvent {
    /// A message that did not require an ack was handed to the transport
    Sent { id: RouteId },
    /// An ack-required message was acknowledged
    Delivered { id: RouteId, peer: PeerId },
    /// The message was dropped after exhausting its retries. Fired once.
    Failed { id: RouteId, error: RouterError },
}

impl RouterEvent {
    pub fn id(&self) -> RouteId {
        match self {
            RouterEvent::Sent { id }
            | RouterEvent::Delivered { id, .. }
            | RouterEvent::Failed { id, .. } => *id,
        }
    }
}
