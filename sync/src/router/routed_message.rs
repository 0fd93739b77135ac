use netsync_shared::{MessageKind, RouteId, Target};

use super::Priority;

/// Application message handed to the router. The payload encoding belongs to
/// whoever registered handlers for `kind`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

impl OutgoingMessage {
    pub fn new(kind: MessageKind, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }
}

/// An outbound message under router control
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutedMessage {
    pub id: RouteId,
    pub target: Target,
    pub priority: Priority,
    pub require_ack: bool,
    /// Failed attempts so far
    pub retry_count: u16,
    pub message: OutgoingMessage,
}
