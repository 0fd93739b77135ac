use thiserror::Error;

use netsync_shared::{RouteId, SendError, SerdeErr};

/// Why a single delivery attempt of a routed message failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteFailure {
    #[error("send failed: {0}")]
    Send(#[from] SendError),

    #[error("payload of {length} bytes exceeds router limit of {limit} bytes")]
    PayloadTooLarge { length: usize, limit: usize },

    #[error("no ack received before the deadline")]
    AckTimeout,
}

/// Errors surfaced by the router
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Terminal: the message was dropped after its final retry
    #[error("{id} dropped after {attempts} failed attempts, last failure: {last_failure}")]
    RetryLimitExceeded {
        id: RouteId,
        attempts: u16,
        last_failure: RouteFailure,
    },

    /// Inbound envelope could not be decoded
    #[error("Malformed routed envelope: {0}")]
    Malformed(#[from] SerdeErr),
}
