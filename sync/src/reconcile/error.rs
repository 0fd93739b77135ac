use thiserror::Error;

use netsync_shared::{SendError, SerdeErr};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    /// The transport refused the snapshot packet
    #[error("Failed to send snapshot: {0}")]
    Send(#[from] SendError),

    /// An inbound snapshot packet could not be decoded
    #[error("Malformed snapshot packet: {0}")]
    Malformed(#[from] SerdeErr),
}
