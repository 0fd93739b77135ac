use thiserror::Error;

use netsync_shared::{Opcode, OpcodeError, SerdeErr};

use super::ExecutionContext;

/// Errors that can occur while registering handlers or ingesting packets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A handler already exists for this (opcode, context) pair
    #[error("Handler already registered for {opcode:?} on {context:?}. The first registration remains authoritative")]
    DuplicateHandler {
        opcode: Opcode,
        context: ExecutionContext,
    },

    /// Packet was empty or carried an unknown opcode
    #[error("Malformed packet: {0}")]
    Malformed(#[from] OpcodeError),

    /// Ingestion has been stopped by shutdown
    #[error("Dispatcher is shutting down and no longer accepts packets")]
    ShuttingDown,

    /// The background worker thread could not be started
    #[error("Failed to spawn background worker: {reason}")]
    WorkerSpawn { reason: String },
}

/// Failure reported by (or captured around) a single handler invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Payload could not be decoded
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] SerdeErr),

    /// Handler rejected the message
    #[error("Handler failed: {reason}")]
    Failed { reason: String },

    /// Handler panicked; the panic was contained
    #[error("Handler panicked: {message}")]
    Panicked { message: String },
}

impl HandlerError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
