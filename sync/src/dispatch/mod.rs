//! Thread-safe ingestion of inbound packets and bounded, ordered delivery to
//! either the engine thread or a dedicated background thread.

mod buffer_pool;
mod dispatcher;
mod error;
mod handler_table;
mod inbound;
mod ingress;
mod stats;
mod worker;

pub use buffer_pool::{BufferPool, PooledBuffer};
pub use dispatcher::{BackgroundHandler, Dispatcher, EngineHandler, Handler, ShutdownReport};
pub use error::{DispatchError, HandlerError};
pub use inbound::InboundMessage;
pub use ingress::Ingress;
pub use stats::DispatchStats;

/// Where a handler runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecutionContext {
    /// The single cooperatively scheduled engine thread, drained once per tick
    EngineThread,
    /// The dedicated background worker; no engine state is reachable here
    Background,
}
