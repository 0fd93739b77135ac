//! Prioritized, optionally acknowledged outbound delivery with bounded
//! retry, and per-kind fan-out of inbound routed messages.

mod envelope;
mod error;
mod events;
mod outgoing_queue;
mod pending_ack;
mod priority;
mod received_routes;
mod registry;
mod routed_message;
mod router;

pub use envelope::{RouteAck, RoutedEnvelope};
pub use error::{RouteFailure, RouterError};
pub use events::RouterEvent;
pub use pending_ack::PendingAck;
pub use priority::Priority;
pub use registry::{RouteHandler, RoutedInbound, SubscriptionId};
pub use routed_message::{OutgoingMessage, RoutedMessage};
pub use router::{ReceiveOutcome, Router};
