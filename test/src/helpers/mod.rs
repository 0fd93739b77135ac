pub mod packet_exchange;
pub mod senders;
pub mod test_replicas;

pub use packet_exchange::{pump, wire_ids};
pub use senders::{FailingSender, RecordingSender, SentPacket};
pub use test_replicas::TestReplicas;
