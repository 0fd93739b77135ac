use std::{default::Default, time::Duration};

use netsync_shared::DeliveryGuarantee;

/// Contains Config properties which will be used by a NetSync context
#[derive(Clone, Debug, Default)]
pub struct SyncConfig {
    /// Used to configure inbound message dispatch
    pub dispatcher: DispatcherConfig,
    /// Used to configure prioritized, acknowledged outbound routing
    pub router: RouterConfig,
    /// Used to configure snapshot reconciliation
    pub reconcile: ReconcileConfig,
}

#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Maximum number of engine-thread messages executed per tick
    pub engine_drain_ceiling: usize,
    /// Number of messages the background worker takes per batch
    pub background_batch_size: usize,
    /// How long the background worker sleeps when its queue is empty
    pub background_idle_sleep: Duration,
    /// How long shutdown waits for the background worker to exit
    pub shutdown_join_timeout: Duration,
    /// Number of payload buffers kept for reuse
    pub buffer_pool_capacity: usize,
    /// Buffers grown beyond this are not returned to the pool
    pub max_pooled_buffer_bytes: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            engine_drain_ceiling: 300,
            background_batch_size: 64,
            background_idle_sleep: Duration::from_millis(1),
            shutdown_join_timeout: Duration::from_secs(2),
            buffer_pool_capacity: 128,
            max_pooled_buffer_bytes: 64 * 1024,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Retries allowed after the first attempt before a message is dropped
    pub max_retries: u8,
    /// Time an ack-required send waits for its ack before being retried
    pub ack_timeout: Duration,
    /// Interval of the retry drain & ack-timeout sweep
    pub poll_interval: Duration,
    /// Maximum number of queued messages sent per poll
    pub max_sends_per_poll: usize,
    /// Largest application payload accepted in one envelope
    pub max_payload_bytes: usize,
    /// Delivery guarantee requested for routed envelopes and acks
    pub delivery: DeliveryGuarantee,
    /// Number of recently received route ids remembered per peer
    pub dedupe_window: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            ack_timeout: Duration::from_millis(1500),
            poll_interval: Duration::from_millis(50),
            max_sends_per_poll: 64,
            max_payload_bytes: 16 * 1024,
            delivery: DeliveryGuarantee::ReliableOrdered,
            dedupe_window: 256,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    /// Minimum time between two unforced snapshot sends for one owner
    pub snapshot_cooldown: Duration,
    /// Pending snapshots older than this are discarded
    pub pending_ttl: Duration,
    /// Delivery guarantee requested for snapshot packets
    pub delivery: DeliveryGuarantee,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            snapshot_cooldown: Duration::from_millis(250),
            pending_ttl: Duration::from_secs(60),
            delivery: DeliveryGuarantee::ReliableOrdered,
        }
    }
}
