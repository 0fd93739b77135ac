use std::sync::atomic::{AtomicU64, Ordering};

use netsync_shared::{Opcode, OPCODE_COUNT};

/// Lock-free counters updated from both execution contexts
pub(crate) struct DispatchCounters {
    received: [AtomicU64; OPCODE_COUNT],
    malformed: AtomicU64,
    rejected: AtomicU64,
    handler_failures: AtomicU64,
    unhandled: AtomicU64,
    defaulted: AtomicU64,
    engine_processed: AtomicU64,
    background_processed: AtomicU64,
    discarded: AtomicU64,
}

impl DispatchCounters {
    pub fn new() -> Self {
        Self {
            received: std::array::from_fn(|_| AtomicU64::new(0)),
            malformed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
            unhandled: AtomicU64::new(0),
            defaulted: AtomicU64::new(0),
            engine_processed: AtomicU64::new(0),
            background_processed: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    pub fn record_received(&self, opcode: Opcode) {
        self.received[opcode.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unhandled(&self) {
        self.unhandled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_defaulted(&self) {
        self.defaulted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_engine_processed(&self, count: usize) {
        self.engine_processed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_background_processed(&self) {
        self.background_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_discarded(&self, count: usize) {
        self.discarded.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            received: std::array::from_fn(|index| self.received[index].load(Ordering::Relaxed)),
            malformed: self.malformed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            unhandled: self.unhandled.load(Ordering::Relaxed),
            defaulted: self.defaulted.load(Ordering::Relaxed),
            engine_processed: self.engine_processed.load(Ordering::Relaxed),
            background_processed: self.background_processed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            engine_queue_len: 0,
            background_queue_len: 0,
            pooled_buffers: 0,
            buffers_in_use: 0,
        }
    }
}

/// Point-in-time view of dispatcher activity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchStats {
    /// Well-formed packets received, indexed by opcode
    pub received: [u64; OPCODE_COUNT],
    /// Empty packets or unknown opcode bytes
    pub malformed: u64,
    /// Packets refused after shutdown began
    pub rejected: u64,
    /// Handler errors and panics, both contexts
    pub handler_failures: u64,
    /// Engine messages with neither a handler nor a default handler
    pub unhandled: u64,
    /// Engine messages given to the default handler
    pub defaulted: u64,
    pub engine_processed: u64,
    pub background_processed: u64,
    /// Messages dropped from the queues by shutdown
    pub discarded: u64,
    pub engine_queue_len: usize,
    pub background_queue_len: usize,
    pub pooled_buffers: usize,
    pub buffers_in_use: usize,
}

impl DispatchStats {
    pub fn received_for(&self, opcode: Opcode) -> u64 {
        self.received[opcode.index()]
    }

    pub fn total_received(&self) -> u64 {
        self.received.iter().sum()
    }
}
