use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};

use crossbeam::queue::SegQueue;
use log::warn;

use netsync_shared::{
    ChannelIndex, DeliveryGuarantee, Opcode, PeerId, ReceivedPacket, OPCODE_COUNT,
};

use super::{
    buffer_pool::BufferPool, handler_table::HandlerTable, inbound::InboundMessage,
    stats::DispatchCounters, BackgroundHandler, DispatchError, DispatchStats, ExecutionContext,
};

/// State shared between the transport's receive threads, the engine thread
/// and the background worker
pub(crate) struct DispatchShared {
    pub accepting: AtomicBool,
    pub worker_running: AtomicBool,
    pub engine_registered: [AtomicBool; OPCODE_COUNT],
    pub background_handlers: RwLock<HandlerTable<BackgroundHandler>>,
    pub engine_queue: SegQueue<InboundMessage>,
    pub background_queue: SegQueue<InboundMessage>,
    pub pool: Arc<BufferPool>,
    pub counters: DispatchCounters,
}

impl DispatchShared {
    pub fn new(pool: Arc<BufferPool>) -> Self {
        Self {
            accepting: AtomicBool::new(true),
            worker_running: AtomicBool::new(false),
            engine_registered: std::array::from_fn(|_| AtomicBool::new(false)),
            background_handlers: RwLock::new(HandlerTable::new(ExecutionContext::Background)),
            engine_queue: SegQueue::new(),
            background_queue: SegQueue::new(),
            pool,
            counters: DispatchCounters::new(),
        }
    }

    pub fn has_engine_handler(&self, opcode: Opcode) -> bool {
        self.engine_registered[opcode.index()].load(Ordering::Acquire)
    }

    pub fn has_background_handler(&self, opcode: Opcode) -> bool {
        self.background_handlers
            .read()
            .map(|table| table.contains(opcode))
            .unwrap_or(false)
    }

    pub fn stats(&self) -> DispatchStats {
        let mut stats = self.counters.snapshot();
        stats.engine_queue_len = self.engine_queue.len();
        stats.background_queue_len = self.background_queue.len();
        stats.pooled_buffers = self.pool.available();
        stats.buffers_in_use = self.pool.in_use();
        stats
    }

    /// Empties both queues, returning how many messages were dropped
    pub fn discard_queues(&self) -> usize {
        let mut discarded = 0;
        while self.engine_queue.pop().is_some() {
            discarded += 1;
        }
        while self.background_queue.pop().is_some() {
            discarded += 1;
        }
        self.counters.add_discarded(discarded);
        discarded
    }
}

/// Cloneable, thread-safe entry point handed to the transport. Packets may
/// be ingested from any thread.
#[derive(Clone)]
pub struct Ingress {
    shared: Arc<DispatchShared>,
}

impl Ingress {
    pub(crate) fn new(shared: Arc<DispatchShared>) -> Self {
        Self { shared }
    }

    /// Classifies a raw packet by its leading opcode and queues it for the
    /// execution context that will handle it. The payload is copied, so the
    /// caller may reuse `bytes` immediately.
    pub fn ingest(
        &self,
        peer: PeerId,
        bytes: &[u8],
        channel: ChannelIndex,
        delivery: DeliveryGuarantee,
    ) -> Result<ExecutionContext, DispatchError> {
        let shared = &self.shared;
        if !shared.accepting.load(Ordering::SeqCst) {
            shared.counters.record_rejected();
            return Err(DispatchError::ShuttingDown);
        }

        let (opcode, payload) = match Opcode::split_packet(bytes) {
            Ok(split) => split,
            Err(error) => {
                shared.counters.record_malformed();
                warn!("Dropping malformed packet of {} bytes from {}: {}", bytes.len(), peer, error);
                return Err(error.into());
            }
        };
        shared.counters.record_received(opcode);

        let message = InboundMessage::new(peer, opcode, channel, delivery, shared.pool.take(payload));

        let context = if shared.has_engine_handler(opcode) {
            shared.engine_queue.push(message);
            ExecutionContext::EngineThread
        } else if shared.has_background_handler(opcode) {
            shared.background_queue.push(message);
            ExecutionContext::Background
        } else {
            // default handling happens on the engine thread
            shared.engine_queue.push(message);
            ExecutionContext::EngineThread
        };

        // shutdown may have drained the queues between the check and the push
        if !shared.accepting.load(Ordering::SeqCst) {
            shared.discard_queues();
            return Err(DispatchError::ShuttingDown);
        }
        Ok(context)
    }

    pub fn ingest_packet(&self, packet: &ReceivedPacket) -> Result<ExecutionContext, DispatchError> {
        self.ingest(packet.peer, &packet.payload, packet.channel, packet.delivery)
    }

    pub fn is_accepting(&self) -> bool {
        self.shared.accepting.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> DispatchStats {
        self.shared.stats()
    }
}
