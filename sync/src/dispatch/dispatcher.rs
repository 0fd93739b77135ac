use std::sync::{atomic::Ordering, Arc};

use log::{debug, warn};

use netsync_shared::{ChannelIndex, DeliveryGuarantee, Opcode, PeerId};

use super::{
    buffer_pool::BufferPool,
    handler_table::HandlerTable,
    inbound::InboundMessage,
    ingress::{DispatchShared, Ingress},
    worker::{process_background_batch, BackgroundWorker},
    DispatchError, DispatchStats, ExecutionContext, HandlerError,
};
use crate::{config::DispatcherConfig, isolation::run_isolated};

/// Engine-thread handler. Receives the engine-side context `C` mutably.
pub type EngineHandler<C> = Box<dyn FnMut(&mut C, &InboundMessage) -> Result<(), HandlerError>>;

/// Background handler. Gets no engine state, so it can only do pure
/// computation or non-engine I/O.
pub type BackgroundHandler =
    Arc<dyn Fn(&InboundMessage) -> Result<(), HandlerError> + Send + Sync>;

/// A handler together with the execution context it runs in
pub enum Handler<C> {
    Engine(EngineHandler<C>),
    Background(BackgroundHandler),
}

impl<C> Handler<C> {
    pub fn engine<F>(handler: F) -> Self
    where
        F: FnMut(&mut C, &InboundMessage) -> Result<(), HandlerError> + 'static,
    {
        Handler::Engine(Box::new(handler))
    }

    pub fn background<F>(handler: F) -> Self
    where
        F: Fn(&InboundMessage) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Handler::Background(Arc::new(handler))
    }

    pub fn context(&self) -> ExecutionContext {
        match self {
            Handler::Engine(_) => ExecutionContext::EngineThread,
            Handler::Background(_) => ExecutionContext::Background,
        }
    }
}

/// Outcome of [`Dispatcher::shutdown`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Messages still queued that were dropped
    pub discarded: usize,
    /// Whether the background worker exited within the join timeout (true
    /// when no worker was running)
    pub worker_joined: bool,
}

/// Owns the engine-thread side of dispatch: engine handlers, the default
/// handler and the background worker's lifetime. `C` is the engine state
/// handed to engine handlers during [`Dispatcher::drain_engine_thread`].
pub struct Dispatcher<C> {
    config: DispatcherConfig,
    shared: Arc<DispatchShared>,
    engine_handlers: HandlerTable<EngineHandler<C>>,
    default_handler: Option<EngineHandler<C>>,
    worker: Option<BackgroundWorker>,
    shut_down: bool,
}

impl<C> Dispatcher<C> {
    /// Creates a Dispatcher and starts its background worker thread
    pub fn new(config: DispatcherConfig) -> Result<Self, DispatchError> {
        let mut dispatcher = Self::without_worker(config);
        let worker = BackgroundWorker::spawn(
            Arc::clone(&dispatcher.shared),
            dispatcher.config.background_batch_size,
            dispatcher.config.background_idle_sleep,
        )?;
        dispatcher.worker = Some(worker);
        Ok(dispatcher)
    }

    /// Creates a Dispatcher with no background thread. Background messages
    /// are then processed by calling [`Dispatcher::drain_background_batch`].
    pub fn without_worker(config: DispatcherConfig) -> Self {
        let pool = BufferPool::new(config.buffer_pool_capacity, config.max_pooled_buffer_bytes);
        Self {
            config,
            shared: Arc::new(DispatchShared::new(pool)),
            engine_handlers: HandlerTable::new(ExecutionContext::EngineThread),
            default_handler: None,
            worker: None,
            shut_down: false,
        }
    }

    /// Returns a handle the transport can use to ingest packets from any thread
    pub fn ingress(&self) -> Ingress {
        Ingress::new(Arc::clone(&self.shared))
    }

    /// Same as [`Ingress::ingest`]
    pub fn ingest(
        &self,
        peer: PeerId,
        bytes: &[u8],
        channel: ChannelIndex,
        delivery: DeliveryGuarantee,
    ) -> Result<ExecutionContext, DispatchError> {
        self.ingress().ingest(peer, bytes, channel, delivery)
    }

    /// Registers the handler for `opcode` in the handler's context. A second
    /// registration for the same (opcode, context) is rejected and the first
    /// one stays in place.
    pub fn register_handler(&mut self, opcode: Opcode, handler: Handler<C>) -> Result<(), DispatchError> {
        let result = match handler {
            Handler::Engine(handler) => {
                let result = self.engine_handlers.insert(opcode, handler);
                if result.is_ok() {
                    self.shared.engine_registered[opcode.index()].store(true, Ordering::Release);
                }
                result
            }
            Handler::Background(handler) => match self.shared.background_handlers.write() {
                Ok(mut table) => table.insert(opcode, handler),
                Err(poisoned) => poisoned.into_inner().insert(opcode, handler),
            },
        };

        if let Err(error) = &result {
            warn!("Rejected handler registration: {}", error);
        }
        result
    }

    /// Removes the handler for (opcode, context). Returns whether one existed.
    pub fn unregister_handler(&mut self, opcode: Opcode, context: ExecutionContext) -> bool {
        match context {
            ExecutionContext::EngineThread => {
                self.shared.engine_registered[opcode.index()].store(false, Ordering::Release);
                self.engine_handlers.remove(opcode).is_some()
            }
            ExecutionContext::Background => match self.shared.background_handlers.write() {
                Ok(mut table) => table.remove(opcode).is_some(),
                Err(poisoned) => poisoned.into_inner().remove(opcode).is_some(),
            },
        }
    }

    /// Handler for engine-queue messages whose opcode has no engine handler
    pub fn set_default_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut C, &InboundMessage) -> Result<(), HandlerError> + 'static,
    {
        self.default_handler = Some(Box::new(handler));
    }

    pub fn has_handler(&self, opcode: Opcode, context: ExecutionContext) -> bool {
        match context {
            ExecutionContext::EngineThread => self.engine_handlers.contains(opcode),
            ExecutionContext::Background => self.shared.has_background_handler(opcode),
        }
    }

    /// Executes at most `engine_drain_ceiling` queued engine-thread messages
    /// in arrival order. Whatever remains stays queued for the next call.
    pub fn drain_engine_thread(&mut self, context: &mut C) -> usize {
        let ceiling = self.config.engine_drain_ceiling;
        let mut processed = 0;

        while processed < ceiling {
            let Some(message) = self.shared.engine_queue.pop() else {
                break;
            };
            processed += 1;
            self.execute_engine(context, message);
        }

        self.shared.counters.add_engine_processed(processed);
        processed
    }

    fn execute_engine(&mut self, context: &mut C, message: InboundMessage) {
        let opcode = message.opcode();
        let counters = &self.shared.counters;

        let handler = match self.engine_handlers.get_mut(opcode) {
            Some(handler) => handler,
            None => match self.default_handler.as_mut() {
                Some(handler) => {
                    counters.record_defaulted();
                    handler
                }
                None => {
                    counters.record_unhandled();
                    debug!(
                        "No handler for {:?} from {}, dropping {} byte payload",
                        opcode,
                        message.peer(),
                        message.payload().len()
                    );
                    return;
                }
            },
        };

        if let Err(error) = run_isolated(|| handler(context, &message)) {
            counters.record_handler_failure();
            warn!(
                "Engine handler for {:?} from {} failed: {}",
                opcode,
                message.peer(),
                error
            );
        }
    }

    /// Processes one background batch on the calling thread. Intended for
    /// hosts constructed with [`Dispatcher::without_worker`].
    pub fn drain_background_batch(&self) -> usize {
        process_background_batch(&self.shared, self.config.background_batch_size.max(1))
    }

    pub fn engine_queue_len(&self) -> usize {
        self.shared.engine_queue.len()
    }

    pub fn background_queue_len(&self) -> usize {
        self.shared.background_queue.len()
    }

    pub fn stats(&self) -> DispatchStats {
        self.shared.stats()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Stops ingestion, discards both queues, then signals the background
    /// worker and waits for it up to `shutdown_join_timeout`. A worker that
    /// does not exit in time is logged and detached.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.shut_down {
            return ShutdownReport {
                discarded: 0,
                worker_joined: true,
            };
        }
        self.shut_down = true;

        self.shared.accepting.store(false, Ordering::SeqCst);
        let mut discarded = self.shared.discard_queues();

        let worker_joined = match self.worker.take() {
            Some(worker) => worker.stop(&self.shared, self.config.shutdown_join_timeout),
            None => true,
        };

        // the worker may have deferred messages to the engine queue while stopping
        discarded += self.shared.discard_queues();

        if discarded > 0 {
            debug!("Dispatcher shutdown discarded {} queued messages", discarded);
        }

        ShutdownReport {
            discarded,
            worker_joined,
        }
    }
}

impl<C> Drop for Dispatcher<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
