use std::sync::Arc;

use log::info;

use netsync_shared::{
    Instant, MessageKind, Opcode, OwnerId, PacketSender, PeerId, RouteId, SequenceNumber, Snapshot,
    Target, Timer,
};

use crate::{
    config::SyncConfig,
    dispatch::{
        DispatchError, DispatchStats, Dispatcher, ExecutionContext, Handler, HandlerError,
        InboundMessage, Ingress, ShutdownReport,
    },
    error::NetSyncError,
    reconcile::{
        ApplyOutcome, ReconcileError, ReconcileManager, ReconcileStats, SendOutcome,
        SnapshotReplica, SnapshotSource,
    },
    router::{OutgoingMessage, Priority, RoutedInbound, RouterEvent, SubscriptionId},
    session::Session,
};

/// What one call to [`NetSync::tick`] did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Engine-thread messages executed
    pub processed: usize,
    /// Whether the router's poll interval elapsed and it was polled
    pub router_polled: bool,
    /// Pending snapshots discarded for exceeding their TTL
    pub pending_expired: usize,
}

/// The sync context: owns the dispatcher, its background worker and the
/// engine-thread [`Session`]. Create one per game session and call
/// [`NetSync::tick`] once per engine frame.
pub struct NetSync<R: SnapshotReplica + 'static> {
    dispatcher: Dispatcher<Session<R>>,
    session: Session<R>,
    poll_timer: Timer,
}

impl<R: SnapshotReplica + 'static> NetSync<R> {
    /// Creates the context and starts the background worker
    pub fn new(config: SyncConfig, sender: Arc<dyn PacketSender>, now: &Instant) -> Result<Self, NetSyncError> {
        let dispatcher = Dispatcher::new(config.dispatcher.clone())?;
        Self::with_dispatcher(config, dispatcher, sender, now)
    }

    /// Creates the context without a background thread. Background messages
    /// are processed by [`NetSync::drain_background_batch`].
    pub fn without_worker(
        config: SyncConfig,
        sender: Arc<dyn PacketSender>,
        now: &Instant,
    ) -> Result<Self, NetSyncError> {
        let dispatcher = Dispatcher::without_worker(config.dispatcher.clone());
        Self::with_dispatcher(config, dispatcher, sender, now)
    }

    fn with_dispatcher(
        config: SyncConfig,
        mut dispatcher: Dispatcher<Session<R>>,
        sender: Arc<dyn PacketSender>,
        now: &Instant,
    ) -> Result<Self, NetSyncError> {
        dispatcher.register_handler(
            Opcode::Routed,
            Handler::engine(|session: &mut Session<R>, message| session.handle_routed(message)),
        )?;
        dispatcher.register_handler(
            Opcode::RouteAck,
            Handler::engine(|session: &mut Session<R>, message| session.handle_route_ack(message)),
        )?;
        dispatcher.register_handler(
            Opcode::VitalitySnapshot,
            Handler::engine(|session: &mut Session<R>, message| session.handle_snapshot(message)),
        )?;

        let poll_timer = Timer::new(config.router.poll_interval, now);
        let session = Session::new(&config, sender, now);
        info!("NetSync context started");

        Ok(Self {
            dispatcher,
            session,
            poll_timer,
        })
    }

    // Dispatch

    /// Handle for the transport's receive thread(s)
    pub fn ingress(&self) -> Ingress {
        self.dispatcher.ingress()
    }

    pub fn register_handler(
        &mut self,
        opcode: Opcode,
        handler: Handler<Session<R>>,
    ) -> Result<(), DispatchError> {
        self.dispatcher.register_handler(opcode, handler)
    }

    pub fn unregister_handler(&mut self, opcode: Opcode, context: ExecutionContext) -> bool {
        self.dispatcher.unregister_handler(opcode, context)
    }

    pub fn set_default_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&mut Session<R>, &InboundMessage) -> Result<(), HandlerError> + 'static,
    {
        self.dispatcher.set_default_handler(handler);
    }

    /// One engine frame: drains the engine queue up to its ceiling, polls
    /// the router when its interval has elapsed and expires stale pending
    /// snapshots
    pub fn tick(&mut self, now: &Instant) -> TickReport {
        self.session.set_now(now);

        let processed = self.dispatcher.drain_engine_thread(&mut self.session);

        let router_polled = self.poll_timer.ring_and_reset(now);
        if router_polled {
            self.session.poll_router();
        }

        let pending_expired = self.session.expire_pending();

        TickReport {
            processed,
            router_polled,
            pending_expired,
        }
    }

    pub fn drain_background_batch(&self) -> usize {
        self.dispatcher.drain_background_batch()
    }

    // Routing

    pub fn route(
        &mut self,
        message: OutgoingMessage,
        target: Target,
        priority: Priority,
        require_ack: bool,
    ) -> RouteId {
        self.session
            .router_mut()
            .route(message, target, priority, require_ack)
    }

    pub fn broadcast(&mut self, message: OutgoingMessage, priority: Priority, require_ack: bool) -> RouteId {
        self.route(message, Target::Broadcast, priority, require_ack)
    }

    pub fn unicast(
        &mut self,
        peer: PeerId,
        message: OutgoingMessage,
        priority: Priority,
        require_ack: bool,
    ) -> RouteId {
        self.route(message, Target::Peer(peer), priority, require_ack)
    }

    pub fn register_route_handler<F>(&mut self, kind: MessageKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&RoutedInbound) -> Result<(), HandlerError> + 'static,
    {
        self.session.router_mut().register_handler(kind, handler)
    }

    pub fn unregister_route_handler(&mut self, subscription: SubscriptionId) -> bool {
        self.session.router_mut().unregister_handler(subscription)
    }

    pub fn take_router_events(&mut self) -> Vec<RouterEvent> {
        self.session.router_mut().take_events()
    }

    pub fn set_router_event_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&RouterEvent) + 'static,
    {
        self.session.router_mut().set_event_callback(callback);
    }

    pub fn peer_disconnected(&mut self, peer: &PeerId) {
        self.session.router_mut().peer_disconnected(peer);
    }

    // Reconciliation

    pub fn capture_local_snapshot<S: SnapshotSource + ?Sized>(source: &S) -> Snapshot {
        ReconcileManager::capture_local_snapshot(source)
    }

    pub fn send_local_snapshot<S: SnapshotSource + ?Sized>(
        &mut self,
        owner: OwnerId,
        source: &S,
        force: bool,
        now: &Instant,
    ) -> Result<SendOutcome, ReconcileError> {
        self.session.set_now(now);
        self.session.send_local_snapshot(owner, source, force)
    }

    pub fn receive_snapshot(
        &mut self,
        owner: OwnerId,
        snapshot: Snapshot,
        sequence: SequenceNumber,
        force: bool,
    ) -> ApplyOutcome {
        self.session.receive_snapshot(owner, snapshot, sequence, force)
    }

    /// Replaces any replica already spawned for `owner`
    pub fn spawn_replica(&mut self, owner: OwnerId, replica: R) -> bool {
        self.session.spawn_replica(owner, replica)
    }

    pub fn flush_pending(&mut self, owner: OwnerId) -> bool {
        self.session.flush_pending(owner)
    }

    pub fn despawn_replica(&mut self, owner: &OwnerId) -> Option<R> {
        self.session.despawn_replica(owner)
    }

    pub fn replica(&self, owner: &OwnerId) -> Option<&R> {
        self.session.replica(owner)
    }

    // Queries

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<R> {
        &mut self.session
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    pub fn reconcile_stats(&self) -> ReconcileStats {
        self.session.reconcile_stats()
    }

    /// Stops ingestion, discards queued messages and joins the background
    /// worker
    pub fn shutdown(&mut self) -> ShutdownReport {
        let report = self.dispatcher.shutdown();
        info!(
            "NetSync context stopped, {} queued messages discarded",
            report.discarded
        );
        report
    }
}
