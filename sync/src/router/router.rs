use log::{debug, trace, warn};

use netsync_shared::{
    ByteReader, Instant, MessageKind, PacketSender, PeerId, RouteId, Serde, Target,
};

use super::{
    envelope::{RouteAck, RoutedEnvelope},
    outgoing_queue::OutgoingQueue,
    pending_ack::{PendingAck, PendingAcks},
    received_routes::ReceivedRoutes,
    registry::{HandlerRegistry, RoutedInbound, SubscriptionId},
    OutgoingMessage, Priority, RouteFailure, RoutedMessage, RouterError, RouterEvent,
};
use crate::{config::RouterConfig, dispatch::HandlerError, isolation::run_isolated};

/// Result of handing an inbound envelope to the router
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Fanned out to `handlers` subscribers, `failures` of which failed
    Dispatched { handlers: usize, failures: usize },
    /// Already delivered earlier (the ack was re-sent if requested)
    Duplicate,
}

/// Prioritized, optionally acknowledged delivery of application messages.
/// Lives on the engine thread and is driven by fixed-interval polling.
pub struct Router {
    config: RouterConfig,
    queue: OutgoingQueue,
    pending_acks: PendingAcks,
    registry: HandlerRegistry,
    received: ReceivedRoutes,
    events: Vec<RouterEvent>,
    event_callback: Option<Box<dyn FnMut(&RouterEvent)>>,
    next_id: u32,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        let received = ReceivedRoutes::new(config.dedupe_window);
        Self {
            config,
            queue: OutgoingQueue::new(),
            pending_acks: PendingAcks::new(),
            registry: HandlerRegistry::new(),
            received,
            events: Vec::new(),
            event_callback: None,
            next_id: 1,
        }
    }

    // Outgoing

    /// Queues `message` for delivery to `target`. Nothing is sent until the
    /// next [`Router::send_messages`].
    pub fn route(
        &mut self,
        message: OutgoingMessage,
        target: Target,
        priority: Priority,
        require_ack: bool,
    ) -> RouteId {
        let id = RouteId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);

        self.queue.push(RoutedMessage {
            id,
            target,
            priority,
            require_ack,
            retry_count: 0,
            message,
        });
        id
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

    /// Ack-timeout sweep followed by a queue drain
    pub fn poll(&mut self, now: &Instant, sender: &dyn PacketSender) {
        self.check_ack_timeouts(now);
        self.send_messages(now, sender);
    }

    /// Sends up to `max_sends_per_poll` queued messages, highest priority
    /// first. Failed sends are re-queued once the drain is over, so a message
    /// is attempted at most once per call. Returns the number of attempts.
    pub fn send_messages(&mut self, now: &Instant, sender: &dyn PacketSender) -> usize {
        let mut attempts = 0;
        let mut failed = Vec::new();

        while attempts < self.config.max_sends_per_poll {
            let Some(routed) = self.queue.pop() else {
                break;
            };
            attempts += 1;

            match self.try_send(&routed, sender) {
                Ok(()) => {
                    if routed.require_ack {
                        self.pending_acks.insert(PendingAck {
                            sent_at: *now,
                            deadline: now.plus(self.config.ack_timeout),
                            routed,
                        });
                    } else {
                        self.push_event(RouterEvent::Sent { id: routed.id });
                    }
                }
                Err(failure) => failed.push((routed, failure)),
            }
        }

        for (routed, failure) in failed {
            self.fail(routed, failure);
        }
        attempts
    }

    fn try_send(&self, routed: &RoutedMessage, sender: &dyn PacketSender) -> Result<(), RouteFailure> {
        let length = routed.message.payload.len();
        if length > self.config.max_payload_bytes {
            return Err(RouteFailure::PayloadTooLarge {
                length,
                limit: self.config.max_payload_bytes,
            });
        }

        let packet = RoutedEnvelope {
            id: routed.id,
            require_ack: routed.require_ack,
            kind: routed.message.kind,
            payload: routed.message.payload.clone(),
        }
        .to_packet();

        sender.send(&routed.target, &packet, self.config.delivery)?;
        Ok(())
    }

    /// Treats every ack expectation past its deadline as a failed send.
    /// Returns the number of expired acks.
    pub fn check_ack_timeouts(&mut self, now: &Instant) -> usize {
        let expired = self.pending_acks.take_expired(now);
        let count = expired.len();
        for pending_ack in expired {
            debug!(
                "{} not acked within {:?}",
                pending_ack.routed.id,
                pending_ack.sent_at.elapsed(now)
            );
            self.fail(pending_ack.routed, RouteFailure::AckTimeout);
        }
        count
    }

    // bounded retry with priority escalation
    fn fail(&mut self, mut routed: RoutedMessage, failure: RouteFailure) {
        routed.retry_count = routed.retry_count.saturating_add(1);

        if routed.retry_count > u16::from(self.config.max_retries) {
            warn!(
                "{} dropped after {} failed attempts: {}",
                routed.id, routed.retry_count, failure
            );
            let id = routed.id;
            self.push_event(RouterEvent::Failed {
                id,
                error: RouterError::RetryLimitExceeded {
                    id,
                    attempts: routed.retry_count,
                    last_failure: failure,
                },
            });
            return;
        }

        debug!(
            "{} attempt {} failed ({}), retrying at {:?}",
            routed.id,
            routed.retry_count,
            failure,
            routed.priority.escalate()
        );
        routed.priority = routed.priority.escalate();
        self.queue.push(routed);
    }

    // Acks

    /// Clears the ack expectation for `id`. Unknown ids (duplicate or late
    /// acks) are ignored. Returns whether an expectation was cleared.
    pub fn handle_ack(&mut self, id: RouteId, sender: PeerId) -> bool {
        if self.pending_acks.remove(&id).is_some() {
            self.push_event(RouterEvent::Delivered { id, peer: sender });
            true
        } else {
            debug!("Ignoring ack for unknown {} from {}", id, sender);
            false
        }
    }

    /// Decodes an `Opcode::RouteAck` payload and handles it
    pub fn receive_ack(&mut self, peer: PeerId, payload: &[u8]) -> Result<bool, RouterError> {
        let mut reader = ByteReader::new(payload);
        let ack = RouteAck::de(&mut reader)?;
        Ok(self.handle_ack(ack.id, peer))
    }

    // Incoming

    /// Decodes an `Opcode::Routed` payload once, acks it if requested, and
    /// fans it out to every handler subscribed to its kind
    pub fn receive(
        &mut self,
        peer: PeerId,
        payload: &[u8],
        sender: &dyn PacketSender,
    ) -> Result<ReceiveOutcome, RouterError> {
        let mut reader = ByteReader::new(payload);
        let envelope = RoutedEnvelope::de(&mut reader)?;

        if envelope.require_ack {
            let ack = RouteAck { id: envelope.id }.to_packet();
            if let Err(error) = sender.send(&Target::Peer(peer), &ack, self.config.delivery) {
                // the remote sender times out and retries
                warn!("Failed to ack {} from {}: {}", envelope.id, peer, error);
            }
        }

        if !self.received.insert(peer, envelope.id) {
            trace!("Duplicate {} from {}", envelope.id, peer);
            return Ok(ReceiveOutcome::Duplicate);
        }

        let inbound = RoutedInbound {
            peer,
            id: envelope.id,
            kind: envelope.kind,
            payload: envelope.payload,
        };
        let (handlers, failures) = self.registry.dispatch(&inbound);
        if handlers == 0 {
            debug!("No subscribers for {} ({} from {})", inbound.kind, inbound.id, peer);
        }
        Ok(ReceiveOutcome::Dispatched { handlers, failures })
    }

    /// Subscribes a handler to a message kind. Any number of handlers may
    /// subscribe to the same kind.
    pub fn register_handler<F>(&mut self, kind: MessageKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&RoutedInbound) -> Result<(), HandlerError> + 'static,
    {
        self.registry.subscribe(kind, Box::new(handler))
    }

    pub fn unregister_handler(&mut self, subscription: SubscriptionId) -> bool {
        self.registry.unsubscribe(subscription)
    }

    pub fn subscriber_count(&self, kind: &MessageKind) -> usize {
        self.registry.subscriber_count(kind)
    }

    /// Forgets duplicate-suppression state for a disconnected peer
    pub fn peer_disconnected(&mut self, peer: &PeerId) {
        self.received.forget_peer(peer);
    }

    // Events

    /// Routes every later event to `callback` instead of the buffer read
    /// by [`Router::take_events`]. A panicking callback is logged and
    /// does not interrupt the router.
    pub fn set_event_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&RouterEvent) + 'static,
    {
        self.event_callback = Some(Box::new(callback));
    }

    /// Hands `event` to the callback if one is set, otherwise buffers it
    /// for [`Router::take_events`]
    fn push_event(&mut self, event: RouterEvent) {
        let Some(callback) = self.event_callback.as_mut() else {
            self.events.push(event);
            return;
        };

        let result = run_isolated(|| {
            callback(&event);
            Ok(())
        });
        if let Err(error) = result {
            warn!("Router event callback failed on {}: {}", event.id(), error);
        }
    }

    pub fn take_events(&mut self) -> Vec<RouterEvent> {
        std::mem::take(&mut self.events)
    }

    // Queries

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn awaiting_ack_len(&self) -> usize {
        self.pending_acks.len()
    }

    pub fn is_awaiting_ack(&self, id: &RouteId) -> bool {
        self.pending_acks.contains(id)
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.pending_acks.is_empty()
    }
}
