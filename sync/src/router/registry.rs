use std::collections::HashMap;

use log::warn;

use netsync_shared::{MessageKind, PeerId, RouteId};

use crate::{dispatch::HandlerError, isolation::run_isolated};

/// A decoded routed message as seen by subscribed handlers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutedInbound {
    pub peer: PeerId,
    pub id: RouteId,
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

pub type RouteHandler = Box<dyn FnMut(&RoutedInbound) -> Result<(), HandlerError>>;

/// Identifies one subscription so it can be removed again
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

/// Per-kind fan-out of inbound routed messages
pub(crate) struct HandlerRegistry {
    handlers: HashMap<MessageKind, Vec<(SubscriptionId, RouteHandler)>>,
    next_subscription: u32,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_subscription: 0,
        }
    }

    pub fn subscribe(&mut self, kind: MessageKind, handler: RouteHandler) -> SubscriptionId {
        let subscription = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.handlers
            .entry(kind)
            .or_default()
            .push((subscription, handler));
        subscription
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let mut removed = false;
        self.handlers.retain(|_, handlers| {
            let before = handlers.len();
            handlers.retain(|(id, _)| *id != subscription);
            removed |= handlers.len() != before;
            !handlers.is_empty()
        });
        removed
    }

    pub fn subscriber_count(&self, kind: &MessageKind) -> usize {
        self.handlers.get(kind).map_or(0, Vec::len)
    }

    /// Calls every handler subscribed to the message's kind. Returns
    /// (handlers invoked, handlers failed).
    pub fn dispatch(&mut self, inbound: &RoutedInbound) -> (usize, usize) {
        let Some(handlers) = self.handlers.get_mut(&inbound.kind) else {
            return (0, 0);
        };

        let mut failures = 0;
        for (_, handler) in handlers.iter_mut() {
            if let Err(error) = run_isolated(|| handler(inbound)) {
                failures += 1;
                warn!(
                    "Routed handler for {} ({} from {}) failed: {}",
                    inbound.kind, inbound.id, inbound.peer, error
                );
            }
        }
        (handlers.len(), failures)
    }
}
