use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use super::RoutedMessage;

struct QueuedRoute {
    stamp: u64,
    routed: RoutedMessage,
}

impl QueuedRoute {
    fn key(&self) -> (super::Priority, Reverse<u64>) {
        (self.routed.priority, Reverse(self.stamp))
    }
}

impl PartialEq for QueuedRoute {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedRoute {}

impl PartialOrd for QueuedRoute {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedRoute {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Max-heap on priority; equal priorities pop in insertion order
pub(crate) struct OutgoingQueue {
    heap: BinaryHeap<QueuedRoute>,
    next_stamp: u64,
}

impl OutgoingQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_stamp: 0,
        }
    }

    pub fn push(&mut self, routed: RoutedMessage) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.heap.push(QueuedRoute { stamp, routed });
    }

    pub fn pop(&mut self) -> Option<RoutedMessage> {
        self.heap.pop().map(|queued| queued.routed)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
