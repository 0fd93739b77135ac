use std::collections::{HashMap, HashSet, VecDeque};

use netsync_shared::{PeerId, RouteId};

/// Remembers the most recent route ids seen from each peer so a retried
/// message whose ack was lost is not handed to handlers twice
pub(crate) struct ReceivedRoutes {
    window: usize,
    peers: HashMap<PeerId, PeerWindow>,
}

struct PeerWindow {
    order: VecDeque<RouteId>,
    seen: HashSet<RouteId>,
}

impl ReceivedRoutes {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            peers: HashMap::new(),
        }
    }

    /// Records `id` for `peer`; returns false if it was already recorded
    pub fn insert(&mut self, peer: PeerId, id: RouteId) -> bool {
        if self.window == 0 {
            return true;
        }
        let peer_window = self.peers.entry(peer).or_insert_with(|| PeerWindow {
            order: VecDeque::new(),
            seen: HashSet::new(),
        });

        if !peer_window.seen.insert(id) {
            return false;
        }
        peer_window.order.push_back(id);
        if peer_window.order.len() > self.window {
            if let Some(oldest) = peer_window.order.pop_front() {
                peer_window.seen.remove(&oldest);
            }
        }
        true
    }

    pub fn forget_peer(&mut self, peer: &PeerId) {
        self.peers.remove(peer);
    }
}
