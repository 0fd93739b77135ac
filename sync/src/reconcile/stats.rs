/// Counters kept by the reconcile manager
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub applied: u64,
    pub stale_dropped: u64,
    pub quarantined: u64,
    pub pending_stored: u64,
    pub pending_replaced: u64,
    pub pending_flushed: u64,
    pub pending_expired: u64,
    pub sent: u64,
    pub rate_limited: u64,
}
