use thiserror::Error;

use crate::{dispatch::DispatchError, reconcile::ReconcileError, router::RouterError};

/// Top-level error for the NetSync context
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetSyncError {
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Router error: {0}")]
    Router(#[from] RouterError),

    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),
}
