use std::sync::Mutex;

use log::trace;

use super::{error::SendError, PacketSender, Target};
use crate::DeliveryGuarantee;

/// Contains configuration required to simulate a lossy link
#[derive(Clone, Debug, PartialEq)]
pub struct LinkConditionerConfig {
    /// Fraction of packets (0.0 - 1.0) that fail to send
    pub loss: f32,
    /// Seed for the loss decision, so a run can be replayed
    pub seed: u64,
}

impl LinkConditionerConfig {
    pub fn new(loss: f32, seed: u64) -> Self {
        Self {
            loss: loss.clamp(0.0, 1.0),
            seed,
        }
    }

    /// Creates a new LinkConditioner that simulates a connection which is in
    /// a good condition
    pub fn good_condition() -> Self {
        Self::new(0.001, 0)
    }

    /// Creates a new LinkConditioner that simulates a connection which is in
    /// an average condition
    pub fn average_condition() -> Self {
        Self::new(0.02, 0)
    }

    /// Creates a new LinkConditioner that simulates a connection which is in
    /// an poor condition
    pub fn poor_condition() -> Self {
        Self::new(0.1, 0)
    }
}

/// Wraps a sender and fails a seeded fraction of sends with
/// [`SendError::Dropped`]
pub struct ConditionedSender<S: PacketSender> {
    inner: S,
    loss: f32,
    rng: Mutex<fastrand::Rng>,
}

impl<S: PacketSender> ConditionedSender<S> {
    pub fn new(inner: S, config: &LinkConditionerConfig) -> Self {
        Self {
            inner,
            loss: config.loss,
            rng: Mutex::new(fastrand::Rng::with_seed(config.seed)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn should_drop(&self) -> bool {
        let Ok(mut rng) = self.rng.lock() else {
            return false;
        };
        rng.f32() < self.loss
    }
}

impl<S: PacketSender> PacketSender for ConditionedSender<S> {
    fn send(
        &self,
        target: &Target,
        payload: &[u8],
        delivery: DeliveryGuarantee,
    ) -> Result<(), SendError> {
        if self.should_drop() {
            trace!("link conditioner dropped {} byte packet", payload.len());
            return Err(SendError::Dropped {
                length: payload.len(),
            });
        }
        self.inner.send(target, payload, delivery)
    }
}
