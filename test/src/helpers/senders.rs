use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use netsync_shared::{DeliveryGuarantee, PacketSender, SendError, Target};

/// One packet handed to a [`RecordingSender`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentPacket {
    pub target: Target,
    pub bytes: Vec<u8>,
    pub delivery: DeliveryGuarantee,
}

/// Transport that accepts everything and remembers what it was given
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentPacket>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packets(&self) -> Vec<SentPacket> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns and forgets everything recorded so far
    pub fn take(&self) -> Vec<SentPacket> {
        match self.sent.lock() {
            Ok(mut sent) => std::mem::take(&mut *sent),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.packets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PacketSender for RecordingSender {
    fn send(&self, target: &Target, payload: &[u8], delivery: DeliveryGuarantee) -> Result<(), SendError> {
        let packet = SentPacket {
            target: *target,
            bytes: payload.to_vec(),
            delivery,
        };
        match self.sent.lock() {
            Ok(mut sent) => sent.push(packet),
            Err(poisoned) => poisoned.into_inner().push(packet),
        }
        Ok(())
    }
}

/// Transport whose link is down: every send fails and is counted
#[derive(Default)]
pub struct FailingSender {
    attempts: AtomicUsize,
}

impl FailingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl PacketSender for FailingSender {
    fn send(&self, _: &Target, _: &[u8], _: DeliveryGuarantee) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SendError::ChannelClosed)
    }
}
