use netsync_serde::{ByteReader, ByteWrite, Serde, SerdeErr};

use crate::{OwnerId, SequenceNumber};

/// A producer-declared maximum/current pair. Only snapshots with a positive
/// maximum may be applied to a live replica.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub maximum: f32,
    pub current: f32,
}

impl Snapshot {
    pub fn new(maximum: f32, current: f32) -> Self {
        Self { maximum, current }
    }

    /// The snapshot returned when no live value could be read
    pub fn invalid() -> Self {
        Self {
            maximum: 0.0,
            current: 0.0,
        }
    }

    /// NaN maxima count as invalid
    pub fn is_valid(&self) -> bool {
        self.maximum > 0.0
    }
}

impl Serde for Snapshot {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.maximum.ser(writer);
        self.current.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let maximum = f32::de(reader)?;
        let current = f32::de(reader)?;
        Ok(Self { maximum, current })
    }

    fn byte_length(&self) -> usize {
        8
    }
}

/// A snapshot together with the owner it describes and its ordering token
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequencedSnapshot {
    pub owner: OwnerId,
    pub sequence: SequenceNumber,
    pub snapshot: Snapshot,
}

impl SequencedSnapshot {
    pub fn new(owner: OwnerId, sequence: SequenceNumber, snapshot: Snapshot) -> Self {
        Self {
            owner,
            sequence,
            snapshot,
        }
    }
}

/// Payload of an `Opcode::VitalitySnapshot` packet
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotMessage {
    pub owner: OwnerId,
    pub sequence: SequenceNumber,
    pub force: bool,
    pub snapshot: Snapshot,
}

impl Serde for SnapshotMessage {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.owner.ser(writer);
        self.sequence.ser(writer);
        self.force.ser(writer);
        self.snapshot.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let owner = OwnerId::de(reader)?;
        let sequence = SequenceNumber::de(reader)?;
        let force = bool::de(reader)?;
        let snapshot = Snapshot::de(reader)?;
        Ok(Self {
            owner,
            sequence,
            force,
            snapshot,
        })
    }

    fn byte_length(&self) -> usize {
        8 + 2 + 1 + 8
    }
}
