use thiserror::Error;

/// Bumped whenever an opcode is added, removed or changes payload shape
pub const PROTOCOL_VERSION: u16 = 3;

/// Errors raised while classifying the leading opcode byte
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpcodeError {
    /// Packet carried no bytes at all
    #[error("Empty packet: no opcode byte present")]
    EmptyPacket,

    /// Leading byte is not part of the current protocol version
    #[error("Unknown opcode byte {byte} (protocol version {version}). This may indicate a malformed packet or a peer on another protocol version")]
    Unknown { byte: u8, version: u16 },
}

/// Closed set of message types known to protocol version [`PROTOCOL_VERSION`]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    Heartbeat = 0,
    /// Router envelope carrying an application message
    Routed = 1,
    /// Router acknowledgement for an ack-required envelope
    RouteAck = 2,
    /// Authoritative vitality (current/maximum) snapshot
    VitalitySnapshot = 3,
    PlayerTransform = 4,
    EnemyState = 5,
    DamageEvent = 6,
    LootSync = 7,
    SceneVote = 8,
    LobbyState = 9,
}

/// Number of opcodes, used to size enum-indexed tables
pub const OPCODE_COUNT: usize = 10;

impl Opcode {
    pub const ALL: [Opcode; OPCODE_COUNT] = [
        Opcode::Heartbeat,
        Opcode::Routed,
        Opcode::RouteAck,
        Opcode::VitalitySnapshot,
        Opcode::PlayerTransform,
        Opcode::EnemyState,
        Opcode::DamageEvent,
        Opcode::LootSync,
        Opcode::SceneVote,
        Opcode::LobbyState,
    ];

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Position in an enum-indexed table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Splits a raw packet into its opcode and remaining payload
    pub fn split_packet(bytes: &[u8]) -> Result<(Opcode, &[u8]), OpcodeError> {
        let Some((first, payload)) = bytes.split_first() else {
            return Err(OpcodeError::EmptyPacket);
        };
        Ok((Opcode::try_from(*first)?, payload))
    }
}

impl TryFrom<u8> for Opcode {
    type Error = OpcodeError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::ALL
            .get(byte as usize)
            .copied()
            .ok_or(OpcodeError::Unknown {
                byte,
                version: PROTOCOL_VERSION,
            })
    }
}
