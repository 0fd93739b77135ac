use std::fmt;

use netsync_serde::{ByteReader, ByteWrite, ConstByteLength, Serde, SerdeErr};

/// Transport lane a packet arrived on. Opaque to the sync core.
pub type ChannelIndex = u8;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($inner);

        impl $name {
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            pub fn value(&self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "({})"), self.0)
            }
        }

        impl Serde for $name {
            fn ser(&self, writer: &mut dyn ByteWrite) {
                self.0.ser(writer);
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                Ok(Self(<$inner>::de(reader)?))
            }

            fn byte_length(&self) -> usize {
                std::mem::size_of::<$inner>()
            }
        }

        impl ConstByteLength for $name {
            fn const_byte_length() -> usize {
                std::mem::size_of::<$inner>()
            }
        }
    };
}

id_type!(
    /// A remote participant, as identified by the transport
    PeerId,
    u64,
    "Peer"
);
id_type!(
    /// The entity whose authoritative state a snapshot describes
    OwnerId,
    u64,
    "Owner"
);
id_type!(
    /// Handle for a message under Router control
    RouteId,
    u32,
    "Route"
);
id_type!(
    /// Application-level type tag carried inside a routed envelope
    MessageKind,
    u16,
    "Kind"
);

/// Delivery property requested from the transport for a single send
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeliveryGuarantee {
    Unreliable,
    ReliableOrdered,
}
