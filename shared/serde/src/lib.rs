//! # Netsync Serde
//! Little-endian byte serialization for the envelopes the sync core puts on
//! the wire. Consumer payloads stay opaque byte strings.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod error;
mod integer;
mod serde;
mod stream_writer;

pub use byte_reader::ByteReader;
pub use error::SerdeErr;
pub use serde::{ConstByteLength, Serde};
pub use stream_writer::{ByteWrite, StreamWriter};
