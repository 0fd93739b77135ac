use crate::{byte_reader::ByteReader, error::SerdeErr, stream_writer::ByteWrite};

/// A type that can be written to and read from a little-endian byte stream
pub trait Serde: Sized {
    /// Writes the value to the stream
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Reads a value from the stream
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will write
    fn byte_length(&self) -> usize;
}

/// Implemented by types whose encoded length never varies
pub trait ConstByteLength {
    fn const_byte_length() -> usize;
}
