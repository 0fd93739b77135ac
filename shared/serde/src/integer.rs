use crate::{
    byte_reader::ByteReader, error::SerdeErr, serde::ConstByteLength, serde::Serde,
    stream_writer::ByteWrite,
};

/// Upper bound accepted for a length-prefixed byte string
pub const MAX_BYTE_STRING_LENGTH: usize = 1 << 20;

macro_rules! impl_serde_for_number {
    ($($type:ty),*) => {
        $(
            impl Serde for $type {
                fn ser(&self, writer: &mut dyn ByteWrite) {
                    writer.write_bytes(&self.to_le_bytes());
                }

                fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                    let bytes = reader.read_array::<{ std::mem::size_of::<$type>() }>()?;
                    Ok(<$type>::from_le_bytes(bytes))
                }

                fn byte_length(&self) -> usize {
                    std::mem::size_of::<$type>()
                }
            }

            impl ConstByteLength for $type {
                fn const_byte_length() -> usize {
                    std::mem::size_of::<$type>()
                }
            }
        )*
    };
}

impl_serde_for_number!(u8, u16, u32, u64, i16, i32, i64, f32, f64);

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(SerdeErr::InvalidBool { byte }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for bool {
    fn const_byte_length() -> usize {
        1
    }
}

// Byte strings carry a u32 length prefix
impl Serde for Vec<u8> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        let length = u32::try_from(self.len()).unwrap_or(u32::MAX);
        length.ser(writer);
        writer.write_bytes(&self[..length as usize]);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = u32::de(reader)? as usize;
        if length > MAX_BYTE_STRING_LENGTH {
            return Err(SerdeErr::LengthTooLarge {
                length,
                limit: MAX_BYTE_STRING_LENGTH,
            });
        }
        Ok(reader.read_bytes(length)?.to_vec())
    }

    fn byte_length(&self) -> usize {
        4 + self.len()
    }
}
