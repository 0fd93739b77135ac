use thiserror::Error;

/// Errors produced while reading a value back off the wire
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The buffer ended before the value was complete
    #[error("Unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A bool was encoded with a byte other than 0 or 1
    #[error("Invalid bool byte {byte}, expected 0 or 1")]
    InvalidBool { byte: u8 },

    /// A length prefix exceeded the configured bound
    #[error("Length prefix {length} exceeds limit of {limit} bytes")]
    LengthTooLarge { length: usize, limit: usize },
}
