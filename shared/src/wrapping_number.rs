use std::fmt;

use netsync_serde::{ByteReader, ByteWrite, ConstByteLength, Serde, SerdeErr};

/// Returns whether or not a wrapping number is greater than another
/// sequence_greater_than(2,1) will return true
/// sequence_greater_than(1,2) will return false
/// sequence_greater_than(1,1) will return false
pub fn sequence_greater_than(s1: u16, s2: u16) -> bool {
    ((s1 > s2) && (s1 - s2 <= 32768)) || ((s1 < s2) && (s2 - s1 > 32768))
}

/// Returns whether or not a wrapping number is less than another
/// sequence_less_than(1,2) will return true
/// sequence_less_than(2,1) will return false
/// sequence_less_than(1,1) will return false
pub fn sequence_less_than(s1: u16, s2: u16) -> bool {
    sequence_greater_than(s2, s1)
}

/// Retrieves the wrapping difference between 2 u16 values, i.e. how far `b`
/// is ahead of `a`.
///
/// # Examples
/// ```
/// # use netsync_shared::wrapping_diff;
/// assert_eq!(wrapping_diff(1, 2), 1);
/// assert_eq!(wrapping_diff(2, 1), -1);
/// assert_eq!(wrapping_diff(65535, 0), 1);
/// assert_eq!(wrapping_diff(0, 65535), -1);
/// ```
pub fn wrapping_diff(a: u16, b: u16) -> i16 {
    b.wrapping_sub(a) as i16
}

/// Per-sender snapshot ordering token. Comparison is half-range, so a
/// sequence that has wrapped past `u16::MAX` is still newer than the values
/// just before the wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SequenceNumber(u16);

impl SequenceNumber {
    pub const ZERO: SequenceNumber = SequenceNumber(0);

    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn is_newer_than(&self, other: &SequenceNumber) -> bool {
        sequence_greater_than(self.0, other.0)
    }

    pub fn is_older_than(&self, other: &SequenceNumber) -> bool {
        sequence_less_than(self.0, other.0)
    }

    /// Returns whichever of the two is newer
    pub fn newest(self, other: SequenceNumber) -> SequenceNumber {
        if other.is_newer_than(&self) {
            other
        } else {
            self
        }
    }

    pub fn next(&self) -> SequenceNumber {
        SequenceNumber(self.0.wrapping_add(1))
    }

    /// Returns the current value and advances in place
    pub fn increment(&mut self) -> SequenceNumber {
        let current = *self;
        self.0 = self.0.wrapping_add(1);
        current
    }
}

impl From<u16> for SequenceNumber {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Serde for SequenceNumber {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self(u16::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for SequenceNumber {
    fn const_byte_length() -> usize {
        2
    }
}
