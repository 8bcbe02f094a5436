//! Explicit byte order decoding.
//!
//! Multi-byte fields in firmware images are always decoded from byte slices
//! with a stated byte order, never by reinterpreting memory.

/// Byte order of a multi-byte field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Decodes a 32 bit word from the first four bytes of `bytes`.
    /// Returns `None` if fewer than four bytes are available.
    pub fn read_u32(self, bytes: &[u8]) -> Option<u32> {
        let word = [*bytes.get(0)?, *bytes.get(1)?, *bytes.get(2)?, *bytes.get(3)?];
        Some(match self {
            Endianness::Little => u32::from_le_bytes(word),
            Endianness::Big => u32::from_be_bytes(word),
        })
    }
}
