//! ASCII hex pair decoding.

/// Text that isn't a well formed sequence of hex pairs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidHex;

/// Decodes a single byte from exactly two ASCII hex digits (either case).
pub fn decode_pair(pair: &[u8]) -> Result<u8, InvalidHex> {
    let mut byte = [0u8; 1];
    hex::decode_to_slice(pair, &mut byte).map_err(|_| InvalidHex)?;
    Ok(byte[0])
}

/// Cursor decoding consecutive hex pairs out of a slice of ASCII text.
pub struct HexPairs<'a> {
    text: &'a [u8],
}

impl<'a> HexPairs<'a> {
    pub fn new(text: &'a [u8]) -> Self { Self { text } }

    /// Decodes the next pair, failing on malformed digits or on a
    /// dangling half pair.
    pub fn next_byte(&mut self) -> Result<u8, InvalidHex> {
        if self.text.len() < 2 {
            return Err(InvalidHex);
        }
        let (pair, rest) = self.text.split_at(2);
        self.text = rest;
        decode_pair(pair)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decoding_valid_pairs() {
        assert_eq!(decode_pair(b"00"), Ok(0x00));
        assert_eq!(decode_pair(b"fF"), Ok(0xFF));
        assert_eq!(decode_pair(b"A5"), Ok(0xA5));
    }

    #[test]
    fn malformed_pairs_are_detected() {
        assert_eq!(decode_pair(b"G0"), Err(InvalidHex));
        assert_eq!(decode_pair(b"0\r"), Err(InvalidHex));
        assert_eq!(decode_pair(b"1"), Err(InvalidHex));
        assert_eq!(decode_pair(b"123"), Err(InvalidHex));
    }

    #[test]
    fn cursor_walks_through_text() {
        let mut pairs = HexPairs::new(b"1300AB7");
        assert_eq!(pairs.next_byte(), Ok(0x13));
        assert_eq!(pairs.next_byte(), Ok(0x00));
        assert_eq!(pairs.next_byte(), Ok(0xAB));
        assert_eq!(pairs.next_byte(), Err(InvalidHex));
    }
}
