//! Motorola S-record (S19) images.
//!
//! Each line is `S`, a type digit, then hex pairs: a byte count, the
//! address, the data, and a checksum such that the count, address, data
//! and checksum bytes add up to `0xFF` modulo 256. Lines are reassembled
//! across chunk boundaries before being decoded; anything between lines
//! (line endings, padding) is ignored.
//!
//! Lines are limited to 260 characters, which puts the byte count at
//! `0x80` or less: at most 125 data bytes on an S1 line, 124 on S2 and
//! 123 on S3. Longer lines are rejected as malformed. Tools that write
//! longer records need them shortened, e.g. `objcopy --srec-len=123`.

use super::{erase::FlashWriter, Error, Progress};
use crate::{
    devices::traits::Flash,
    utilities::{
        hex::{decode_pair, HexPairs, InvalidHex},
        log::{info, warn},
        memory::padding_to,
    },
};
use heapless::Vec;

/// Longest line accepted, in ASCII characters.
pub const MAX_LINE_LENGTH: usize = 260;

/// Decoded data of the longest line, plus alignment padding on both ends.
const MAX_PAYLOAD: usize = (MAX_LINE_LENGTH - 4) / 2 + 2 * 8;

/// Characters before the hex pairs start (`S` and the type digit).
const PREFIX: usize = 2;

impl From<InvalidHex> for Error {
    fn from(_: InvalidHex) -> Self { Error::RecordFormat }
}

#[derive(Default)]
pub struct SRecord {
    line: Vec<u8, MAX_LINE_LENGTH>,
    /// Inside a line, after its `S`.
    in_line: bool,
    /// Full length of the current line, known once its byte count arrives.
    total: Option<usize>,
}

impl SRecord {
    pub fn new() -> Self { Self::default() }

    /// Consumes a chunk, programming every line it completes. Returns
    /// `Progress::Complete` once a terminator line is decoded; the rest of
    /// the chunk is ignored.
    pub fn feed<F: Flash>(
        &mut self,
        writer: &mut FlashWriter<F>,
        chunk: &[u8],
    ) -> Result<Progress, Error> {
        for byte in chunk.iter().copied() {
            if !self.in_line {
                if byte == b'S' {
                    self.line.clear();
                    self.total = None;
                    self.in_line = true;
                    self.append(b'S')?;
                }
                continue;
            }

            self.append(byte)?;
            match self.line.len() {
                2 if !byte.is_ascii_digit() => return Err(Error::RecordFormat),
                4 if self.total.is_none() => {
                    let count = decode_pair(&self.line[PREFIX..4])? as usize;
                    let total = (count + 2) * 2;
                    if total > MAX_LINE_LENGTH {
                        return Err(Error::RecordFormat);
                    }
                    self.total = Some(total);
                }
                _ => (),
            }

            if self.total == Some(self.line.len()) {
                self.in_line = false;
                if let Progress::Complete = self.process(writer)? {
                    return Ok(Progress::Complete);
                }
            }
        }
        Ok(Progress::Continue)
    }

    fn append(&mut self, byte: u8) -> Result<(), Error> {
        self.line.push(byte).map_err(|_| Error::RecordFormat)
    }

    /// Decodes a complete line.
    fn process<F: Flash>(&self, writer: &mut FlashWriter<F>) -> Result<Progress, Error> {
        let kind = self.line[1] - b'0';
        let mut pairs = HexPairs::new(&self.line[PREFIX..]);
        let count = pairs.next_byte()?;
        let mut checksum = count;

        let address_length = match kind {
            1..=3 => kind as usize + 1,
            7..=9 => 11 - kind as usize,
            // Header and count records carry nothing to program.
            _ => return Ok(Progress::Continue),
        };
        if (count as usize) < address_length + 1 {
            return Err(Error::RecordFormat);
        }

        let mut address = 0u32;
        for _ in 0..address_length {
            let byte = pairs.next_byte()?;
            checksum = checksum.wrapping_add(byte);
            address = (address << 8) | byte as u32;
        }

        let layout = writer.layout();
        let terminator = kind >= 7;
        if !terminator && !layout.check_address_valid(address) {
            warn!("S-record targets invalid address {:?}", address);
            return Err(Error::AddressRange);
        }

        let aligned = layout.align_down(address);
        let unit = layout.program_unit.bytes();
        let mut payload: Vec<u8, MAX_PAYLOAD> = Vec::new();
        for _ in aligned..address {
            payload.push(0xFF).map_err(|_| Error::RecordFormat)?;
        }
        for _ in 0..(count as usize - address_length - 1) {
            let byte = pairs.next_byte()?;
            checksum = checksum.wrapping_add(byte);
            payload.push(byte).map_err(|_| Error::RecordFormat)?;
        }

        let received = pairs.next_byte()?;
        if checksum.wrapping_add(received) != 0xFF {
            warn!("S-record checksum mismatch at {:?}", address);
            return Err(Error::Checksum);
        }

        if terminator {
            info!("S-record terminator reached, entry point {:?}", address);
            return Ok(Progress::Complete);
        }

        for _ in 0..padding_to(payload.len(), unit) {
            payload.push(0xFF).map_err(|_| Error::RecordFormat)?;
        }
        // RAM records are only validated.
        if layout.is_programmable(address) {
            writer.program(aligned, &payload)?;
        }
        Ok(Progress::Continue)
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::{
        devices::{
            layout::{test::TEST_LAYOUT, Layout},
            loader::erase::{
                test::{fake_flash, phrase_flash, PHRASE_LAYOUT},
                ErasedSectors,
            },
        },
        hal::doubles::flash::FakeFlash,
    };

    /// Builds a well formed line of the given type, with its checksum.
    pub fn line(kind: u8, address: u32, data: &[u8]) -> String {
        let address_length = match kind {
            0 | 1 | 5 | 9 => 2,
            2 | 6 | 8 => 3,
            _ => 4,
        };
        let address_bytes = &address.to_be_bytes()[4 - address_length..];
        let count = (address_length + data.len() + 1) as u8;
        let sum = address_bytes
            .iter()
            .chain(data)
            .fold(count, |sum, byte| sum.wrapping_add(*byte));
        let mut text = format!("S{}{:02X}", kind, count);
        for byte in address_bytes.iter().chain(data) {
            text.push_str(&format!("{:02X}", byte));
        }
        text.push_str(&format!("{:02X}\r\n", 0xFF - sum));
        text
    }

    fn decode(text: &[u8], chunk_size: usize) -> (FakeFlash, Result<Progress, Error>) {
        decode_on(&TEST_LAYOUT, fake_flash(), text, chunk_size)
    }

    fn decode_on(
        layout: &Layout,
        mut flash: FakeFlash,
        text: &[u8],
        chunk_size: usize,
    ) -> (FakeFlash, Result<Progress, Error>) {
        let mut erased = ErasedSectors::new();
        let mut writer = FlashWriter::new(&mut flash, layout, &mut erased);
        let mut decoder = SRecord::new();
        let mut result = Ok(Progress::Continue);
        for chunk in text.chunks(chunk_size) {
            result = decoder.feed(&mut writer, chunk);
            if !matches!(result, Ok(Progress::Continue)) {
                break;
            }
        }
        (flash, result)
    }

    #[test]
    fn test_line_builder_matches_known_records() {
        assert_eq!(line(9, 0x0000, &[]), "S9030000FC\r\n");
        assert_eq!(line(1, 0x0038, &[0x48, 0x65, 0x6C, 0x6C, 0x6F]), "S108003848656C6C6FCB\r\n");
    }

    #[test]
    fn programming_is_independent_of_chunk_boundaries() {
        // Given
        let text = [
            line(0, 0x0000, b"HDR"),
            line(1, 0x1800, &[0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]),
            line(2, 0x001810, &[0x10, 0x11, 0x12, 0x13]),
            line(3, 0x0000_1820, &[0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27]),
            line(5, 0x0003, &[]),
        ]
        .concat();

        // When
        let (whole, whole_result) = decode(text.as_bytes(), text.len());
        let (bytewise, bytewise_result) = decode(text.as_bytes(), 1);

        // Then
        assert!(matches!(whole_result, Ok(Progress::Continue)));
        assert!(matches!(bytewise_result, Ok(Progress::Continue)));
        assert_eq!(whole.programs.len(), 3);
        assert_eq!(whole.programs, bytewise.programs);
        assert_eq!(whole.programs[1], (0x1810, vec![0x10, 0x11, 0x12, 0x13]));
    }

    #[test]
    fn any_checksum_bit_flip_is_rejected_before_programming() {
        let valid = line(1, 0x1800, &[0xAA, 0xBB, 0xCC, 0xDD]);
        let checksum = decode_pair(&valid.as_bytes()[valid.len() - 4..valid.len() - 2]).unwrap();

        for bit in 0..8 {
            // Given
            let mut text = valid[..valid.len() - 4].to_string();
            text.push_str(&format!("{:02X}\r\n", checksum ^ (1 << bit)));

            // When
            let (flash, result) = decode(text.as_bytes(), 5);

            // Then
            assert!(matches!(result, Err(Error::Checksum)));
            assert!(flash.programs.is_empty());
        }
    }

    #[test]
    fn protected_address_is_the_lowest_programmable_one() {
        let (flash, result) = decode(line(1, 0x17FF, &[0x01]).as_bytes(), 512);
        assert!(matches!(result, Err(Error::AddressRange)));
        assert!(flash.programs.is_empty());

        let (flash, result) = decode(line(1, 0x1800, &[0x01]).as_bytes(), 512);
        assert!(matches!(result, Ok(Progress::Continue)));
        assert_eq!(flash.programs, vec![(0x1800, vec![0x01, 0xFF, 0xFF, 0xFF])]);
    }

    #[test]
    fn misaligned_records_are_padded_on_both_ends() {
        let (flash, _) = decode(line(1, 0x1803, &[0xD0, 0xD1, 0xD2]).as_bytes(), 512);
        let expected = vec![0xFF, 0xFF, 0xFF, 0xD0, 0xD1, 0xD2, 0xFF, 0xFF];
        assert_eq!(flash.programs, vec![(0x1800, expected)]);

        let (flash, _) = decode(line(1, 0x1801, &[0xD0, 0xD1]).as_bytes(), 512);
        assert_eq!(flash.programs, vec![(0x1800, vec![0xFF, 0xD0, 0xD1, 0xFF])]);
    }

    #[test]
    fn misaligned_records_are_padded_to_whole_phrases() {
        // Given
        let short = line(1, 0x1803, &[0xD0, 0xD1, 0xD2]);
        let straddling = line(1, 0x1805, &[0xD0, 0xD1, 0xD2, 0xD3, 0xD4]);

        // When
        let (short_flash, _) = decode_on(&PHRASE_LAYOUT, phrase_flash(), short.as_bytes(), 512);
        let (straddling_flash, _) =
            decode_on(&PHRASE_LAYOUT, phrase_flash(), straddling.as_bytes(), 5);

        // Then
        let expected = vec![0xFF, 0xFF, 0xFF, 0xD0, 0xD1, 0xD2, 0xFF, 0xFF];
        assert_eq!(short_flash.programs, vec![(0x1800, expected)]);
        let mut expected = vec![0xFF; 16];
        expected[5..10].copy_from_slice(&[0xD0, 0xD1, 0xD2, 0xD3, 0xD4]);
        assert_eq!(straddling_flash.programs, vec![(0x1800, expected)]);
    }

    #[test]
    fn terminator_completes_the_image() {
        // Given
        let text = [
            line(1, 0x1800, &[0x12, 0x34, 0x56, 0x78]),
            line(9, 0x1800, &[]),
            line(1, 0x1900, &[0x9A; 4]),
        ]
        .concat();

        // When
        let (flash, result) = decode(text.as_bytes(), 7);

        // Then
        assert!(matches!(result, Ok(Progress::Complete)));
        assert_eq!(flash.programs, vec![(0x1800, vec![0x12, 0x34, 0x56, 0x78])]);
    }

    #[test]
    fn corrupted_terminators_are_rejected() {
        let (_, result) = decode(b"S9030000FD\r\n", 512);
        assert!(matches!(result, Err(Error::Checksum)));
        let (_, result) = decode(b"S804000000FB\r\n", 512);
        assert!(matches!(result, Ok(Progress::Complete)));
    }

    #[test]
    fn sixteen_byte_fixture_is_programmed_at_address_zero() {
        // Given
        let layout = Layout { protected_address: 0, ..TEST_LAYOUT };
        let mut flash = fake_flash();
        let mut erased = ErasedSectors::new();
        let mut writer = FlashWriter::new(&mut flash, &layout, &mut erased);
        let mut decoder = SRecord::new();

        // When
        let result = decoder.feed(&mut writer, b"S1130000AABBCCDDEEFF00112233445566778899F4\r\n");

        // Then
        assert!(matches!(result, Ok(Progress::Continue)));
        assert_eq!(flash.programs, vec![(0x0000, vec![
            0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x00, 0x11,
            0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99,
        ])]);
    }

    #[test]
    fn incomplete_lines_wait_for_more_data() {
        let (flash, result) = decode(b"S1130000AABBCCDDEEFF00112233445566AA\r\n", 512);
        assert!(matches!(result, Ok(Progress::Continue)));
        assert!(flash.programs.is_empty());
    }

    #[test]
    fn longest_lines_are_accepted_and_longer_ones_rejected() {
        // Given
        let longest = line(3, 0x2000, &[0x5A; 123]);
        let too_long = line(3, 0x2000, &[0x5A; 124]);

        // When
        let (flash, accepted) = decode(longest.as_bytes(), 64);
        let (rejected_flash, rejected) = decode(too_long.as_bytes(), 64);

        // Then
        assert_eq!(longest.trim_end().len(), MAX_LINE_LENGTH);
        assert!(matches!(accepted, Ok(Progress::Continue)));
        assert_eq!(flash.contents(0x2000, 123), &[0x5A; 123][..]);
        assert!(matches!(rejected, Err(Error::RecordFormat)));
        assert!(rejected_flash.programs.is_empty());
    }

    #[test]
    fn malformed_lines_are_fatal() {
        let (_, result) = decode(b"S1071800GG11223344\r\n", 512);
        assert!(matches!(result, Err(Error::RecordFormat)));
        let (_, result) = decode(b"SX0700001122\r\n", 512);
        assert!(matches!(result, Err(Error::RecordFormat)));
        let (_, result) = decode(b"S1FF0000", 512);
        assert!(matches!(result, Err(Error::RecordFormat)));
        let (_, result) = decode(b"S10100FE\r\n", 512);
        assert!(matches!(result, Err(Error::RecordFormat)));
    }

    #[test]
    fn ram_records_are_validated_but_not_programmed() {
        let text = line(3, 0x2000_0000, &[0x01, 0x02, 0x03, 0x04]);
        let (flash, result) = decode(text.as_bytes(), 512);
        assert!(matches!(result, Ok(Progress::Continue)));
        assert!(flash.programs.is_empty());
    }
}
