//! CodeWarrior binary images.
//!
//! The file is a flat sequence of records, each an 8 byte header (load
//! address, then data length, in the layout's header byte order) followed
//! by the data itself. Records and headers may be split anywhere across
//! chunks.

use super::{erase::FlashWriter, Error};
use crate::{
    devices::traits::Flash,
    utilities::{log::warn, memory::padding_to},
};
use heapless::Vec;

const HEADER_LENGTH: usize = 8;

/// Record data is programmed in segments of this size, so records of any
/// length are decoded in bounded memory.
const SEGMENT: usize = 256;

#[derive(Default)]
pub struct CodeWarrior {
    header: Vec<u8, HEADER_LENGTH>,
    /// Data bytes of the current record still to be received.
    remaining: usize,
    /// The current record targets memory that is never programmed.
    skip: bool,
    /// Flash address of the first staged byte.
    segment_address: u32,
    segment: Vec<u8, SEGMENT>,
}

impl CodeWarrior {
    pub fn new() -> Self { Self::default() }

    /// Whether the last chunk ended inside a record.
    pub fn is_mid_record(&self) -> bool { !self.header.is_empty() }

    pub fn feed<F: Flash>(
        &mut self,
        writer: &mut FlashWriter<F>,
        chunk: &[u8],
    ) -> Result<(), Error> {
        let mut bytes = chunk;
        while !bytes.is_empty() {
            if self.header.len() < HEADER_LENGTH {
                let take = (HEADER_LENGTH - self.header.len()).min(bytes.len());
                let (head, rest) = bytes.split_at(take);
                self.header.extend_from_slice(head).map_err(|_| Error::RecordFormat)?;
                bytes = rest;
                if self.header.len() == HEADER_LENGTH {
                    self.start_record(writer)?;
                }
                continue;
            }

            let take = self.remaining.min(bytes.len());
            let (data, rest) = bytes.split_at(take);
            bytes = rest;
            self.remaining -= take;
            if !self.skip {
                for byte in data {
                    self.stage(writer, *byte)?;
                }
            }
            if self.remaining == 0 {
                self.end_record(writer)?;
            }
        }
        Ok(())
    }

    fn start_record<F: Flash>(&mut self, writer: &mut FlashWriter<F>) -> Result<(), Error> {
        let layout = writer.layout();
        let endianness = layout.header_endianness;
        let address = endianness.read_u32(&self.header[..4]).ok_or(Error::RecordFormat)?;
        let length = endianness.read_u32(&self.header[4..]).ok_or(Error::RecordFormat)?;

        // RAM records are legal but there's nothing to program for them.
        self.skip = !layout.is_programmable(address) || length == 0;
        if !layout.check_address_valid(address) {
            warn!("Skipping record at invalid address {:?}", address);
        }
        self.remaining = length as usize;
        self.segment.clear();
        self.segment_address = layout.align_down(address);
        for _ in self.segment_address..address {
            self.segment.push(0xFF).map_err(|_| Error::RecordFormat)?;
        }

        if self.remaining == 0 {
            self.end_record(writer)?;
        }
        Ok(())
    }

    fn stage<F: Flash>(&mut self, writer: &mut FlashWriter<F>, byte: u8) -> Result<(), Error> {
        if self.segment.is_full() {
            self.flush(writer)?;
        }
        self.segment.push(byte).map_err(|_| Error::RecordFormat)
    }

    fn flush<F: Flash>(&mut self, writer: &mut FlashWriter<F>) -> Result<(), Error> {
        let result = writer.program(self.segment_address, &self.segment);
        self.segment_address += self.segment.len() as u32;
        self.segment.clear();
        result
    }

    fn end_record<F: Flash>(&mut self, writer: &mut FlashWriter<F>) -> Result<(), Error> {
        self.header.clear();
        if self.skip || self.segment.is_empty() {
            return Ok(());
        }
        let unit = writer.layout().program_unit.bytes();
        for _ in 0..padding_to(self.segment.len(), unit) {
            self.segment.push(0xFF).map_err(|_| Error::RecordFormat)?;
        }
        self.flush(writer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::devices::{
        layout::test::TEST_LAYOUT,
        loader::erase::{
            test::{fake_flash, phrase_flash, PHRASE_LAYOUT},
            ErasedSectors,
        },
    };

    fn record(address: u32, data: &[u8]) -> std::vec::Vec<u8> {
        let mut bytes = address.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn records_are_reassembled_across_any_split() {
        let mut file = record(0x2000, &[0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17]);
        file.extend(record(0x2100, &[0x20, 0x21, 0x22, 0x23]));

        for chunk_size in [1, 3, 7, 8, 512] {
            // Given
            let mut flash = fake_flash();
            let mut erased = ErasedSectors::new();
            let mut writer = FlashWriter::new(&mut flash, &TEST_LAYOUT, &mut erased);
            let mut decoder = CodeWarrior::new();

            // When
            for chunk in file.chunks(chunk_size) {
                decoder.feed(&mut writer, chunk).unwrap();
            }

            // Then
            assert!(!decoder.is_mid_record());
            let expected: std::vec::Vec<u8> = (0x10..0x18).collect();
            assert_eq!(flash.contents(0x2000, 8), &expected[..]);
            assert_eq!(flash.contents(0x2100, 4), &[0x20, 0x21, 0x22, 0x23]);
        }
    }

    #[test]
    fn misaligned_records_are_padded_to_whole_units() {
        // Given
        let mut flash = fake_flash();
        let mut erased = ErasedSectors::new();
        let mut writer = FlashWriter::new(&mut flash, &TEST_LAYOUT, &mut erased);
        let mut decoder = CodeWarrior::new();

        // When
        decoder.feed(&mut writer, &record(0x1803, &[0xD0, 0xD1, 0xD2])).unwrap();

        // Then
        let expected = vec![0xFF, 0xFF, 0xFF, 0xD0, 0xD1, 0xD2, 0xFF, 0xFF];
        assert_eq!(flash.programs, vec![(0x1800, expected)]);
    }

    #[test]
    fn misaligned_records_are_padded_to_whole_phrases() {
        // Given
        let mut flash = phrase_flash();
        let mut erased = ErasedSectors::new();
        let mut writer = FlashWriter::new(&mut flash, &PHRASE_LAYOUT, &mut erased);
        let mut decoder = CodeWarrior::new();

        // When
        decoder.feed(&mut writer, &record(0x1805, &[0xD0, 0xD1, 0xD2, 0xD3, 0xD4])).unwrap();

        // Then
        let mut expected = vec![0xFF; 16];
        expected[5..10].copy_from_slice(&[0xD0, 0xD1, 0xD2, 0xD3, 0xD4]);
        assert_eq!(flash.programs, vec![(0x1800, expected)]);
    }

    #[test]
    fn long_records_are_programmed_in_segments() {
        // Given
        let mut flash = fake_flash();
        let mut erased = ErasedSectors::new();
        let mut writer = FlashWriter::new(&mut flash, &TEST_LAYOUT, &mut erased);
        let mut decoder = CodeWarrior::new();
        let data: std::vec::Vec<u8> = (0..600u32).map(|i| i as u8).collect();

        // When
        decoder.feed(&mut writer, &record(0x4000, &data)).unwrap();

        // Then
        let addresses: std::vec::Vec<u32> = flash.programs.iter().map(|(a, _)| *a).collect();
        assert_eq!(addresses, vec![0x4000, 0x4100, 0x4200]);
        assert_eq!(flash.contents(0x4000, 600), &data[..]);
    }

    #[test]
    fn records_outside_application_flash_are_skipped() {
        // Given
        let mut flash = fake_flash();
        let mut erased = ErasedSectors::new();
        let mut writer = FlashWriter::new(&mut flash, &TEST_LAYOUT, &mut erased);
        let mut decoder = CodeWarrior::new();
        let mut file = record(0x0400, &[0xEE; 4]);
        file.extend(record(0x2000_0000, &[0xEE; 4]));
        file.extend(record(0x2000, &[0x42; 4]));

        // When
        decoder.feed(&mut writer, &file).unwrap();

        // Then
        assert_eq!(flash.programs, vec![(0x2000, vec![0x42; 4])]);
    }

    #[test]
    fn truncated_records_are_detected() {
        // Given
        let mut flash = fake_flash();
        let mut erased = ErasedSectors::new();
        let mut writer = FlashWriter::new(&mut flash, &TEST_LAYOUT, &mut erased);
        let mut decoder = CodeWarrior::new();
        let file = record(0x2000, &[0x42; 8]);

        // When
        decoder.feed(&mut writer, &file[..12]).unwrap();

        // Then
        assert!(decoder.is_mid_record());
        assert!(flash.programs.is_empty());
    }

    #[test]
    fn flash_errors_are_returned() {
        // Given
        let mut flash = fake_flash();
        flash.fail_programs_at = Some(0x2000);
        let mut erased = ErasedSectors::new();
        let mut writer = FlashWriter::new(&mut flash, &TEST_LAYOUT, &mut erased);
        let mut decoder = CodeWarrior::new();

        // When
        let result = decoder.feed(&mut writer, &record(0x2000, &[0x42; 4]));

        // Then
        assert!(matches!(result, Err(Error::Flash(_))));
    }
}
