//! Raw binary images, programmed verbatim from the application start.

use super::{erase::FlashWriter, Error};
use crate::devices::traits::Flash;
use heapless::Vec;

/// Largest program unit of any supported part.
const MAX_UNIT: usize = 8;

/// Passes file contents straight through to flash. Bytes that don't fill a
/// whole program unit are held back until the next chunk completes it, or
/// until the end of the file pads it.
#[derive(Default)]
pub struct RawBinary {
    tail: Vec<u8, MAX_UNIT>,
}

impl RawBinary {
    pub fn new() -> Self { Self::default() }

    /// Programs `chunk`, found at `offset` bytes into the file.
    pub fn feed<F: Flash>(
        &mut self,
        writer: &mut FlashWriter<F>,
        offset: usize,
        chunk: &[u8],
    ) -> Result<(), Error> {
        let unit = writer.layout().program_unit.bytes();
        let base = writer.layout().application_start();
        let mut bytes = chunk;

        if !self.tail.is_empty() {
            let tail_address = base + (offset - self.tail.len()) as u32;
            let missing = (unit - self.tail.len()).min(bytes.len());
            let (head, rest) = bytes.split_at(missing);
            self.tail.extend_from_slice(head).map_err(|_| Error::RecordFormat)?;
            bytes = rest;
            if self.tail.len() < unit {
                return Ok(());
            }
            let result = writer.program(tail_address, &self.tail);
            self.tail.clear();
            result?;
        }

        let whole = bytes.len() - bytes.len() % unit;
        let (aligned, leftover) = bytes.split_at(whole);
        let address = base + (offset + (chunk.len() - bytes.len())) as u32;
        self.tail.extend_from_slice(leftover).map_err(|_| Error::RecordFormat)?;
        writer.program(address, aligned)
    }

    /// Flushes any held back bytes, padded with `0xFF` to a whole unit.
    pub fn finish<F: Flash>(
        &mut self,
        writer: &mut FlashWriter<F>,
        offset: usize,
    ) -> Result<(), Error> {
        if self.tail.is_empty() {
            return Ok(());
        }
        let unit = writer.layout().program_unit.bytes();
        let address = writer.layout().application_start() + (offset - self.tail.len()) as u32;
        while self.tail.len() < unit {
            self.tail.push(0xFF).map_err(|_| Error::RecordFormat)?;
        }
        let result = writer.program(address, &self.tail);
        self.tail.clear();
        result
    }
}
