use super::error::FakeError;
use crate::hal::flash::{Program, ProgramUnit};

/// Flash double with NOR semantics: programming can only clear bits, so
/// the stored value is the AND of old and new contents. Every erase and
/// program call is recorded for inspection.
pub struct FakeFlash {
    base: u32,
    sector_size: usize,
    unit: ProgramUnit,
    memory: Vec<u8>,
    busy_polls: usize,
    pub erases: Vec<u32>,
    pub programs: Vec<(u32, Vec<u8>)>,
    /// Makes every program call starting at this address fail.
    pub fail_programs_at: Option<u32>,
    /// Makes every erase call fail.
    pub fail_erases: bool,
}

impl FakeFlash {
    /// Fully erased flash, as a freshly erased part would be.
    pub fn new(base: u32, size: usize, sector_size: usize, unit: ProgramUnit) -> Self {
        Self::with_contents(base, size, sector_size, unit, 0xFF)
    }

    /// Flash holding a previous image of all zeroes, so programming without
    /// erasing first leaves it unchanged.
    pub fn with_stale_contents(
        base: u32,
        size: usize,
        sector_size: usize,
        unit: ProgramUnit,
    ) -> Self {
        Self::with_contents(base, size, sector_size, unit, 0x00)
    }

    fn with_contents(
        base: u32,
        size: usize,
        sector_size: usize,
        unit: ProgramUnit,
        byte: u8,
    ) -> Self {
        Self {
            base,
            sector_size,
            unit,
            memory: vec![byte; size],
            busy_polls: 0,
            erases: Vec::new(),
            programs: Vec::new(),
            fail_programs_at: None,
            fail_erases: false,
        }
    }

    /// Makes the next `polls` operations report the controller as busy.
    pub fn stay_busy_for(&mut self, polls: usize) { self.busy_polls = polls; }

    pub fn contents(&self, address: u32, length: usize) -> &[u8] {
        let offset = (address - self.base) as usize;
        &self.memory[offset..offset + length]
    }

    fn offset_of(&self, address: u32, length: usize) -> Result<usize, FakeError> {
        let offset = address.checked_sub(self.base).ok_or(FakeError::OutOfBounds)? as usize;
        if offset + length > self.memory.len() {
            Err(FakeError::OutOfBounds)
        } else {
            Ok(offset)
        }
    }

    fn poll_busy(&mut self) -> nb::Result<(), FakeError> {
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }
}

impl Program for FakeFlash {
    type Error = FakeError;

    fn erase_sector(&mut self, address: u32) -> nb::Result<(), Self::Error> {
        self.poll_busy()?;
        if self.fail_erases {
            return Err(nb::Error::Other(FakeError::Injected));
        }
        if address.wrapping_sub(self.base) as usize % self.sector_size != 0 {
            return Err(nb::Error::Other(FakeError::Misaligned));
        }
        let offset = self.offset_of(address, self.sector_size)?;
        self.memory[offset..offset + self.sector_size].iter_mut().for_each(|b| *b = 0xFF);
        self.erases.push(address);
        Ok(())
    }

    fn program(&mut self, address: u32, bytes: &[u8]) -> nb::Result<(), Self::Error> {
        self.poll_busy()?;
        if self.fail_programs_at == Some(address) {
            return Err(nb::Error::Other(FakeError::Injected));
        }
        let unit = self.unit.bytes();
        if address as usize % unit != 0 || bytes.len() % unit != 0 {
            return Err(nb::Error::Other(FakeError::Misaligned));
        }
        let offset = self.offset_of(address, bytes.len())?;
        let target = &mut self.memory[offset..offset + bytes.len()];
        target.iter_mut().zip(bytes).for_each(|(cell, byte)| *cell &= *byte);
        self.programs.push((address, bytes.to_vec()));
        Ok(())
    }
}
