//! Memory map of the target, as far as image loading is concerned.
//!
//! Board ports get their `Layout` generated at build time from the RON
//! configuration; tests build their own.

use crate::{
    error::Error,
    hal::flash::ProgramUnit,
    utilities::{
        endian::Endianness,
        memory::{self, AddressRange, Region},
    },
};

/// Number of sectors the erase tracker can account for.
pub const MAX_SECTORS: usize = 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Layout {
    /// Internal flash, inclusive.
    pub flash: AddressRange,
    /// Internal RAM, inclusive. The top address is a valid initial stack pointer.
    pub ram: AddressRange,
    /// Start of the application region. Everything below belongs to the
    /// loader itself and is never written.
    pub protected_address: u32,
    pub sector_size: usize,
    pub program_unit: ProgramUnit,
    /// Byte order of the address and length fields in CodeWarrior images.
    pub header_endianness: Endianness,
}

impl Layout {
    /// Whether a record may legitimately target `address`: either the
    /// application flash region or RAM.
    pub fn check_address_valid(&self, address: u32) -> bool {
        self.is_programmable(address) || self.ram.contains(address)
    }

    /// Whether `address` lies in the application flash region.
    pub fn is_programmable(&self, address: u32) -> bool {
        (self.protected_address..=self.flash.max).contains(&address)
    }

    /// Load address of raw binary images.
    pub fn application_start(&self) -> u32 { self.protected_address }

    pub fn align_down(&self, address: u32) -> u32 {
        memory::align_down(address, self.program_unit.bytes())
    }

    /// Index of the flash sector containing `address`.
    pub fn sector_index(&self, address: u32) -> Option<usize> {
        self.flash
            .contains(address)
            .then(|| (address - self.flash.min) as usize / self.sector_size)
    }

    pub fn sector_start(&self, index: usize) -> u32 {
        self.flash.min + (index * self.sector_size) as u32
    }

    /// Checks the layout is coherent, describing the first problem found.
    pub const fn validate(&self) -> Result<(), Error> {
        let unit = self.program_unit.bytes();
        if !self.flash.is_valid() || !self.ram.is_valid() {
            Err(Error::ConfigurationError("Memory range ends before it starts"))
        } else if self.flash.overlaps(&self.ram) {
            Err(Error::ConfigurationError("Flash and RAM ranges overlap"))
        } else if self.protected_address < self.flash.min || self.protected_address > self.flash.max
        {
            Err(Error::ConfigurationError("Protected address outside of flash"))
        } else if !self.sector_size.is_power_of_two() || self.sector_size % unit != 0 {
            Err(Error::ConfigurationError(
                "Sector size not a power of two multiple of program unit",
            ))
        } else if (self.protected_address - self.flash.min) as usize % self.sector_size != 0 {
            Err(Error::ConfigurationError("Protected address not sector aligned"))
        } else if self.flash.size() % self.sector_size != 0 {
            Err(Error::ConfigurationError("Flash size is not a whole number of sectors"))
        } else if self.flash.size() / self.sector_size > MAX_SECTORS {
            Err(Error::ConfigurationError("Too many flash sectors to track"))
        } else {
            Ok(())
        }
    }

    pub const fn is_sound(&self) -> bool { self.validate().is_ok() }
}
