use serde::{Deserialize, Serialize};

use crate::port::Port;

#[macro_export(local_inner_macros)]
macro_rules! KB {
    ($val:expr) => {
        $val * 1024
    };
}

/// Byte order of multi-byte header fields in CodeWarrior binary records.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endianness {
    Little,
    Big,
}

/// Width of a single flash programming operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramUnit {
    /// 4 byte longword (FTFA controllers).
    Word,
    /// 8 byte phrase (FTFE controllers).
    Phrase,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryConfiguration {
    /// Size of the region at the start of MCU flash reserved for the loader
    /// itself. Nothing below its end is ever erased or programmed.
    pub bootloader_length_kb: u32,
    pub header_endianness: Endianness,
}

impl Default for MemoryConfiguration {
    fn default() -> Self { Self { bootloader_length_kb: 64, header_endianness: Endianness::Big } }
}

impl MemoryConfiguration {
    /// First address application images are allowed to occupy.
    pub fn protected_address(&self, port: &Port) -> u32 {
        port.internal_flash().start + KB!(self.bootloader_length_kb)
    }
}

/// Memory-mapped MCU flash, with an inclusive end address.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FlashChip {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
    /// Size of the smallest erasable region
    pub sector_size: u32,
    pub program_unit: ProgramUnit,
}

/// On-chip SRAM. The end address is inclusive, since the initial stack
/// pointer of an application points one past the last RAM byte.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Ram {
    pub start: u32,
    pub end: u32,
}
