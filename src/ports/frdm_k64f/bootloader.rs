//! Bootloader construction for the FRDM-K64F board (MK64FN1M0VLL12).
use crate::{
    devices::bootloader::Bootloader,
    drivers::kinetis::ftfx::{Ftfx, FtfxRegisterBlock},
    hal::{mass_storage::BlockWrites, serial},
    ports::layout::LAYOUT,
};
use static_assertions::const_assert;

const_assert!(LAYOUT.is_sound());

/// FTFE controller, programming 8 byte phrases.
pub type McuFlash = Ftfx<FtfxRegisterBlock>;

impl<ST: BlockWrites, SRL: serial::Write> Bootloader<ST, McuFlash, SRL> {
    pub fn new(storage: ST, serial: SRL) -> Self {
        // NOTE(Safety): The port is the only owner of the flash controller.
        let registers = unsafe { FtfxRegisterBlock::new() };
        let flash = Ftfx::new(registers, LAYOUT.flash, LAYOUT.sector_size, LAYOUT.program_unit);
        Bootloader::from_parts(storage, flash, LAYOUT, serial)
    }
}
