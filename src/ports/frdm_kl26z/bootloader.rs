//! Bootloader construction for the FRDM-KL26Z board (MKL26Z128VLH4).
use crate::{
    devices::bootloader::Bootloader,
    drivers::kinetis::ftfx::{Ftfx, FtfxRegisterBlock},
    hal::{mass_storage::BlockWrites, serial},
    ports::layout::LAYOUT,
};
use static_assertions::const_assert;

const_assert!(LAYOUT.is_sound());

// The FTFA controller on the KL26 programs longwords only, so images
// are padded to 4 byte boundaries.
pub type McuFlash = Ftfx<FtfxRegisterBlock>;

impl<ST: BlockWrites, SRL: serial::Write> Bootloader<ST, McuFlash, SRL> {
    pub fn new(storage: ST, serial: SRL) -> Self {
        let registers = unsafe { FtfxRegisterBlock::new() };
        let flash = Ftfx::new(registers, LAYOUT.flash, LAYOUT.sector_size, LAYOUT.program_unit);
        Bootloader::from_parts(storage, flash, LAYOUT, serial)
    }
}
