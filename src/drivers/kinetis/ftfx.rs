//! Flash memory controller (FTFA/FTFE) for the Kinetis family.
//!
//! Every operation is a command sequence: the command, its 24 bit address
//! and up to eight data bytes are staged in the FCCOB registers, then the
//! command is launched by writing `CCIF` to `FSTAT` and the controller is
//! polled until it reports completion.
//!
//! The flash array can't serve instruction fetches while it is being
//! modified, so the launch-and-wait step runs from RAM with interrupts
//! masked for the whole sequence.

use crate::{
    error::{self, Convertible},
    hal::flash::{Program, ProgramUnit},
    utilities::memory::AddressRange,
};
use bitflags::bitflags;

/// Command complete.
const CCIF: u8 = 0x80;
const RDCOLERR: u8 = 0x40;
const ACCERR: u8 = 0x20;
const FPVIOL: u8 = 0x10;
const MGSTAT0: u8 = 0x01;

const ERASE_FLASH_SECTOR: u8 = 0x09;
const PROGRAM_LONGWORD: u8 = 0x06;
const PROGRAM_PHRASE: u8 = 0x07;

/// Index of the first FCCOB data register.
const FCCOB_DATA: usize = 4;

bitflags! {
    /// Failures reported by the controller after a command.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Fault: u8 {
        const READ_COLLISION = RDCOLERR;
        const ACCESS = ACCERR;
        const PROTECTION = FPVIOL;
        const VERIFY = MGSTAT0;
    }
}

/// Status flags in the order they are inspected after a command.
const FAULT_PRIORITY: [(u8, Fault); 4] = [
    (ACCERR, Fault::ACCESS),
    (FPVIOL, Fault::PROTECTION),
    (RDCOLERR, Fault::READ_COLLISION),
    (MGSTAT0, Fault::VERIFY),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Misaligned,
    OutOfBounds,
    Controller(Fault),
}

impl Convertible for Error {
    fn into(self) -> error::Error {
        error::Error::DriverError(match self {
            Error::Misaligned => "Flash access misaligned",
            Error::OutOfBounds => "Flash access out of bounds",
            Error::Controller(fault) if fault.contains(Fault::ACCESS) => "Flash access error",
            Error::Controller(fault) if fault.contains(Fault::PROTECTION) => {
                "Flash protection violation"
            }
            Error::Controller(fault) if fault.contains(Fault::READ_COLLISION) => {
                "Flash read collision"
            }
            Error::Controller(_) => "Flash verify failure",
        })
    }
}

/// Raw access to the controller registers.
pub trait Registers {
    /// Reads `FSTAT`.
    fn status(&self) -> u8;
    /// Writes `FSTAT`. Error flags are cleared by writing ones to them.
    fn write_status(&mut self, value: u8);
    /// Writes FCCOB register number `index` (0 to 0xB).
    fn write_fccob(&mut self, index: usize, value: u8);
    /// Launches the staged command and returns once the controller is idle.
    fn launch(&mut self);
}

/// Memory mapped FTFx register block.
pub struct FtfxRegisterBlock {
    base: *mut u8,
}

impl FtfxRegisterBlock {
    pub const BASE_ADDRESS: usize = 0x4002_0000;

    /// # Safety
    ///
    /// Must be called at most once, and only on a part that maps the
    /// controller at `BASE_ADDRESS`.
    pub unsafe fn new() -> Self { Self { base: Self::BASE_ADDRESS as *mut u8 } }

    // FCCOB registers are laid out in big endian groups of four after FSTAT.
    fn fccob_offset(index: usize) -> usize { (index & !3) + 4 + (3 - (index & 3)) }
}

impl Registers for FtfxRegisterBlock {
    fn status(&self) -> u8 {
        // NOTE(Safety): FSTAT sits at the base of the block.
        unsafe { self.base.read_volatile() }
    }

    fn write_status(&mut self, value: u8) { unsafe { self.base.write_volatile(value) } }

    fn write_fccob(&mut self, index: usize, value: u8) {
        unsafe { self.base.add(Self::fccob_offset(index)).write_volatile(value) }
    }

    fn launch(&mut self) { unsafe { launch_and_wait(self.base) } }
}

/// Starts the staged command and spins until it completes. Must not touch
/// flash, so it is kept out of line and placed in RAM.
#[inline(never)]
#[cfg_attr(target_os = "none", link_section = ".data.ramfunc")]
unsafe fn launch_and_wait(fstat: *mut u8) {
    fstat.write_volatile(CCIF);
    while fstat.read_volatile() & CCIF == 0 {}
}

#[cfg(target_arch = "arm")]
fn with_interrupts_disabled<T>(f: impl FnOnce() -> T) -> T { cortex_m::interrupt::free(|_| f()) }

#[cfg(not(target_arch = "arm"))]
fn with_interrupts_disabled<T>(f: impl FnOnce() -> T) -> T { f() }

pub struct Ftfx<R: Registers> {
    registers: R,
    range: AddressRange,
    sector_size: usize,
    unit: ProgramUnit,
}

impl<R: Registers> Ftfx<R> {
    pub fn new(registers: R, range: AddressRange, sector_size: usize, unit: ProgramUnit) -> Self {
        Self { registers, range, sector_size, unit }
    }

    fn is_ready(&self) -> bool { self.registers.status() & CCIF == CCIF }

    fn check_bounds(&self, address: u32, length: usize) -> Result<(), Error> {
        let end = address as u64 + length as u64;
        if address < self.range.min || end > self.range.max as u64 + 1 {
            Err(Error::OutOfBounds)
        } else {
            Ok(())
        }
    }

    /// Stages and runs a single command. The controller must be idle.
    fn execute(&mut self, command: u8, address: u32, data: &[u8]) -> Result<(), Error> {
        let registers = &mut self.registers;
        let status = with_interrupts_disabled(|| {
            let stale = registers.status() & (ACCERR | FPVIOL);
            if stale != 0 {
                registers.write_status(stale);
            }
            registers.write_fccob(0, command);
            registers.write_fccob(1, (address >> 16) as u8);
            registers.write_fccob(2, (address >> 8) as u8);
            registers.write_fccob(3, address as u8);
            for (i, byte) in data.iter().enumerate() {
                registers.write_fccob(FCCOB_DATA + (i & !3) + (3 - (i & 3)), *byte);
            }
            registers.launch();
            registers.status()
        });

        let mut fault = Fault::empty();
        for (flag, kind) in FAULT_PRIORITY {
            if status & flag != 0 {
                // MGSTAT0 is read only; it clears with the next command.
                if flag != MGSTAT0 {
                    self.registers.write_status(flag);
                }
                fault |= kind;
            }
        }
        if fault.is_empty() {
            Ok(())
        } else {
            Err(Error::Controller(fault))
        }
    }
}

impl<R: Registers> Program for Ftfx<R> {
    type Error = Error;

    fn erase_sector(&mut self, address: u32) -> nb::Result<(), Self::Error> {
        if address.wrapping_sub(self.range.min) as usize % self.sector_size != 0 {
            return Err(nb::Error::Other(Error::Misaligned));
        }
        self.check_bounds(address, self.sector_size)?;
        if !self.is_ready() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.execute(ERASE_FLASH_SECTOR, address, &[])?)
    }

    fn program(&mut self, address: u32, bytes: &[u8]) -> nb::Result<(), Self::Error> {
        let unit = self.unit.bytes();
        if address as usize % unit != 0 || bytes.len() % unit != 0 {
            return Err(nb::Error::Other(Error::Misaligned));
        }
        self.check_bounds(address, bytes.len())?;
        if !self.is_ready() {
            return Err(nb::Error::WouldBlock);
        }
        let command = match self.unit {
            ProgramUnit::Word => PROGRAM_LONGWORD,
            ProgramUnit::Phrase => PROGRAM_PHRASE,
        };
        // Each command waits for completion, so the controller is idle again
        // by the time the next unit is staged.
        for (i, chunk) in bytes.chunks(unit).enumerate() {
            self.execute(command, address + (i * unit) as u32, chunk)?;
        }
        Ok(())
    }
}
