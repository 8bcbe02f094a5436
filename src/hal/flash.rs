//! Interface to a command-driven MCU flash controller.
use core::fmt;

/// Width of a single flash programming operation. Every program call
/// must start on a unit boundary and cover a whole number of units.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProgramUnit {
    /// 4 byte longword.
    Word,
    /// 8 byte phrase.
    Phrase,
}

impl ProgramUnit {
    pub const fn bytes(self) -> usize {
        match self {
            ProgramUnit::Word => 4,
            ProgramUnit::Phrase => 8,
        }
    }
}

/// Erases and programs flash through the controller's command protocol.
///
/// Both operations yield `WouldBlock` while the controller is still busy
/// with a previous command; once started, a command runs to completion.
pub trait Program {
    type Error: Clone + Copy + fmt::Debug;

    /// Erases the sector starting at `address`, leaving it all `0xFF`.
    fn erase_sector(&mut self, address: u32) -> nb::Result<(), Self::Error>;

    /// Programs `bytes` at `address`. Both must be aligned to the
    /// controller's program unit.
    fn program(&mut self, address: u32, bytes: &[u8]) -> nb::Result<(), Self::Error>;
}
