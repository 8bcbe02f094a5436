//! Erase-on-first-write access to flash.
//!
//! Image formats carry no erase instructions, so every sector is erased
//! the first time a session programs into it.

use super::Error;
use crate::{
    devices::{layout::{Layout, MAX_SECTORS}, traits::Flash},
    error,
    utilities::log::debug,
};
use nb::block;

/// Set of flash sectors already erased during the current session.
pub struct ErasedSectors {
    bits: [u32; MAX_SECTORS / 32],
}

impl ErasedSectors {
    pub const fn new() -> Self { Self { bits: [0; MAX_SECTORS / 32] } }

    pub fn contains(&self, index: usize) -> bool {
        index < MAX_SECTORS && self.bits[index / 32] & (1 << (index % 32)) != 0
    }

    pub fn insert(&mut self, index: usize) {
        if index < MAX_SECTORS {
            self.bits[index / 32] |= 1 << (index % 32);
        }
    }

    pub fn clear(&mut self) { self.bits = [0; MAX_SECTORS / 32]; }
}

impl Default for ErasedSectors {
    fn default() -> Self { Self::new() }
}

/// Flash as seen by the decoders: erases sectors on demand and folds
/// controller errors into loader errors.
pub struct FlashWriter<'a, F: Flash> {
    flash: &'a mut F,
    layout: &'a Layout,
    erased: &'a mut ErasedSectors,
}

impl<'a, F: Flash> FlashWriter<'a, F> {
    pub fn new(flash: &'a mut F, layout: &'a Layout, erased: &'a mut ErasedSectors) -> Self {
        Self { flash, layout, erased }
    }

    pub fn layout(&self) -> &Layout { self.layout }

    /// Programs `bytes` at `address`, erasing every sector they touch that
    /// wasn't erased yet. Sectors below the protected address are never
    /// erased.
    pub fn program(&mut self, address: u32, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        let last = address.saturating_add(bytes.len() as u32 - 1);
        if let (Some(first), Some(last)) =
            (self.layout.sector_index(address), self.layout.sector_index(last))
        {
            for index in first..=last {
                let start = self.layout.sector_start(index);
                if start < self.layout.protected_address || self.erased.contains(index) {
                    continue;
                }
                debug!("Erasing sector at {:?}", start);
                block!(self.flash.erase_sector(start)).map_err(flash_error)?;
                self.erased.insert(index);
            }
        }
        block!(self.flash.program(address, bytes)).map_err(flash_error)
    }
}

fn flash_error<E: error::Convertible>(e: E) -> Error { Error::Flash(error::Error::from(e)) }
