//! Generic Bootloader.
//!
//! This module contains the foreground loop of the loader, with
//! the exception of how to construct one. Construction is
//! handled by the `port` module as it depends on board
//! specific information.
//!
//! The loop is the only caller of the image loader: it pulls write events
//! from the mass-storage layer one at a time and processes each to
//! completion before looking at the next.
use super::{
    layout::Layout,
    loader::{Loader, Status},
    traits::Flash,
};
use crate::{
    error::Error,
    hal::{
        mass_storage::{BlockWrites, Event},
        serial,
    },
    utilities::log::warn,
};
use ufmt::uwriteln;

pub struct Bootloader<ST: BlockWrites, F: Flash, SRL: serial::Write> {
    pub(crate) storage: ST,
    pub(crate) loader: Loader<F>,
    pub(crate) serial: SRL,
    /// Logical block the next chunk is expected at.
    pub(crate) next_sector: u32,
}

impl<ST: BlockWrites, F: Flash, SRL: serial::Write> Bootloader<ST, F, SRL> {
    pub fn from_parts(storage: ST, flash: F, layout: Layout, serial: SRL) -> Self {
        Self { storage, loader: Loader::new(flash, layout), serial, next_sector: 0 }
    }

    /// Main loader routine. Never returns; the host resets the board once
    /// the image is in place.
    pub fn run(mut self) -> ! {
        let _ = uwriteln!(self.serial, "-- MSD Loader Initialised --");
        let _ = uwriteln!(self.serial, "Copy a BIN, CodeWarrior or S19 image to the drive.");
        loop {
            self.poll();
        }
    }

    /// Handles a single storage event, if any is pending, and returns the
    /// resulting loader status.
    pub fn poll(&mut self) -> Option<Status> {
        let previous = self.loader.status();
        match self.storage.next_event()? {
            Event::NewFile => {
                self.loader.on_new_file();
                self.next_sector = 0;
            }
            Event::Chunk { sector, bytes } => {
                if sector != self.next_sector {
                    warn!("Chunk at sector {:?} arrived out of order", sector);
                }
                self.next_sector = sector.wrapping_add(1);
                self.loader.on_chunk(bytes);
            }
            Event::EndOfFile => {
                self.loader.on_end_of_file();
            }
        }

        let status = self.loader.status();
        if status != previous {
            self.report(status);
        }
        Some(status)
    }

    pub fn loader(&self) -> &Loader<F> { &self.loader }

    fn report(&mut self, status: Status) {
        let _ = match status {
            Status::Ready => Ok(()),
            Status::Started => {
                uwriteln!(self.serial, "Receiving {} image...", self.loader.file_type().name())
            }
            Status::Success => uwriteln!(
                self.serial,
                "Image loaded successfully. Reset the board to start the application."
            ),
            Status::S19Error | Status::FlashError | Status::Unsupported => {
                if let Some(error) = self.loader.last_error() {
                    Error::from(error).report(&mut self.serial);
                }
                uwriteln!(self.serial, "Image load aborted. Copy the image again to retry.")
            }
        };
    }
}
