//! # USB Mass-Storage Firmware Loader Library
//!
//! This crate contains all functionality for the mass-storage
//! firmware loader in library form: the streaming image decoders,
//! the flash programming engine, and the board ports that tie
//! them to specific Kinetis MCUs.
#![cfg_attr(test, allow(unused_imports))]
#![cfg_attr(target_arch = "arm", no_std)]

extern crate static_assertions;

#[macro_use]
pub mod utilities {
    pub mod endian;
    pub mod hex;
    pub(crate) mod log;
    pub mod memory;
    mod macros;
}

pub mod hal;
pub mod devices;
pub mod drivers;
pub mod ports;
pub mod error;
