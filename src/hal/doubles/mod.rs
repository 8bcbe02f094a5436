//! Test doubles for the hardware abstraction layer.

pub mod error;
pub mod flash;
pub mod mass_storage;
pub mod serial;
