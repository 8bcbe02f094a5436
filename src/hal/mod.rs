//! Hardware Abstraction Layer, containing interfaces
//! for low level drivers and external collaborators.
#![macro_use]

pub mod flash;
pub mod mass_storage;
pub mod serial;

#[cfg(not(target_arch = "arm"))]
#[doc(hidden)]
pub mod doubles;
