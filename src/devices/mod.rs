//! Complex modules with business logic related to the problem
//! domain, that lay on top of abstract drivers. Devices are
//! generic, while board specifics (memory map, flash controller)
//! are handled in the `ports` module.

pub mod bootloader;
pub mod layout;
pub mod loader;

/// General purpose traits that summarize requirements on devices.
pub mod traits {
    use crate::{error, hal::flash};

    /// A supported flash must be able to erase, program, and report
    /// errors to the loader.
    pub trait Flash: flash::Program<Error: error::Convertible> {}
    impl<T: flash::Program<Error: error::Convertible>> Flash for T {}
}
