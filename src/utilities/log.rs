//! Logging front end.
//!
//! Forwards to `defmt` when the `defmt` feature is enabled, and expands to
//! nothing otherwise so host builds never need a global logger.

#[cfg(feature = "defmt")]
#[allow(unused_imports)]
pub(crate) use defmt::{debug, error, info, warn};

#[cfg(not(feature = "defmt"))]
macro_rules! discard {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
#[allow(unused_imports)]
pub(crate) use {discard as debug, discard as error, discard as info, discard as warn};
