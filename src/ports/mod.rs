//! Full project ports for specific targets. They mainly
//! provide a method to construct a generic bootloader from
//! specific parts.

/// Memory layout generated at build time from the port's configuration.
#[cfg(any(feature = "frdm_k64f", feature = "frdm_kl26z"))]
pub mod layout {
    include!(concat!(env!("OUT_DIR"), "/layout.rs"));
}

#[cfg(feature = "frdm_k64f")]
port!(frdm_k64f: [bootloader,]);

#[cfg(feature = "frdm_kl26z")]
port!(frdm_kl26z: [bootloader,]);
