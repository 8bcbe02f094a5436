//! Convenience macros for the loader project
#![macro_use]

/// Define and export a specific board port module (transparently pulls
/// its namespace to the current one).
///
/// Used mostly to conveniently fit the module declaration and reexport
/// under a single configuration flag.
///
/// # Example
/// ```ignore
/// #[cfg(feature = "frdm_k64f")]
/// port!(frdm_k64f: [bootloader,]);
/// // Expands into:
/// pub mod frdm_k64f { pub mod bootloader; }
/// pub use self::frdm_k64f::bootloader;
/// ```
#[macro_export]
macro_rules! port {
    ($mod:ident) => {
        pub mod $mod;
        pub use self::$mod::*;
    };
    ($outer:ident: [$($inner:ident,)+]) => {
        pub mod $outer {
        $(
            pub mod $inner;
        )+
        }
        $(
            pub use self::$outer::$inner;
        )+
    };
}
