//! Diagnostic text channel.
//!
//! Anything `ufmt` can write to works as a diagnostic sink, so status
//! reports can be formatted without `core::fmt`.
use ufmt::uWrite;

pub trait Write: uWrite {}
impl<T: uWrite> Write for T {}
