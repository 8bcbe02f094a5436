//! Error types for the loader project as a whole.

use crate::hal::serial::Write;
use ufmt::uwriteln;

/// Top level error type for the loader. Unlike the specific
/// module errors, this error contains textual descriptions of the
/// problem as it is meant to be directly reported through serial.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Error caused by a low level peripheral driver
    DriverError(&'static str),
    /// Error caused by a faulty configuration
    ConfigurationError(&'static str),
    /// Error caused by a high level device driver
    DeviceError(&'static str),
    UnsupportedFile,
    RecordMalformed,
    ChecksumMismatch,
    AddressOutOfRange,
    ImageTruncated,
}

pub trait Convertible {
    fn into(self) -> Error;
}

impl<T: Convertible> From<T> for Error {
    fn from(t: T) -> Self { t.into() }
}

/// Exposes a report_unwrap() method that behaves like
/// unwrap(), but also reports any errors via serial before panicking.
pub trait ReportOnUnwrap<T, S: Write> {
    fn report_unwrap(self, serial: &mut S) -> T;
}

impl<T, S: Write> ReportOnUnwrap<T, S> for Result<T, Error> {
    fn report_unwrap(self, serial: &mut S) -> T {
        match self {
            Ok(value) => value,
            Err(error) => {
                error.report(serial);
                panic!();
            }
        }
    }
}

impl Error {
    /// Reports error via abstract serial device
    pub fn report<S: Write>(&self, serial: &mut S) {
        // Nothing sensible can be done if the diagnostic channel itself fails.
        let _ = match self {
            Error::DriverError(text) => uwriteln!(serial, "[Driver Error] -> {}", text),
            Error::ConfigurationError(text) => {
                uwriteln!(serial, "[Configuration Error] -> {}", text)
            }
            Error::DeviceError(text) => uwriteln!(serial, "[Device Error] -> {}", text),
            Error::UnsupportedFile => {
                uwriteln!(serial, "[Image Error] -> Unsupported file (not BIN, CodeWarrior or S19)")
            }
            Error::RecordMalformed => uwriteln!(serial, "[Image Error] -> Malformed record"),
            Error::ChecksumMismatch => {
                uwriteln!(serial, "[Image Error] -> Record checksum mismatch")
            }
            Error::AddressOutOfRange => {
                uwriteln!(serial, "[Image Error] -> Record targets protected or invalid memory")
            }
            Error::ImageTruncated => {
                uwriteln!(serial, "[Image Error] -> Image ended before its last record")
            }
        };
    }
}
