use crate::error::{Convertible, Error};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FakeError {
    Misaligned,
    OutOfBounds,
    /// Failure requested by the test itself.
    Injected,
}

impl Convertible for FakeError {
    fn into(self) -> Error { Error::DeviceError("A fake error occurred [TESTING ONLY]") }
}
