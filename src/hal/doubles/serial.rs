use core::convert::Infallible;
use ufmt::uWrite;

/// Diagnostic channel double capturing everything written to it.
#[derive(Default, Debug)]
pub struct FakeSerial {
    pub output: String,
}

impl uWrite for FakeSerial {
    type Error = Infallible;
    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.output.push_str(s);
        Ok(())
    }
}
