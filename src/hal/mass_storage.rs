//! Interface to the mass-storage class driver.
//!
//! The USB stack and its emulated filesystem live outside this crate. All
//! the loader needs from them is the stream of file-level write events, in
//! the order the host issues them.

/// A single write event, as seen by the storage layer.
#[derive(Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// The host opened a new file. Any transfer in progress is abandoned.
    NewFile,
    /// A block of file data, `sector` being its logical block offset
    /// inside the file.
    Chunk { sector: u32, bytes: &'a [u8] },
    /// The host finished writing the file.
    EndOfFile,
}

/// Source of mass-storage write events.
pub trait BlockWrites {
    /// Returns the next pending event, if any. Never blocks.
    fn next_event(&mut self) -> Option<Event<'_>>;
}
