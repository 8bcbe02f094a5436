//! Recognition of the image format from the first bytes of a file.

use super::FileType;
use crate::{
    devices::layout::Layout,
    utilities::{endian::Endianness, memory::Region},
};

/// Decides which decoder owns a new file, given its first chunk.
///
/// * A little endian first word inside RAM is the initial stack pointer of
///   a vector table: a raw binary image.
/// * A first word inside flash, read in the CodeWarrior header byte order,
///   is the load address of a CodeWarrior record.
/// * `S` followed by a record type digit starts an S-record file.
pub fn classify(layout: &Layout, bytes: &[u8]) -> FileType {
    let (stack_pointer, load_address) =
        match (Endianness::Little.read_u32(bytes), layout.header_endianness.read_u32(bytes)) {
            (Some(stack_pointer), Some(load_address)) => (stack_pointer, load_address),
            _ => return FileType::Unknown,
        };

    if layout.ram.contains(stack_pointer) {
        FileType::RawBinary
    } else if layout.flash.contains(load_address) {
        FileType::CodeWarrior
    } else if bytes[0] == b'S' && bytes[1].is_ascii_digit() {
        FileType::SRecord
    } else {
        FileType::Unknown
    }
}
