//! Utilities to manipulate target memory ranges

/// Abstract region that can contain addresses
pub trait Region {
    fn contains(&self, address: u32) -> bool;
}

/// Range of 32 bit addresses, inclusive on both ends.
///
/// Both ends are inclusive because the top of RAM is a legitimate value
/// for an initial stack pointer, and because the last flash address must
/// be representable on parts whose flash reaches the end of the map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressRange {
    pub min: u32,
    pub max: u32,
}

impl AddressRange {
    pub const fn new(min: u32, max: u32) -> Self { Self { min, max } }

    pub const fn is_valid(&self) -> bool { self.max >= self.min }

    pub const fn overlaps(&self, other: &AddressRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Number of bytes spanned by the range.
    pub const fn size(&self) -> usize { (self.max - self.min) as usize + 1 }
}

impl Region for AddressRange {
    fn contains(&self, address: u32) -> bool { (self.min..=self.max).contains(&address) }
}

/// Rounds an address down to a multiple of `alignment` (a power of two).
pub const fn align_down(address: u32, alignment: usize) -> u32 {
    address & !(alignment as u32 - 1)
}

/// Number of bytes needed to round `length` up to a multiple of `alignment`.
pub const fn padding_to(length: usize, alignment: usize) -> usize {
    (alignment - length % alignment) % alignment
}
