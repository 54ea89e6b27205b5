//! Flat virtual addresses.

use super::constants::{PAGE_OFFSET_MASK, PAGE_SHIFT};
use std::fmt;

/// A flat 64-bit address in the hart's address space.
///
/// Translation is stateless: the page id and offset are recomputed from
/// the raw value on every call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(u64);

impl VirtAddr {
    /// Wraps a raw address.
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Rebuilds a flat address from a page id and an in-page offset.
    pub const fn from_parts(page_id: u64, offset: u64) -> Self {
        Self((page_id << PAGE_SHIFT).wrapping_add(offset))
    }

    /// Returns the raw address value.
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Returns the page identifier (high bits).
    pub const fn page_id(self) -> u64 {
        self.0 >> PAGE_SHIFT
    }

    /// Returns the offset within the page (low bits).
    pub const fn page_offset(self) -> u64 {
        self.0 & PAGE_OFFSET_MASK
    }

    /// Returns the address `n` bytes further on, wrapping at the top of the
    /// address space.
    pub const fn add(self, n: u64) -> Self {
        Self(self.0.wrapping_add(n))
    }
}

impl From<u64> for VirtAddr {
    fn from(addr: u64) -> Self {
        Self(addr)
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
