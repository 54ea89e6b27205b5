//! Physical Page.
//!
//! A page is the unit of lazy allocation. Besides its storage it carries a
//! single high-water mark, the free pointer, which marks the end of the
//! occupied prefix `[0, free_pointer)`. Fill inside a page is assumed to be
//! sequential; no byte-granular occupancy is kept.

use crate::common::PAGE_SIZE;

/// One fixed-size physical page.
pub struct Page {
    id: u64,
    free_pointer: u64,
    data: Box<[u8]>,
}

impl Page {
    /// Creates a zero-filled page with an empty occupied prefix.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            free_pointer: 0,
            data: vec![0u8; PAGE_SIZE as usize].into_boxed_slice(),
        }
    }

    /// Returns the page identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the offset of the first unoccupied byte.
    pub fn free_pointer(&self) -> u64 {
        self.free_pointer
    }

    /// Moves the free pointer.
    ///
    /// Only the occupancy tracking in [`VirtualMemory`](super::VirtualMemory)
    /// should call this. Moving the pointer backwards re-opens space that was
    /// already counted as occupied.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is larger than `PAGE_SIZE`.
    pub fn set_free_pointer(&mut self, offset: u64) {
        assert!(
            offset <= PAGE_SIZE,
            "free pointer {offset:#x} past end of page {:#x}",
            self.id
        );
        self.free_pointer = offset;
    }

    /// Number of bytes in the occupied prefix.
    pub fn occupied_size(&self) -> u64 {
        self.free_pointer
    }

    /// Number of bytes after the occupied prefix.
    pub fn free_size(&self) -> u64 {
        PAGE_SIZE - self.free_pointer
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
