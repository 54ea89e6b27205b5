//! Physical Backing Store.
//!
//! This module implements the sparse physical memory behind a hart's
//! address space. Pages are committed on the first write that touches
//! them; reads of uncommitted pages are page faults. The total amount of
//! committed memory is bounded by a ceiling fixed at construction time.

use super::page::Page;
use crate::common::{AccessType, MemFault, VirtAddr, PAGE_SIZE};
use std::collections::btree_map::{BTreeMap, Entry};
use tracing::debug;

/// Sparse collection of pages keyed by page id.
///
/// Pages are kept in an ordered map so that occupancy scans walk them in
/// address order.
pub struct PhysicalMemory {
    pages: BTreeMap<u64, Page>,
    capacity: u64,
}

impl PhysicalMemory {
    /// Creates an empty backing store.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Ceiling on committed memory in bytes. Committing a page
    ///   that would push the total past this value fails with
    ///   [`MemFault::CapacityExceeded`].
    pub fn new(capacity: u64) -> Self {
        Self {
            pages: BTreeMap::new(),
            capacity,
        }
    }

    /// Returns the configured ceiling in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Returns the number of committed pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns the number of committed bytes.
    pub fn committed_bytes(&self) -> u64 {
        self.pages.len() as u64 * PAGE_SIZE
    }

    /// Iterates over committed pages in ascending page-id order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    /// Returns `true` if `[offset, offset + size)` stays inside one page.
    pub fn fits_in_one_page(offset: u64, size: u64) -> bool {
        offset + size <= PAGE_SIZE
    }

    /// Resolves `(page_id, offset)` for a read or fetch.
    ///
    /// Never commits memory: a missing page is a page fault.
    ///
    /// # Returns
    ///
    /// The page storage from `offset` to the end of the page.
    pub fn resolve_read(
        &self,
        page_id: u64,
        offset: u64,
        access: AccessType,
    ) -> Result<&[u8], MemFault> {
        debug_assert!(!access.allocates(), "writes resolve through resolve_write");
        match self.pages.get(&page_id) {
            Some(page) => Ok(&page.bytes()[offset as usize..]),
            None => Err(MemFault::PageFault {
                addr: VirtAddr::from_parts(page_id, offset).val(),
                page_id,
                access,
            }),
        }
    }

    /// Resolves `(page_id, offset)` for a write, committing a zero-filled
    /// page first if none exists.
    ///
    /// # Returns
    ///
    /// The page storage from `offset` to the end of the page, or
    /// [`MemFault::CapacityExceeded`] if the page cannot be committed.
    pub fn resolve_write(&mut self, page_id: u64, offset: u64) -> Result<&mut [u8], MemFault> {
        let committed = self.committed_bytes();
        let page = match self.pages.entry(page_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if committed + PAGE_SIZE > self.capacity {
                    return Err(MemFault::CapacityExceeded {
                        page_id,
                        capacity: self.capacity,
                    });
                }
                debug!("[PhysMem] Committing page {:#x}", page_id);
                entry.insert(Page::new(page_id))
            }
        };
        Ok(&mut page.bytes_mut()[offset as usize..])
    }

    /// Looks up a committed page, faulting if it does not exist.
    pub fn page(&self, page_id: u64) -> Result<&Page, MemFault> {
        self.pages.get(&page_id).ok_or(MemFault::PageFault {
            addr: VirtAddr::from_parts(page_id, 0).val(),
            page_id,
            access: AccessType::Read,
        })
    }

    /// Mutable variant of [`page`](Self::page), used by occupancy tracking.
    pub fn page_mut(&mut self, page_id: u64) -> Result<&mut Page, MemFault> {
        self.pages.get_mut(&page_id).ok_or(MemFault::PageFault {
            addr: VirtAddr::from_parts(page_id, 0).val(),
            page_id,
            access: AccessType::Write,
        })
    }

    /// Finds the location right after the last occupied byte.
    ///
    /// Walks the committed pages from the highest id down and stops at the
    /// first page with a non-empty occupied prefix. Committed pages with
    /// nothing occupied are ignored. Cost is linear in the number of
    /// committed pages.
    ///
    /// # Returns
    ///
    /// `(page_id, offset)` of the next unoccupied byte, or `(0, 0)` when
    /// nothing is occupied yet.
    pub fn next_unoccupied(&self) -> (u64, u64) {
        for page in self.pages.values().rev() {
            if page.occupied_size() == 0 {
                continue;
            }
            if page.free_size() == 0 {
                return (page.id().wrapping_add(1), 0);
            }
            return (page.id(), page.free_pointer());
        }
        (0, 0)
    }
}
