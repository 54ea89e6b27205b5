//! Virtual Memory.
//!
//! This module implements the flat address space seen by a hart. Every
//! access translates its address into `(page id, offset)` and resolves it
//! through the exclusively owned [`PhysicalMemory`]. Stores commit pages on
//! demand; loads and fetches of uncommitted pages return a page fault.
//!
//! Multi-byte accesses take a fast path when the access stays within one
//! page: a single little-endian access on the page storage. Accesses that
//! straddle a page boundary are split into two halves of half the width,
//! recursively, down to single bytes.

use super::phys::PhysicalMemory;
use crate::common::constants::DEFAULT_PHYS_CAPACITY;
use crate::common::{AccessType, ElfError, MemFault, VirtAddr};
use crate::sim::loader;
use std::path::Path;

/// Flat address space backed by lazily committed pages.
pub struct VirtualMemory {
    ram: PhysicalMemory,
}

impl Default for VirtualMemory {
    /// Returns an address space with the default 16 GiB ceiling.
    fn default() -> Self {
        Self::new(DEFAULT_PHYS_CAPACITY)
    }
}

/// Copies the first `N` bytes of a resolved page slice.
fn le_bytes<const N: usize>(slot: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&slot[..N]);
    buf
}

impl VirtualMemory {
    /// Creates an empty address space with a fresh backing store.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Ceiling on committed physical memory in bytes.
    pub fn new(capacity: u64) -> Self {
        Self {
            ram: PhysicalMemory::new(capacity),
        }
    }

    /// Read-only view of the backing store.
    pub fn physical(&self) -> &PhysicalMemory {
        &self.ram
    }

    /// Splits a flat address into `(page_id, offset)`.
    pub fn translate(addr: u64) -> (u64, u64) {
        let vaddr = VirtAddr::new(addr);
        (vaddr.page_id(), vaddr.page_offset())
    }

    /// Writes one byte, committing the page if needed.
    pub fn store_u8(&mut self, addr: u64, val: u8) -> Result<(), MemFault> {
        let (page_id, offset) = Self::translate(addr);
        let slot = self.ram.resolve_write(page_id, offset)?;
        slot[0] = val;
        Ok(())
    }

    /// Reads one byte.
    pub fn load_u8(&self, addr: u64) -> Result<u8, MemFault> {
        self.load_u8_as(addr, AccessType::Read)
    }

    fn load_u8_as(&self, addr: u64, access: AccessType) -> Result<u8, MemFault> {
        let (page_id, offset) = Self::translate(addr);
        let slot = self.ram.resolve_read(page_id, offset, access)?;
        Ok(slot[0])
    }

    /// Writes a little-endian half-word.
    pub fn store_u16(&mut self, addr: u64, val: u16) -> Result<(), MemFault> {
        let (page_id, offset) = Self::translate(addr);
        if PhysicalMemory::fits_in_one_page(offset, 2) {
            let slot = self.ram.resolve_write(page_id, offset)?;
            slot[..2].copy_from_slice(&val.to_le_bytes());
            return Ok(());
        }
        self.store_u8(addr, val as u8)?;
        self.store_u8(addr.wrapping_add(1), (val >> 8) as u8)
    }

    /// Reads a little-endian half-word.
    pub fn load_u16(&self, addr: u64) -> Result<u16, MemFault> {
        self.load_u16_as(addr, AccessType::Read)
    }

    fn load_u16_as(&self, addr: u64, access: AccessType) -> Result<u16, MemFault> {
        let (page_id, offset) = Self::translate(addr);
        if PhysicalMemory::fits_in_one_page(offset, 2) {
            let slot = self.ram.resolve_read(page_id, offset, access)?;
            return Ok(u16::from_le_bytes(le_bytes(slot)));
        }
        let lo = self.load_u8_as(addr, access)? as u16;
        let hi = self.load_u8_as(addr.wrapping_add(1), access)? as u16;
        Ok(lo | (hi << 8))
    }

    /// Writes a little-endian word.
    pub fn store_u32(&mut self, addr: u64, val: u32) -> Result<(), MemFault> {
        let (page_id, offset) = Self::translate(addr);
        if PhysicalMemory::fits_in_one_page(offset, 4) {
            let slot = self.ram.resolve_write(page_id, offset)?;
            slot[..4].copy_from_slice(&val.to_le_bytes());
            return Ok(());
        }
        self.store_u16(addr, val as u16)?;
        self.store_u16(addr.wrapping_add(2), (val >> 16) as u16)
    }

    /// Reads a little-endian word.
    pub fn load_u32(&self, addr: u64) -> Result<u32, MemFault> {
        self.load_u32_as(addr, AccessType::Read)
    }

    /// Fetches a 32-bit instruction word.
    ///
    /// Identical to [`load_u32`](Self::load_u32) except that a fault is
    /// reported as a fetch fault.
    pub fn fetch_u32(&self, addr: u64) -> Result<u32, MemFault> {
        self.load_u32_as(addr, AccessType::Fetch)
    }

    fn load_u32_as(&self, addr: u64, access: AccessType) -> Result<u32, MemFault> {
        let (page_id, offset) = Self::translate(addr);
        if PhysicalMemory::fits_in_one_page(offset, 4) {
            let slot = self.ram.resolve_read(page_id, offset, access)?;
            return Ok(u32::from_le_bytes(le_bytes(slot)));
        }
        let lo = self.load_u16_as(addr, access)? as u32;
        let hi = self.load_u16_as(addr.wrapping_add(2), access)? as u32;
        Ok(lo | (hi << 16))
    }

    /// Writes a little-endian double-word.
    pub fn store_u64(&mut self, addr: u64, val: u64) -> Result<(), MemFault> {
        let (page_id, offset) = Self::translate(addr);
        if PhysicalMemory::fits_in_one_page(offset, 8) {
            let slot = self.ram.resolve_write(page_id, offset)?;
            slot[..8].copy_from_slice(&val.to_le_bytes());
            return Ok(());
        }
        self.store_u32(addr, val as u32)?;
        self.store_u32(addr.wrapping_add(4), (val >> 32) as u32)
    }

    /// Reads a little-endian double-word.
    pub fn load_u64(&self, addr: u64) -> Result<u64, MemFault> {
        let (page_id, offset) = Self::translate(addr);
        if PhysicalMemory::fits_in_one_page(offset, 8) {
            let slot = self.ram.resolve_read(page_id, offset, AccessType::Read)?;
            return Ok(u64::from_le_bytes(le_bytes(slot)));
        }
        let lo = self.load_u32(addr)? as u64;
        let hi = self.load_u32(addr.wrapping_add(4))? as u64;
        Ok(lo | (hi << 32))
    }

    /// Stores a byte sequence and records it as occupied.
    ///
    /// Bytes are copied page by page; every touched page is committed. After
    /// the copy the occupied prefix of each touched page is extended to
    /// cover the written range. An empty slice is a no-op.
    ///
    /// If a page cannot be committed, the bytes already copied stay written
    /// and are still recorded as occupied before the fault is returned.
    pub fn store_bytes(&mut self, addr: u64, bytes: &[u8]) -> Result<(), MemFault> {
        let mut written = 0usize;
        let mut fault = None;
        while written < bytes.len() {
            let (page_id, offset) = Self::translate(addr.wrapping_add(written as u64));
            let slot = match self.ram.resolve_write(page_id, offset) {
                Ok(slot) => slot,
                Err(err) => {
                    fault = Some(err);
                    break;
                }
            };
            let chunk = (bytes.len() - written).min(slot.len());
            slot[..chunk].copy_from_slice(&bytes[written..written + chunk]);
            written += chunk;
        }

        self.track_occupancy(addr, written as u64)?;
        match fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Reads `len` bytes into a freshly allocated vector.
    ///
    /// The vector grows one page chunk at a time, so a length far beyond
    /// the mapped range faults instead of over-allocating.
    pub fn load_bytes(&self, addr: u64, len: usize) -> Result<Vec<u8>, MemFault> {
        let mut out = Vec::new();
        let mut cursor = addr;
        while out.len() < len {
            let (page_id, offset) = Self::translate(cursor);
            let slot = self.ram.resolve_read(page_id, offset, AccessType::Read)?;
            let chunk = (len - out.len()).min(slot.len());
            out.extend_from_slice(&slot[..chunk]);
            cursor = cursor.wrapping_add(chunk as u64);
        }
        Ok(out)
    }

    /// Extends the occupied prefixes to cover `[addr, addr + len)`.
    ///
    /// Walks the range page by page:
    ///
    /// * Cursor below the free pointer: that part is already tracked, skip
    ///   forward to the free pointer.
    /// * Cursor above the free pointer: the free pointer jumps to the cursor.
    ///   The bytes in between were never written but now count as
    ///   occupied. This mirrors the single high-water-mark model; a
    ///   byte-granular bitmap would be needed to avoid it.
    /// * Cursor at the free pointer: advance it by what is left, capped at
    ///   the end of the page, and carry the remainder into the next page.
    fn track_occupancy(&mut self, addr: u64, len: u64) -> Result<(), MemFault> {
        let mut cursor = addr;
        let mut remaining = len;
        while remaining != 0 {
            let (page_id, offset) = Self::translate(cursor);
            let page = self.ram.page_mut(page_id)?;
            let free_ptr = page.free_pointer();

            if offset < free_ptr {
                let skip = remaining.min(free_ptr - offset);
                remaining -= skip;
                cursor = cursor.wrapping_add(skip);
                continue;
            }
            if offset > free_ptr {
                page.set_free_pointer(offset);
            }

            let advance = remaining.min(page.free_size());
            page.set_free_pointer(offset + advance);
            remaining -= advance;
            cursor = cursor.wrapping_add(advance);
        }
        Ok(())
    }

    /// Returns the address right after the last occupied byte.
    ///
    /// Acts as a bump allocator for placing sequential data: storing `L > 0`
    /// bytes at the returned address moves the next result past them.
    pub fn next_continuous_block(&self) -> VirtAddr {
        let (page_id, offset) = self.ram.next_unoccupied();
        VirtAddr::from_parts(page_id, offset)
    }

    /// Loads the `PT_LOAD` segments of an ELF image into this address space.
    ///
    /// # Returns
    ///
    /// The entry point declared in the ELF header.
    pub fn store_elf_file(&mut self, path: impl AsRef<Path>) -> Result<u64, ElfError> {
        loader::load_elf(self, path)
    }
}
