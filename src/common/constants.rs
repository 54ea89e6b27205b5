//! Paging constants.
//!
//! A flat 64-bit address is split into a page identifier (the bits above
//! `PAGE_SHIFT`) and an in-page offset (the low `PAGE_SHIFT` bits).

/// Number of offset bits in an address (4 KiB pages).
pub const PAGE_SHIFT: u64 = 12;

/// Size of one physical page in bytes.
pub const PAGE_SIZE: u64 = 1 << PAGE_SHIFT;

/// Mask selecting the in-page offset of an address.
pub const PAGE_OFFSET_MASK: u64 = PAGE_SIZE - 1;

/// Default ceiling on committed physical memory (16 GiB).
pub const DEFAULT_PHYS_CAPACITY: u64 = 16 * 1024 * 1024 * 1024;
