//! Paged memory subsystem.
//!
//! Physical storage is committed lazily one page at a time by
//! [`PhysicalMemory`]; [`VirtualMemory`] owns that store exclusively and
//! exposes byte, half, word and double-word accessors over flat addresses.

/// Per-page metadata and storage.
pub mod page;

/// Sparse physical backing store.
pub mod phys;

/// Flat address space over the backing store.
pub mod virt;

pub use page::Page;
pub use phys::PhysicalMemory;
pub use virt::VirtualMemory;
