//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used by the
//! backing store. Reads and fetches never commit new pages; writes may
//! legitimately extend the address space.

/// Type of memory access operation.
///
/// Used to pick the resolution entry point on the backing store and to
/// classify the resulting page fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch access.
    ///
    /// Used when fetching instruction words for execution.
    Fetch,

    /// Data read access.
    Read,

    /// Data write access.
    ///
    /// Commits the backing page on first touch.
    Write,
}

impl AccessType {
    /// Returns `true` if an access of this type may commit a missing page.
    pub fn allocates(self) -> bool {
        matches!(self, AccessType::Write)
    }
}
