//! Common utilities and types used throughout the hart simulator.
//!
//! This module provides fundamental types for addresses, memory access
//! classification and error handling that are shared across the memory
//! subsystem, the loader and the execution loop.

/// Flat virtual address type.
pub mod addr;

/// Paging constants shared by every component.
pub mod constants;

/// Memory access type definitions.
pub mod data;

/// Error types for memory faults, ELF loading and execution.
pub mod error;

pub use addr::VirtAddr;
pub use constants::{PAGE_OFFSET_MASK, PAGE_SHIFT, PAGE_SIZE};
pub use data::AccessType;
pub use error::{ConfigError, ElfError, HartError, MemFault};
