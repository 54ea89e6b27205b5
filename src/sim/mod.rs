//! Simulation harness: binary loaders and memory dumps.

/// ELF64 header and program header decoding.
pub mod elf;

/// Hex dump formatting.
pub mod dump;

/// Loading ELF images into a hart's address space.
pub mod loader;

pub use elf::{ElfHeader, ElfImage, LoadSegment};
pub use loader::{load_elf, load_elf_image, read_elf};
