//! Error types.
//!
//! Memory faults are returned as values rather than aborting, so that the
//! top-level driver (or a debugger) decides whether a fault is fatal.

use super::data::AccessType;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A fault raised while resolving an address through the backing store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemFault {
    /// The address resolves to a page that is not committed and the access
    /// is not allowed to commit it.
    #[error("PageFault: {access:?} at {addr:#x} hits unmapped page {page_id:#x}")]
    PageFault {
        addr: u64,
        page_id: u64,
        access: AccessType,
    },

    /// Committing a new page would exceed the physical memory ceiling.
    #[error("OutOfMemory: committing page {page_id:#x} exceeds the {capacity} byte ceiling")]
    CapacityExceeded { page_id: u64, capacity: u64 },
}

/// Errors raised while loading an ELF image.
#[derive(Debug, Error)]
pub enum ElfError {
    #[error("cannot open ELF file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while reading ELF file: {0}")]
    Io(#[from] io::Error),

    #[error("ELF image truncated: need {needed} bytes, file has {len}")]
    Truncated { needed: u64, len: u64 },

    #[error("e_ident[EI_MAG{index}] != {expected:#04x} (found {found:#04x}): not an ELF image")]
    BadMagic { index: usize, expected: u8, found: u8 },

    #[error("e_ident[EI_CLASS] != ELFCLASS64 (found {0}): only 64-bit images are supported")]
    UnsupportedClass(u8),

    #[error("e_ident[EI_DATA] != ELFDATA2LSB (found {0}): only little-endian images are supported")]
    UnsupportedEncoding(u8),

    #[error("e_machine != EM_RISCV (found {0}): only RISC-V images are supported")]
    UnsupportedMachine(u16),

    #[error("malformed program header table: {0}")]
    MalformedProgramHeaders(String),

    #[error("memory fault while storing segment: {0}")]
    Memory(#[from] MemFault),
}

/// Errors that stop the execution loop.
#[derive(Debug, Error)]
pub enum HartError {
    #[error("{0}")]
    Fault(#[from] MemFault),

    /// Reported by an executor that cannot carry out an instruction.
    #[error("execution failed at pc={pc:#x}: {reason}")]
    Execution { pc: u64, reason: String },
}

/// Errors raised while reading the TOML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
