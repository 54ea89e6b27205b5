//! ELF64 Header Parsing.
//!
//! Minimal decoding of the ELF file header and program header table. Only
//! 64-bit little-endian RISC-V images are accepted; every other image is
//! rejected with an error naming the header field that did not match.

use crate::common::ElfError;
use tracing::debug;

/// Size of the ELF64 file header.
pub const EHDR_SIZE: usize = 64;

/// Size of one ELF64 program header.
pub const PHDR_SIZE: usize = 56;

pub const ELFMAG: [u8; 4] = [0x7F, b'E', b'L', b'F'];
pub const EI_CLASS: usize = 4;
pub const EI_DATA: usize = 5;
pub const ELFCLASS64: u8 = 2;
pub const ELFDATA2LSB: u8 = 1;
pub const EM_RISCV: u16 = 243;
pub const PT_LOAD: u32 = 1;

fn u16_at(bytes: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([bytes[off], bytes[off + 1]])
}

fn u32_at(bytes: &[u8], off: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[off..off + 4]);
    u32::from_le_bytes(buf)
}

fn u64_at(bytes: &[u8], off: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[off..off + 8]);
    u64::from_le_bytes(buf)
}

/// The fields of the ELF file header the loader needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElfHeader {
    pub entry: u64,
    pub phoff: u64,
    pub phentsize: u16,
    pub phnum: u16,
}

impl ElfHeader {
    /// Decodes and validates an ELF64 file header.
    ///
    /// Checks, in order: the four magic bytes, `EI_CLASS`, `EI_DATA` and
    /// `e_machine`. The first mismatch is reported.
    pub fn parse(bytes: &[u8]) -> Result<Self, ElfError> {
        if bytes.len() < EHDR_SIZE {
            return Err(ElfError::Truncated {
                needed: EHDR_SIZE as u64,
                len: bytes.len() as u64,
            });
        }

        for (index, (&expected, &found)) in ELFMAG.iter().zip(&bytes[..4]).enumerate() {
            if expected != found {
                return Err(ElfError::BadMagic {
                    index,
                    expected,
                    found,
                });
            }
        }
        if bytes[EI_CLASS] != ELFCLASS64 {
            return Err(ElfError::UnsupportedClass(bytes[EI_CLASS]));
        }
        if bytes[EI_DATA] != ELFDATA2LSB {
            return Err(ElfError::UnsupportedEncoding(bytes[EI_DATA]));
        }
        let machine = u16_at(bytes, 18);
        if machine != EM_RISCV {
            return Err(ElfError::UnsupportedMachine(machine));
        }

        Ok(Self {
            entry: u64_at(bytes, 24),
            phoff: u64_at(bytes, 32),
            phentsize: u16_at(bytes, 54),
            phnum: u16_at(bytes, 56),
        })
    }

    /// Returns the byte range `(offset, size)` of the program header table
    /// after checking it lies within a file of `file_len` bytes.
    pub fn program_header_table(&self, file_len: u64) -> Result<(u64, u64), ElfError> {
        if self.phnum == 0 {
            return Ok((self.phoff, 0));
        }
        if self.phentsize as usize != PHDR_SIZE {
            return Err(ElfError::MalformedProgramHeaders(format!(
                "e_phentsize is {}, expected {}",
                self.phentsize, PHDR_SIZE
            )));
        }
        let size = self.phnum as u64 * PHDR_SIZE as u64;
        let end = self.phoff.checked_add(size).ok_or_else(|| {
            ElfError::MalformedProgramHeaders("e_phoff overflows".to_string())
        })?;
        if end > file_len {
            return Err(ElfError::MalformedProgramHeaders(format!(
                "table [{:#x}, {:#x}) extends past end of file ({:#x} bytes)",
                self.phoff, end, file_len
            )));
        }
        Ok((self.phoff, size))
    }
}

/// A `PT_LOAD` program header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadSegment {
    pub vaddr: u64,
    pub offset: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub flags: u32,
}

impl LoadSegment {
    /// Returns `true` if the segment carries more file bytes than it
    /// occupies in memory. Such segments are not loaded.
    pub fn is_oversized(&self) -> bool {
        self.filesz > self.memsz
    }
}

/// Parsed ELF header plus its loadable segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElfImage {
    pub entry: u64,
    pub segments: Vec<LoadSegment>,
}

impl ElfImage {
    /// Builds the image description from a validated header and the raw
    /// program header table.
    ///
    /// Only `PT_LOAD` entries are kept. Each kept segment's file range must
    /// lie within a file of `file_len` bytes.
    pub fn from_table(header: &ElfHeader, table: &[u8], file_len: u64) -> Result<Self, ElfError> {
        let mut segments = Vec::new();

        for (i, ph) in table.chunks_exact(PHDR_SIZE).enumerate() {
            let p_type = u32_at(ph, 0);
            if p_type != PT_LOAD {
                debug!("[ELF] phdr {}: type {:#x} is not PT_LOAD, skipping", i, p_type);
                continue;
            }

            let segment = LoadSegment {
                flags: u32_at(ph, 4),
                offset: u64_at(ph, 8),
                vaddr: u64_at(ph, 16),
                filesz: u64_at(ph, 32),
                memsz: u64_at(ph, 40),
            };

            let end = segment.offset.checked_add(segment.filesz);
            if !matches!(end, Some(end) if end <= file_len) {
                return Err(ElfError::MalformedProgramHeaders(format!(
                    "segment {} [{:#x} + {:#x}] extends past end of file ({:#x} bytes)",
                    i, segment.offset, segment.filesz, file_len
                )));
            }
            segments.push(segment);
        }

        Ok(Self {
            entry: header.entry,
            segments,
        })
    }

    /// Parses a complete in-memory ELF image.
    pub fn parse(bytes: &[u8]) -> Result<Self, ElfError> {
        let header = ElfHeader::parse(bytes)?;
        let file_len = bytes.len() as u64;
        let (offset, size) = header.program_header_table(file_len)?;
        let table = if size == 0 {
            &[][..]
        } else {
            &bytes[offset as usize..(offset + size) as usize]
        };
        Self::from_table(&header, table, file_len)
    }
}
