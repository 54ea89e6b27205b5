//! ELF Program Loader.
//!
//! This module copies the loadable segments of a RISC-V ELF image into a
//! [`VirtualMemory`]. The header and every segment are read and validated
//! before the first byte is stored, so a rejected image leaves the address
//! space untouched.

use super::elf::{ElfHeader, ElfImage, EHDR_SIZE};
use crate::common::ElfError;
use crate::memory::VirtualMemory;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info, warn};

fn open(path: &Path) -> Result<(File, u64), ElfError> {
    let file = File::open(path).map_err(|source| ElfError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let len = file.metadata()?.len();
    Ok((file, len))
}

fn read_exact_at(file: &mut File, offset: u64, buf: &mut [u8]) -> Result<(), ElfError> {
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf)?;
    Ok(())
}

fn read_headers(file: &mut File, file_len: u64) -> Result<ElfImage, ElfError> {
    if file_len < EHDR_SIZE as u64 {
        return Err(ElfError::Truncated {
            needed: EHDR_SIZE as u64,
            len: file_len,
        });
    }
    let mut ehdr = [0u8; EHDR_SIZE];
    read_exact_at(file, 0, &mut ehdr)?;
    let header = ElfHeader::parse(&ehdr)?;

    let (offset, size) = header.program_header_table(file_len)?;
    let mut table = vec![0u8; size as usize];
    if size != 0 {
        read_exact_at(file, offset, &mut table)?;
    }
    ElfImage::from_table(&header, &table, file_len)
}

/// Reads and validates the headers of an ELF image without loading it.
pub fn read_elf(path: impl AsRef<Path>) -> Result<ElfImage, ElfError> {
    let (mut file, len) = open(path.as_ref())?;
    read_headers(&mut file, len)
}

/// Loads every `PT_LOAD` segment of an ELF image into `mem`.
///
/// For each loadable segment exactly `p_filesz` bytes are read from
/// `p_offset` and stored at `p_vaddr`. Segments whose `p_filesz` exceeds
/// `p_memsz` are skipped.
///
/// # Returns
///
/// The entry point declared in the ELF header.
pub fn load_elf(mem: &mut VirtualMemory, path: impl AsRef<Path>) -> Result<u64, ElfError> {
    load_elf_image(mem, path).map(|image| image.entry)
}

/// Same as [`load_elf`], but returns the whole parsed image, skipped
/// segments included.
pub fn load_elf_image(
    mem: &mut VirtualMemory,
    path: impl AsRef<Path>,
) -> Result<ElfImage, ElfError> {
    let path = path.as_ref();
    let (mut file, len) = open(path)?;
    let image = read_headers(&mut file, len)?;

    let mut payloads = Vec::with_capacity(image.segments.len());
    for segment in &image.segments {
        if segment.is_oversized() {
            warn!(
                "[Loader] Skipping segment @ {:#x}: p_filesz {:#x} > p_memsz {:#x}",
                segment.vaddr, segment.filesz, segment.memsz
            );
            continue;
        }
        let mut data = vec![0u8; segment.filesz as usize];
        read_exact_at(&mut file, segment.offset, &mut data)?;
        payloads.push((segment.vaddr, data));
    }

    for (vaddr, data) in &payloads {
        debug!("[Loader] Writing {} bytes to {:#x}", data.len(), vaddr);
        mem.store_bytes(*vaddr, data)?;
    }

    info!(
        "[Loader] Loaded {} ({} segments), entry {:#x}",
        path.display(),
        payloads.len(),
        image.entry
    );
    Ok(image)
}
