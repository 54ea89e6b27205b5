//! RISC-V 64-bit Hart Memory and Execution Loop.
//!
//! This crate models the addressable memory of a single RISC-V hart and the
//! loop that drives it. Physical pages are committed lazily, loads of
//! uncommitted memory fault, and ELF64 RISC-V programs are loaded segment by
//! segment into the address space.
//!
//! # Architecture
//!
//! * **Memory**: sparse physical backing store, flat virtual address space
//!   with single-access fast paths and occupancy tracking.
//! * **Loader**: ELF64 little-endian RISC-V program loading.
//! * **Core**: fetch-decode-execute loop with simple, block-cached and
//!   disabled run modes. Decoding and execution are supplied by the
//!   embedder.
//!
//! # Modules
//!
//! * `common`: Shared types, constants, and error handling.
//! * `config`: Configuration loading and parsing.
//! * `core`: Execution loop and its collaborator traits.
//! * `memory`: Pages, physical backing store and virtual memory.
//! * `sim`: ELF loader.
//! * `stats`: Run statistics.

/// Shared types, constants and error handling.
///
/// Provides the address type, paging constants, access classification and
/// the error enums used throughout the crate.
pub mod common;

/// Configuration system for memory and hart settings.
///
/// Loads and parses TOML configuration files.
pub mod config;

/// Execution loop, run modes and the basic-block cache.
pub mod core;

/// Paged memory subsystem.
///
/// Lazily committed physical pages behind a flat virtual address space.
pub mod memory;

/// Binary loaders.
///
/// Parses ELF images and copies their loadable segments into memory.
pub mod sim;

/// Run statistics collection and reporting.
pub mod stats;
