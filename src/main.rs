//! RISC-V Hart Loader CLI.
//!
//! Loads a RISC-V ELF64 program into a fresh address space and reports what
//! ended up where: entry point, loadable segments, committed pages with
//! their occupancy, and the next free block. Optionally hex-dumps a range
//! of the loaded memory.
//!
//! Memory faults and loader errors are fatal here: the address space is
//! released and the process exits with status 1.

use clap::Parser;
use serde::Serialize;
use std::process;
use tracing_subscriber::EnvFilter;

use rvhart::config::Config;
use rvhart::memory::VirtualMemory;
use rvhart::sim::{dump, loader};

/// Command-line arguments for the loader.
#[derive(Parser, Debug)]
#[command(author, version, about = "RISC-V ELF loader and memory inspector")]
struct Args {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// RISC-V ELF64 program to load.
    #[arg(short, long)]
    elf: String,

    /// Start address of a range to hex-dump after loading.
    #[arg(long, value_parser = parse_addr)]
    dump: Option<u64>,

    /// Number of bytes to dump.
    #[arg(long, default_value_t = 64)]
    len: usize,

    /// Emit the load report as JSON.
    #[arg(long)]
    json: bool,
}

fn parse_addr(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

#[derive(Serialize)]
struct SegmentReport {
    vaddr: u64,
    offset: u64,
    filesz: u64,
    memsz: u64,
    flags: u32,
    loaded: bool,
}

#[derive(Serialize)]
struct PageReport {
    id: u64,
    occupied: u64,
}

#[derive(Serialize)]
struct LoadReport {
    path: String,
    entry: u64,
    segments: Vec<SegmentReport>,
    pages: Vec<PageReport>,
    committed_bytes: u64,
    next_free: u64,
}

fn fatal(mem: VirtualMemory, msg: impl std::fmt::Display) -> ! {
    drop(mem);
    eprintln!("\n[!] FATAL: {}", msg);
    process::exit(1);
}

fn print_report(report: &LoadReport) {
    println!("[*] Loaded {}", report.path);
    println!("    Entry:       {:#x}", report.entry);
    println!("Segments:");
    for seg in &report.segments {
        println!(
            "  {:#012x}  off={:#08x} filesz={:#08x} memsz={:#08x} flags={:#x}{}",
            seg.vaddr,
            seg.offset,
            seg.filesz,
            seg.memsz,
            seg.flags,
            if seg.loaded { "" } else { "  (skipped)" }
        );
    }
    println!("Pages:");
    for page in &report.pages {
        println!("  page {:#010x}  occupied {:>4} bytes", page.id, page.occupied);
    }
    println!("Committed:       {} bytes", report.committed_bytes);
    println!("Next free block: {:#x}", report.next_free);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|e| {
            eprintln!("[!] FATAL: {}", e);
            process::exit(1);
        }),
        None => Config::default(),
    };

    let mut mem = VirtualMemory::new(config.memory.capacity);

    let image = match loader::load_elf_image(&mut mem, &args.elf) {
        Ok(image) => image,
        Err(e) => fatal(mem, e),
    };

    let report = LoadReport {
        path: args.elf.clone(),
        entry: image.entry,
        segments: image
            .segments
            .iter()
            .map(|seg| SegmentReport {
                vaddr: seg.vaddr,
                offset: seg.offset,
                filesz: seg.filesz,
                memsz: seg.memsz,
                flags: seg.flags,
                loaded: !seg.is_oversized(),
            })
            .collect(),
        pages: mem
            .physical()
            .pages()
            .map(|page| PageReport {
                id: page.id(),
                occupied: page.occupied_size(),
            })
            .collect(),
        committed_bytes: mem.physical().committed_bytes(),
        next_free: mem.next_continuous_block().val(),
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => fatal(mem, e),
        }
    } else {
        print_report(&report);
    }

    if let Some(addr) = args.dump {
        match mem.load_bytes(addr, args.len) {
            Ok(bytes) => {
                for line in dump::hex_lines(addr, &bytes) {
                    println!("{}", line);
                }
            }
            Err(fault) => fatal(mem, fault),
        }
    }
}
