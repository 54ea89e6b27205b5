//! Hart Execution Loop.
//!
//! The hart repeatedly fetches the instruction word at the program counter,
//! decodes it and hands it to the executor until the program counter reaches
//! the halt sentinel `0`. A fetch is never attempted at the sentinel.

use super::block::{Block, BlockCache};
use super::mode::RunMode;
use super::traits::{BlockCompiler, Decoder, Executor};
use crate::common::HartError;
use crate::config::HartConfig;
use crate::memory::VirtualMemory;
use crate::stats::{RunReport, RunStats};
use std::io::{self, Write};
use tracing::{info, trace, warn};

/// Program counter value that terminates execution.
pub const HALT_PC: u64 = 0;

/// Size of one instruction word in bytes.
const INSTR_BYTES: u64 = 4;

/// Outcome of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// The program counter was at the sentinel; nothing was executed.
    Halted,
    /// One instruction was executed.
    Stepped,
}

/// A single emulated hart.
///
/// Owns its address space exclusively, together with the decoder and
/// executor that give instructions their meaning.
pub struct Hart<D: Decoder, E> {
    mem: VirtualMemory,
    decoder: D,
    executor: E,
    blocks: BlockCache<D::Instr, E>,
    compiler: Option<Box<dyn BlockCompiler<D::Instr, E>>>,
    max_block_len: usize,
    mode: RunMode,
    measure: bool,
}

/// Fetches and decodes the basic block starting at `start`.
///
/// The block ends after an instruction the decoder marks as a terminator or
/// after `max_len` instructions. A fetch fault past the first instruction
/// just ends the block early; the fault is raised again if execution ever
/// gets there.
fn fetch_block<D: Decoder>(
    mem: &VirtualMemory,
    decoder: &mut D,
    start: u64,
    max_len: usize,
) -> Result<Vec<D::Instr>, HartError> {
    let mut instrs = Vec::new();
    let mut pc = start;
    while instrs.len() < max_len.max(1) {
        let raw = match mem.fetch_u32(pc) {
            Ok(raw) => raw,
            Err(_) if !instrs.is_empty() => break,
            Err(fault) => return Err(fault.into()),
        };
        let instr = decoder.decode(raw);
        let ends = decoder.ends_block(&instr);
        instrs.push(instr);
        if ends {
            break;
        }
        pc = pc.wrapping_add(INSTR_BYTES);
    }
    Ok(instrs)
}

impl<D, E> Hart<D, E>
where
    D: Decoder,
    E: Executor<D::Instr>,
{
    /// Creates a hart with the default configuration.
    pub fn new(mem: VirtualMemory, decoder: D, executor: E) -> Self {
        Self::with_config(mem, decoder, executor, &HartConfig::default())
    }

    /// Creates a hart whose block cache, run mode and measurement flag come
    /// from `config`.
    pub fn with_config(mem: VirtualMemory, decoder: D, executor: E, config: &HartConfig) -> Self {
        Self {
            mem,
            decoder,
            executor,
            blocks: BlockCache::new(config.block_cache_size, config.hot_threshold),
            compiler: None,
            max_block_len: config.max_block_len,
            mode: config.mode,
            measure: config.measure,
        }
    }

    /// Installs the backend used to promote hot blocks.
    pub fn set_compiler(&mut self, compiler: Box<dyn BlockCompiler<D::Instr, E>>) {
        self.compiler = Some(compiler);
    }

    pub fn memory(&self) -> &VirtualMemory {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut VirtualMemory {
        &mut self.mem
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Run mode used by [`run_configured`](Self::run_configured).
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn blocks(&self) -> &BlockCache<D::Instr, E> {
        &self.blocks
    }

    /// Gives back the address space, e.g. to release it before exiting.
    pub fn into_memory(self) -> VirtualMemory {
        self.mem
    }

    fn execute_one(&mut self, pc: u64) -> Result<(), HartError> {
        let raw = self.mem.fetch_u32(pc)?;
        let instr = self.decoder.decode(raw);
        self.executor.execute(&instr, &mut self.mem)
    }

    /// Runs exactly one fetch-decode-execute cycle, whatever the run mode.
    ///
    /// # Returns
    ///
    /// [`StepStatus::Halted`] without fetching if the program counter is at
    /// the sentinel, [`StepStatus::Stepped`] otherwise.
    pub fn step(&mut self) -> Result<StepStatus, HartError> {
        let pc = self.executor.pc();
        if pc == HALT_PC {
            return Ok(StepStatus::Halted);
        }
        trace!("[Hart] step pc={:#x}", pc);
        self.execute_one(pc)?;
        Ok(StepStatus::Stepped)
    }

    /// Runs until the program counter reaches the sentinel.
    ///
    /// # Arguments
    ///
    /// * `mode` - Execution strategy for this run.
    /// * `measure` - Print instruction count, elapsed time and MIPS to
    ///   stderr when the run ends.
    pub fn run(&mut self, mode: RunMode, measure: bool) -> Result<RunReport, HartError> {
        self.run_reporting_to(mode, measure, &mut io::stderr().lock())
    }

    /// Runs with the mode and measurement flag the hart was configured with.
    pub fn run_configured(&mut self) -> Result<RunReport, HartError> {
        self.run(self.mode, self.measure)
    }

    /// Like [`run`](Self::run), but writes the measurement summary to `out`.
    ///
    /// Nothing is written when `measure` is `false` or the run fails.
    pub fn run_reporting_to<W: Write>(
        &mut self,
        mode: RunMode,
        measure: bool,
        out: &mut W,
    ) -> Result<RunReport, HartError> {
        let mut stats = RunStats::default();
        info!(
            "[Hart] Running in {} mode from pc={:#x}",
            mode,
            self.executor.pc()
        );

        match mode {
            RunMode::Simple => {
                loop {
                    let pc = self.executor.pc();
                    if pc == HALT_PC {
                        break;
                    }
                    self.execute_one(pc)?;
                    stats.instructions_retired += 1;
                }
            }
            RunMode::BasicBlockCached => {
                stats.instructions_retired += self.run_blocks()?;
            }
            RunMode::Disabled => {
                warn!("[Hart] Disabled mode is used, nothing executed");
            }
        }

        let report = stats.finish(mode);
        if measure {
            if let Err(e) = report.write_to(out) {
                warn!("[Hart] Cannot write measurement summary: {}", e);
            }
        }
        Ok(report)
    }

    fn run_blocks(&mut self) -> Result<u64, HartError> {
        let Self {
            mem,
            decoder,
            executor,
            blocks,
            compiler,
            max_block_len,
            ..
        } = self;
        let threshold = blocks.hot_threshold();
        let mut executed = 0u64;

        while executor.pc() != HALT_PC {
            let start = executor.pc();
            let block = blocks.get_or_fill(start, || {
                fetch_block(&*mem, &mut *decoder, start, *max_block_len)
            })?;

            let mut promoted = false;
            if block.heat(threshold) {
                let entry = match (&*block, compiler.as_mut()) {
                    (Block::Interpreted { instrs, .. }, Some(backend)) => {
                        backend.compile(start, instrs)
                    }
                    _ => None,
                };
                if let Some(entry) = entry {
                    promoted = block.promote(entry);
                }
            }

            match block {
                Block::Compiled { entry, len } => {
                    entry(&mut *executor, &mut *mem)?;
                    executed += *len as u64;
                }
                Block::Interpreted { instrs, .. } => {
                    let mut next = start;
                    for instr in instrs.iter() {
                        executor.execute(instr, &mut *mem)?;
                        executed += 1;
                        next = next.wrapping_add(INSTR_BYTES);
                        if executor.pc() != next {
                            break;
                        }
                    }
                }
            }

            if promoted {
                blocks.promotions += 1;
                info!("[Hart] Promoted block @ {:#x}", start);
            }
        }
        Ok(executed)
    }
}
