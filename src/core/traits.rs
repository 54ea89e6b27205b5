//! Hart Collaborator Traits.
//!
//! The execution loop owns no instruction semantics. Decoding, execution
//! (including the register file and program counter) and block compilation
//! are plugged in through the traits in this module.

use super::block::CompiledEntry;
use crate::common::HartError;
use crate::memory::VirtualMemory;

/// Turns raw 32-bit instruction words into decoded instructions.
pub trait Decoder {
    /// Decoded instruction representation.
    type Instr;

    /// Decodes one instruction word.
    fn decode(&mut self, raw: u32) -> Self::Instr;

    /// Returns `true` if `instr` terminates a basic block (branches, jumps,
    /// system instructions).
    ///
    /// The default treats no instruction as a terminator; blocks then end at
    /// the configured maximum length and execution still leaves a block as
    /// soon as the program counter stops being sequential.
    fn ends_block(&self, _instr: &Self::Instr) -> bool {
        false
    }
}

/// Architectural state and instruction semantics of a hart.
pub trait Executor<I> {
    /// Returns the current program counter.
    fn pc(&self) -> u64;

    /// Executes one decoded instruction.
    ///
    /// Implementations advance or redirect the program counter and may read
    /// and write memory.
    fn execute(&mut self, instr: &I, mem: &mut VirtualMemory) -> Result<(), HartError>;
}

/// Backend that turns a hot basic block into an executable handle.
pub trait BlockCompiler<I, E> {
    /// Compiles the block starting at `start`.
    ///
    /// # Returns
    ///
    /// `None` if the block cannot be compiled; it then stays interpreted.
    fn compile(&mut self, start: u64, instrs: &[I]) -> Option<CompiledEntry<E>>;
}
