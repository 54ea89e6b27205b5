//! Hart core: the fetch-decode-execute loop and its collaborators.
//!
//! Instruction decoding and execution are supplied by the embedder through
//! the [`Decoder`] and [`Executor`] traits. The [`Hart`] drives them over a
//! [`VirtualMemory`](crate::memory::VirtualMemory) under a [`RunMode`].

/// Direct-mapped basic-block cache with hotness-driven promotion.
pub mod block;

/// The execution loop.
pub mod hart;

/// Run-mode selection.
pub mod mode;

/// Decoder, executor and block compiler interfaces.
pub mod traits;

pub use block::{Block, BlockCache, CompiledEntry};
pub use hart::{Hart, StepStatus, HALT_PC};
pub use mode::RunMode;
pub use traits::{BlockCompiler, Decoder, Executor};
