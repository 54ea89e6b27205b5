//! Run Modes.
//!
//! A run mode is selected once per call to [`Hart::run`](super::Hart::run)
//! and decides how the loop moves through the program.

use serde::Deserialize;

/// Execution strategy of the hart loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum RunMode {
    /// One instruction per iteration: fetch, decode, execute.
    #[default]
    Simple,

    /// Decoded basic blocks are cached by start address; hot blocks are
    /// offered to a block compiler once.
    BasicBlockCached,

    /// Nothing is executed.
    Disabled,
}

impl RunMode {
    /// Returns the human-readable name of the run mode.
    pub fn name(&self) -> &'static str {
        match self {
            RunMode::Simple => "Simple",
            RunMode::BasicBlockCached => "BasicBlockCached",
            RunMode::Disabled => "Disabled",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
