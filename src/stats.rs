//! Run statistics collection and reporting.
//!
//! Tracks the number of executed instructions and the wall time of one
//! run, and reports throughput in instructions per microsecond (MIPS).

use crate::core::RunMode;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Counters for a run in progress.
pub struct RunStats {
    start_time: Instant,
    pub instructions_retired: u64,
}

impl Default for RunStats {
    /// Starts the clock with zeroed counters.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            instructions_retired: 0,
        }
    }
}

impl RunStats {
    /// Stops the clock and freezes the counters.
    pub fn finish(&self, mode: RunMode) -> RunReport {
        RunReport {
            mode,
            instructions: self.instructions_retired,
            elapsed: self.start_time.elapsed(),
        }
    }
}

/// Summary of a finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunReport {
    pub mode: RunMode,
    pub instructions: u64,
    pub elapsed: Duration,
}

impl RunReport {
    /// Instructions per microsecond, i.e. millions of instructions per second.
    ///
    /// Returns `0.0` for a run too short to measure.
    pub fn mips(&self) -> f64 {
        let micros = self.elapsed.as_secs_f64() * 1e6;
        if micros == 0.0 {
            0.0
        } else {
            self.instructions as f64 / micros
        }
    }

    /// Writes the three-line measurement summary.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Amount of executed instructions: {}", self.instructions)?;
        writeln!(
            out,
            "Execution time : {:.3} ms",
            self.elapsed.as_secs_f64() * 1e3
        )?;
        writeln!(out, "MIPS: {:.4}", self.mips())
    }
}
