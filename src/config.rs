//! Simulator configuration.
//!
//! Loaded from a TOML file with two optional sections:
//!
//! ```toml
//! [memory]
//! capacity = 17179869184
//!
//! [hart]
//! mode = "BasicBlockCached"
//! measure = true
//! block_cache_size = 1024
//! hot_threshold = 64
//! max_block_len = 64
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use crate::common::constants::DEFAULT_PHYS_CAPACITY;
use crate::common::ConfigError;
use crate::core::RunMode;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_BLOCK_CACHE_SIZE: usize = 1024;
const DEFAULT_HOT_THRESHOLD: u32 = 64;
const DEFAULT_MAX_BLOCK_LEN: usize = 64;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub hart: HartConfig,
}

impl Config {
    /// Reads and parses a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parses a TOML configuration string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct MemoryConfig {
    /// Ceiling on committed physical memory, in bytes.
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HartConfig {
    #[serde(default)]
    pub mode: RunMode,

    #[serde(default)]
    pub measure: bool,

    #[serde(default = "default_block_cache_size")]
    pub block_cache_size: usize,

    /// Executions before a block is offered to the compiler; `0` disables
    /// promotion.
    #[serde(default = "default_hot_threshold")]
    pub hot_threshold: u32,

    #[serde(default = "default_max_block_len")]
    pub max_block_len: usize,
}

impl Default for HartConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            measure: false,
            block_cache_size: default_block_cache_size(),
            hot_threshold: default_hot_threshold(),
            max_block_len: default_max_block_len(),
        }
    }
}

fn default_capacity() -> u64 {
    DEFAULT_PHYS_CAPACITY
}

fn default_block_cache_size() -> usize {
    DEFAULT_BLOCK_CACHE_SIZE
}

fn default_hot_threshold() -> u32 {
    DEFAULT_HOT_THRESHOLD
}

fn default_max_block_len() -> usize {
    DEFAULT_MAX_BLOCK_LEN
}
