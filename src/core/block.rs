//! Basic-Block Cache.
//!
//! A fixed-size, direct-mapped cache of decoded basic blocks keyed by their
//! start address. Each interpreted block counts how often it has run; when
//! the count reaches the hotness threshold the block may be promoted to a
//! compiled handle. Promotion happens at most once per cached block.

use crate::common::HartError;
use crate::memory::VirtualMemory;

/// Executable handle produced by a block compiler.
///
/// Runs the whole block against the executor state and memory, leaving the
/// program counter at the block's successor.
pub type CompiledEntry<E> = Box<dyn FnMut(&mut E, &mut VirtualMemory) -> Result<(), HartError>>;

/// A cached basic block.
pub enum Block<I, E> {
    /// Decoded instructions run by the interpreter.
    Interpreted { instrs: Vec<I>, hotness: u32 },

    /// Compiled form; `len` is the number of instructions it replaces.
    Compiled { entry: CompiledEntry<E>, len: usize },
}

impl<I, E> Block<I, E> {
    /// Wraps freshly decoded instructions with zero hotness.
    pub fn interpreted(instrs: Vec<I>) -> Self {
        Block::Interpreted { instrs, hotness: 0 }
    }

    /// Number of instructions in the block.
    pub fn len(&self) -> usize {
        match self {
            Block::Interpreted { instrs, .. } => instrs.len(),
            Block::Compiled { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self, Block::Compiled { .. })
    }

    /// Current hotness, or `None` once compiled.
    pub fn hotness(&self) -> Option<u32> {
        match self {
            Block::Interpreted { hotness, .. } => Some(*hotness),
            Block::Compiled { .. } => None,
        }
    }

    /// Records one more execution of an interpreted block.
    ///
    /// # Returns
    ///
    /// `true` exactly when the hotness becomes equal to `threshold`. A
    /// threshold of `0` never fires, which disables promotion.
    pub fn heat(&mut self, threshold: u32) -> bool {
        match self {
            Block::Interpreted { hotness, .. } => {
                *hotness = hotness.saturating_add(1);
                threshold != 0 && *hotness == threshold
            }
            Block::Compiled { .. } => false,
        }
    }

    /// Replaces an interpreted block with its compiled handle.
    ///
    /// # Returns
    ///
    /// `false` if the block was already compiled; the handle is dropped.
    pub fn promote(&mut self, entry: CompiledEntry<E>) -> bool {
        match self {
            Block::Interpreted { instrs, .. } => {
                let len = instrs.len();
                *self = Block::Compiled { entry, len };
                true
            }
            Block::Compiled { .. } => false,
        }
    }
}

struct Slot<I, E> {
    start: Option<u64>,
    block: Block<I, E>,
}

/// Direct-mapped cache of basic blocks.
pub struct BlockCache<I, E> {
    slots: Vec<Slot<I, E>>,
    hot_threshold: u32,
    pub hits: u64,
    pub misses: u64,
    pub promotions: u64,
}

impl<I, E> BlockCache<I, E> {
    /// Creates a cache with `size` slots (at least one).
    ///
    /// # Arguments
    ///
    /// * `size` - Number of direct-mapped slots.
    /// * `hot_threshold` - Executions after which a block is offered for
    ///   compilation; `0` keeps every block interpreted.
    pub fn new(size: usize, hot_threshold: u32) -> Self {
        let slots = (0..size.max(1))
            .map(|_| Slot {
                start: None,
                block: Block::interpreted(Vec::new()),
            })
            .collect();
        Self {
            slots,
            hot_threshold,
            hits: 0,
            misses: 0,
            promotions: 0,
        }
    }

    pub fn hot_threshold(&self) -> u32 {
        self.hot_threshold
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot index for a block starting at `pc`.
    pub fn index(&self, pc: u64) -> usize {
        ((pc / 4) % self.slots.len() as u64) as usize
    }

    /// Returns the cached block starting at `pc`, if present.
    pub fn get(&self, pc: u64) -> Option<&Block<I, E>> {
        let slot = &self.slots[self.index(pc)];
        (slot.start == Some(pc)).then_some(&slot.block)
    }

    /// Returns the block starting at `pc`, filling the slot on a miss.
    ///
    /// A slot holding a block with a different start address is evicted.
    /// `fill` is only called on a miss; its error leaves the slot unchanged.
    pub fn get_or_fill<F>(&mut self, pc: u64, fill: F) -> Result<&mut Block<I, E>, HartError>
    where
        F: FnOnce() -> Result<Vec<I>, HartError>,
    {
        let idx = self.index(pc);
        let slot = &mut self.slots[idx];
        if slot.start == Some(pc) {
            self.hits += 1;
        } else {
            let instrs = fill()?;
            self.misses += 1;
            *slot = Slot {
                start: Some(pc),
                block: Block::interpreted(instrs),
            };
        }
        Ok(&mut slot.block)
    }

    /// Drops every cached block.
    pub fn flush(&mut self) {
        for slot in &mut self.slots {
            slot.start = None;
            slot.block = Block::interpreted(Vec::new());
        }
    }
}
