//! Memoized procedural cell generator.
//!
//! Cells are created lazily on first access and owned exclusively by this
//! cache, keyed by absolute coordinate. Repeated lookups before an
//! [`CellCache::invalidate`] return the identical digit, which is what keeps
//! a previously visited region stable when the operator pans back to it.
//!
//! No eviction: the cache grows for the lifetime of the session. A
//! viewport-distance LRU would cap memory for very long sessions, but the
//! original behaviour is unbounded and that is preserved here.

use ahash::RandomState;
use rand::{rngs::SmallRng, Rng};
use std::collections::HashMap;

use crate::cell::Cell;
use crate::coords::GridPos;

#[derive(Debug, Default)]
pub struct CellCache {
    entries: HashMap<GridPos, Cell, RandomState>,
}

impl CellCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cell at `pos`, materialising it with a uniformly random
    /// digit on first access.
    pub fn get_or_create(&mut self, pos: GridPos, rng: &mut SmallRng) -> &Cell {
        self.entries
            .entry(pos)
            .or_insert_with(|| fresh_cell(pos, rng))
    }

    pub fn get(&self, pos: GridPos) -> Option<&Cell> {
        self.entries.get(&pos)
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        self.entries.get_mut(&pos)
    }

    /// Replace the entry at `pos` with a fresh cell: new random digit,
    /// temper and highlight cleared. Used after a transfer consumes the
    /// cell.
    pub fn invalidate(&mut self, pos: GridPos, rng: &mut SmallRng) {
        self.entries.insert(pos, fresh_cell(pos, rng));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fresh_cell(pos: GridPos, rng: &mut SmallRng) -> Cell {
    Cell {
        pos,
        digit: rng.gen_range(0..10),
        temper: None,
        highlighted: false,
    }
}
