//! Fixed-capacity arena storage with chained overflow blocks.
//!
//! Each block holds up to `BLOCK_CAP` elements and never grows past that,
//! so stored elements never move for the arena's whole lifetime. When a
//! request does not fit the remaining space of any block, a new block is
//! chained on. Chaining raises total capacity across many allocations,
//! never the maximum size of a single request: one request larger than
//! `BLOCK_CAP` always fails.
//!
//! Callers address elements through [`ArenaIndex`] handles rather than
//! references. Every arena carries a process-unique stamp, and a handle is
//! only honored by the arena that produced it.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use log::error;

/// Counter for stamping arenas with process-unique ids.
static ARENA_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Opaque handle to an element stored in an [`ArenaAllocator`].
///
/// For a multi-element extent this addresses the first element; the rest
/// follow at successive slots of the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaIndex {
    arena: u32,
    block: u32,
    slot: u32,
}

/// Bump storage for `T` in blocks of `BLOCK_CAP` elements.
pub struct ArenaAllocator<T, const BLOCK_CAP: usize> {
    id: u32,
    blocks: Vec<Vec<T>>,
}

impl<T, const BLOCK_CAP: usize> ArenaAllocator<T, BLOCK_CAP> {
    pub fn new() -> Self {
        Self {
            id: ARENA_ID_COUNTER.fetch_add(1, Ordering::SeqCst),
            blocks: vec![Vec::with_capacity(BLOCK_CAP)],
        }
    }

    /// Stores one element, chaining a new block if the current ones are full.
    pub fn alloc(&mut self, value: T) -> Option<ArenaIndex> {
        self.alloc_extent(vec![value])
    }

    /// Stores a contiguous run of elements within a single block.
    ///
    /// Walks the chain for the first block with enough remaining space and
    /// opens a new block when none has it. A run larger than `BLOCK_CAP`
    /// always fails, regardless of how many blocks exist. An empty run
    /// yields no handle.
    pub fn alloc_extent(&mut self, values: Vec<T>) -> Option<ArenaIndex> {
        let count = values.len();
        if count == 0 {
            return None;
        }
        if count > BLOCK_CAP {
            error!(
                "cannot allocate {} elements: arena block capacity is {}",
                count, BLOCK_CAP
            );
            return None;
        }

        let block = match self
            .blocks
            .iter()
            .position(|b| BLOCK_CAP - b.len() >= count)
        {
            Some(i) => i,
            None => {
                self.blocks.push(Vec::with_capacity(BLOCK_CAP));
                self.blocks.len() - 1
            }
        };

        let slot = self.blocks[block].len();
        self.blocks[block].extend(values);

        Some(ArenaIndex {
            arena: self.id,
            block: block as u32,
            slot: slot as u32,
        })
    }

    /// Resolves a handle. Handles stamped by a different arena yield `None`.
    pub fn get(&self, index: ArenaIndex) -> Option<&T> {
        if index.arena != self.id {
            return None;
        }
        self.blocks.get(index.block as usize)?.get(index.slot as usize)
    }

    pub fn get_mut(&mut self, index: ArenaIndex) -> Option<&mut T> {
        if index.arena != self.id {
            return None;
        }
        self.blocks
            .get_mut(index.block as usize)?
            .get_mut(index.slot as usize)
    }

    /// Live elements across the whole chain.
    pub fn len(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks currently in the chain.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Drops every element and every chained block, keeping the first
    /// block's capacity. Outstanding handles dangle and resolve to `None`
    /// only via slot emptiness, so callers should drop handles with the
    /// contents they address.
    pub fn clear(&mut self) {
        self.blocks.truncate(1);
        if let Some(block) = self.blocks.first_mut() {
            block.clear();
        }
    }
}

impl<T, const BLOCK_CAP: usize> Default for ArenaAllocator<T, BLOCK_CAP> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_one_block_then_chains() {
        let mut arena: ArenaAllocator<u8, 8> = ArenaAllocator::new();

        // exactly one block's worth succeeds without chaining
        assert!(arena.alloc_extent(vec![7; 8]).is_some());
        assert_eq!(arena.block_count(), 1);

        // one more element forces a chained block
        let index = arena.alloc(9).expect("chained allocation");
        assert_eq!(arena.block_count(), 2);
        assert_eq!(arena.get(index), Some(&9));
    }

    #[test]
    fn oversized_request_always_fails() {
        let mut arena: ArenaAllocator<u8, 8> = ArenaAllocator::new();
        assert!(arena.alloc_extent(vec![0; 9]).is_none());

        // chain state does not change the per-request limit
        arena.alloc_extent(vec![0; 8]);
        arena.alloc_extent(vec![0; 8]);
        assert!(arena.alloc_extent(vec![0; 9]).is_none());
    }

    #[test]
    fn later_small_request_reuses_earlier_block_tail() {
        let mut arena: ArenaAllocator<u8, 8> = ArenaAllocator::new();
        arena.alloc_extent(vec![1; 5]);
        let second = arena.alloc_extent(vec![2; 5]).expect("second extent");
        assert_eq!(second.block, 1);

        // three slots still free in block 0, taken before growing the chain
        let third = arena.alloc_extent(vec![3; 3]).expect("third extent");
        assert_eq!(third.block, 0);
        assert_eq!(arena.block_count(), 2);
    }

    #[test]
    fn handles_are_arena_specific() {
        let mut first: ArenaAllocator<u32, 4> = ArenaAllocator::new();
        let mut second: ArenaAllocator<u32, 4> = ArenaAllocator::new();

        let index = first.alloc(42).expect("alloc");
        second.alloc(99).expect("alloc");

        assert_eq!(first.get(index), Some(&42));
        assert_eq!(second.get(index), None);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut arena: ArenaAllocator<String, 4> = ArenaAllocator::new();
        let index = arena.alloc("before".to_string()).expect("alloc");
        if let Some(value) = arena.get_mut(index) {
            *value = "after".to_string();
        }
        assert_eq!(arena.get(index).map(String::as_str), Some("after"));
    }

    #[test]
    fn clear_resets_to_one_empty_block() {
        let mut arena: ArenaAllocator<u8, 4> = ArenaAllocator::new();
        for _ in 0..10 {
            arena.alloc(1);
        }
        assert!(arena.block_count() > 1);

        arena.clear();
        assert_eq!(arena.block_count(), 1);
        assert!(arena.is_empty());
        assert!(arena.alloc(5).is_some());
    }

    #[test]
    fn empty_extent_yields_no_handle() {
        let mut arena: ArenaAllocator<u8, 4> = ArenaAllocator::new();
        assert!(arena.alloc_extent(Vec::new()).is_none());
        assert!(arena.is_empty());
    }
}
