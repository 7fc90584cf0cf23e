//! The free list.
//!
//! Free blocks are threaded into a doubly-linked list through their own headers, so the list
//! needs no storage of its own besides the head.

use crate::prelude::*;

/// An address-ordered list of free blocks.
///
/// Guarantees
/// ==========
///
/// Certain guarantees are made:
///
/// 1. Iterating from the head yields strictly increasing block addresses.
/// 2. No two listed blocks overlap, and no block is listed twice.
///
/// These are invariants assuming that only the public methods are used, and that every inserted
/// block is free memory of the same arena.
pub struct FreeList {
    /// The lowest-addressed free block.
    head: Option<Block>,
    /// The number of listed blocks.
    len: usize,
}

impl FreeList {
    /// Create a new, empty free list.
    #[inline]
    pub const fn new() -> FreeList {
        FreeList {
            head: None,
            len: 0,
        }
    }

    /// The number of free blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the list empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Iterate over the free blocks, in address order.
    #[inline]
    pub fn iter(&self) -> Iter {
        Iter { cur: self.head }
    }

    /// Insert a block, keeping the list sorted.
    ///
    /// Inserting at the head is O(1), otherwise the list is scanned for the last block below
    /// `block`.
    ///
    /// The block must not be listed already, and must not overlap any listed block.
    pub fn insert(&mut self, block: Block) {
        trace!("Inserting {:?} into the free list.", block);

        match self.head {
            Some(head) if head < block => {
                // Find the last block below the new one.
                let mut prev = head;
                while let Some(next) = prev.next() {
                    if next >= block {
                        break;
                    }
                    prev = next;
                }

                debug_assert!(prev.end() <= block.addr(), "{:?} overlaps {:?}.", prev, block);

                let next = prev.next();
                block.set_prev(Some(prev));
                block.set_next(next);
                if let Some(next) = next {
                    debug_assert!(block.end() <= next.addr(), "{:?} overlaps {:?}.", block, next);
                    next.set_prev(Some(block));
                }
                prev.set_next(Some(block));
            },
            head => {
                // Fast path: the new block becomes the head.
                debug_assert!(head != Some(block), "{:?} is already free.", block);

                block.set_prev(None);
                block.set_next(head);
                if let Some(head) = head {
                    head.set_prev(Some(block));
                }
                self.head = Some(block);
            },
        }

        self.len += 1;
        self.check();
    }

    /// Unlink a listed block.
    pub fn remove(&mut self, block: Block) {
        trace!("Removing {:?} from the free list.", block);

        let prev = block.prev();
        let next = block.next();

        match prev {
            Some(prev) => prev.set_next(next),
            None => {
                debug_assert!(self.head == Some(block), "{:?} is not listed.", block);
                self.head = next;
            },
        }
        if let Some(next) = next {
            next.set_prev(prev);
        }

        block.set_prev(None);
        block.set_next(None);

        self.len -= 1;
        self.check();
    }

    /// Find the first block, by address, which can hold `size` bytes.
    #[inline]
    pub fn first_fit(&self, size: usize) -> Option<Block> {
        self.iter().find(|block| block.size() >= size)
    }

    /// Find the listed block starting exactly at `addr`.
    #[inline]
    pub fn find_at(&self, addr: usize) -> Option<Block> {
        self.iter()
            .take_while(|block| block.addr() <= addr)
            .find(|block| block.addr() == addr)
    }

    /// Merge every run of adjacent free blocks into one block.
    ///
    /// A merged block is checked against its new successor before moving on, so runs of any
    /// length collapse in a single pass. The highest-addressed block is returned.
    pub fn coalesce(&mut self) -> Option<Block> {
        let mut cur = self.head?;

        loop {
            let next = match cur.next() {
                Some(next) => next,
                None => break,
            };

            if cur.left_to(next) {
                trace!("Merging {:?} with {:?}.", cur, next);

                // Unlink the successor, and absorb it.
                let after = next.next();
                cur.set_next(after);
                if let Some(after) = after {
                    after.set_prev(Some(cur));
                }
                cur.merge_right(next);
                self.len -= 1;
                // Stay on `cur`, it may touch its new successor as well.
            } else {
                cur = next;
            }
        }

        self.check();

        Some(cur)
    }

    /// Forget every listed block.
    ///
    /// The headers are left as they are.
    #[inline]
    pub fn clear(&mut self) {
        self.head = None;
        self.len = 0;
    }

    /// No-op in release mode.
    #[cfg(not(debug_assertions))]
    #[inline]
    fn check(&self) {}

    /// Perform consistency checks.
    ///
    /// This will check for the following conditions:
    ///
    /// 1. The list is sorted, and the links agree in both directions.
    /// 2. No blocks overlap.
    /// 3. The length matches.
    #[cfg(debug_assertions)]
    fn check(&self) {
        let mut len = 0;
        let mut prev: Option<Block> = None;

        for block in self.iter() {
            assert!(block.prev() == prev, "Broken back link at {:?}.", block);
            if let Some(prev) = prev {
                assert!(prev < block, "The free list is not sorted ({:?} >= {:?}).", prev, block);
                assert!(prev.end() <= block.addr(), "Overlapping blocks {:?} and {:?}.", prev,
                        block);
            }

            prev = Some(block);
            len += 1;
        }

        assert!(len == self.len, "The free list has {} blocks, expected {}.", len, self.len);
    }
}

impl Default for FreeList {
    fn default() -> FreeList {
        FreeList::new()
    }
}

/// An iterator over the free blocks of a [`FreeList`].
pub struct Iter {
    /// The next block to yield.
    cur: Option<Block>,
}

impl Iterator for Iter {
    type Item = Block;

    #[inline]
    fn next(&mut self) -> Option<Block> {
        let res = self.cur?;
        self.cur = res.next();

        Some(res)
    }
}
