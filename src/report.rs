//! Heap state reports.
//!
//! A report is a read-only view of an arena: the current break and the free blocks. It borrows
//! the arena immutably, so producing one can never disturb the allocator.

use crate::prelude::*;

use core::fmt;

use crate::free_list;

/// An `(address, size)` view of the free blocks of an arena, in address order.
pub struct FreeBlocks {
    /// The inner iterator.
    inner: free_list::Iter,
}

impl FreeBlocks {
    /// Wrap a free list iterator.
    #[inline]
    pub(crate) fn new(inner: free_list::Iter) -> FreeBlocks {
        FreeBlocks { inner: inner }
    }
}

impl Iterator for FreeBlocks {
    type Item = (usize, usize);

    #[inline]
    fn next(&mut self) -> Option<(usize, usize)> {
        self.inner.next().map(|block| (block.addr(), block.size()))
    }
}

/// A snapshot of an arena, labeled with the stage it was taken at.
///
/// The `Display` implementation prints the break followed by one line per free block.
pub struct Report<'a> {
    /// The label of the snapshot.
    stage: &'a str,
    /// The break at the time of the snapshot.
    brk: usize,
    /// The free list of the arena.
    free: &'a FreeList,
}

impl<'a> Report<'a> {
    /// Create a report.
    #[inline]
    pub(crate) fn new(stage: &'a str, brk: usize, free: &'a FreeList) -> Report<'a> {
        Report {
            stage: stage,
            brk: brk,
            free: free,
        }
    }

    /// The break at the time of the snapshot.
    #[inline]
    pub fn brk(&self) -> usize {
        self.brk
    }

    /// The free blocks.
    #[inline]
    pub fn free_blocks(&self) -> FreeBlocks {
        FreeBlocks::new(self.free.iter())
    }
}

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Program break at {}: 0x{:x}", self.stage, self.brk)?;

        for (addr, size) in self.free_blocks() {
            writeln!(f, "block addr: 0x{:x}, size: {}", addr, size)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display() {
        let mut arr = vec![0u8; 256];
        let base = arr.as_mut_ptr() as usize;

        let a = unsafe { Block::init(base, 64) };
        let b = unsafe { Block::init(a.end() + 8, 32) };
        let mut list = FreeList::new();
        list.insert(a);
        list.insert(b);

        let report = Report::new("start", 0x1234, &list);
        assert_eq!(format!("{}", report), format!(
            "Program break at start: 0x1234\nblock addr: 0x{:x}, size: 64\nblock addr: 0x{:x}, \
             size: 32\n", a.addr(), b.addr()));
        assert_eq!(report.free_blocks().collect::<std::vec::Vec<_>>(),
                   [(a.addr(), 64), (b.addr(), 32)]);
    }

    #[test]
    fn test_empty() {
        let list = FreeList::new();
        let report = Report::new("end", 0x10, &list);

        assert_eq!(format!("{}", report), "Program break at end: 0x10\n");
        assert_eq!(report.free_blocks().count(), 0);
    }
}
