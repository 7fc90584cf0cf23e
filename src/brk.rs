//! The heap region.
//!
//! This module keeps track of the range `[start, brk)` an arena has obtained from its segment,
//! and is the only place where the break is moved.

use crate::prelude::*;

use core::cmp;

/// Canonicalize a growth request.
///
/// Syscalls can be expensive, which is why we would rather acquire more memory than necessary,
/// than have many syscalls acquiring memory stubs. Requests below `unit` are rounded up to a whole
/// `unit`. Requests of at least `unit` get exactly what they need.
///
/// The return value is the number of bytes to extend the segment by, header included, or `None`
/// on overflow.
#[inline]
pub fn canonicalize_brk(size: usize, unit: usize) -> Option<usize> {
    let needed = size.checked_add(HEADER_SIZE)?;

    if size >= unit {
        Some(needed)
    } else {
        Some(cmp::max(needed, unit))
    }
}

/// The heap region of an arena.
pub struct Heap<S> {
    /// The segment we grow into.
    segment: S,
    /// The break when the heap was created.
    start: usize,
    /// The allocation unit (see [`canonicalize_brk`]).
    unit: usize,
    /// The number of bytes currently held from the segment.
    granted: usize,
}

impl<S: Segment> Heap<S> {
    /// Create a heap starting at the segment's current break.
    pub fn new(segment: S, unit: usize) -> Heap<S> {
        let start = segment.brk();

        Heap {
            segment: segment,
            start: start,
            unit: unit,
            granted: 0,
        }
    }

    /// The start of the heap.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// The current break.
    #[inline]
    pub fn brk(&self) -> usize {
        self.segment.brk()
    }

    /// The number of bytes currently held from the segment.
    #[inline]
    pub fn granted(&self) -> usize {
        self.granted
    }

    /// Get the inner segment.
    #[inline]
    pub fn segment(&self) -> &S {
        &self.segment
    }

    /// Grow the heap to fit a block of `size` usable bytes.
    ///
    /// The fresh memory becomes a single, unlinked block placed at the old break. It may be larger
    /// than `size` (see [`canonicalize_brk`]); splitting off the excess is up to the caller.
    pub fn grow(&mut self, size: usize) -> Result<Block, Error> {
        let oom = Error::OutOfMemory { requested: size };
        let brk_size = canonicalize_brk(size, self.unit).ok_or(oom)?;

        debug!("Growing the heap by {} bytes for a block of size {}.", brk_size, size);

        let old = match self.segment.extend(brk_size) {
            Ok(old) => old,
            Err(()) => {
                warn!("The segment refused to grow by {} bytes.", brk_size);
                return Err(oom);
            },
        };
        self.granted += brk_size;

        debug_assert!(old >= self.start, "The break moved below the start of the heap.");

        Ok(unsafe {
            // The segment just handed us this memory.
            Block::init(old, brk_size - HEADER_SIZE)
        })
    }

    /// Give a block back to the segment.
    ///
    /// The block must be free, unlinked, and end exactly at the break. On failure, the block is
    /// intact and still belongs to the heap.
    pub fn shrink(&mut self, block: Block) -> Result<(), Error> {
        assert!(block.end() == self.brk(), "{:?} does not end at the break.", block);

        let total = block.total();
        self.retract(block.addr()).map_err(|()| Error::ShrinkFailure {
            addr: block.addr(),
            size: block.size(),
        })?;

        debug!("Released {} bytes to the OS.", total);

        Ok(())
    }

    /// Move the break down to `to`, reclaiming everything above it.
    ///
    /// Everything between `to` and the break must belong to this heap, and be unused.
    pub fn retract(&mut self, to: usize) -> Result<(), ()> {
        let brk = self.brk();
        assert!(to >= self.start && to <= brk, "Retracting to 0x{:x} outside of the heap.", to);

        unsafe {
            // Everything above `to` is ours, and unused.
            self.segment.retract(to)?;
        }
        self.granted -= brk - to;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::segment::Buffer;

    #[test]
    fn test_canonicalize() {
        // Small requests are rounded up to the unit.
        assert_eq!(canonicalize_brk(1, 1000), Some(1000));
        assert_eq!(canonicalize_brk(64, 1000), Some(1000));
        // Just below the unit, but the header doesn't fit.
        assert_eq!(canonicalize_brk(999, 1000), Some(999 + HEADER_SIZE));
        // Large requests are not rounded.
        assert_eq!(canonicalize_brk(1000, 1000), Some(1000 + HEADER_SIZE));
        assert_eq!(canonicalize_brk(5000, 1000), Some(5000 + HEADER_SIZE));
        assert_eq!(canonicalize_brk(usize::max_value(), 1000), None);
    }

    #[test]
    fn test_grow() {
        let mut arr = vec![0u8; 4096];
        let mut heap = Heap::new(Buffer::new(&mut arr), 1024);
        let start = heap.start();

        let block = heap.grow(10).unwrap();
        assert_eq!(block.addr(), start);
        assert_eq!(block.size(), 1024 - HEADER_SIZE);
        assert_eq!(heap.brk(), start + 1024);
        assert_eq!(heap.granted(), 1024);

        let block = heap.grow(2000).unwrap();
        assert_eq!(block.addr(), start + 1024);
        assert_eq!(block.size(), 2000);
        assert_eq!(heap.granted(), 1024 + 2000 + HEADER_SIZE);
    }

    #[test]
    fn test_grow_oom() {
        let mut arr = vec![0u8; 512];
        let mut heap = Heap::new(Buffer::new(&mut arr), 1024);

        assert_eq!(heap.grow(10), Err(Error::OutOfMemory { requested: 10 }));
        assert_eq!(heap.granted(), 0);
        assert_eq!(heap.brk(), heap.start());
        assert!(heap.grow(usize::max_value()).is_err());
    }

    #[test]
    fn test_shrink() {
        let mut arr = vec![0u8; 4096];
        let mut heap = Heap::new(Buffer::new(&mut arr), 1024);
        let start = heap.start();

        heap.grow(10).unwrap();
        let block = heap.grow(10).unwrap();
        heap.shrink(block).unwrap();

        assert_eq!(heap.brk(), start + 1024);
        assert_eq!(heap.granted(), 1024);
    }

    #[test]
    #[should_panic]
    fn test_shrink_not_at_brk() {
        let mut arr = vec![0u8; 4096];
        let mut heap = Heap::new(Buffer::new(&mut arr), 1024);

        let block = heap.grow(10).unwrap();
        heap.grow(10).unwrap();
        let _ = heap.shrink(block);
    }
}
