//! Memory bookkeeping.

use crate::prelude::*;

use core::ptr::{self, NonNull};

use crate::report::{FreeBlocks, Report};

/// The memory bookkeeper.
///
/// This is the main component of brkalloc, and owns all the state of an arena: the heap region
/// it grows into, and the free list of blocks available for reuse. Its job is to find, split,
/// merge and return blocks such that allocation and deallocation keep the heap compact.
///
/// Only making use of only [`alloc`](#method.alloc), [`free`](#method.free) and
/// [`realloc`](#method.realloc) (and following their respective assumptions) guarantees that no
/// block overlaps another, and that every byte obtained from the segment is accounted for.
///
/// The bookkeeper is not synchronized. Sharing one between threads needs an external lock held
/// for every call, as the [global arena](../allocator/index.html) does.
pub struct Bookkeeper<S> {
    /// The heap region.
    heap: Heap<S>,
    /// The free blocks.
    ///
    /// Guarantees
    /// ==========
    ///
    /// Outside of a call,
    ///
    /// 1. The list is sorted by address.
    /// 2. No two listed blocks are adjacent.
    ///
    /// Right after a `free` which returned `Ok`, additionally
    ///
    /// 3. No listed block of at least `min_dealloc` bytes ends at the break.
    ///
    /// Allocation doesn't trim, so the remainder of a fresh chunk may end at the break whatever
    /// its size.
    free: FreeList,
    /// The tunables.
    config: Config,
    /// The number of usable bytes currently handed out.
    allocated: usize,
    /// The number of blocks currently handed out.
    live: usize,
    /// Has the arena been torn down?
    torn_down: bool,
}

impl<S: Segment> Bookkeeper<S> {
    /// Create a new, empty arena over `segment`.
    ///
    /// This makes no allocations and doesn't move the break.
    pub fn new(segment: S, config: Config) -> Bookkeeper<S> {
        Bookkeeper {
            heap: Heap::new(segment, config.alloc_unit),
            free: FreeList::new(),
            config: config,
            allocated: 0,
            live: 0,
            torn_down: false,
        }
    }

    /// Allocate a block of `size` usable bytes.
    ///
    /// The free list is searched first, by address. The first block large enough is taken, and
    /// whatever it has in excess is split off and put back, as long as the excess can hold a
    /// header of its own.
    ///
    /// # Example
    ///
    /// We start with a free block large enough for our request.
    ///
    /// ```notrust
    ///    Address space
    ///   I---------------------------------I
    /// B
    /// l
    /// k
    /// s
    /// ```
    ///
    /// We split it right after the requested size, and put the excess back.
    ///
    /// ```notrust
    ///    Address space
    ///   I------I
    /// B        I--------------------------I
    /// l  ^ our allocated block.
    /// k
    /// s
    /// ```
    ///
    /// If no free block fits, the heap is grown (by at least the allocation unit) and the fresh
    /// block is split the same way.
    ///
    /// # Failure
    ///
    /// `InvalidArgument` if `size` is zero, `OutOfMemory` if the segment refuses to grow. Nothing
    /// is changed on failure.
    pub fn alloc(&mut self, size: usize) -> Result<NonNull<u8>, Error> {
        if size == 0 {
            return Err(Error::InvalidArgument);
        }

        trace!("Allocating {} bytes.", size);

        let block = match self.free.first_fit(size) {
            Some(block) => {
                self.free.remove(block);
                block
            },
            None => self.heap.grow(size)?,
        };

        if block.can_split(size) {
            let excessive = block.split(size);
            self.free.insert(excessive);
        }

        debug_assert!(block.size() >= size, "Block too small for the request.");
        debug_assert!(block.addr() >= self.heap.start() && block.end() <= self.heap.brk(),
                      "Allocated {:?} outside of the heap.", block);

        Ok(self.leave(block))
    }

    /// Free a block.
    ///
    /// The block is inserted into the free list, merged with its free neighbours, and, if the
    /// resulting block at the end of the heap is at least `min_dealloc` bytes, given back to the
    /// OS.
    ///
    /// # Example
    ///
    /// ```notrust
    ///    Address space
    ///   I------I
    /// B        I-----------------I
    /// l  ^ the used block we want to deallocate.
    /// k
    /// s
    /// ```
    ///
    /// The blocks are adjacent, so we merge them:
    ///
    /// ```notrust
    ///    Address space
    ///   I--------------------------I
    /// B
    /// l
    /// k
    /// s
    /// ```
    ///
    /// # Failure
    ///
    /// `ShrinkFailure` if the OS refused to take the trailing block back. The block is on the free
    /// list in that case, so no memory is lost.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this bookkeeper, and not freed since. Freeing anything
    /// else corrupts the arena.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) -> Result<(), Error> {
        let block = self.enter(Block::from_payload(ptr.as_ptr()));

        trace!("Freeing {:?}.", block);

        #[cfg(feature = "security")]
        block.zero();

        self.free.insert(block);

        self.trim()
    }

    /// Reallocate a block to `size` usable bytes.
    ///
    /// Shrinking happens in place, giving the excess back to the free list. Growing first tries to
    /// absorb a free block directly to the right; only if that isn't possible, a new block is
    /// allocated, the data is copied over, and the old block is freed.
    ///
    /// The returned block holds the same data byte-for-byte as the original, truncated to `size`.
    ///
    /// # Failure
    ///
    /// `InvalidArgument` if `size` is zero, `OutOfMemory` if a new block is needed and the
    /// segment refuses to grow. The original block is intact on failure.
    ///
    /// A refused release of freed memory (the excess of a shrink, or the old block after a move)
    /// is not an error here: the reallocation itself succeeded, and the memory stays on the free
    /// list. It is logged as a warning.
    ///
    /// # Safety
    ///
    /// Same as for [`free`](#method.free).
    pub unsafe fn realloc(&mut self, ptr: NonNull<u8>, size: usize) -> Result<NonNull<u8>, Error> {
        if size == 0 {
            return Err(Error::InvalidArgument);
        }

        let block = Block::from_payload(ptr.as_ptr());
        let old = block.size();

        trace!("Reallocating {:?} to size {}.", block, size);

        if size <= old {
            // Shrink in place.
            if block.can_split(size) {
                let excessive = block.split(size);
                self.allocated -= old - size;
                self.free.insert(excessive);
                // The excess may release memory; the reallocation has succeeded either way.
                let _ = self.trim();
            }

            return Ok(ptr);
        }

        if let Some(next) = self.free.find_at(block.end()) {
            if old + next.total() >= size {
                // Extend in place.
                self.free.remove(next);
                block.merge_right(next);
                if block.can_split(size) {
                    let excessive = block.split(size);
                    self.free.insert(excessive);
                }
                self.allocated += block.size() - old;

                return Ok(ptr);
            }
        }

        let res = self.alloc(size)?;
        ptr::copy_nonoverlapping(ptr.as_ptr(), res.as_ptr(), old);
        // As above, a refused shrink leaves the old block on the free list.
        let _ = self.free(ptr);

        Ok(res)
    }

    /// Get the usable size of an allocated block.
    ///
    /// This can be larger than requested, when the excess was too small to be split off.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live allocation of this bookkeeper.
    #[inline]
    pub unsafe fn usable_size(&self, ptr: NonNull<u8>) -> usize {
        Block::from_payload(ptr.as_ptr()).size()
    }

    /// Tear the arena down.
    ///
    /// The free block at the end of the heap is given back to the OS in full, regardless of
    /// `min_dealloc`, and the free list is forgotten. Nothing below an allocated block is ever
    /// reclaimed, so live allocations stay valid.
    ///
    /// This is meant to run once, on exit. Later calls do nothing.
    pub fn teardown(&mut self) -> Result<(), Error> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;

        debug!("Tearing down the arena ({} live blocks, {} free blocks).", self.live,
               self.free.len());

        if self.free.is_empty() {
            return Ok(());
        }

        if let Some(last) = self.free.coalesce() {
            if last.end() == self.heap.brk() {
                self.heap.retract(last.addr()).map_err(|()| {
                    warn!("Failed to reclaim {:?} on teardown.", last);

                    Error::ShrinkFailure {
                        addr: last.addr(),
                        size: last.size(),
                    }
                })?;
            } else {
                debug!("{:?} doesn't end at the break, leaving the heap as it is.", last);
            }
        }

        self.free.clear();

        Ok(())
    }

    /// The current break.
    #[inline]
    pub fn brk(&self) -> usize {
        self.heap.brk()
    }

    /// The start of the heap.
    #[inline]
    pub fn start(&self) -> usize {
        self.heap.start()
    }

    /// The number of bytes currently held from the segment.
    #[inline]
    pub fn granted(&self) -> usize {
        self.heap.granted()
    }

    /// The number of usable bytes currently handed out.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// The number of blocks currently handed out.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// The configuration of this arena.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the inner segment.
    #[inline]
    pub fn segment(&self) -> &S {
        self.heap.segment()
    }

    /// The free blocks, as `(address, size)` pairs in address order.
    #[inline]
    pub fn free_blocks(&self) -> FreeBlocks {
        FreeBlocks::new(self.free.iter())
    }

    /// Take a snapshot of the arena for printing.
    #[inline]
    pub fn report<'a>(&'a self, stage: &'a str) -> Report<'a> {
        Report::new(stage, self.heap.brk(), &self.free)
    }

    /// Merge the free list, and give the block at the end of the heap back if it is large enough.
    fn trim(&mut self) -> Result<(), Error> {
        let last = match self.free.coalesce() {
            Some(last) => last,
            None => return Ok(()),
        };

        if last.end() == self.heap.brk() && last.size() >= self.config.min_dealloc {
            self.free.remove(last);

            if let Err(err) = self.heap.shrink(last) {
                warn!("Unable to release {:?} to the OS, keeping it.", last);
                // Put it back, it is still ours.
                self.free.insert(last);

                return Err(err);
            }
        }

        Ok(())
    }

    /// Leave the allocator.
    ///
    /// A block should be "registered" through this function when it leaves the allocator (i.e.,
    /// is returned), these are used to keep track of the current heap usage.
    #[inline]
    fn leave(&mut self, block: Block) -> NonNull<u8> {
        self.allocated += block.size();
        self.live += 1;

        unsafe {
            // The payload follows a header, so it is never null.
            NonNull::new_unchecked(block.payload() as *mut u8)
        }
    }

    /// Enter the allocator.
    ///
    /// The counterpart of [`leave`](#method.leave), for blocks given back by the user.
    #[inline]
    fn enter(&mut self, block: Block) -> Block {
        self.allocated -= block.size();
        self.live -= 1;

        block
    }
}
