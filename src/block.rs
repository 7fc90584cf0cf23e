//! Memory blocks.
//!
//! Blocks are the main unit for the memory bookkeeping. Every block starts with a [`Header`]
//! holding its usable size and, while the block is free, the links of the free list. The
//! payload handed out to the user starts exactly [`HEADER_SIZE`] bytes after the header.
//!
//! A [`Block`] is only a handle (the header's address); the header itself lives in the arena.

use core::{fmt, mem, ptr};

/// The header prepended to every block.
///
/// Headers may be placed at any byte address (payloads are not rounded up), so they are always
/// accessed with unaligned reads and writes.
#[repr(C)]
#[derive(Clone, Copy)]
struct Header {
    /// The previous free block, or zero.
    prev: usize,
    /// The next free block, or zero.
    next: usize,
    /// The usable payload size, excluding the header.
    size: usize,
}

/// The distance between a block's header and its payload.
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// A handle to a block in the arena.
///
/// This provides a number of guarantees,
///
/// 1. The address points to an initialized header inside some arena.
/// 2. `addr + HEADER_SIZE + size` does not overflow and stays within the arena.
///
/// Both are established by the (unsafe) constructors; everything else is safe.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Block {
    /// The address of the header.
    addr: usize,
}

impl Block {
    /// Write a fresh, unlinked header at `addr`.
    ///
    /// # Safety
    ///
    /// `addr..addr + HEADER_SIZE + size` must be writable memory owned by the caller.
    #[inline]
    pub unsafe fn init(addr: usize, size: usize) -> Block {
        debug_assert!(addr != 0, "Null block.");

        ptr::write_unaligned(addr as *mut Header, Header {
            prev: 0,
            next: 0,
            size: size,
        });

        Block { addr: addr }
    }

    /// Get the handle of an existing header.
    ///
    /// # Safety
    ///
    /// A header must have been written at `addr` by [`Block::init`] (or a split).
    #[inline]
    pub unsafe fn from_raw(addr: usize) -> Block {
        Block { addr: addr }
    }

    /// Recover the block from the payload pointer handed out to the user.
    ///
    /// # Safety
    ///
    /// `payload` must be the payload of a live block.
    #[inline]
    pub unsafe fn from_payload(payload: *mut u8) -> Block {
        Block::from_raw(payload as usize - HEADER_SIZE)
    }

    /// The address of the header.
    #[inline]
    pub fn addr(self) -> usize {
        self.addr
    }

    /// The address of the payload.
    #[inline]
    pub fn payload(self) -> usize {
        self.addr + HEADER_SIZE
    }

    /// The usable size of this block.
    #[inline]
    pub fn size(self) -> usize {
        self.header().size
    }

    /// Overwrite the usable size of this block.
    #[inline]
    pub fn set_size(self, size: usize) {
        let mut header = self.header();
        header.size = size;
        self.write(header);
    }

    /// The first address past this block.
    #[inline]
    pub fn end(self) -> usize {
        self.payload() + self.size()
    }

    /// The header plus payload span, in bytes.
    #[inline]
    pub fn total(self) -> usize {
        HEADER_SIZE + self.size()
    }

    /// The previous free block.
    #[inline]
    pub fn prev(self) -> Option<Block> {
        Block::link(self.header().prev)
    }

    /// The next free block.
    #[inline]
    pub fn next(self) -> Option<Block> {
        Block::link(self.header().next)
    }

    /// Set the previous free block.
    #[inline]
    pub fn set_prev(self, prev: Option<Block>) {
        let mut header = self.header();
        header.prev = prev.map_or(0, Block::addr);
        self.write(header);
    }

    /// Set the next free block.
    #[inline]
    pub fn set_next(self, next: Option<Block>) {
        let mut header = self.header();
        header.next = next.map_or(0, Block::addr);
        self.write(header);
    }

    /// Is this block placed directly left to the given other block?
    #[inline]
    pub fn left_to(self, to: Block) -> bool {
        self.end() == to.addr
    }

    /// Can this block be split after `size` bytes?
    ///
    /// The leftover has to hold a header and at least one byte of payload.
    #[inline]
    pub fn can_split(self, size: usize) -> bool {
        size.checked_add(HEADER_SIZE).map_or(false, |x| self.size() > x)
    }

    /// Split the block after `size` bytes of payload, and return the leftover.
    ///
    /// This block keeps its identity and is shrunk to exactly `size`. The leftover is a new,
    /// unlinked block covering the rest; together they span exactly the bytes of the original.
    ///
    /// # Panics
    ///
    /// Panics if the leftover couldn't hold a header and a byte (see [`Block::can_split`]).
    #[inline]
    pub fn split(self, size: usize) -> Block {
        assert!(self.can_split(size), "Split at {} out of bound (size is {})!", size, self.size());

        let rest_size = self.size() - HEADER_SIZE - size;
        self.set_size(size);

        unsafe {
            // The leftover lies inside our old payload, which we own.
            Block::init(self.end(), rest_size)
        }
    }

    /// Merge the block to the right into this one.
    ///
    /// The right block loses its identity. Its links are not touched, so it must be unlinked by
    /// the caller.
    ///
    /// # Panics
    ///
    /// Panics if the blocks aren't adjacent.
    #[inline]
    pub fn merge_right(self, right: Block) {
        assert!(self.left_to(right), "Merging non-adjacent blocks {:?} and {:?}.", self, right);

        self.set_size(self.size() + right.total());
    }

    /// Zero the payload of this block.
    #[cfg(feature = "security")]
    pub fn zero(self) {
        unsafe {
            ptr::write_bytes(self.payload() as *mut u8, 0, self.size());
        }
    }

    #[inline]
    fn link(addr: usize) -> Option<Block> {
        if addr == 0 {
            None
        } else {
            Some(Block { addr: addr })
        }
    }

    #[inline]
    fn header(self) -> Header {
        unsafe { ptr::read_unaligned(self.addr as *const Header) }
    }

    #[inline]
    fn write(self, header: Header) {
        unsafe { ptr::write_unaligned(self.addr as *mut Header, header) }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:x}[0x{:x}]", self.addr, self.size())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_header_mapping() {
        let mut arr = vec![0u8; 256];
        let base = arr.as_mut_ptr() as usize;

        let block = unsafe { Block::init(base, 256 - HEADER_SIZE) };
        assert_eq!(block.payload(), base + HEADER_SIZE);
        assert_eq!(block.end(), base + 256);
        assert_eq!(unsafe { Block::from_payload(block.payload() as *mut u8) }, block);
        assert!(block.prev().is_none());
        assert!(block.next().is_none());
    }

    #[test]
    fn test_split() {
        let mut arr = vec![0u8; 256];
        let base = arr.as_mut_ptr() as usize;

        let block = unsafe { Block::init(base, 256 - HEADER_SIZE) };
        let rest = block.split(5);

        assert_eq!(block.size(), 5);
        assert_eq!(rest.addr(), base + HEADER_SIZE + 5);
        assert_eq!(block.total() + rest.total(), 256);
        assert!(block.left_to(rest));
        assert!(block < rest);
    }

    #[test]
    fn test_merge() {
        let mut arr = vec![0u8; 128];
        let base = arr.as_mut_ptr() as usize;

        let block = unsafe { Block::init(base, 128 - HEADER_SIZE) };
        let rest = block.split(32);
        block.merge_right(rest);

        assert_eq!(block.size(), 128 - HEADER_SIZE);
        assert_eq!(block.end(), base + 128);
    }

    #[test]
    fn test_links() {
        let mut arr = vec![0u8; 256];
        let base = arr.as_mut_ptr() as usize;

        let a = unsafe { Block::init(base, 256 - HEADER_SIZE) };
        let b = a.split(64);
        a.set_next(Some(b));
        b.set_prev(Some(a));

        assert_eq!(a.next(), Some(b));
        assert_eq!(b.prev(), Some(a));
        // Relinking leaves the size alone.
        assert_eq!(a.size(), 64);

        a.set_next(None);
        assert!(a.next().is_none());
    }

    #[test]
    fn test_can_split() {
        let mut arr = vec![0u8; 128];
        let block = unsafe { Block::init(arr.as_mut_ptr() as usize, 100) };

        assert!(block.can_split(100 - HEADER_SIZE - 1));
        assert!(!block.can_split(100 - HEADER_SIZE));
        assert!(!block.can_split(100));
        assert!(!block.can_split(usize::max_value()));
    }

    #[test]
    #[should_panic]
    fn test_oob() {
        let mut arr = vec![0u8; 64];
        let block = unsafe { Block::init(arr.as_mut_ptr() as usize, 64 - HEADER_SIZE) };

        // No room left for a header.
        block.split(64 - 2 * HEADER_SIZE);
    }
}
