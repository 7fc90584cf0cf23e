//! Test automation.

#![allow(dead_code)]

use std::cell::Cell;
use std::ptr::NonNull;

use brkalloc::{Bookkeeper, Buffer, Config, Segment, HEADER_SIZE};

/// Run `func` on a fresh arena over a buffer of `len` bytes.
pub fn with_arena<F, R>(len: usize, config: Config, func: F) -> R
    where F: FnOnce(&mut Bookkeeper<Buffer>) -> R {
    let mut buf = vec![0u8; len];
    let mut bk = Bookkeeper::new(Buffer::new(&mut buf), config);

    func(&mut bk)
}

/// The header address of a payload pointer.
pub fn header(ptr: NonNull<u8>) -> usize {
    ptr.as_ptr() as usize - HEADER_SIZE
}

/// Check the consistency of an arena over a contiguous segment.
///
/// `live` holds every allocation currently handed out. This asserts that
///
/// 1. the free list is sorted by address,
/// 2. free and live blocks never overlap, and tile `[start, brk)` without gaps,
/// 3. every byte granted by the segment belongs to exactly one block.
pub fn check<S: Segment>(bk: &Bookkeeper<S>, live: &[NonNull<u8>]) {
    let free: Vec<(usize, usize)> = bk.free_blocks().collect();
    for pair in free.windows(2) {
        assert!(pair[0].0 < pair[1].0, "Free list unsorted: {:?}", free);
    }

    let mut spans: Vec<(usize, usize)> = free.iter()
        .map(|&(addr, size)| (addr, addr + HEADER_SIZE + size))
        .chain(live.iter().map(|&ptr| {
            (header(ptr), ptr.as_ptr() as usize + unsafe { bk.usable_size(ptr) })
        }))
        .collect();
    spans.sort();

    let mut cur = bk.start();
    for &(start, end) in &spans {
        assert_eq!(start, cur, "Gap or overlap at 0x{:x}: {:x?}", cur, spans);
        cur = end;
    }
    assert_eq!(cur, bk.brk(), "Blocks don't end at the break.");

    let total: usize = spans.iter().map(|&(start, end)| end - start).sum();
    assert_eq!(total, bk.granted(), "Granted bytes not conserved.");
    assert_eq!(bk.live(), live.len());
}

/// The byte at offset `i` of an allocation tagged `tag`.
///
/// The pattern doesn't depend on the address, so it survives a moving reallocation.
fn pattern(tag: u8, i: usize) -> u8 {
    tag.wrapping_add((i * 7 + 3) as u8)
}

/// Fill an allocation with the byte pattern of `tag`.
pub fn scribble(ptr: NonNull<u8>, len: usize, tag: u8) {
    for i in 0..len {
        unsafe {
            *ptr.as_ptr().add(i) = pattern(tag, i);
        }
    }
}

/// Check the pattern written by [`scribble`].
pub fn verify(ptr: NonNull<u8>, len: usize, tag: u8) {
    for i in 0..len {
        unsafe {
            assert_eq!(*ptr.as_ptr().add(i), pattern(tag, i),
                       "Corrupted byte {} of 0x{:x}.", i, ptr.as_ptr() as usize);
        }
    }
}

/// A small deterministic PRNG (xorshift).
pub struct Rng(u64);

impl Rng {
    /// Seed the generator.
    pub fn new(seed: u64) -> Rng {
        Rng(seed | 1)
    }

    /// A number in `0..n`.
    pub fn below(&mut self, n: usize) -> usize {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;

        (self.0 % n as u64) as usize
    }
}

/// A segment which can be told to refuse giving memory back.
pub struct Stubborn<'a, S> {
    /// The inner segment.
    pub inner: S,
    /// Refuse every retraction while set.
    pub refuse: &'a Cell<bool>,
}

impl<'a, S: Segment> Segment for Stubborn<'a, S> {
    fn brk(&self) -> usize {
        self.inner.brk()
    }

    fn extend(&mut self, by: usize) -> Result<usize, ()> {
        self.inner.extend(by)
    }

    unsafe fn retract(&mut self, to: usize) -> Result<(), ()> {
        if self.refuse.get() {
            Err(())
        } else {
            self.inner.retract(to)
        }
    }
}
