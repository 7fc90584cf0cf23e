//! Growable memory segments.
//!
//! A segment is a contiguous range of memory with a movable upper boundary, the "break". The
//! allocator never touches the break directly; it asks its segment to move it, and the segment
//! may refuse.

use core::marker::PhantomData;

/// A growable, contiguous memory segment.
pub trait Segment {
    /// The current break.
    fn brk(&self) -> usize;

    /// Move the break up by `by` bytes.
    ///
    /// On success the old break (the start of the fresh memory) is returned. On failure, the
    /// break is left untouched.
    fn extend(&mut self, by: usize) -> Result<usize, ()>;

    /// Move the break down to `to`.
    ///
    /// `to` is never above the current break. On failure, the break is left untouched.
    ///
    /// # Safety
    ///
    /// Everything between `to` and the old break is gone after this returns successfully.
    unsafe fn retract(&mut self, to: usize) -> Result<(), ()>;
}

/// A segment over a caller-provided buffer.
///
/// The break starts at the beginning of the buffer and can move anywhere inside it. This is
/// useful where there is no program break to speak of (embedded targets), or when the memory of
/// the arena should be confined and deterministic (tests).
pub struct Buffer<'a> {
    /// The first address of the buffer.
    base: usize,
    /// The length of the buffer.
    len: usize,
    /// The current break.
    brk: usize,
    /// The buffer is exclusively ours.
    _phantom: PhantomData<&'a mut [u8]>,
}

impl<'a> Buffer<'a> {
    /// Create a segment with its break at the start of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Buffer<'a> {
        let base = buf.as_mut_ptr() as usize;

        Buffer {
            base: base,
            len: buf.len(),
            brk: base,
            _phantom: PhantomData,
        }
    }

    /// The first address of the buffer.
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    /// The number of bytes left above the break.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.base + self.len - self.brk
    }
}

impl<'a> Segment for Buffer<'a> {
    #[inline]
    fn brk(&self) -> usize {
        self.brk
    }

    fn extend(&mut self, by: usize) -> Result<usize, ()> {
        if by > self.remaining() {
            return Err(());
        }

        let old = self.brk;
        self.brk += by;

        Ok(old)
    }

    unsafe fn retract(&mut self, to: usize) -> Result<(), ()> {
        if to < self.base || to > self.brk {
            return Err(());
        }

        self.brk = to;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_extend() {
        let mut arr = vec![0u8; 100];
        let mut seg = Buffer::new(&mut arr);
        let base = seg.base();

        assert_eq!(seg.brk(), base);
        assert_eq!(seg.extend(60), Ok(base));
        assert_eq!(seg.extend(40), Ok(base + 60));
        assert_eq!(seg.remaining(), 0);
        assert_eq!(seg.brk(), base + 100);
    }

    #[test]
    fn test_oom() {
        let mut arr = vec![0u8; 100];
        let mut seg = Buffer::new(&mut arr);
        let base = seg.base();

        assert!(seg.extend(101).is_err());
        // A refusal leaves the break alone.
        assert_eq!(seg.brk(), base);
        assert!(seg.extend(usize::max_value()).is_err());
    }

    #[test]
    fn test_retract() {
        let mut arr = vec![0u8; 100];
        let mut seg = Buffer::new(&mut arr);
        let base = seg.base();

        seg.extend(80).unwrap();
        unsafe {
            assert!(seg.retract(base + 90).is_err());
            assert!(seg.retract(base - 1).is_err());
            assert_eq!(seg.retract(base + 10), Ok(()));
        }
        assert_eq!(seg.brk(), base + 10);
        assert_eq!(seg.remaining(), 90);
    }
}
