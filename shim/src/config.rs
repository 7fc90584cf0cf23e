//! Configuration.
//!
//! This module contains anything which can be tweaked and customized to the users preferences.

/// The allocation unit, in pages.
///
/// Requests smaller than this many pages grow the heap by exactly this many pages, so that a
/// run of small allocations doesn't call into the kernel every time.
pub const ALLOC_UNIT_PAGES: usize = 3;

/// The minimum deallocation, in pages.
///
/// A free block at the end of the heap is only given back to the OS once it is at least this
/// large.
pub const MIN_DEALLOC_PAGES: usize = 1;

/// The page size assumed when the OS can't tell us.
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// The file descriptor state dumps are written to.
pub const LOG_TARGET: i32 = 2;

/// The default allocation unit, in bytes.
#[inline]
pub fn default_alloc_unit() -> usize {
    ALLOC_UNIT_PAGES * crate::syscalls::page_size()
}

/// The default minimum deallocation, in bytes.
#[inline]
pub fn default_min_dealloc() -> usize {
    MIN_DEALLOC_PAGES * crate::syscalls::page_size()
}
