//! **brkalloc:** a minimal first-fit allocator over the program break.
//!
//! The allocator manages a single contiguous, growable heap. Free blocks are kept in an
//! address-ordered, doubly-linked free list threaded through their headers. Allocation takes the
//! first block that fits (splitting off the excess), or grows the heap. Deallocation merges
//! adjacent free blocks, and gives the end of the heap back to the OS once it is large enough.
//!
//! ```text
//!   Heap layout:
//!
//!   start                                                             break
//!   ├──────┬─────────┬──────┬───────────────┬──────┬─────────────────────┤
//!   │ hdr  │  used   │ hdr  │     free      │ hdr  │        used         │
//!   └──────┴─────────┴──────┴───────────────┴──────┴─────────────────────┘
//!                       │                               ▲
//!                       └── free list (by address) ─────┘ (only free blocks are linked)
//! ```
//!
//! An arena is a [`Bookkeeper`] over a [`Segment`]. The process-wide arena (the free functions
//! of this crate) grows into the real program break through [`Sbrk`]; other arenas can live in any
//! buffer through [`Buffer`].
//!
//! The allocator is single-threaded by nature. The global arena is guarded by one lock held for
//! the whole of every call.

#![no_std]
#![warn(missing_docs)]

#[cfg(test)]
#[macro_use]
extern crate std;

extern crate brkalloc_shim as shim;

mod allocator;
mod block;
mod bookkeeper;
mod brk;
mod config;
mod free_list;
mod lazy_init;
mod prelude;
mod report;
mod segment;
mod sync;
mod sys;
mod write;
pub mod fail;

pub use allocator::{alloc, free, install_exit_hook, print_stats, realloc, teardown, usable_size,
                    with_report};
pub use block::HEADER_SIZE;
pub use bookkeeper::Bookkeeper;
pub use config::Config;
pub use fail::Error;
pub use report::{FreeBlocks, Report};
pub use segment::{Buffer, Segment};
pub use sys::Sbrk;
