//! General error handling.

use core::fmt;

/// An allocator error.
///
/// Every failure is handed straight back to the caller; nothing is retried internally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The segment refused to grow the heap.
    ///
    /// This is for OOM-conditions (the OS is unable to give us more memory), or for requests so
    /// large that their header can't be accounted for.
    OutOfMemory {
        /// The requested usable size.
        requested: usize,
    },
    /// The segment refused to take memory back.
    ///
    /// The block in question has been put back on the free list, so no memory is lost.
    ShrinkFailure {
        /// The address of the block's header.
        addr: usize,
        /// The usable size of the block.
        size: usize,
    },
    /// A zero-sized allocation was requested.
    InvalidArgument,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::OutOfMemory { requested } => {
                write!(f, "out of memory (requested {} bytes)", requested)
            },
            Error::ShrinkFailure { addr, size } => {
                write!(f, "failed to release 0x{:x}[0x{:x}] to the OS", addr, size)
            },
            Error::InvalidArgument => write!(f, "invalid allocation size"),
        }
    }
}
