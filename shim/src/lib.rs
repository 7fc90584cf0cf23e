//! Symbols and externs that `brkalloc` depends on.
//!
//! This crate wraps the handful of libc entry points the allocator needs (the program break,
//! page size, yielding, exit hooks and a raw stderr write), and holds the compile-time
//! configuration defaults.

#![no_std]
#![warn(missing_docs)]

pub mod config;
pub mod log;
pub mod syscalls;

pub use log::log;
pub use syscalls::*;
