//! Direct shim-based write for state dumps.
//!
//! This writes through a non-allocating primitive, so it is safe to use while the allocator is
//! locked.

use core::fmt;

use crate::sys;

/// A log writer.
///
/// This writes to `sys::log`.
pub struct LogWriter;

impl fmt::Write for LogWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if sys::log(s).is_err() {
            Err(fmt::Error)
        } else { Ok(()) }
    }
}
