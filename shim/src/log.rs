//! Raw log output.

use crate::config;

/// Write to the log.
///
/// This points to stderr, but could be changed through [`config::LOG_TARGET`]. The number of
/// bytes written is returned, or `-1` on failure.
pub fn log(s: &str) -> isize {
    unsafe { libc::write(config::LOG_TARGET, s.as_ptr() as *const libc::c_void, s.len()) as isize }
}
