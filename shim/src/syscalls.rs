//! System calls.

use crate::config;

/// Move the program break by `n` bytes. See `man sbrk`.
///
/// On success, the old program break is returned. On failure, `!0` is returned.
///
/// # Safety
///
/// Moving the break down invalidates whatever lived above the new break.
#[inline]
pub unsafe fn sbrk(n: isize) -> *mut u8 {
    libc::sbrk(n as libc::intptr_t) as *mut u8
}

/// Get the current program break without moving it.
#[inline]
pub fn current_brk() -> *mut u8 {
    // `sbrk(0)` only queries.
    unsafe { libc::sbrk(0) as *mut u8 }
}

/// The size of an OS page, in bytes.
///
/// Falls back to [`config::FALLBACK_PAGE_SIZE`] if `sysconf` refuses to answer.
pub fn page_size() -> usize {
    let res = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    if res > 0 {
        res as usize
    } else {
        config::FALLBACK_PAGE_SIZE
    }
}

/// Voluntarily give a time slice to the scheduler.
#[inline]
pub fn sched_yield() -> i32 {
    unsafe { libc::sched_yield() }
}

/// Register a function to be called on normal process exit. See `man atexit`.
///
/// Returns zero on success.
pub fn atexit(f: extern "C" fn()) -> i32 {
    unsafe { libc::atexit(f) }
}
