//! The global allocator.
//!
//! This contains the process-wide arena, which grows into the real program break. Every call
//! locks the arena for its whole duration.

use crate::prelude::*;

use core::fmt::Write;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::lazy_init::LazyInit;
use crate::sync::{self, Mutex};
use crate::sys::Sbrk;
use crate::write;

/// The initializer of the global arena.
type Init = fn() -> Bookkeeper<Sbrk>;

/// The bookkeeper.
///
/// This is the associated bookkeeper of this allocator. It is created on first use, so the
/// configuration can depend on the page size.
static BOOKKEEPER: Mutex<LazyInit<Init, Bookkeeper<Sbrk>>> =
    Mutex::new(LazyInit::new(system as Init));

/// Is the exit hook registered?
static EXIT_HOOK: AtomicBool = AtomicBool::new(false);

/// Create the global arena.
fn system() -> Bookkeeper<Sbrk> {
    Bookkeeper::new(Sbrk, Config::default())
}

/// Lock the global arena.
fn lock() -> sync::MutexGuard<'static, LazyInit<Init, Bookkeeper<Sbrk>>> {
    BOOKKEEPER.lock()
}

/// Allocate a block of `size` bytes from the global arena.
///
/// See [`Bookkeeper::alloc`].
pub fn alloc(size: usize) -> Result<NonNull<u8>, Error> {
    lock().get().alloc(size)
}

/// Free a block of the global arena.
///
/// See [`Bookkeeper::free`].
///
/// # Safety
///
/// `ptr` must have been returned by [`alloc`] or [`realloc`], and not freed since.
pub unsafe fn free(ptr: NonNull<u8>) -> Result<(), Error> {
    lock().get().free(ptr)
}

/// Reallocate a block of the global arena.
///
/// See [`Bookkeeper::realloc`].
///
/// # Safety
///
/// Same as for [`free`].
pub unsafe fn realloc(ptr: NonNull<u8>, size: usize) -> Result<NonNull<u8>, Error> {
    lock().get().realloc(ptr, size)
}

/// Get the usable size of a block of the global arena.
///
/// # Safety
///
/// `ptr` must be a live allocation of the global arena.
pub unsafe fn usable_size(ptr: NonNull<u8>) -> usize {
    lock().get().usable_size(ptr)
}

/// Tear the global arena down.
///
/// See [`Bookkeeper::teardown`]. If the arena was never used, this does nothing.
pub fn teardown() -> Result<(), Error> {
    match lock().get_if_initialized() {
        Some(bk) => bk.teardown(),
        None => Ok(()),
    }
}

/// The exit hook.
extern "C" fn on_exit() {
    if let Err(err) = teardown() {
        warn!("Teardown on exit failed: {}.", err);
    }
}

/// Tear the global arena down when the process exits.
///
/// Registering more than once has no further effect.
pub fn install_exit_hook() -> Result<(), ()> {
    if EXIT_HOOK.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    if shim::atexit(on_exit) == 0 {
        Ok(())
    } else {
        EXIT_HOOK.store(false, Ordering::SeqCst);
        Err(())
    }
}

/// Print the state of the global arena to the log target.
///
/// The arena stays locked while printing; nothing here allocates.
pub fn print_stats(stage: &str) {
    let mut guard = lock();
    let bk = guard.get();

    let _ = write!(write::LogWriter, "{}", bk.report(stage));
}

/// Run `f` on the state report of the global arena.
///
/// The arena stays locked while `f` runs, so `f` must not call into the global arena.
pub fn with_report<F: FnOnce(&Report) -> R, R>(stage: &str, f: F) -> R {
    let mut guard = lock();

    f(&guard.get().report(stage))
}
