//! Synchronization primitives.

use core::cell::UnsafeCell;
use core::ops;
use core::sync::atomic::{self, AtomicBool};

use crate::sys;

/// A mutual exclusive container.
///
/// This assures that only one holds mutability of the inner value. To get the inner value, you
/// need acquire the "lock". If you try to lock it while a lock is already held elsewhere, it will
/// block the thread until the lock is released.
pub struct Mutex<T> {
    /// The inner value.
    inner: UnsafeCell<T>,
    /// The lock boolean.
    ///
    /// This is true, if and only if the lock is currently held.
    locked: AtomicBool,
}

/// A mutex guard.
///
/// This acts as the lock.
#[must_use]
pub struct MutexGuard<'a, T: 'a> {
    /// The parent mutex.
    mutex: &'a Mutex<T>,
}

/// Release the mutex.
impl<'a, T> Drop for MutexGuard<'a, T> {
    #[inline]
    fn drop(&mut self) {
        self.mutex.locked.store(false, atomic::Ordering::Release);
    }
}

impl<'a, T> ops::Deref for MutexGuard<'a, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe {
            // We hold the lock.
            &*self.mutex.inner.get()
        }
    }
}

impl<'a, T> ops::DerefMut for MutexGuard<'a, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        unsafe {
            // We hold the lock.
            &mut *self.mutex.inner.get()
        }
    }
}

impl<T> Mutex<T> {
    /// Create a new mutex with some inner value.
    #[inline]
    pub const fn new(inner: T) -> Mutex<T> {
        Mutex {
            inner: UnsafeCell::new(inner),
            locked: AtomicBool::new(false),
        }
    }

    /// Lock this mutex.
    ///
    /// If another lock is held, this will block the thread until it is released.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        // Lock the mutex.
        while self.locked
            .compare_exchange_weak(false, true, atomic::Ordering::Acquire, atomic::Ordering::Relaxed)
            .is_err() {
            // ,___,
            // {O,o}
            // |)``)
            // SRSLY?
            sys::yield_now();
        }

        MutexGuard {
            mutex: self,
        }
    }
}

unsafe impl<T: Send> Send for Mutex<T> {}
unsafe impl<T: Send> Sync for Mutex<T> {}
