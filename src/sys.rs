//! System primitives.

use crate::prelude::*;

/// The program break of this process, as a segment.
///
/// The break is read from the OS every time instead of being cached: other `brk` users (libc
/// malloc, for one) may move it behind our back, and we must never retract memory that isn't
/// ours.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sbrk;

impl Segment for Sbrk {
    #[inline]
    fn brk(&self) -> usize {
        shim::current_brk() as usize
    }

    fn extend(&mut self, by: usize) -> Result<usize, ()> {
        // The conversion is fallible to avoid overflow-based attacks.
        let by = isize::try_from(by).map_err(|_| ())?;

        let old = unsafe {
            // Moving the break up never invalidates anything.
            shim::sbrk(by)
        };

        if old as usize == !0 {
            Err(())
        } else {
            Ok(old as usize)
        }
    }

    unsafe fn retract(&mut self, to: usize) -> Result<(), ()> {
        let brk = self.brk();
        if to > brk {
            return Err(());
        }

        let by = isize::try_from(brk - to).map_err(|_| ())?;
        if shim::sbrk(-by) as usize == !0 {
            Err(())
        } else {
            Ok(())
        }
    }
}

/// Cooperatively gives up a timeslice to the OS scheduler.
pub fn yield_now() {
    // There is nothing sensible to do if yielding fails; we'll just spin again.
    let _ = shim::sched_yield();
}

/// Write text to the log.
///
/// The log target is defined by the `shim` crate.
pub fn log(s: &str) -> Result<(), ()> {
    if shim::log(s) == -1 { Err(()) } else { Ok(()) }
}
