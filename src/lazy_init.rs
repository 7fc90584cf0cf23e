//! `LazyStatic` like initialization.

/// The initialization state
enum State<F, T> {
    /// The data is uninitialized, initialization is pending.
    ///
    /// The inner closure contains the initialization function.
    Uninitialized(F),
    /// The data is initialized, and ready for use.
    Initialized(T),
    /// Initialization is in progress (the initializer has been taken out).
    Initializing,
}

/// A lazily initialized container.
///
/// This container starts out simply containing an initializer (i.e., a function to construct the
/// value in question). When the value is requested, the initializer runs.
pub struct LazyInit<F, T> {
    /// The internal state.
    state: State<F, T>,
}

impl<F: FnOnce() -> T, T> LazyInit<F, T> {
    /// Create a new to-be-initialized container.
    ///
    /// The closure will be executed when initialization is required, and is guaranteed to be
    /// executed at most once.
    #[inline]
    pub const fn new(init: F) -> LazyInit<F, T> {
        LazyInit {
            state: State::Uninitialized(init),
        }
    }

    /// Get a mutable reference to the inner value.
    ///
    /// If it is uninitialized, it will be initialized and then returned.
    #[inline]
    pub fn get(&mut self) -> &mut T {
        if let State::Uninitialized(_) = self.state {
            if let State::Uninitialized(f) = core::mem::replace(&mut self.state, State::Initializing) {
                self.state = State::Initialized(f());
            }
        }

        match self.state {
            State::Initialized(ref mut x) => x,
            _ => unreachable!("Reentrant lazy initialization."),
        }
    }

    /// Get the inner value, if it has been initialized.
    ///
    /// This never runs the initializer.
    #[inline]
    pub fn get_if_initialized(&mut self) -> Option<&mut T> {
        match self.state {
            State::Initialized(ref mut x) => Some(x),
            _ => None,
        }
    }
}
