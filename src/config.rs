//! Arena configuration.
//!
//! The configuration is fixed when an arena is created. Defaults come from
//! `brkalloc_shim::config`, scaled by the OS page size.

use shim::config;

/// The tunables of an arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// The heap growth granularity for requests smaller than this.
    ///
    /// Requests of at least this many bytes grow the heap by exactly what they need.
    pub alloc_unit: usize,
    /// The minimum size of a trailing free block before it is given back to the OS.
    pub min_dealloc: usize,
}

impl Config {
    /// Create a configuration with explicit values, in bytes.
    #[inline]
    pub const fn new(alloc_unit: usize, min_dealloc: usize) -> Config {
        Config {
            alloc_unit: alloc_unit,
            min_dealloc: min_dealloc,
        }
    }
}

impl Default for Config {
    /// Three pages of allocation unit, and one page of minimum deallocation.
    fn default() -> Config {
        Config::new(config::default_alloc_unit(), config::default_min_dealloc())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default() {
        let page = shim::page_size();
        let conf = Config::default();

        assert_eq!(conf.alloc_unit, 3 * page);
        assert_eq!(conf.min_dealloc, page);
    }
}
