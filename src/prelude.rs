//! Frequently used imports.

pub use log::{debug, trace, warn};

pub use crate::block::{Block, HEADER_SIZE};
pub use crate::bookkeeper::Bookkeeper;
pub use crate::brk::Heap;
pub use crate::config::Config;
pub use crate::fail::Error;
pub use crate::free_list::FreeList;
pub use crate::report::Report;
pub use crate::segment::Segment;
