//! Arenas over the real program break.
//!
//! The break is process-wide, so everything touching it directly runs in a single test.

extern crate brkalloc;

mod util;

use brkalloc::{Bookkeeper, Config, Sbrk, Segment};

#[test_log::test]
fn program_break() {
    let mut seg = Sbrk;

    // Raw segment.
    let before = seg.brk();
    let old = seg.extend(4096).unwrap();
    assert!(old >= before);
    assert!(seg.brk() >= old + 4096);
    unsafe {
        for i in 0..4096 {
            *((old + i) as *mut u8) = i as u8;
        }
    }
    if seg.brk() == old + 4096 {
        unsafe { seg.retract(old).unwrap(); }
        assert_eq!(seg.brk(), old);
    }
    assert!(seg.extend(usize::max_value()).is_err());

    // A whole arena.
    let conf = Config::default();
    let mut bk = Bookkeeper::new(Sbrk, conf);

    let p1 = bk.alloc(64).unwrap();
    let p2 = bk.alloc(1).unwrap();
    assert_eq!(util::header(p2), p1.as_ptr() as usize + 64);
    util::scribble(p1, 64, 1);
    util::scribble(p2, 1, 2);

    unsafe { bk.free(p1).unwrap(); }
    assert_eq!(bk.free_blocks().next(), Some((util::header(p1), 64)));
    util::verify(p2, 1, 2);

    let big = bk.alloc(conf.alloc_unit + 1).unwrap();
    util::scribble(big, conf.alloc_unit + 1, 3);
    assert_eq!(unsafe { bk.usable_size(big) }, conf.alloc_unit + 1);

    unsafe {
        bk.free(big).unwrap();
        bk.free(p2).unwrap();
    }
    assert_eq!(bk.live(), 0);
    assert_eq!(bk.allocated(), 0);

    bk.teardown().unwrap();
    assert_eq!(bk.free_blocks().count(), 0);
}
