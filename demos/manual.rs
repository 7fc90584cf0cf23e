extern crate brkalloc;

use std::ptr;

fn main() {
    brkalloc::install_exit_hook().unwrap();
    brkalloc::print_stats("beginning");

    let ptr1 = brkalloc::alloc(64).unwrap();
    brkalloc::print_stats("after allocating 64 bytes");

    let ptr2 = brkalloc::alloc(1).unwrap();
    brkalloc::print_stats("after allocating 1 more byte");

    unsafe {
        ptr::write_bytes(ptr1.as_ptr(), 0x22, 64);
        *ptr2.as_ptr() = 7;
        assert_eq!(*ptr1.as_ptr().offset(63), 0x22);

        brkalloc::free(ptr1).unwrap();
    }
    brkalloc::print_stats("after freeing the first block");

    unsafe {
        let ptr2 = brkalloc::realloc(ptr2, 300).unwrap();
        assert_eq!(*ptr2.as_ptr(), 7);
        brkalloc::print_stats("after growing the second block");

        brkalloc::free(ptr2).unwrap();
    }
    brkalloc::print_stats("end");
}
