//! Fuzz target for /proc/[pid]/cmdline rendering.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netps_core::procfs::cmdline::parse_cmdline_content;

fuzz_target!(|data: &[u8]| {
    let rendered = parse_cmdline_content(data);
    // NUL separators never survive into the rendered line.
    assert!(!rendered.contains('\0'));
});
