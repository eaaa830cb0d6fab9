//! Fuzz target for /proc/[pid]/stat parsing.
//!
//! Tests that `parse_stat_content` handles arbitrary input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netps_core::procfs::stat::parse_stat_content;

fuzz_target!(|data: &str| {
    let _ = parse_stat_content(data);
});
