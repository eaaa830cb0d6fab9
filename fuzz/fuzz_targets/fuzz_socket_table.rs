//! Fuzz target for /proc/net/{tcp,tcp6,udp,udp6} parsing.
//!
//! Tests that malformed rows are skipped rather than panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netps_core::procfs::net::{parse_socket_table_content, Protocol};

fuzz_target!(|data: &str| {
    for protocol in Protocol::ALL {
        let _ = parse_socket_table_content(data, protocol);
    }
});
