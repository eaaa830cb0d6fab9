//! Fuzz target for the `Uid:` line of /proc/[pid]/status and /etc/passwd lookup.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netps_core::procfs::status::parse_uid_line;
use netps_core::users::lookup_passwd_content;

fuzz_target!(|data: &str| {
    if let Ok((real, effective)) = parse_uid_line(data) {
        let _ = lookup_passwd_content(data, real);
        let _ = lookup_passwd_content(data, effective);
    }
});
