//! Host conversion factors: clock ticks per second and page size.
//!
//! Queried once via `sysconf` and passed explicitly into readers.

use serde::{Deserialize, Serialize};

/// USER_HZ on every mainstream Linux build.
pub const FALLBACK_CLOCK_TICKS: u64 = 100;
pub const FALLBACK_PAGE_SIZE: u64 = 4096;

/// Clock-tick rate and page size used to convert raw process counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFactors {
    /// Ticks per second.
    pub clock_ticks: u64,
    /// Bytes per page.
    pub page_size: u64,
}

impl Default for HostFactors {
    fn default() -> Self {
        HostFactors {
            clock_ticks: FALLBACK_CLOCK_TICKS,
            page_size: FALLBACK_PAGE_SIZE,
        }
    }
}

impl HostFactors {
    pub fn new(clock_ticks: u64, page_size: u64) -> Self {
        HostFactors {
            clock_ticks: clock_ticks.max(1),
            page_size,
        }
    }

    /// Query the running host, falling back to 100 / 4096.
    pub fn query() -> Self {
        HostFactors::new(
            sysconf_or(libc::_SC_CLK_TCK, FALLBACK_CLOCK_TICKS),
            sysconf_or(libc::_SC_PAGESIZE, FALLBACK_PAGE_SIZE),
        )
    }

    /// Host values with optional configured overrides.
    pub fn resolve(clock_ticks: Option<u64>, page_size: Option<u64>) -> Self {
        let queried = HostFactors::query();
        HostFactors::new(
            clock_ticks.unwrap_or(queried.clock_ticks),
            page_size.unwrap_or(queried.page_size),
        )
    }
}

fn sysconf_or(name: libc::c_int, fallback: u64) -> u64 {
    let value = unsafe { libc::sysconf(name) };
    if value > 0 {
        value as u64
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_returns_positive_values() {
        let host = HostFactors::query();
        assert!(host.clock_ticks > 0);
        assert!(host.page_size >= 1024);
        assert!(host.page_size.is_power_of_two());
    }

    #[test]
    fn test_overrides_win() {
        let host = HostFactors::resolve(Some(250), Some(16384));
        assert_eq!(host, HostFactors::new(250, 16384));
    }

    #[test]
    fn test_zero_tick_rate_clamped() {
        assert_eq!(HostFactors::new(0, 4096).clock_ticks, 1);
    }
}
