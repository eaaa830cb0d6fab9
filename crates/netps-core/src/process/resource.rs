//! Memory and CPU counters with unit conversion.
//!
//! Raw counters come in pages and clock ticks. Conversion uses one sample of
//! the tick rate, page size and system uptime per fetch so elapsed time and
//! CPU time are never computed from different samples.

use super::{HostFactorSource, ResourceSource, UptimeSource};
use crate::host::HostFactors;
use crate::procfs::stat::{state_label, StatFields};
use crate::procfs::ProcError;
use netps_common::ProcessId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw counters from the stat snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounters {
    pub state: char,
    pub rss_pages: u64,
    pub vsize_bytes: u64,
    pub start_ticks: u64,
    pub user_ticks: u64,
    pub system_ticks: u64,
}

impl From<StatFields> for ResourceCounters {
    fn from(stat: StatFields) -> Self {
        ResourceCounters {
            state: stat.state,
            rss_pages: stat.rss_pages,
            vsize_bytes: stat.vsize,
            start_ticks: stat.starttime,
            user_ticks: stat.utime,
            system_ticks: stat.stime,
        }
    }
}

/// Raw counters plus derived sizes and durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResource {
    pub pid: ProcessId,
    pub counters: ResourceCounters,
    pub state_label: String,
    pub resident_bytes: u64,
    /// Seconds after boot at which the process started.
    pub start_time_secs: u64,
    pub elapsed: Duration,
    pub user_cpu: Duration,
    pub system_cpu: Duration,
    /// Factors the derived fields were computed with.
    pub factors: HostFactors,
    pub uptime_sample: f64,
}

impl ProcessResource {
    /// Derive sizes and durations from one consistent factor sample.
    ///
    /// Tick divisions truncate. Elapsed time clamps at zero when the uptime
    /// sample lags a process that just started, and saturates when the
    /// sample is too large for a `Duration`.
    pub fn from_counters(
        pid: ProcessId,
        counters: ResourceCounters,
        factors: HostFactors,
        uptime_sample: f64,
    ) -> Self {
        let ticks = factors.clock_ticks.max(1);
        let start_time_secs = counters.start_ticks / ticks;
        let elapsed_secs = (uptime_sample - start_time_secs as f64).max(0.0);

        ProcessResource {
            pid,
            counters,
            state_label: state_label(counters.state).to_string(),
            resident_bytes: counters.rss_pages.saturating_mul(factors.page_size),
            start_time_secs,
            elapsed: Duration::try_from_secs_f64(elapsed_secs).unwrap_or(Duration::MAX),
            user_cpu: Duration::from_secs(counters.user_ticks / ticks),
            system_cpu: Duration::from_secs(counters.system_ticks / ticks),
            factors,
            uptime_sample,
        }
    }
}

/// Fetch counters and convert them.
///
/// Counters are read before the uptime sample so elapsed time never runs
/// ahead of the counters it is derived from.
pub fn fetch_resource(
    resources: &dyn ResourceSource,
    uptime: &dyn UptimeSource,
    host: &dyn HostFactorSource,
    pid: ProcessId,
) -> Result<ProcessResource, ProcError> {
    let counters = resources.resource_counters(pid)?;
    let factors = HostFactors::new(host.clock_ticks(), host.page_size());
    let uptime_sample = uptime.uptime()?;
    Ok(ProcessResource::from_counters(pid, counters, factors, uptime_sample))
}
