//! In-memory process host for testing.
//!
//! [`MockHost`] implements every process capability trait over a fixed set
//! of [`MockProcess`] entries, with per-slot failure injection, artificial
//! latency and call counting so hydration behavior can be tested without a
//! real `/proc`.
//!
//! ```ignore
//! use netps_core::mock_sources::{MockFailure, MockHost, MockProcess};
//!
//! let host = Arc::new(
//!     MockHost::new()
//!         .with_process(MockProcess::new(1234, "postgres").socket(100, 5432, SocketState::Listen))
//!         .fail(SlotKind::Resource, MockFailure::PermissionDenied, 1),
//! );
//! let sources = host.sources();
//! ```

use crate::host::HostFactors;
use crate::hydration::SlotKind;
use crate::process::{
    HostFactorSource, IdentitySource, OwnerSource, OwnershipSource, ProcessIdentity,
    ResourceCounters, ResourceSource, SocketSource, Sources, UptimeSource,
};
use crate::procfs::net::{Protocol, SocketRecord, SocketState, SocketTable};
use crate::procfs::ProcError;
use crate::users::UserDirectory;
use netps_common::{ProcessId, SocketInode};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Default uptime for mock hosts, in seconds.
pub const MOCK_UPTIME: f64 = 120.0;

/// One fake process.
#[derive(Debug, Clone)]
pub struct MockProcess {
    pub pid: ProcessId,
    pub name: String,
    pub ppid: ProcessId,
    pub exe: String,
    pub cmdline: String,
    pub counters: ResourceCounters,
    pub uids: (u32, u32),
    pub sockets: Vec<SocketRecord>,
}

impl MockProcess {
    /// A sleeping process started at tick 1000 with 256 resident pages.
    pub fn new(pid: u32, name: &str) -> Self {
        MockProcess {
            pid: ProcessId(pid),
            name: name.to_string(),
            ppid: ProcessId(0),
            exe: format!("/usr/bin/{}", name),
            cmdline: name.to_string(),
            counters: ResourceCounters {
                state: 'S',
                rss_pages: 256,
                vsize_bytes: 8 * 1024 * 1024,
                start_ticks: 1000,
                user_ticks: 250,
                system_ticks: 50,
            },
            uids: (1000, 1000),
            sockets: Vec::new(),
        }
    }

    pub fn ppid(mut self, ppid: u32) -> Self {
        self.ppid = ProcessId(ppid);
        self
    }

    pub fn cmdline(mut self, cmdline: &str) -> Self {
        self.cmdline = cmdline.to_string();
        self
    }

    pub fn counters(mut self, counters: ResourceCounters) -> Self {
        self.counters = counters;
        self
    }

    pub fn uids(mut self, real: u32, effective: u32) -> Self {
        self.uids = (real, effective);
        self
    }

    /// Add an IPv4 TCP socket bound to 0.0.0.0.
    pub fn socket(self, inode: u64, port: u16, state: SocketState) -> Self {
        self.socket_on(Protocol::Tcp, "0.0.0.0", inode, port, state)
    }

    pub fn socket_on(
        mut self,
        protocol: Protocol,
        addr: &str,
        inode: u64,
        port: u16,
        state: SocketState,
    ) -> Self {
        self.sockets.push(SocketRecord {
            protocol,
            local_addr: addr.to_string(),
            local_port: port,
            state,
            inode: SocketInode(inode),
        });
        self
    }
}

/// Failure a mock fetch can be made to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Vanished,
    PermissionDenied,
    Malformed,
}

impl MockFailure {
    fn to_error(self, pid: ProcessId, slot: SlotKind) -> ProcError {
        let path = PathBuf::from(format!("/mock/{}/{}", pid, slot));
        match self {
            MockFailure::Vanished => ProcError::NotFound { path },
            MockFailure::PermissionDenied => ProcError::PermissionDenied { path },
            MockFailure::Malformed => ProcError::Malformed {
                path,
                message: "injected".to_string(),
            },
        }
    }
}

/// Fake host implementing every process capability.
#[derive(Debug)]
pub struct MockHost {
    processes: BTreeMap<ProcessId, MockProcess>,
    users: HashMap<u32, String>,
    factors: HostFactors,
    uptime: f64,
    delays: HashMap<SlotKind, Duration>,
    /// Remaining injected failures per slot.
    failures: Mutex<HashMap<SlotKind, (MockFailure, usize)>>,
    calls: Mutex<HashMap<SlotKind, usize>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    pub fn new() -> Self {
        MockHost {
            processes: BTreeMap::new(),
            users: HashMap::new(),
            factors: HostFactors::new(100, 4096),
            uptime: MOCK_UPTIME,
            delays: HashMap::new(),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_process(mut self, process: MockProcess) -> Self {
        self.processes.insert(process.pid, process);
        self
    }

    pub fn with_user(mut self, uid: u32, name: &str) -> Self {
        self.users.insert(uid, name.to_string());
        self
    }

    pub fn with_factors(mut self, factors: HostFactors) -> Self {
        self.factors = factors;
        self
    }

    pub fn with_uptime(mut self, uptime: f64) -> Self {
        self.uptime = uptime;
        self
    }

    /// Make the next `times` fetches for `slot` fail.
    pub fn fail(self, slot: SlotKind, failure: MockFailure, times: usize) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(slot, (failure, times));
        }
        self
    }

    /// Sleep this long in every fetch for `slot`.
    pub fn delay(mut self, slot: SlotKind, delay: Duration) -> Self {
        self.delays.insert(slot, delay);
        self
    }

    /// How many fetches reached the host for `slot`.
    pub fn calls(&self, slot: SlotKind) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(&slot).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Sources backed entirely by this host, with the default state filter.
    pub fn sources(self: &Arc<Self>) -> Sources {
        Sources {
            sockets: self.clone(),
            owners: self.clone(),
            identity: self.clone(),
            resource: self.clone(),
            uptime: self.clone(),
            host: self.clone(),
            ownership: self.clone(),
            users: self.clone(),
            socket_states: crate::process::default_detail_states(),
        }
    }

    /// Count the call, apply latency, then consume an injected failure.
    fn enter(&self, pid: ProcessId, slot: SlotKind) -> Result<&MockProcess, ProcError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(slot).or_insert(0) += 1;
        }
        if let Some(delay) = self.delays.get(&slot) {
            thread::sleep(*delay);
        }
        if let Ok(mut failures) = self.failures.lock() {
            if let Some((failure, remaining)) = failures.get_mut(&slot) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(failure.to_error(pid, slot));
                }
            }
        }
        self.lookup(pid, slot)
    }

    fn lookup(&self, pid: ProcessId, slot: SlotKind) -> Result<&MockProcess, ProcError> {
        self.processes
            .get(&pid)
            .ok_or_else(|| MockFailure::Vanished.to_error(pid, slot))
    }
}

impl SocketSource for MockHost {
    fn socket_tables(&self) -> SocketTable {
        self.processes
            .values()
            .flat_map(|p| p.sockets.iter().cloned())
            .map(|record| (record.inode, record))
            .collect()
    }

    fn socket_inodes(&self, pid: ProcessId) -> Result<Vec<SocketInode>, ProcError> {
        let process = self.enter(pid, SlotKind::Sockets)?;
        Ok(process.sockets.iter().map(|s| s.inode).collect())
    }
}

impl OwnerSource for MockHost {
    fn inode_owners(&self) -> Result<HashMap<SocketInode, ProcessId>, ProcError> {
        let mut owners = HashMap::new();
        for process in self.processes.values() {
            for socket in &process.sockets {
                owners.entry(socket.inode).or_insert(process.pid);
            }
        }
        Ok(owners)
    }
}

impl IdentitySource for MockHost {
    fn process_name(&self, pid: ProcessId) -> Result<String, ProcError> {
        self.lookup(pid, SlotKind::Identity).map(|p| p.name.clone())
    }

    fn identity(&self, pid: ProcessId) -> Result<ProcessIdentity, ProcError> {
        let process = self.enter(pid, SlotKind::Identity)?;
        let parent_name = match process.ppid.0 {
            0 => String::new(),
            1 => self
                .processes
                .get(&ProcessId(1))
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "init".to_string()),
            ppid => self
                .processes
                .get(&ProcessId(ppid))
                .map(|p| p.name.clone())
                .unwrap_or_default(),
        };
        Ok(ProcessIdentity {
            pid,
            name: process.name.clone(),
            ppid: process.ppid,
            parent_name,
            exe: process.exe.clone(),
            cmdline: process.cmdline.clone(),
        })
    }
}

impl ResourceSource for MockHost {
    fn resource_counters(&self, pid: ProcessId) -> Result<ResourceCounters, ProcError> {
        self.enter(pid, SlotKind::Resource).map(|p| p.counters)
    }
}

impl UptimeSource for MockHost {
    fn uptime(&self) -> Result<f64, ProcError> {
        Ok(self.uptime)
    }
}

impl HostFactorSource for MockHost {
    fn clock_ticks(&self) -> u64 {
        self.factors.clock_ticks
    }

    fn page_size(&self) -> u64 {
        self.factors.page_size
    }
}

impl OwnershipSource for MockHost {
    fn uid_pair(&self, pid: ProcessId) -> Result<(u32, u32), ProcError> {
        self.enter(pid, SlotKind::Ownership).map(|p| p.uids)
    }
}

impl UserDirectory for MockHost {
    fn username(&self, uid: u32) -> Option<String> {
        self.users.get(&uid).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_consumed() {
        let host = MockHost::new()
            .with_process(MockProcess::new(7, "sshd"))
            .fail(SlotKind::Ownership, MockFailure::PermissionDenied, 1);

        let err = host.uid_pair(ProcessId(7)).unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(host.uid_pair(ProcessId(7)).unwrap(), (1000, 1000));
        assert_eq!(host.calls(SlotKind::Ownership), 2);
    }

    #[test]
    fn test_unknown_pid_vanished() {
        let host = MockHost::new();
        assert!(host.resource_counters(ProcessId(99)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_first_owner_wins() {
        let host = MockHost::new()
            .with_process(MockProcess::new(10, "a").socket(5, 80, SocketState::Listen))
            .with_process(MockProcess::new(20, "b").socket(5, 80, SocketState::Listen));
        let owners = host.inode_owners().unwrap();
        assert_eq!(owners[&SocketInode(5)], ProcessId(10));
    }
}
