//! Process model: capability traits, the procfs-backed client, and the
//! per-process readers built on top of them.
//!
//! Each data need has its own narrow trait so the hydration coordinator and
//! the list scan can be driven by in-memory fakes in tests.

pub mod identity;
pub mod join;
pub mod ownership;
pub mod resource;
pub mod summary;

pub use identity::ProcessIdentity;
pub use join::{join_sockets, scan_running_processes, sockets_for_pid, ProcessSockets};
pub use ownership::ProcessOwnership;
pub use resource::{ProcessResource, ResourceCounters};
pub use summary::{summarize, ProcessSummary, SocketCounts};

use crate::host::HostFactors;
use crate::procfs::net::{read_socket_tables, SocketState, SocketTable};
use crate::procfs::{fd, stat, status, uptime, ProcError, ProcRoot};
use crate::users::{PasswdDirectory, UserDirectory};
use netps_common::{Config, ProcessId, SocketInode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Socket tables and per-process socket inodes.
pub trait SocketSource: Send + Sync {
    /// inode → socket over all protocols. Unavailable tables are skipped.
    fn socket_tables(&self) -> SocketTable;

    /// Socket inodes held by one process, in descriptor order.
    fn socket_inodes(&self, pid: ProcessId) -> Result<Vec<SocketInode>, ProcError>;
}

/// System-wide inode → PID ownership.
pub trait OwnerSource: Send + Sync {
    fn inode_owners(&self) -> Result<HashMap<SocketInode, ProcessId>, ProcError>;
}

/// Process naming and ancestry.
pub trait IdentitySource: Send + Sync {
    /// Short name only, for list rows.
    fn process_name(&self, pid: ProcessId) -> Result<String, ProcError>;

    fn identity(&self, pid: ProcessId) -> Result<ProcessIdentity, ProcError>;
}

/// Raw scheduling and memory counters.
pub trait ResourceSource: Send + Sync {
    fn resource_counters(&self, pid: ProcessId) -> Result<ResourceCounters, ProcError>;
}

/// Seconds since boot.
pub trait UptimeSource: Send + Sync {
    fn uptime(&self) -> Result<f64, ProcError>;
}

/// Conversion factors for raw counters.
pub trait HostFactorSource: Send + Sync {
    fn clock_ticks(&self) -> u64;
    fn page_size(&self) -> u64;
}

/// Real and effective UID.
pub trait OwnershipSource: Send + Sync {
    fn uid_pair(&self, pid: ProcessId) -> Result<(u32, u32), ProcError>;
}

impl HostFactorSource for HostFactors {
    fn clock_ticks(&self) -> u64 {
        self.clock_ticks
    }

    fn page_size(&self) -> u64 {
        self.page_size
    }
}

/// Procfs-backed implementation of every process capability.
#[derive(Debug, Clone, Default)]
pub struct ProcfsClient {
    root: ProcRoot,
}

impl ProcfsClient {
    pub fn new(root: ProcRoot) -> Self {
        ProcfsClient { root }
    }

    pub fn root(&self) -> &ProcRoot {
        &self.root
    }
}

impl SocketSource for ProcfsClient {
    fn socket_tables(&self) -> SocketTable {
        read_socket_tables(&self.root)
    }

    fn socket_inodes(&self, pid: ProcessId) -> Result<Vec<SocketInode>, ProcError> {
        fd::socket_inodes(&self.root, pid)
    }
}

impl OwnerSource for ProcfsClient {
    fn inode_owners(&self) -> Result<HashMap<SocketInode, ProcessId>, ProcError> {
        fd::inode_owners(&self.root)
    }
}

impl IdentitySource for ProcfsClient {
    fn process_name(&self, pid: ProcessId) -> Result<String, ProcError> {
        self.root.read_comm(pid)
    }

    fn identity(&self, pid: ProcessId) -> Result<ProcessIdentity, ProcError> {
        identity::read_identity(&self.root, pid)
    }
}

impl ResourceSource for ProcfsClient {
    fn resource_counters(&self, pid: ProcessId) -> Result<ResourceCounters, ProcError> {
        stat::read_stat(&self.root, pid).map(ResourceCounters::from)
    }
}

impl UptimeSource for ProcfsClient {
    fn uptime(&self) -> Result<f64, ProcError> {
        uptime::read_uptime(&self.root)
    }
}

impl OwnershipSource for ProcfsClient {
    fn uid_pair(&self, pid: ProcessId) -> Result<(u32, u32), ProcError> {
        status::read_uid_pair(&self.root, pid)
    }
}

/// Shared data sources handed to list scans and hydration workers.
#[derive(Clone)]
pub struct Sources {
    pub sockets: Arc<dyn SocketSource>,
    pub owners: Arc<dyn OwnerSource>,
    pub identity: Arc<dyn IdentitySource>,
    pub resource: Arc<dyn ResourceSource>,
    pub uptime: Arc<dyn UptimeSource>,
    pub host: Arc<dyn HostFactorSource>,
    pub ownership: Arc<dyn OwnershipSource>,
    pub users: Arc<dyn UserDirectory>,
    /// States kept by the detail view's socket fetch.
    pub socket_states: Vec<SocketState>,
}

impl Sources {
    /// Sources reading a process filesystem root.
    pub fn procfs(root: ProcRoot, host: HostFactors, users: PasswdDirectory) -> Self {
        let client = Arc::new(ProcfsClient::new(root));
        Sources {
            sockets: client.clone(),
            owners: client.clone(),
            identity: client.clone(),
            resource: client.clone(),
            uptime: client.clone(),
            host: Arc::new(host),
            ownership: client,
            users: Arc::new(users),
            socket_states: default_detail_states(),
        }
    }

    /// Sources described by a loaded config.
    pub fn from_config(config: &Config) -> Self {
        let host = HostFactors::resolve(config.clock_ticks, config.page_size);
        let mut sources = Sources::procfs(
            ProcRoot::new(&config.proc_root),
            host,
            PasswdDirectory::new(&config.passwd_path),
        );
        sources.socket_states = parse_state_filter(&config.detail_socket_states);
        sources
    }

    pub fn with_socket_states(mut self, states: Vec<SocketState>) -> Self {
        self.socket_states = states;
        self
    }
}

impl std::fmt::Debug for Sources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sources")
            .field("socket_states", &self.socket_states)
            .finish_non_exhaustive()
    }
}

pub fn default_detail_states() -> Vec<SocketState> {
    vec![SocketState::Listen, SocketState::Established, SocketState::Close]
}

/// Parse configured state names, dropping unknown ones.
///
/// An empty result falls back to the default filter.
pub fn parse_state_filter(names: &[String]) -> Vec<SocketState> {
    let mut states = Vec::new();
    for name in names {
        match name.parse::<SocketState>() {
            Ok(state) if !states.contains(&state) => states.push(state),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "ignoring configured socket state"),
        }
    }
    if states.is_empty() {
        default_detail_states()
    } else {
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state_filter() {
        let names = vec![
            "listen".to_string(),
            "TIME_WAIT".to_string(),
            "LISTEN".to_string(),
            "nonsense".to_string(),
        ];
        assert_eq!(
            parse_state_filter(&names),
            vec![SocketState::Listen, SocketState::TimeWait]
        );
    }

    #[test]
    fn test_empty_state_filter_uses_default() {
        assert_eq!(parse_state_filter(&[]), default_detail_states());
        assert_eq!(
            parse_state_filter(&["bogus".to_string()]),
            default_detail_states()
        );
    }

    #[test]
    fn test_sources_from_config() {
        let config = Config {
            clock_ticks: Some(250),
            page_size: Some(8192),
            detail_socket_states: vec!["ESTABLISHED".to_string()],
            ..Config::default()
        };
        let sources = Sources::from_config(&config);
        assert_eq!(sources.host.clock_ticks(), 250);
        assert_eq!(sources.host.page_size(), 8192);
        assert_eq!(sources.socket_states, vec![SocketState::Established]);
    }
}
