//! Joining socket tables with descriptor ownership.
//!
//! Both inputs are independent snapshots read at slightly different times, so
//! an inode present on one side only is normal and silently dropped.

use super::summary::{summarize, ProcessSummary};
use super::{IdentitySource, OwnerSource, SocketSource};
use crate::procfs::net::{SocketRecord, SocketState, SocketTable};
use crate::procfs::ProcError;
use netps_common::{ProcessId, SocketInode};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::{debug, info};

/// PID → sockets. A PID with no matched socket has no entry.
pub type ProcessSockets = BTreeMap<ProcessId, Vec<SocketRecord>>;

/// Group sockets by owning PID.
///
/// Within a PID, sockets are ordered by inode so repeated joins over the
/// same snapshot render identically.
pub fn join_sockets(
    table: &SocketTable,
    owners: &HashMap<SocketInode, ProcessId>,
) -> ProcessSockets {
    let mut joined = ProcessSockets::new();
    let mut unowned = 0usize;

    for (inode, record) in table {
        match owners.get(inode) {
            Some(pid) => joined.entry(*pid).or_default().push(record.clone()),
            None => unowned += 1,
        }
    }

    for sockets in joined.values_mut() {
        sockets.sort_by_key(|s| s.inode);
    }

    debug!(
        processes = joined.len(),
        unowned, "joined sockets to processes"
    );
    joined
}

/// Full list refresh: join, name and summarize every socket-owning process.
///
/// Fails only when the process root itself cannot be listed. Results are
/// sorted by PID.
pub fn scan_running_processes(
    sockets: &dyn SocketSource,
    owners: &dyn OwnerSource,
    identity: &dyn IdentitySource,
) -> Result<Vec<ProcessSummary>, ProcError> {
    let start = Instant::now();

    let table = sockets.socket_tables();
    let owner_map = owners.inode_owners()?;
    let joined = join_sockets(&table, &owner_map);

    let mut summaries = Vec::with_capacity(joined.len());
    for (pid, records) in &joined {
        match identity.process_name(*pid) {
            Ok(name) => summaries.push(summarize(*pid, name, records)),
            Err(e) => debug!(pid = pid.0, error = %e, "process gone before naming, skipping"),
        }
    }

    info!(
        sockets = table.len(),
        processes = summaries.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "process scan complete"
    );
    Ok(summaries)
}

/// Sockets of one process, filtered to `states`, in descriptor order.
///
/// A descriptor-table failure (process gone, permission) is returned;
/// inodes missing from the socket tables are dropped.
pub fn sockets_for_pid(
    sockets: &dyn SocketSource,
    pid: ProcessId,
    states: &[SocketState],
) -> Result<Vec<SocketRecord>, ProcError> {
    let inodes = sockets.socket_inodes(pid)?;
    if inodes.is_empty() {
        return Ok(Vec::new());
    }

    let table = sockets.socket_tables();
    Ok(inodes
        .iter()
        .filter_map(|inode| table.get(inode))
        .filter(|record| states.contains(&record.state))
        .cloned()
        .collect())
}
