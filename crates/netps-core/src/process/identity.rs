//! Process identity: name, executable, command line, parent.

use crate::procfs::{cmdline, stat, ProcError, ProcRoot};
use netps_common::ProcessId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Identity snapshot taken once per detail visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessIdentity {
    pub pid: ProcessId,
    pub name: String,
    pub ppid: ProcessId,
    /// Empty when there is no parent or it has already exited.
    pub parent_name: String,
    /// Empty for kernel threads or when the link is unreadable.
    pub exe: String,
    /// Shell-quoted argv; empty for kernel threads.
    pub cmdline: String,
}

/// Read the identity of `pid`.
///
/// Fails only when the process itself cannot be read. Missing optional
/// pieces (exe link, parent) degrade to empty strings.
pub fn read_identity(root: &ProcRoot, pid: ProcessId) -> Result<ProcessIdentity, ProcError> {
    let stat = stat::read_stat(root, pid)?;
    let cmdline = cmdline::read_cmdline(root, pid)?;
    let exe = read_exe(root, pid);
    let ppid = ProcessId(stat.ppid);
    let parent_name = parent_name(root, ppid);

    Ok(ProcessIdentity {
        pid,
        name: stat.comm,
        ppid,
        parent_name,
        exe,
        cmdline,
    })
}

fn read_exe(root: &ProcRoot, pid: ProcessId) -> String {
    match root.read_link(&root.pid_file(pid, "exe")) {
        Ok(target) => target.to_string_lossy().into_owned(),
        Err(e) => {
            debug!(pid = pid.0, error = %e, "exe link unreadable");
            String::new()
        }
    }
}

fn parent_name(root: &ProcRoot, ppid: ProcessId) -> String {
    if ppid.is_root_parent() {
        return String::new();
    }
    match root.read_comm(ppid) {
        Ok(name) => name,
        Err(e) => {
            debug!(ppid = ppid.0, error = %e, "parent name unavailable");
            String::new()
        }
    }
}
