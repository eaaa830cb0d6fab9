//! Socket inodes from per-process descriptor tables (`/proc/[pid]/fd/`).
//!
//! Each descriptor is a symlink; sockets point at `socket:[<inode>]`.

use super::{ProcError, ProcRoot};
use netps_common::{ProcessId, SocketInode};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Socket inodes of one process, in descriptor order.
pub fn socket_inodes(root: &ProcRoot, pid: ProcessId) -> Result<Vec<SocketInode>, ProcError> {
    parse_socket_fd_dir(&root.pid_file(pid, "fd"))
}

/// Read a descriptor directory.
///
/// Fails only when the directory itself cannot be listed. Individual links
/// that vanish while being read (descriptor closed) are skipped.
pub fn parse_socket_fd_dir(dir: &Path) -> Result<Vec<SocketInode>, ProcError> {
    let entries = fs::read_dir(dir).map_err(|e| ProcError::from_io(dir, e))?;

    let mut by_fd: Vec<(u32, SocketInode)> = Vec::new();
    for entry in entries.flatten() {
        let Some(fd) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let Ok(target) = fs::read_link(entry.path()) else {
            continue;
        };
        if let Some(inode) = target.to_str().and_then(SocketInode::from_link_target) {
            by_fd.push((fd, inode));
        }
    }

    by_fd.sort_by_key(|(fd, _)| *fd);
    Ok(by_fd.into_iter().map(|(_, inode)| inode).collect())
}

/// inode → owning PID over every process under the root.
///
/// Processes that vanish mid-scan or whose descriptors are unreadable are
/// skipped. When several processes share an inode (inherited descriptors),
/// the lowest PID wins.
pub fn inode_owners(root: &ProcRoot) -> Result<HashMap<SocketInode, ProcessId>, ProcError> {
    let pids = root.list_pids()?;
    let mut owners = HashMap::new();
    let mut skipped = 0usize;

    for pid in pids {
        match socket_inodes(root, pid) {
            Ok(inodes) => {
                for inode in inodes {
                    owners.entry(inode).or_insert(pid);
                }
            }
            Err(e) => {
                skipped += 1;
                debug!(pid = pid.0, error = %e, "skipping unreadable fd table");
            }
        }
    }

    debug!(owned = owners.len(), skipped, "inode owner scan complete");
    Ok(owners)
}
