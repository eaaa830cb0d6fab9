//! Process and socket identity types.
//!
//! A socket inode is only meaningful inside the scan that produced it: the
//! kernel recycles inode numbers, so it is a join key, never a durable ID.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process ID wrapper with display formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// PID 0 is what the kernel reports as the parent of init and kthreadd.
    pub fn is_root_parent(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        ProcessId(pid)
    }
}

/// Kernel socket inode, the join key between socket tables and fd tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketInode(pub u64);

impl SocketInode {
    /// Parse an fd link target of the form `socket:[12345]`.
    pub fn from_link_target(target: &str) -> Option<Self> {
        let inner = target.strip_prefix("socket:[")?.strip_suffix(']')?;
        inner.parse::<u64>().ok().map(SocketInode)
    }
}

impl fmt::Display for SocketInode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SocketInode {
    fn from(inode: u64) -> Self {
        SocketInode(inode)
    }
}
