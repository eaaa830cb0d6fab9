//! Readers for the Linux process filesystem.
//!
//! Every reader takes a [`ProcRoot`] so tests can point it at a fixture tree
//! instead of `/proc`. Content parsers (`parse_*_content`) are pure functions
//! over the file text; the path wrappers add I/O and error classification.
//!
//! # Files Read
//! - `/proc/net/{tcp,tcp6,udp,udp6}` - socket tables
//! - `/proc/[pid]/fd/` - open descriptors (socket inodes)
//! - `/proc/[pid]/stat` - state, ppid, CPU ticks, start ticks, vsize, rss
//! - `/proc/[pid]/status` - real/effective UID
//! - `/proc/[pid]/comm`, `cmdline`, `exe` - identity
//! - `/proc/uptime` - seconds since boot

pub mod cmdline;
pub mod fd;
pub mod net;
pub mod stat;
pub mod status;
pub mod uptime;

use netps_common::ProcessId;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single kernel-interface read.
#[derive(Debug, Error)]
pub enum ProcError {
    #[error("{} does not exist (process vanished)", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied reading {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("malformed {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The hydration cycle was cancelled before this read started.
    #[error("read skipped: hydration cycle cancelled")]
    Cancelled,
}

impl ProcError {
    /// Classify an I/O error raised while reading `path`.
    ///
    /// `ENOENT`/`ESRCH` mean the process is gone; `EACCES`/`EPERM` mean
    /// another user owns it.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.raw_os_error() {
            Some(libc::ENOENT) | Some(libc::ESRCH) => return ProcError::NotFound { path },
            Some(libc::EACCES) | Some(libc::EPERM) => return ProcError::PermissionDenied { path },
            _ => {}
        }
        match err.kind() {
            io::ErrorKind::NotFound => ProcError::NotFound { path },
            io::ErrorKind::PermissionDenied => ProcError::PermissionDenied { path },
            _ => ProcError::Io { path, source: err },
        }
    }

    /// Attach a path to a content parse failure.
    pub fn malformed(path: &Path, err: ParseError) -> Self {
        ProcError::Malformed {
            path: path.to_path_buf(),
            message: err.0,
        }
    }

    /// Whether the failure means the process no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProcError::NotFound { .. })
    }

    /// Whether the failure is a permission problem.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ProcError::PermissionDenied { .. })
    }

    /// Convert to the CLI-facing error, attributing it to `pid` when known.
    pub fn into_error(self, pid: Option<ProcessId>) -> netps_common::Error {
        use netps_common::Error;
        match (self, pid) {
            (ProcError::NotFound { .. }, Some(pid)) => Error::ProcessNotFound { pid: pid.0 },
            (ProcError::PermissionDenied { .. }, Some(pid)) => Error::PermissionDenied { pid: pid.0 },
            (ProcError::Io { source, .. }, None) => Error::Io(source),
            (err, _) => Error::Collection(err.to_string()),
        }
    }
}

/// Content parse failure, before the file path is known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError(message.into())
    }
}

/// Root of a process filesystem (normally `/proc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcRoot {
    root: PathBuf,
}

impl Default for ProcRoot {
    fn default() -> Self {
        ProcRoot::new(netps_common::config::DEFAULT_PROC_ROOT)
    }
}

impl ProcRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ProcRoot { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// `<root>/<pid>`
    pub fn pid_dir(&self, pid: ProcessId) -> PathBuf {
        self.root.join(pid.0.to_string())
    }

    /// `<root>/<pid>/<name>`
    pub fn pid_file(&self, pid: ProcessId, name: &str) -> PathBuf {
        self.pid_dir(pid).join(name)
    }

    /// `<root>/net/<name>`
    pub fn net_file(&self, name: &str) -> PathBuf {
        self.root.join("net").join(name)
    }

    /// `<root>/uptime`
    pub fn uptime_file(&self) -> PathBuf {
        self.root.join("uptime")
    }

    /// Read a whole file as text, classifying failures.
    ///
    /// Process names may hold arbitrary bytes (`prctl(PR_SET_NAME)`), and
    /// they show up in `comm`, `stat` and `status`. Invalid UTF-8 is replaced
    /// rather than failing the read.
    pub fn read_to_string(&self, path: &Path) -> Result<String, ProcError> {
        let bytes = self.read_bytes(path)?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// Read a whole file as bytes, classifying failures.
    pub fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, ProcError> {
        fs::read(path).map_err(|e| ProcError::from_io(path, e))
    }

    /// Read a symlink target, classifying failures.
    pub fn read_link(&self, path: &Path) -> Result<PathBuf, ProcError> {
        fs::read_link(path).map_err(|e| ProcError::from_io(path, e))
    }

    /// Numeric entries directly under the root, ascending.
    pub fn list_pids(&self) -> Result<Vec<ProcessId>, ProcError> {
        let entries = fs::read_dir(&self.root).map_err(|e| ProcError::from_io(&self.root, e))?;

        let mut pids: Vec<ProcessId> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
            .map(ProcessId)
            .collect();

        pids.sort();
        Ok(pids)
    }

    /// Short process name from `<pid>/comm`, trimmed.
    pub fn read_comm(&self, pid: ProcessId) -> Result<String, ProcError> {
        let path = self.pid_file(pid, "comm");
        Ok(self.read_to_string(&path)?.trim_end_matches('\n').to_string())
    }
}
