//! Send-signal action for the process list.
//!
//! A fixed menu of four signals delivered with `kill(2)`. There is no
//! escalation or verification: the caller refreshes the list afterwards.

use crate::procfs::ProcError;
use netps_common::ProcessId;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tracing::info;

/// Signals offered by the action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Sigterm,
    Sigkill,
    Sigint,
    Sighup,
}

impl Signal {
    /// Menu order.
    pub const MENU: [Signal; 4] = [
        Signal::Sigterm,
        Signal::Sigkill,
        Signal::Sigint,
        Signal::Sighup,
    ];

    pub fn number(self) -> i32 {
        match self {
            Signal::Sigterm => 15,
            Signal::Sigkill => 9,
            Signal::Sigint => 2,
            Signal::Sighup => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Signal::Sigterm => "SIGTERM",
            Signal::Sigkill => "SIGKILL",
            Signal::Sigint => "SIGINT",
            Signal::Sighup => "SIGHUP",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Signal {
    type Err = String;

    /// Accepts `SIGTERM`, `term`, or `15` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("SIG").unwrap_or(&upper);
        Signal::MENU
            .into_iter()
            .find(|sig| sig.name()[3..] == *bare || sig.number().to_string() == bare)
            .ok_or_else(|| format!("unknown signal: {}", s))
    }
}

/// Deliver `signal` to `pid`.
///
/// `ESRCH` maps to [`ProcError::NotFound`] and `EPERM` to
/// [`ProcError::PermissionDenied`].
#[cfg(unix)]
pub fn send(pid: ProcessId, signal: Signal) -> Result<(), ProcError> {
    let path = PathBuf::from(format!("/proc/{}", pid.0));
    let target = i32::try_from(pid.0).map_err(|_| ProcError::NotFound { path: path.clone() })?;
    // PID 0 and negative targets address process groups.
    if target <= 0 {
        return Err(ProcError::NotFound { path });
    }

    let result = unsafe { libc::kill(target, signal.number()) };
    if result == 0 {
        info!(pid = pid.0, signal = %signal, "signal sent");
        return Ok(());
    }
    Err(ProcError::from_io(&path, io::Error::last_os_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_numbers() {
        assert_eq!("SIGTERM".parse::<Signal>().unwrap(), Signal::Sigterm);
        assert_eq!("kill".parse::<Signal>().unwrap(), Signal::Sigkill);
        assert_eq!("sigint".parse::<Signal>().unwrap(), Signal::Sigint);
        assert_eq!("1".parse::<Signal>().unwrap(), Signal::Sighup);
        assert_eq!("9".parse::<Signal>().unwrap(), Signal::Sigkill);
        assert!("SIGSTOP".parse::<Signal>().is_err());
        assert!("19".parse::<Signal>().is_err());
        assert!("".parse::<Signal>().is_err());
    }

    #[test]
    fn test_menu_numbers() {
        let numbers: Vec<i32> = Signal::MENU.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![15, 9, 2, 1]);
    }

    #[test]
    fn test_send_to_pid_zero_rejected() {
        let err = send(ProcessId(0), Signal::Sigterm).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_send_to_child() {
        let mut child = std::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("spawn sleep");
        send(ProcessId(child.id()), Signal::Sigterm).unwrap();
        let status = child.wait().unwrap();
        assert!(!status.success());
    }
}
