//! Process ownership: UIDs, username and privilege.

use super::OwnershipSource;
use crate::procfs::ProcError;
use crate::users::UserDirectory;
use netps_common::ProcessId;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOwnership {
    pub real_uid: u32,
    pub effective_uid: u32,
    /// Resolved name, or the numeric UID when the lookup missed.
    pub username: String,
    pub username_resolved: bool,
    /// Effective UID is 0.
    pub privileged: bool,
}

impl ProcessOwnership {
    pub fn privilege_label(&self) -> &'static str {
        if self.privileged {
            "privileged"
        } else {
            "unprivileged"
        }
    }
}

/// Read UIDs and resolve the real UID's name.
///
/// A username miss does not fail the fetch: the UID itself is still valid,
/// so the numeric UID stands in for the name.
pub fn fetch_ownership(
    source: &dyn OwnershipSource,
    users: &dyn UserDirectory,
    pid: ProcessId,
) -> Result<ProcessOwnership, ProcError> {
    let (real_uid, effective_uid) = source.uid_pair(pid)?;

    let (username, username_resolved) = match users.username(real_uid) {
        Some(name) => (name, true),
        None => {
            warn!(pid = pid.0, uid = real_uid, "no username for uid, showing numeric uid");
            (real_uid.to_string(), false)
        }
    };

    Ok(ProcessOwnership {
        real_uid,
        effective_uid,
        username,
        username_resolved,
        privileged: effective_uid == 0,
    })
}
