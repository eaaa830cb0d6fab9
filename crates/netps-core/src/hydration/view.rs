//! Presentation snapshot of the detail view.

use super::screen::ScreenState;
use super::slot::{FetchError, FetchErrorKind, HydrationState, Severity, SlotKind};
use crate::procfs::net::SocketRecord;
use crate::process::{ProcessIdentity, ProcessOwnership, ProcessResource};
use netps_common::ProcessId;
use serde::Serialize;

/// One slot error as shown in the error panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorLine {
    pub slot: SlotKind,
    pub kind: FetchErrorKind,
    pub severity: Severity,
    pub message: String,
}

impl ErrorLine {
    pub fn new(slot: SlotKind, err: &FetchError) -> Self {
        ErrorLine {
            slot,
            kind: err.kind,
            severity: slot.severity(),
            message: err.message.clone(),
        }
    }

    pub fn retry_hint(&self) -> bool {
        self.severity.retry_hint()
    }
}

impl std::fmt::Display for ErrorLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.severity.label(), self.message)
    }
}

/// Everything the detail view renders, copied out of the coordinator.
#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub pid: Option<ProcessId>,
    pub name: String,
    pub screen: ScreenState,
    /// Some category failed. Stays set after the panel is dismissed.
    pub partial: bool,
    pub errors_visible: bool,
    pub slots: Vec<(SlotKind, HydrationState)>,
    pub identity: Option<ProcessIdentity>,
    pub resource: Option<ProcessResource>,
    pub ownership: Option<ProcessOwnership>,
    pub sockets: Option<Vec<SocketRecord>>,
    pub errors: Vec<ErrorLine>,
}

impl DetailView {
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn failed_slots(&self) -> usize {
        self.errors.len()
    }
}
