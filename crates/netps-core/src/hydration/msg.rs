//! Messages into the detail-view update loop and commands out of it.
//!
//! Everything a fetch worker produces reaches the coordinator as a `Msg`;
//! everything the coordinator wants done outside itself is a `Cmd`.

use super::cancel::CancelToken;
use super::slot::{FetchError, SlotKind};
use crate::procfs::net::SocketRecord;
use crate::process::{ProcessIdentity, ProcessOwnership, ProcessResource};
use netps_common::ProcessId;

/// Completed fetch, tagged with the slot it belongs to.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Identity(Result<ProcessIdentity, FetchError>),
    Resource(Result<ProcessResource, FetchError>),
    Ownership(Result<ProcessOwnership, FetchError>),
    Sockets(Result<Vec<SocketRecord>, FetchError>),
}

impl FetchResult {
    pub fn slot(&self) -> SlotKind {
        match self {
            FetchResult::Identity(_) => SlotKind::Identity,
            FetchResult::Resource(_) => SlotKind::Resource,
            FetchResult::Ownership(_) => SlotKind::Ownership,
            FetchResult::Sockets(_) => SlotKind::Sockets,
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            FetchResult::Identity(r) => r.is_ok(),
            FetchResult::Resource(r) => r.is_ok(),
            FetchResult::Ownership(r) => r.is_ok(),
            FetchResult::Sockets(r) => r.is_ok(),
        }
    }

    /// A failed result for `slot`.
    pub fn failed(slot: SlotKind, err: FetchError) -> Self {
        match slot {
            SlotKind::Identity => FetchResult::Identity(Err(err)),
            SlotKind::Resource => FetchResult::Resource(Err(err)),
            SlotKind::Ownership => FetchResult::Ownership(Err(err)),
            SlotKind::Sockets => FetchResult::Sockets(Err(err)),
        }
    }
}

/// Input to [`HydrationCoordinator::update`](super::HydrationCoordinator::update).
#[derive(Debug, Clone)]
pub enum Msg {
    /// Open the detail view for a process.
    Visit { pid: ProcessId, name: String },
    /// A fetch finished for the cycle with this generation.
    Hydrated {
        generation: u64,
        result: FetchResult,
    },
    Retry,
    DismissErrors,
    /// Back to the process list.
    Leave,
    Quit,
}

/// One fetch to run outside the loop.
#[derive(Debug, Clone)]
pub struct FetchTask {
    pub slot: SlotKind,
    pub pid: ProcessId,
    pub generation: u64,
    pub token: CancelToken,
}

/// Effect requested by the coordinator.
#[derive(Debug, Clone)]
pub enum Cmd {
    None,
    Batch(Vec<Cmd>),
    Fetch(FetchTask),
    GoBack,
    Quit,
}

impl Cmd {
    pub fn batch(cmds: Vec<Cmd>) -> Cmd {
        match cmds.len() {
            0 => Cmd::None,
            _ => Cmd::Batch(cmds),
        }
    }

    /// Fetch tasks contained in this command, flattened.
    pub fn fetches(&self) -> Vec<&FetchTask> {
        match self {
            Cmd::Fetch(task) => vec![task],
            Cmd::Batch(cmds) => cmds.iter().flat_map(Cmd::fetches).collect(),
            Cmd::None | Cmd::GoBack | Cmd::Quit => Vec::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }
}
