//! List-row projection of a process and its sockets.

use crate::procfs::net::{SocketRecord, SocketState};
use netps_common::ProcessId;
use serde::{Deserialize, Serialize};

/// Socket counts by display bucket. The buckets always sum to the number
/// of sockets summarized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketCounts {
    pub listening: usize,
    pub established: usize,
    /// CLOSE, CLOSE_WAIT, LAST_ACK, CLOSING.
    pub closed: usize,
    pub other: usize,
}

impl SocketCounts {
    pub fn total(&self) -> usize {
        self.listening + self.established + self.closed + self.other
    }

    fn count(&mut self, state: SocketState) {
        match state {
            SocketState::Listen => self.listening += 1,
            SocketState::Established => self.established += 1,
            s if s.is_closed_family() => self.closed += 1,
            _ => self.other += 1,
        }
    }
}

/// One row of the process list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub pid: ProcessId,
    pub name: String,
    pub counts: SocketCounts,
    /// Listening ports, comma-separated, in encounter order.
    pub listen_ports: String,
}

/// Reduce a process's sockets to a list row.
pub fn summarize(pid: ProcessId, name: impl Into<String>, sockets: &[SocketRecord]) -> ProcessSummary {
    let mut counts = SocketCounts::default();
    let mut ports = Vec::new();

    for socket in sockets {
        counts.count(socket.state);
        if socket.state.is_listen() {
            ports.push(socket.local_port.to_string());
        }
    }

    ProcessSummary {
        pid,
        name: name.into(),
        counts,
        listen_ports: ports.join(","),
    }
}
