//! Kernel socket tables (`/proc/net/tcp`, `tcp6`, `udp`, `udp6`).
//!
//! Each table is a header line followed by whitespace-separated rows:
//!
//! ```text
//!   sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
//!    0: 0100007F:0035 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 12345 ...
//! ```
//!
//! Only the local address, the state code and the inode are used.

use super::ProcRoot;
use netps_common::SocketInode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use tracing::debug;

/// Socket table protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Tcp6,
    Udp,
    Udp6,
}

impl Protocol {
    /// All tables, in read order.
    pub const ALL: [Protocol; 4] = [Protocol::Tcp, Protocol::Tcp6, Protocol::Udp, Protocol::Udp6];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Tcp6 => "tcp6",
            Protocol::Udp => "udp",
            Protocol::Udp6 => "udp6",
        }
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self, Protocol::Tcp6 | Protocol::Udp6)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection state, as encoded in the `st` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketState {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    NewSynRecv,
    Unknown,
}

impl SocketState {
    /// Map a kernel state code.
    pub fn from_hex(code: u8) -> Self {
        match code {
            0x01 => SocketState::Established,
            0x02 => SocketState::SynSent,
            0x03 => SocketState::SynRecv,
            0x04 => SocketState::FinWait1,
            0x05 => SocketState::FinWait2,
            0x06 => SocketState::TimeWait,
            0x07 => SocketState::Close,
            0x08 => SocketState::CloseWait,
            0x09 => SocketState::LastAck,
            0x0A => SocketState::Listen,
            0x0B => SocketState::Closing,
            0x0C => SocketState::NewSynRecv,
            _ => SocketState::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SocketState::Established => "ESTABLISHED",
            SocketState::SynSent => "SYN_SENT",
            SocketState::SynRecv => "SYN_RECV",
            SocketState::FinWait1 => "FIN_WAIT1",
            SocketState::FinWait2 => "FIN_WAIT2",
            SocketState::TimeWait => "TIME_WAIT",
            SocketState::Close => "CLOSE",
            SocketState::CloseWait => "CLOSE_WAIT",
            SocketState::LastAck => "LAST_ACK",
            SocketState::Listen => "LISTEN",
            SocketState::Closing => "CLOSING",
            SocketState::NewSynRecv => "NEW_SYN_RECV",
            SocketState::Unknown => "UNKNOWN",
        }
    }

    /// CLOSE, CLOSE_WAIT, LAST_ACK and CLOSING are shown as one "closed" bucket.
    pub fn is_closed_family(&self) -> bool {
        matches!(
            self,
            SocketState::Close | SocketState::CloseWait | SocketState::LastAck | SocketState::Closing
        )
    }

    pub fn is_listen(&self) -> bool {
        matches!(self, SocketState::Listen)
    }
}

impl std::fmt::Display for SocketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SocketState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const KNOWN: [SocketState; 13] = [
            SocketState::Established,
            SocketState::SynSent,
            SocketState::SynRecv,
            SocketState::FinWait1,
            SocketState::FinWait2,
            SocketState::TimeWait,
            SocketState::Close,
            SocketState::CloseWait,
            SocketState::LastAck,
            SocketState::Listen,
            SocketState::Closing,
            SocketState::NewSynRecv,
            SocketState::Unknown,
        ];
        KNOWN
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown socket state: {}", s))
    }
}

/// One row of a socket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketRecord {
    pub protocol: Protocol,
    pub local_addr: String,
    pub local_port: u16,
    pub state: SocketState,
    /// Join key with the fd tables; only meaningful within one scan.
    pub inode: SocketInode,
}

/// inode → socket, over all protocols.
pub type SocketTable = HashMap<SocketInode, SocketRecord>;

/// Read all four tables. A missing or unreadable table is skipped.
pub fn read_socket_tables(root: &ProcRoot) -> SocketTable {
    let mut table = SocketTable::new();

    for protocol in Protocol::ALL {
        let path = root.net_file(protocol.as_str());
        let content = match root.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(protocol = %protocol, error = %e, "socket table unavailable, skipping");
                continue;
            }
        };

        for record in parse_socket_table_content(&content, protocol) {
            table.insert(record.inode, record);
        }
    }

    table
}

/// Parse one socket table. Malformed rows are skipped individually.
pub fn parse_socket_table_content(content: &str, protocol: Protocol) -> Vec<SocketRecord> {
    let mut records = Vec::new();

    // First line is the column header.
    for (line_no, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_socket_row(line, protocol) {
            Some(record) => records.push(record),
            None => debug!(protocol = %protocol, line = line_no + 1, "skipping malformed socket row"),
        }
    }

    records
}

fn parse_socket_row(line: &str, protocol: Protocol) -> Option<SocketRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 10 {
        return None;
    }

    let (local_addr, local_port) = decode_addr_port(fields[1], protocol.is_ipv6())?;
    let state = u8::from_str_radix(fields[3], 16).ok().map(SocketState::from_hex)?;
    let inode = fields[9].parse::<u64>().ok().map(SocketInode)?;

    Some(SocketRecord {
        protocol,
        local_addr,
        local_port,
        state,
        inode,
    })
}

/// Decode a hex `address:port` pair.
///
/// IPv4 is 8 hex digits with the bytes reversed; IPv6 is 32 hex digits made of
/// four 32-bit words, each with its bytes reversed. The port is big-endian.
pub fn decode_addr_port(addr_port: &str, is_ipv6: bool) -> Option<(String, u16)> {
    let (addr_hex, port_hex) = addr_port.split_once(':')?;
    if port_hex.is_empty() || port_hex.len() > 4 || !is_hex(port_hex) {
        return None;
    }
    let port = u16::from_str_radix(port_hex, 16).ok()?;

    let addr = if is_ipv6 {
        decode_ipv6(addr_hex)?.to_string()
    } else {
        decode_ipv4(addr_hex)?.to_string()
    };

    Some((addr, port))
}

// from_str_radix accepts a leading sign; the kernel never writes one.
fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_ipv4(hex: &str) -> Option<Ipv4Addr> {
    if hex.len() != 8 || !is_hex(hex) {
        return None;
    }
    let word = u32::from_str_radix(hex, 16).ok()?;
    Some(Ipv4Addr::from(word.swap_bytes()))
}

fn decode_ipv6(hex: &str) -> Option<Ipv6Addr> {
    if hex.len() != 32 || !is_hex(hex) {
        return None;
    }

    let mut octets = [0u8; 16];
    for i in 0..4 {
        let word = u32::from_str_radix(&hex[i * 8..(i + 1) * 8], 16).ok()?;
        octets[i * 4..(i + 1) * 4].copy_from_slice(&word.swap_bytes().to_be_bytes());
    }

    Some(Ipv6Addr::from(octets))
}
