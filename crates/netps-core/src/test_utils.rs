//! Test utilities for netps-core.
//!
//! [`ProcFixture`] lays out a fake process filesystem in a tempdir: socket
//! tables, per-process `stat`/`status`/`comm`/`cmdline`, `exe` links and
//! `fd/` directories of `socket:[inode]` links. Point a [`ProcRoot`] (or the
//! CLI's `--proc-root`) at it to exercise the real readers.

use crate::procfs::net::{Protocol, SocketState};
use crate::procfs::ProcRoot;
use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TABLE_HEADER: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode\n";

/// One process to write into a fixture.
#[derive(Debug, Clone)]
pub struct FixtureProcess {
    pub pid: u32,
    pub comm: String,
    pub state: char,
    pub ppid: u32,
    pub utime: u64,
    pub stime: u64,
    pub starttime: u64,
    pub vsize: u64,
    pub rss_pages: u64,
    pub uids: (u32, u32),
    /// Raw cmdline bytes, NUL-separated.
    pub cmdline: Vec<u8>,
    pub exe: Option<String>,
    /// Socket inodes, one descriptor each, starting at fd 3.
    pub socket_inodes: Vec<u64>,
}

impl FixtureProcess {
    pub fn new(pid: u32, comm: &str) -> Self {
        FixtureProcess {
            pid,
            comm: comm.to_string(),
            state: 'S',
            ppid: 1,
            utime: 250,
            stime: 50,
            starttime: 1000,
            vsize: 8 * 1024 * 1024,
            rss_pages: 256,
            uids: (1000, 1000),
            cmdline: format!("{}\0", comm).into_bytes(),
            exe: Some(format!("/usr/bin/{}", comm)),
            socket_inodes: Vec::new(),
        }
    }

    pub fn ppid(mut self, ppid: u32) -> Self {
        self.ppid = ppid;
        self
    }

    pub fn uids(mut self, real: u32, effective: u32) -> Self {
        self.uids = (real, effective);
        self
    }

    pub fn argv(mut self, args: &[&str]) -> Self {
        let mut raw = Vec::new();
        for arg in args {
            raw.extend_from_slice(arg.as_bytes());
            raw.push(0);
        }
        self.cmdline = raw;
        self
    }

    pub fn sockets(mut self, inodes: &[u64]) -> Self {
        self.socket_inodes = inodes.to_vec();
        self
    }

    pub fn without_exe(mut self) -> Self {
        self.exe = None;
        self
    }

    fn stat_line(&self) -> String {
        format!(
            "{pid} ({comm}) {state} {ppid} {pid} {pid} 0 -1 4194304 100 0 0 0 {utime} {stime} 0 0 20 0 1 0 {start} {vsize} {rss} 18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0\n",
            pid = self.pid,
            comm = self.comm,
            state = self.state,
            ppid = self.ppid,
            utime = self.utime,
            stime = self.stime,
            start = self.starttime,
            vsize = self.vsize,
            rss = self.rss_pages,
        )
    }

    fn status_text(&self) -> String {
        let (real, effective) = self.uids;
        format!(
            "Name:\t{}\nState:\t{} (sleeping)\nPid:\t{}\nPPid:\t{}\nUid:\t{}\t{}\t{}\t{}\nGid:\t{}\t{}\t{}\t{}\n",
            self.comm,
            self.state,
            self.pid,
            self.ppid,
            real,
            effective,
            effective,
            effective,
            real,
            real,
            real,
            real
        )
    }
}

/// Fake `/proc` tree in a tempdir, removed on drop.
#[derive(Debug)]
pub struct ProcFixture {
    dir: TempDir,
    rows: HashMap<Protocol, Vec<String>>,
}

impl ProcFixture {
    /// Empty tree with an uptime of 120 seconds and empty socket tables.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create fixture tempdir");
        fs::create_dir_all(dir.path().join("net")).expect("create net dir");
        let mut fixture = ProcFixture {
            dir,
            rows: HashMap::new(),
        };
        fixture.set_uptime(120.0);
        for protocol in Protocol::ALL {
            fixture.write_table(protocol);
        }
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> ProcRoot {
        ProcRoot::new(self.dir.path())
    }

    pub fn set_uptime(&mut self, secs: f64) {
        fs::write(self.path().join("uptime"), format!("{:.2} 400.00\n", secs))
            .expect("write uptime");
    }

    /// Append a socket-table row. `local` is the kernel hex address
    /// (8 hex digits for IPv4, 32 for IPv6).
    pub fn add_socket(
        &mut self,
        protocol: Protocol,
        local: &str,
        port: u16,
        state: SocketState,
        inode: u64,
    ) {
        let remote = if protocol.is_ipv6() {
            "00000000000000000000000000000000"
        } else {
            "00000000"
        };
        let rows = self.rows.entry(protocol).or_default();
        let row = format!(
            "{:>4}: {}:{:04X} {}:0000 {:02X} 00000000:00000000 00:00000000 00000000  1000        0 {} 1 0000000000000000 100 0 0 10 0\n",
            rows.len(),
            local,
            port,
            remote,
            state_hex(state),
            inode
        );
        rows.push(row);
        self.write_table(protocol);
    }

    /// Remove a protocol's table file entirely.
    pub fn remove_table(&mut self, protocol: Protocol) {
        self.rows.remove(&protocol);
        let _ = fs::remove_file(self.table_path(protocol));
    }

    /// Write every file of one process.
    pub fn add_process(&self, process: &FixtureProcess) {
        let dir = self.path().join(process.pid.to_string());
        fs::create_dir_all(dir.join("fd")).expect("create pid dir");
        fs::write(dir.join("comm"), format!("{}\n", process.comm)).expect("write comm");
        fs::write(dir.join("stat"), process.stat_line()).expect("write stat");
        fs::write(dir.join("status"), process.status_text()).expect("write status");
        fs::write(dir.join("cmdline"), &process.cmdline).expect("write cmdline");
        if let Some(exe) = &process.exe {
            symlink(exe, dir.join("exe")).expect("link exe");
        }
        // stdin/stdout/stderr are not sockets.
        for fd in 0..3 {
            symlink("/dev/null", dir.join("fd").join(fd.to_string())).expect("link fd");
        }
        for (i, inode) in process.socket_inodes.iter().enumerate() {
            symlink(
                format!("socket:[{}]", inode),
                dir.join("fd").join((i + 3).to_string()),
            )
            .expect("link socket fd");
        }
    }

    /// Delete a process directory, as if it exited.
    pub fn remove_process(&self, pid: u32) {
        let _ = fs::remove_dir_all(self.path().join(pid.to_string()));
    }

    /// Write a passwd file into the fixture and return its path.
    pub fn write_passwd(&self, entries: &[(&str, u32)]) -> PathBuf {
        let mut content = String::from("# fixture\n");
        for (name, uid) in entries {
            content.push_str(&format!("{}:x:{}:{}::/home/{}:/bin/sh\n", name, uid, uid, name));
        }
        let path = self.path().join("passwd");
        fs::write(&path, content).expect("write passwd");
        path
    }

    fn table_path(&self, protocol: Protocol) -> PathBuf {
        self.path().join("net").join(protocol.as_str())
    }

    fn write_table(&self, protocol: Protocol) {
        let mut content = String::from(TABLE_HEADER);
        if let Some(rows) = self.rows.get(&protocol) {
            for row in rows {
                content.push_str(row);
            }
        }
        fs::write(self.table_path(protocol), content).expect("write socket table");
    }
}

impl Default for ProcFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Kernel encoding of a state in the `st` column.
pub fn state_hex(state: SocketState) -> u8 {
    (0x01..=0x0C)
        .find(|code| SocketState::from_hex(*code) == state)
        .unwrap_or(0x00)
}
