//! `/proc/[pid]/stat` parsing.
//!
//! Format: `pid (comm) state ppid pgrp session tty_nr tpgid flags minflt
//! cminflt majflt cmajflt utime stime cutime cstime priority nice
//! num_threads itrealvalue starttime vsize rss ...`
//!
//! `comm` may contain spaces and parentheses, so it is taken between the
//! first `(` and the last `)`.

use super::{ParseError, ProcError, ProcRoot};
use netps_common::ProcessId;
use serde::{Deserialize, Serialize};

// Indices into the fields that follow the closing parenthesis.
const STATE: usize = 0;
const PPID: usize = 1;
const UTIME: usize = 11;
const STIME: usize = 12;
const STARTTIME: usize = 19;
const VSIZE: usize = 20;
const RSS: usize = 21;

/// Raw fields of one stat snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatFields {
    pub comm: String,
    pub state: char,
    pub ppid: u32,
    /// User CPU time in clock ticks.
    pub utime: u64,
    /// System CPU time in clock ticks.
    pub stime: u64,
    /// Start time in clock ticks after boot.
    pub starttime: u64,
    /// Virtual size in bytes.
    pub vsize: u64,
    /// Resident set size in pages.
    pub rss_pages: u64,
}

pub fn read_stat(root: &ProcRoot, pid: ProcessId) -> Result<StatFields, ProcError> {
    let path = root.pid_file(pid, "stat");
    let content = root.read_to_string(&path)?;
    parse_stat_content(&content).map_err(|e| ProcError::malformed(&path, e))
}

pub fn parse_stat_content(content: &str) -> Result<StatFields, ParseError> {
    let open = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' before comm"))?;
    let close = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' after comm"))?;
    if close < open {
        return Err(ParseError::new("comm parentheses out of order"));
    }

    let comm = content[open + 1..close].to_string();
    let fields: Vec<&str> = content[close + 1..].split_whitespace().collect();
    if fields.len() <= RSS {
        return Err(ParseError::new(format!(
            "expected at least {} fields after comm, found {}",
            RSS + 1,
            fields.len()
        )));
    }

    let state = fields[STATE]
        .chars()
        .next()
        .ok_or_else(|| ParseError::new("empty state field"))?;

    Ok(StatFields {
        comm,
        state,
        ppid: number(&fields, PPID, "ppid")?,
        utime: number(&fields, UTIME, "utime")?,
        stime: number(&fields, STIME, "stime")?,
        starttime: number(&fields, STARTTIME, "starttime")?,
        vsize: number(&fields, VSIZE, "vsize")?,
        rss_pages: number(&fields, RSS, "rss")?,
    })
}

fn number<T: std::str::FromStr>(fields: &[&str], idx: usize, name: &str) -> Result<T, ParseError> {
    fields[idx]
        .parse()
        .map_err(|_| ParseError::new(format!("{} is not a number: {:?}", name, fields[idx])))
}

/// Human label for the scheduling state character.
pub fn state_label(state: char) -> &'static str {
    match state {
        'R' => "Running",
        'S' => "Sleeping",
        'D' => "Disk Sleep",
        'Z' => "Zombie",
        'T' => "Stopped",
        't' => "Tracing stop",
        'X' => "Dead",
        'I' => "Idle",
        _ => "UNKNOWN",
    }
}
