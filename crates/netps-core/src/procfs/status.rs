//! `/proc/[pid]/status` parsing (UID line only).

use super::{ParseError, ProcError, ProcRoot};
use netps_common::ProcessId;

/// Real and effective UID of a process.
pub fn read_uid_pair(root: &ProcRoot, pid: ProcessId) -> Result<(u32, u32), ProcError> {
    let path = root.pid_file(pid, "status");
    let content = root.read_to_string(&path)?;
    parse_uid_line(&content).map_err(|e| ProcError::malformed(&path, e))
}

/// Extract `(real, effective)` from the `Uid:` line.
///
/// The line carries four values: real, effective, saved, filesystem.
pub fn parse_uid_line(content: &str) -> Result<(u32, u32), ParseError> {
    let line = content
        .lines()
        .find(|line| line.starts_with("Uid:"))
        .ok_or_else(|| ParseError::new("no Uid: line"))?;

    let mut values = line.split_whitespace().skip(1);
    let mut next_uid = |name: &str| -> Result<u32, ParseError> {
        values
            .next()
            .ok_or_else(|| ParseError::new(format!("Uid: line missing {} uid", name)))?
            .parse()
            .map_err(|_| ParseError::new(format!("Uid: line has non-numeric {} uid", name)))
    };

    let real = next_uid("real")?;
    let effective = next_uid("effective")?;
    Ok((real, effective))
}
