//! `/proc/[pid]/cmdline` reconstruction.
//!
//! The file is argv joined by NUL bytes with a trailing NUL. Tokens are
//! rendered so the result can be pasted back into a POSIX shell.

use super::{ProcError, ProcRoot};
use netps_common::ProcessId;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

pub fn read_cmdline(root: &ProcRoot, pid: ProcessId) -> Result<String, ProcError> {
    let path = root.pid_file(pid, "cmdline");
    let bytes = root.read_bytes(&path)?;
    Ok(parse_cmdline_content(&bytes))
}

/// Join NUL-separated argv into one shell-safe string.
///
/// Kernel threads have an empty cmdline and yield an empty string.
pub fn parse_cmdline_content(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\0").unwrap_or(bytes);
    if bytes.is_empty() {
        return String::new();
    }

    bytes
        .split(|b| *b == 0)
        .map(|token| shell_quote(&String::from_utf8_lossy(token)).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn needs_quoting() -> &'static Regex {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_@%+=:,./-]").expect("static pattern"))
}

/// Quote a token with POSIX single quotes when it is empty or contains
/// whitespace or shell metacharacters.
pub fn shell_quote(token: &str) -> Cow<'_, str> {
    if !token.is_empty() && !needs_quoting().is_match(token) {
        return Cow::Borrowed(token);
    }
    Cow::Owned(format!("'{}'", token.replace('\'', r"'\''")))
}
