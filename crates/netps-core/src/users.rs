//! UID → username lookup against a passwd-format file.

use std::fs;
use std::path::{Path, PathBuf};

/// Keyed lookup into the host identity database.
pub trait UserDirectory: Send + Sync {
    /// Username for `uid`, or `None` when the database has no entry or
    /// cannot be read.
    fn username(&self, uid: u32) -> Option<String>;
}

/// `UserDirectory` backed by `/etc/passwd` (or a fixture file).
///
/// The file is re-read on every lookup so accounts added while the process
/// runs are picked up.
#[derive(Debug, Clone)]
pub struct PasswdDirectory {
    path: PathBuf,
}

impl PasswdDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PasswdDirectory { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for PasswdDirectory {
    fn default() -> Self {
        PasswdDirectory::new(netps_common::config::DEFAULT_PASSWD_PATH)
    }
}

impl UserDirectory for PasswdDirectory {
    fn username(&self, uid: u32) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        lookup_passwd_content(&content, uid)
    }
}

/// Find `uid` in passwd content (`name:pw:uid:gid:gecos:home:shell`).
pub fn lookup_passwd_content(content: &str, uid: u32) -> Option<String> {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .find_map(|line| {
            let mut fields = line.split(':');
            let name = fields.next()?;
            let line_uid: u32 = fields.nth(1)?.parse().ok()?;
            (line_uid == uid && !name.is_empty()).then(|| name.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
# comment:x:5:5::/:/bin/false
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
postgres:x:109:117:PostgreSQL administrator,,,:/var/lib/postgresql:/bin/bash
broken-line
alice:x:1000:1000:Alice,,,:/home/alice:/bin/zsh
";

    #[test]
    fn test_lookup_passwd_content() {
        assert_eq!(lookup_passwd_content(PASSWD, 0).as_deref(), Some("root"));
        assert_eq!(lookup_passwd_content(PASSWD, 109).as_deref(), Some("postgres"));
        assert_eq!(lookup_passwd_content(PASSWD, 1000).as_deref(), Some("alice"));
    }

    #[test]
    fn test_lookup_miss_and_comment() {
        assert_eq!(lookup_passwd_content(PASSWD, 4242), None);
        assert_eq!(lookup_passwd_content(PASSWD, 5), None);
    }

    #[test]
    fn test_passwd_directory_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwd");
        fs::write(&path, PASSWD).unwrap();

        let users = PasswdDirectory::new(&path);
        assert_eq!(users.username(109).as_deref(), Some("postgres"));
        assert_eq!(users.username(31337), None);
    }

    #[test]
    fn test_unreadable_database_is_a_miss() {
        let users = PasswdDirectory::new("/nonexistent/passwd");
        assert_eq!(users.username(0), None);
    }
}
