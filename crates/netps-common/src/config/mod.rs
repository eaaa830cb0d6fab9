//! Configuration loading for netps.
//!
//! This module provides:
//! - The typed `Config` read from `config.toml`
//! - Deterministic config resolution (CLI > env > XDG > defaults)

pub mod resolve;

pub use resolve::{ConfigPaths, ConfigResolver};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default root of the kernel process filesystem.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Default host identity database.
pub const DEFAULT_PASSWD_PATH: &str = "/etc/passwd";

/// The complete loaded configuration.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the process filesystem; overridden in tests with a fixture tree.
    pub proc_root: PathBuf,
    /// Passwd-format file used to resolve UIDs to usernames.
    pub passwd_path: PathBuf,
    /// Clock ticks per second. Queried from the host when unset.
    pub clock_ticks: Option<u64>,
    /// Page size in bytes. Queried from the host when unset.
    pub page_size: Option<u64>,
    /// Socket states shown in the detail view's socket category.
    pub detail_socket_states: Vec<String>,
    /// Log level name (trace, debug, info, warn, error, off).
    pub log_level: Option<String>,
    /// Log format name (human, jsonl).
    pub log_format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
            passwd_path: PathBuf::from(DEFAULT_PASSWD_PATH),
            clock_ticks: None,
            page_size: None,
            detail_socket_states: vec![
                "LISTEN".to_string(),
                "ESTABLISHED".to_string(),
                "CLOSE".to_string(),
            ],
            log_level: None,
            log_format: None,
        }
    }
}

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// Path to the config file, or None if using defaults
    pub path: Option<PathBuf>,
    /// How this source was resolved
    pub resolution: ConfigResolution,
}

/// How a config file was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigResolution {
    /// From explicit CLI flag
    CliFlag,
    /// From environment variable
    EnvVar,
    /// From XDG config directory
    XdgConfig,
    /// Using built-in defaults
    Default,
}

impl std::fmt::Display for ConfigResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigResolution::CliFlag => write!(f, "cli"),
            ConfigResolution::EnvVar => write!(f, "env"),
            ConfigResolution::XdgConfig => write!(f, "xdg"),
            ConfigResolution::Default => write!(f, "default"),
        }
    }
}
