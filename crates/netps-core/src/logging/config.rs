//! Log level and format selection.
//!
//! Sources, lowest to highest priority: built-in defaults, `RUST_LOG`,
//! `NETPS_LOG` / `NETPS_LOG_FORMAT`, then whatever the caller passes in
//! (CLI flags, or config keys when no flag was given).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Console lines on stderr.
    #[default]
    Human,
    /// One JSON object per event on stderr.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Most verbose level named in a `RUST_LOG` directive list.
    ///
    /// `"netps_core=debug,hyper=warn"` gives Debug. Directives without a
    /// recognisable level are ignored.
    pub fn from_directives(directives: &str) -> Option<LogLevel> {
        directives
            .split(',')
            .filter_map(|d| {
                let level = d.rsplit('=').next()?;
                level.parse::<LogLevel>().ok()
            })
            .min()
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "quiet" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for tracing::Level {
    /// `Off` has no `Level`; it maps to the quietest one.
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Off => tracing::Level::ERROR,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            other => LevelFilter::from_level(other.into()),
        }
    }
}

/// Resolved logging settings handed to [`super::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human lines with a timestamp.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment, with `level` / `format`
    /// overriding anything the environment says.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self::resolve(
            var("NETPS_LOG").as_deref(),
            var("NETPS_LOG_FORMAT").as_deref(),
            var("RUST_LOG").as_deref(),
            level,
            format,
        )
    }

    fn resolve(
        netps_log: Option<&str>,
        netps_log_format: Option<&str>,
        rust_log: Option<&str>,
        level: Option<LogLevel>,
        format: Option<LogFormat>,
    ) -> Self {
        let env_level = netps_log
            .and_then(|v| v.parse().ok())
            .or_else(|| rust_log.and_then(LogLevel::from_directives));
        let env_format = netps_log_format.and_then(|v| v.parse().ok());

        let defaults = LogConfig::default();
        LogConfig {
            level: level.or(env_level).unwrap_or(defaults.level),
            format: format.or(env_format).unwrap_or(defaults.format),
            timestamps: defaults.timestamps,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Jsonl);
        assert_eq!(" pretty ".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());

        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("quiet".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_display_matches_parse() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::Off,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert_eq!(LogFormat::Jsonl.to_string(), "jsonl");
    }

    #[test]
    fn test_from_directives_picks_most_verbose() {
        assert_eq!(
            LogLevel::from_directives("netps_core=debug,hyper=warn"),
            Some(LogLevel::Debug)
        );
        assert_eq!(LogLevel::from_directives("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_directives("netps_core"), None);
    }

    #[test]
    fn test_level_filter_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Off), LevelFilter::OFF);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(tracing::Level::from(LogLevel::Off), tracing::Level::ERROR);
    }

    #[test]
    fn test_env_precedence() {
        let config = LogConfig::resolve(Some("debug"), Some("jsonl"), Some("error"), None, None);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Jsonl);

        let config = LogConfig::resolve(None, None, Some("netps_core=warn"), None, None);
        assert_eq!(config.level, LogLevel::Warn);

        let config = LogConfig::resolve(
            Some("debug"),
            Some("jsonl"),
            None,
            Some(LogLevel::Error),
            Some(LogFormat::Human),
        );
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn test_unparseable_env_ignored() {
        let config = LogConfig::resolve(Some("loud"), Some("xml"), None, None, None);
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = LogConfig::default()
            .with_level(LogLevel::Trace)
            .with_format(LogFormat::Jsonl)
            .without_timestamps();
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Jsonl);
        assert!(!config.timestamps);
    }
}
