//! Configuration resolution for netps.
//!
//! Implements deterministic config resolution order:
//! 1. Explicit CLI flag (--config)
//! 2. Environment variable (NETPS_CONFIG)
//! 3. XDG config (`$XDG_CONFIG_HOME/netps/config.toml`, else `~/.config/netps/config.toml`)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Config, ConfigResolution, ConfigSource};
use crate::error::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "NETPS_CONFIG";

const CONFIG_DIR_NAME: &str = "netps";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file paths supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit path to config.toml
    pub config_path: Option<PathBuf>,
}

/// Configuration resolver with deterministic resolution order.
#[derive(Debug)]
pub struct ConfigResolver {
    cli_paths: ConfigPaths,
}

impl ConfigResolver {
    /// Create a new resolver with CLI paths.
    pub fn new(paths: ConfigPaths) -> Self {
        ConfigResolver { cli_paths: paths }
    }

    /// Create a resolver with no CLI overrides.
    pub fn with_defaults() -> Self {
        ConfigResolver {
            cli_paths: ConfigPaths::default(),
        }
    }

    /// Resolve the config file path against the process environment.
    pub fn resolve_config_path(&self) -> (Option<PathBuf>, ConfigResolution) {
        self.resolve_with(|key| env::var(key).ok(), dirs::config_dir())
    }

    fn resolve_with<F>(
        &self,
        lookup: F,
        home_config: Option<PathBuf>,
    ) -> (Option<PathBuf>, ConfigResolution)
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. CLI flag
        if let Some(ref path) = self.cli_paths.config_path {
            return (Some(path.clone()), ConfigResolution::CliFlag);
        }

        // 2. NETPS_CONFIG env var
        if let Some(path) = lookup(CONFIG_ENV_VAR) {
            return (Some(PathBuf::from(path)), ConfigResolution::EnvVar);
        }

        // 3. XDG_CONFIG_HOME/netps, then ~/.config/netps
        let xdg_dir = lookup("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or(home_config)
            .map(|d| d.join(CONFIG_DIR_NAME));
        if let Some(dir) = xdg_dir {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                return (Some(path), ConfigResolution::XdgConfig);
            }
        }

        // 4. Default
        (None, ConfigResolution::Default)
    }

    /// Load config from the resolved path, or defaults.
    pub fn load(&self) -> Result<(Config, ConfigSource)> {
        let (path, resolution) = self.resolve_config_path();
        load_resolved(path, resolution)
    }
}

fn load_resolved(
    path: Option<PathBuf>,
    resolution: ConfigResolution,
) -> Result<(Config, ConfigSource)> {
    match path {
        Some(p) => {
            let config = load_file(&p)?;
            Ok((
                config,
                ConfigSource {
                    path: Some(p),
                    resolution,
                },
            ))
        }
        None => Ok((
            Config::default(),
            ConfigSource {
                path: None,
                resolution: ConfigResolution::Default,
            },
        )),
    }
}

/// Read and parse one config file.
pub fn load_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read config from {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| Error::InvalidConfig {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_resolver_defaults_when_nothing_found() {
        let resolver = ConfigResolver::with_defaults();
        let (path, resolution) =
            resolver.resolve_with(env_of(&[("XDG_CONFIG_HOME", "/nonexistent/xdg")]), None);
        assert!(path.is_none());
        assert_eq!(resolution, ConfigResolution::Default);
    }

    #[test]
    fn test_cli_flag_wins_over_env() {
        let resolver = ConfigResolver::new(ConfigPaths {
            config_path: Some(PathBuf::from("/tmp/cli.toml")),
        });
        let (path, resolution) =
            resolver.resolve_with(env_of(&[(CONFIG_ENV_VAR, "/tmp/env.toml")]), None);
        assert_eq!(path, Some(PathBuf::from("/tmp/cli.toml")));
        assert_eq!(resolution, ConfigResolution::CliFlag);
    }

    #[test]
    fn test_env_wins_over_xdg() {
        let dir = tempfile::tempdir().unwrap();
        let netps_dir = dir.path().join("netps");
        fs::create_dir_all(&netps_dir).unwrap();
        fs::write(netps_dir.join("config.toml"), "").unwrap();

        let resolver = ConfigResolver::with_defaults();
        let xdg = dir.path().to_string_lossy().to_string();
        let (path, resolution) = resolver.resolve_with(
            env_of(&[(CONFIG_ENV_VAR, "/tmp/env.toml"), ("XDG_CONFIG_HOME", xdg.as_str())]),
            None,
        );
        assert_eq!(path, Some(PathBuf::from("/tmp/env.toml")));
        assert_eq!(resolution, ConfigResolution::EnvVar);
    }

    #[test]
    fn test_xdg_config_found() {
        let dir = tempfile::tempdir().unwrap();
        let netps_dir = dir.path().join("netps");
        fs::create_dir_all(&netps_dir).unwrap();
        fs::write(netps_dir.join("config.toml"), "page_size = 16384\n").unwrap();

        let resolver = ConfigResolver::with_defaults();
        let (path, resolution) = resolver.resolve_with(env_of(&[]), Some(dir.path().into()));
        assert_eq!(resolution, ConfigResolution::XdgConfig);

        let (config, source) = load_resolved(path, resolution).unwrap();
        assert_eq!(config.page_size, Some(16384));
        assert_eq!(source.resolution, ConfigResolution::XdgConfig);
    }

    #[test]
    fn test_load_from_cli_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "proc_root = \"/tmp/fakeproc\"").unwrap();
        writeln!(tmp, "detail_socket_states = [\"LISTEN\"]").unwrap();

        let resolver = ConfigResolver::new(ConfigPaths {
            config_path: Some(tmp.path().to_path_buf()),
        });
        let (config, source) = resolver.load().unwrap();
        assert_eq!(source.resolution, ConfigResolution::CliFlag);
        assert_eq!(config.proc_root, PathBuf::from("/tmp/fakeproc"));
        assert_eq!(config.detail_socket_states, vec!["LISTEN"]);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "clock_ticks = \"many\"").unwrap();

        let err = load_file(tmp.path()).unwrap_err();
        assert_eq!(err.code(), 11);
        assert!(err.to_string().contains(&tmp.path().display().to_string()));
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = load_file(Path::new("/nonexistent/netps.toml")).unwrap_err();
        assert_eq!(err.code(), 10);
    }
}
