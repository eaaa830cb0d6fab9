//! CLI help and argument tests for netps.
//!
//! These tests verify that commands display their help text and reject bad
//! arguments without touching `/proc`.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn netps() -> Command {
    let mut cmd = cargo_bin_cmd!("netps");
    cmd.env_remove("NETPS_CONFIG").env_remove("NETPS_LOG");
    cmd
}

// ============================================================================
// Top-level Help Tests
// ============================================================================

mod top_level {
    use super::*;

    #[test]
    fn help_flag_works() {
        netps()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("network sockets by process"));
    }

    #[test]
    fn version_flag_works() {
        netps()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("netps"));
    }

    #[test]
    fn help_shows_all_commands() {
        netps()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("list"))
            .stdout(predicate::str::contains("inspect"))
            .stdout(predicate::str::contains("signal"))
            .stdout(predicate::str::contains("version"));
    }

    #[test]
    fn help_shows_global_options() {
        netps()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--format"))
            .stdout(predicate::str::contains("--proc-root"))
            .stdout(predicate::str::contains("--timeout"));
    }
}

// ============================================================================
// Subcommand Tests
// ============================================================================

mod subcommands {
    use super::*;

    #[test]
    fn inspect_help_shows_retry() {
        netps()
            .args(["inspect", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--retry"));
    }

    #[test]
    fn inspect_requires_pid() {
        netps().arg("inspect").assert().failure().code(2);
    }

    #[test]
    fn inspect_rejects_non_numeric_pid() {
        netps().args(["inspect", "nginx"]).assert().failure().code(2);
    }

    #[test]
    fn unknown_signal_is_rejected() {
        netps()
            .args(["-f", "md", "signal", "1", "SIGSTOP"])
            .assert()
            .code(13)
            .stderr(predicate::str::contains("Unknown Signal"));
    }

    #[test]
    fn version_json() {
        let output = netps().arg("version").assert().success().get_output().stdout.clone();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["netps_version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn version_summary() {
        netps()
            .args(["--format", "summary", "version"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("netps "));
    }
}
