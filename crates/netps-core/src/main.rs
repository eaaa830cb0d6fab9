//! netps - which processes own which sockets
//!
//! The entry point for the `netps` binary, handling:
//! - Listing socket-owning processes
//! - Inspecting one process with concurrent detail hydration
//! - Sending a signal from the fixed action menu

use clap::{Args, Parser, Subcommand};
use netps_common::error::{format_error_human, StructuredError};
use netps_common::{
    Config, ConfigPaths, ConfigResolver, ConfigSource, Error, OutputFormat, ProcessId,
    SCHEMA_VERSION,
};
use netps_core::exit_codes::ExitCode;
use netps_core::inspect::{inspect, InspectOptions};
use netps_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use netps_core::output::{render_detail, render_list, DetailReport, ListReport};
use netps_core::process::{scan_running_processes, Sources};
use netps_core::signal::{self, Signal};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// netps - network sockets by process
#[derive(Parser)]
#[command(name = "netps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to config.toml
    #[arg(long, global = true, env = "NETPS_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Read this directory instead of /proc
    #[arg(long, global = true)]
    proc_root: Option<PathBuf>,

    /// Detail hydration deadline in seconds (0 waits indefinitely)
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List processes that own sockets
    List,

    /// Show identity, resources, ownership and sockets of one process
    Inspect(InspectArgs),

    /// Send a signal (SIGTERM, SIGKILL, SIGINT, SIGHUP) to a process
    Signal(SignalArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Process ID
    pid: u32,

    /// Retry failed categories up to N times
    #[arg(long, default_value_t = 0)]
    retry: u32,
}

#[derive(Args, Debug)]
struct SignalArgs {
    /// Process ID
    pid: u32,

    /// Signal name or number
    signal: String,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let global = &cli.global;

    let (config, source) = match load_config(global) {
        Ok(loaded) => loaded,
        Err(e) => {
            // Logging is configured from the file, so report directly.
            report_error(global, &e);
            std::process::exit(ExitCode::from_error(&e).as_i32());
        }
    };

    init_logging(&log_config(global, &config));

    let run_id = generate_run_id();
    let span = tracing::info_span!("netps", run_id = %run_id);
    let _guard = span.enter();
    debug!(
        resolution = %source.resolution,
        path = ?source.path,
        proc_root = %config.proc_root.display(),
        "configuration loaded"
    );

    let result = match &cli.command {
        Commands::List => run_list(global, &config, &run_id),
        Commands::Inspect(args) => run_inspect(global, &config, &run_id, args),
        Commands::Signal(args) => run_signal(global, args),
        Commands::Version => run_version(global),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            report_error(global, &e);
            ExitCode::from_error(&e)
        }
    };
    std::process::exit(exit_code.as_i32());
}

fn load_config(global: &GlobalOpts) -> Result<(Config, ConfigSource), Error> {
    let resolver = ConfigResolver::new(ConfigPaths {
        config_path: global.config.clone(),
    });
    let (mut config, source) = resolver.load()?;
    if let Some(root) = &global.proc_root {
        config.proc_root = root.clone();
    }
    Ok((config, source))
}

/// Flags win over config keys; both win over NETPS_LOG / RUST_LOG.
fn log_config(global: &GlobalOpts, config: &Config) -> LogConfig {
    let cli_level = if global.quiet {
        Some(LogLevel::Error)
    } else {
        match global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    let level = cli_level.or_else(|| config.log_level.as_deref()?.parse().ok());
    let format = config
        .log_format
        .as_deref()
        .and_then(|f| f.parse::<LogFormat>().ok());
    LogConfig::from_env(level, format)
}

fn report_error(global: &GlobalOpts, err: &Error) {
    if global.format.is_machine() {
        let payload = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "error": StructuredError::from(err),
        });
        println!("{}", payload);
    } else {
        eprintln!("{}", format_error_human(err, std::io::stderr().is_terminal()));
    }
}

fn print_payload(rendered: String) {
    if rendered.ends_with('\n') {
        print!("{}", rendered);
    } else {
        println!("{}", rendered);
    }
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_list(global: &GlobalOpts, config: &Config, run_id: &str) -> Result<ExitCode, Error> {
    ensure_platform()?;
    let sources = Sources::from_config(config);
    let processes =
        scan_running_processes(&*sources.sockets, &*sources.owners, &*sources.identity)
            .map_err(|e| e.into_error(None))?;

    let report = ListReport::new(run_id, processes);
    print_payload(render_list(&report, global.format)?);
    Ok(ExitCode::Clean)
}

fn run_inspect(
    global: &GlobalOpts,
    config: &Config,
    run_id: &str,
    args: &InspectArgs,
) -> Result<ExitCode, Error> {
    ensure_platform()?;
    let options = InspectOptions {
        timeout: match global.timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => InspectOptions::default().timeout,
        },
        max_retries: args.retry,
    };

    let outcome = inspect(Sources::from_config(config), ProcessId(args.pid), &options)?;
    let exit_code = outcome.exit_code();
    info!(
        pid = args.pid,
        screen = %outcome.view.screen,
        exit = %exit_code,
        "inspect finished"
    );

    let report = DetailReport::new(run_id, outcome.view, outcome.interrupted, outcome.retries);
    print_payload(render_detail(&report, global.format)?);
    Ok(exit_code)
}

fn run_signal(global: &GlobalOpts, args: &SignalArgs) -> Result<ExitCode, Error> {
    let sig: Signal = args
        .signal
        .parse()
        .map_err(|_| Error::UnknownSignal(args.signal.clone()))?;

    signal::send(ProcessId(args.pid), sig).map_err(|e| Error::SignalFailed {
        pid: args.pid,
        signal: sig.name().to_string(),
        message: e.to_string(),
    })?;

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            let payload = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "pid": args.pid,
                "signal": sig.name(),
                "number": sig.number(),
                "sent": true,
            });
            println!("{}", payload);
        }
        OutputFormat::Md | OutputFormat::Summary => {
            println!("sent {} to {}", sig, args.pid);
        }
    }
    Ok(ExitCode::Clean)
}

fn run_version(global: &GlobalOpts) -> Result<ExitCode, Error> {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            let version_info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "netps_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{}", serde_json::to_string_pretty(&version_info)?);
        }
        OutputFormat::Md | OutputFormat::Summary => {
            println!("netps {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
    Ok(ExitCode::Clean)
}

#[cfg(target_os = "linux")]
fn ensure_platform() -> Result<(), Error> {
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn ensure_platform() -> Result<(), Error> {
    Err(Error::UnsupportedPlatform(std::env::consts::OS.to_string()))
}
