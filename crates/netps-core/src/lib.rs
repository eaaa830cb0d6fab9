//! netps core library
//!
//! This library provides the engine behind the `netps` tool:
//! - Socket discovery over the process filesystem (`procfs`, `process`)
//! - Per-process detail readers (identity, resources, ownership, sockets)
//! - Concurrent detail hydration with cancellation (`hydration`)
//! - Logging setup, exit codes and output rendering for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod exit_codes;
pub mod format;
pub mod host;
pub mod hydration;
pub mod inspect;
pub mod logging;
pub mod output;
pub mod process;
pub mod procfs;
pub mod signal;
pub mod users;

// Re-export test utilities for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock_sources;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
