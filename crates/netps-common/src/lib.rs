//! netps common types, IDs, and errors.
//!
//! This crate provides foundational types shared by netps-core:
//! - Process and socket identity types
//! - Common error types with stable codes
//! - Output format specifications
//! - Configuration loading and resolution

pub mod config;
pub mod error;
pub mod id;
pub mod output;

pub use config::{Config, ConfigPaths, ConfigResolution, ConfigResolver, ConfigSource};
pub use error::{Error, Result};
pub use id::{ProcessId, SocketInode};
pub use output::OutputFormat;

/// Schema version stamped into JSON command payloads.
pub const SCHEMA_VERSION: &str = "1.0.0";
