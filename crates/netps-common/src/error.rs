//! Error types for netps.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints and suggested actions
//! - Remediation text for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Process Not Found
//!   Reason: process 4242 not found
//!   Fix: The process exited before it could be inspected. Refresh the list.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 21,
//!   "category": "collection",
//!   "message": "process 4242 not found",
//!   "recoverable": false,
//!   "suggested_action": "rescan",
//!   "context": { "pid": 4242 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for netps operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration file errors.
    Config,
    /// Process and socket discovery errors.
    Collection,
    /// Detail hydration errors.
    Hydration,
    /// Signal delivery errors.
    Action,
    /// File I/O and serialization errors.
    Io,
    /// Platform compatibility errors.
    Platform,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Collection => write!(f, "collection"),
            ErrorCategory::Hydration => write!(f, "hydration"),
            ErrorCategory::Action => write!(f, "action"),
            ErrorCategory::Io => write!(f, "io"),
            ErrorCategory::Platform => write!(f, "platform"),
        }
    }
}

/// Suggested follow-up for callers that automate netps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Retry the operation.
    Retry,
    /// Fix the configuration file.
    FixConfig,
    /// Refresh the process list.
    Rescan,
    /// Request elevated privileges.
    Elevate,
    /// Abort the operation.
    Abort,
    /// No action needed.
    None,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::FixConfig => write!(f, "fix_config"),
            SuggestedAction::Rescan => write!(f, "rescan"),
            SuggestedAction::Elevate => write!(f, "elevate"),
            SuggestedAction::Abort => write!(f, "abort"),
            SuggestedAction::None => write!(f, "none"),
        }
    }
}

/// Unified error type for netps.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid config file {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    // Collection errors (20-29)
    #[error("process collection failed: {0}")]
    Collection(String),

    #[error("process {pid} not found")]
    ProcessNotFound { pid: u32 },

    #[error("permission denied accessing process {pid}")]
    PermissionDenied { pid: u32 },

    // Hydration errors (30-39)
    #[error("detail hydration for process {pid} cancelled")]
    HydrationCancelled { pid: u32 },

    // Action errors (40-49)
    #[error("failed to send {signal} to process {pid}: {message}")]
    SignalFailed {
        pid: u32,
        signal: String,
        message: String,
    },

    #[error("unknown signal: {0}")]
    UnknownSignal(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Platform errors (70-79)
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Collection errors
    /// - 30-39: Hydration errors
    /// - 40-49: Action errors
    /// - 60-69: I/O errors
    /// - 70-79: Platform errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig { .. } => 11,
            Error::Collection(_) => 20,
            Error::ProcessNotFound { .. } => 21,
            Error::PermissionDenied { .. } => 23,
            Error::HydrationCancelled { .. } => 31,
            Error::SignalFailed { .. } => 40,
            Error::UnknownSignal(_) => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::UnsupportedPlatform(_) => 70,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => ErrorCategory::Config,

            Error::Collection(_)
            | Error::ProcessNotFound { .. }
            | Error::PermissionDenied { .. } => ErrorCategory::Collection,

            Error::HydrationCancelled { .. } => ErrorCategory::Hydration,

            Error::SignalFailed { .. } | Error::UnknownSignal(_) => ErrorCategory::Action,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,

            Error::UnsupportedPlatform(_) => ErrorCategory::Platform,
        }
    }

    /// Returns whether this error is potentially recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidConfig { .. } => true,

            Error::Collection(_) => true,
            Error::ProcessNotFound { .. } => false, // Process is gone
            Error::PermissionDenied { .. } => true, // Can elevate

            Error::HydrationCancelled { .. } => true,

            Error::SignalFailed { .. } => true,
            Error::UnknownSignal(_) => false,

            Error::Io(_) => true,
            Error::Json(_) => false,

            Error::UnsupportedPlatform(_) => false,
        }
    }

    /// Returns the suggested action for automation.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::Config(_) | Error::InvalidConfig { .. } => SuggestedAction::FixConfig,

            Error::Collection(_) => SuggestedAction::Retry,
            Error::ProcessNotFound { .. } => SuggestedAction::Rescan,
            Error::PermissionDenied { .. } => SuggestedAction::Elevate,

            Error::HydrationCancelled { .. } => SuggestedAction::Retry,

            Error::SignalFailed { .. } => SuggestedAction::Elevate,
            Error::UnknownSignal(_) => SuggestedAction::Abort,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::Abort,

            Error::UnsupportedPlatform(_) => SuggestedAction::Abort,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => "Check that the config file exists and is readable.",
            Error::InvalidConfig { .. } => {
                "Fix the TOML syntax or remove the offending key; unknown keys are rejected."
            }

            Error::Collection(_) => {
                "Retry the scan. If persistent, check that /proc is mounted and readable."
            }
            Error::ProcessNotFound { .. } => {
                "The process exited before it could be inspected. Refresh the list."
            }
            Error::PermissionDenied { .. } => {
                "Another user owns this process. Run netps with elevated privileges to see it."
            }

            Error::HydrationCancelled { .. } => {
                "Hydration did not finish before the deadline. Increase '--timeout' or retry."
            }

            Error::SignalFailed { .. } => {
                "Check that the process still exists and that you are allowed to signal it."
            }
            Error::UnknownSignal(_) => "Use one of SIGTERM, SIGKILL, SIGINT or SIGHUP.",

            Error::Io(_) => "Check permissions and retry the operation.",
            Error::Json(_) => "Internal serialization failure. Report it as a bug.",

            Error::UnsupportedPlatform(_) => "netps reads the Linux /proc filesystem only.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidConfig { .. } => "Invalid Configuration",

            Error::Collection(_) => "Process Collection Error",
            Error::ProcessNotFound { .. } => "Process Not Found",
            Error::PermissionDenied { .. } => "Permission Denied",

            Error::HydrationCancelled { .. } => "Hydration Cancelled",

            Error::SignalFailed { .. } => "Signal Failed",
            Error::UnknownSignal(_) => "Unknown Signal",

            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",

            Error::UnsupportedPlatform(_) => "Unsupported Platform",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested follow-up.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., pid, file path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ProcessNotFound { pid }
            | Error::PermissionDenied { pid }
            | Error::HydrationCancelled { pid } => {
                context.insert("pid".to_string(), serde_json::json!(pid));
            }
            Error::SignalFailed { pid, signal, .. } => {
                context.insert("pid".to_string(), serde_json::json!(pid));
                context.insert("signal".to_string(), serde_json::json!(signal));
            }
            Error::InvalidConfig { path, .. } => {
                context.insert(
                    "path".to_string(),
                    serde_json::json!(path.display().to_string()),
                );
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("test".into()).code(), 10);
        assert_eq!(Error::ProcessNotFound { pid: 123 }.code(), 21);
        assert_eq!(Error::HydrationCancelled { pid: 1 }.code(), 31);
        assert_eq!(Error::UnknownSignal("SIGFOO".into()).code(), 41);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(Error::Config("test".into()).category(), ErrorCategory::Config);
        assert_eq!(
            Error::ProcessNotFound { pid: 123 }.category(),
            ErrorCategory::Collection
        );
        assert_eq!(
            Error::HydrationCancelled { pid: 1 }.category(),
            ErrorCategory::Hydration
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::Config("test".into()).is_recoverable());
        assert!(!Error::ProcessNotFound { pid: 123 }.is_recoverable());
        assert!(Error::PermissionDenied { pid: 123 }.is_recoverable());
    }

    #[test]
    fn test_suggested_action() {
        assert_eq!(
            Error::PermissionDenied { pid: 123 }.suggested_action(),
            SuggestedAction::Elevate
        );
        assert_eq!(
            Error::ProcessNotFound { pid: 123 }.suggested_action(),
            SuggestedAction::Rescan
        );
    }

    #[test]
    fn test_structured_error_from_error() {
        let err = Error::HydrationCancelled { pid: 12345 };
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 31);
        assert_eq!(structured.category, ErrorCategory::Hydration);
        assert!(structured.recoverable);
        assert_eq!(structured.suggested_action, SuggestedAction::Retry);
        assert_eq!(structured.context.get("pid"), Some(&serde_json::json!(12345)));
        assert_eq!(structured.context.len(), 1);
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::ProcessNotFound { pid: 7 };
        let json = StructuredError::from(&err).to_json();

        assert!(json.contains(r#""code":21"#));
        assert!(json.contains(r#""category":"collection""#));
        assert!(json.contains(r#""recoverable":false"#));
        assert!(json.contains(r#""suggested_action":"rescan""#));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::PermissionDenied { pid: 1234 };
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Permission Denied"));
        assert!(formatted.contains("permission denied accessing process 1234"));
        assert!(formatted.contains("elevated privileges"));
    }

    #[test]
    fn test_display_impls() {
        assert_eq!(ErrorCategory::Hydration.to_string(), "hydration");
        assert_eq!(SuggestedAction::FixConfig.to_string(), "fix_config");
    }
}
