//! Exit codes for the netps CLI.
//!
//! Exit codes communicate the outcome of a command without requiring output
//! parsing.
//!
//! Exit code ranges:
//! - 0-3: Operational outcomes (the command ran)
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors

/// Exit codes for netps commands.
///
/// These codes are a stable contract for scripts. Changes require a major
/// version bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-3)
    // ========================================================================
    /// Success: every category hydrated / command completed
    Clean = 0,

    /// Detail view finished with at least one failed category
    Partial = 1,

    /// Detail hydration hit the deadline and was cancelled
    Interrupted = 2,

    /// The requested process does not exist
    NotFound = 3,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Configuration file unreadable or invalid
    ConfigError = 11,

    /// Permission denied
    PermissionError = 12,

    /// Signal delivery failed or unknown signal
    SignalError = 13,

    /// Platform without a process filesystem
    PlatformError = 14,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates full success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Check if this exit code is an operational outcome (codes 0-9).
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    /// Check if this exit code is a user/environment error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        let code = self as i32;
        (10..20).contains(&code)
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Get the code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::Partial => "OK_PARTIAL",
            ExitCode::Interrupted => "ERR_INTERRUPTED",
            ExitCode::NotFound => "ERR_NOT_FOUND",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::PermissionError => "ERR_PERMISSION",
            ExitCode::SignalError => "ERR_SIGNAL",
            ExitCode::PlatformError => "ERR_PLATFORM",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }

    /// Exit code for a library error.
    pub fn from_error(err: &netps_common::Error) -> Self {
        use netps_common::Error;
        match err {
            Error::Config(_) | Error::InvalidConfig { .. } => ExitCode::ConfigError,
            Error::ProcessNotFound { .. } => ExitCode::NotFound,
            Error::PermissionDenied { .. } => ExitCode::PermissionError,
            Error::HydrationCancelled { .. } => ExitCode::Interrupted,
            Error::SignalFailed { .. } | Error::UnknownSignal(_) => ExitCode::SignalError,
            Error::UnsupportedPlatform(_) => ExitCode::PlatformError,
            Error::Io(_) | Error::Collection(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(ExitCode::Clean.is_success());
        assert!(ExitCode::Partial.is_operational());
        assert!(!ExitCode::Partial.is_success());
        assert!(ExitCode::NotFound.is_operational());
        assert!(ExitCode::ConfigError.is_user_error());
        assert!(ExitCode::IoError.is_internal_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::Interrupted.to_string(), "ERR_INTERRUPTED (2)");
        assert_eq!(i32::from(ExitCode::Partial), 1);
    }

    #[test]
    fn test_from_error() {
        use netps_common::Error;
        let err = Error::ProcessNotFound { pid: 9 };
        assert_eq!(ExitCode::from_error(&err), ExitCode::NotFound);
        let err = Error::UnknownSignal("SIGFOO".to_string());
        assert_eq!(ExitCode::from_error(&err), ExitCode::SignalError);
        // Partial data is an outcome, not an error; only cancellation maps here.
        let err = Error::HydrationCancelled { pid: 9 };
        assert_eq!(ExitCode::from_error(&err), ExitCode::Interrupted);
    }
}
