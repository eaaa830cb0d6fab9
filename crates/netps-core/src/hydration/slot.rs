//! Hydration slots: one independently tracked detail category.

use crate::procfs::ProcError;
use serde::{Deserialize, Serialize};

/// The four detail categories of an inspected process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Identity,
    Resource,
    Ownership,
    Sockets,
}

impl SlotKind {
    pub const ALL: [SlotKind; 4] = [
        SlotKind::Identity,
        SlotKind::Resource,
        SlotKind::Ownership,
        SlotKind::Sockets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Identity => "identity",
            SlotKind::Resource => "resource",
            SlotKind::Ownership => "ownership",
            SlotKind::Sockets => "sockets",
        }
    }

    /// How often this category fails and whether retrying helps.
    pub fn severity(&self) -> Severity {
        match self {
            SlotKind::Identity => Severity::new(Frequency::Rare, Retryability::Retryable),
            SlotKind::Resource => Severity::new(Frequency::Common, Retryability::Retryable),
            SlotKind::Ownership => Severity::new(Frequency::Common, Retryability::Permanent),
            SlotKind::Sockets => Severity::new(Frequency::Common, Retryability::Retryable),
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Rare,
    Common,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retryability {
    Retryable,
    Permanent,
}

/// Error classification shown next to a slot error. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    pub frequency: Frequency,
    pub retry: Retryability,
}

impl Severity {
    pub const fn new(frequency: Frequency, retry: Retryability) -> Self {
        Severity { frequency, retry }
    }

    /// Whether a retry is likely to help.
    pub fn retry_hint(&self) -> bool {
        self.retry == Retryability::Retryable
    }

    /// e.g. `[rare][retryable]`
    pub fn label(&self) -> &'static str {
        match (self.frequency, self.retry) {
            (Frequency::Rare, Retryability::Retryable) => "[rare][retryable]",
            (Frequency::Rare, Retryability::Permanent) => "[rare][permanent]",
            (Frequency::Common, Retryability::Retryable) => "[common][retryable]",
            (Frequency::Common, Retryability::Permanent) => "[common][permanent]",
        }
    }
}

/// Lifecycle of a slot within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrationState {
    NotAsked,
    Hydrating,
    Success,
    Error,
}

impl HydrationState {
    pub fn is_finished(&self) -> bool {
        matches!(self, HydrationState::Success | HydrationState::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The process (or one of its files) disappeared.
    Vanished,
    PermissionDenied,
    Malformed,
    Io,
    Cancelled,
}

/// Slot-level fetch failure. Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        FetchError {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

impl From<ProcError> for FetchError {
    fn from(err: ProcError) -> Self {
        let kind = match &err {
            ProcError::NotFound { .. } => FetchErrorKind::Vanished,
            ProcError::PermissionDenied { .. } => FetchErrorKind::PermissionDenied,
            ProcError::Malformed { .. } => FetchErrorKind::Malformed,
            ProcError::Io { .. } => FetchErrorKind::Io,
            ProcError::Cancelled => FetchErrorKind::Cancelled,
        };
        FetchError::new(kind, err.to_string())
    }
}

/// One slot: lifecycle state, payload and error.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydration<T> {
    state: HydrationState,
    data: Option<T>,
    error: Option<FetchError>,
}

impl<T> Default for Hydration<T> {
    fn default() -> Self {
        Hydration {
            state: HydrationState::NotAsked,
            data: None,
            error: None,
        }
    }
}

impl<T> Hydration<T> {
    pub fn state(&self) -> HydrationState {
        self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Enter Hydrating for a new cycle, discarding prior contents.
    pub fn start(&mut self) {
        *self = Hydration {
            state: HydrationState::Hydrating,
            data: None,
            error: None,
        };
    }

    /// Back to NotAsked.
    pub fn reset(&mut self) {
        *self = Hydration::default();
    }

    /// Whether applying `result` would change `(state, error)`.
    pub fn would_change(&self, result: &Result<T, FetchError>) -> bool {
        match result {
            Ok(_) => self.state != HydrationState::Success || self.error.is_some(),
            Err(e) => self.state != HydrationState::Error || self.error.as_ref() != Some(e),
        }
    }

    /// Apply a fetch result. Only a Hydrating slot accepts one, and only
    /// when it changes `(state, error)`; returns whether anything changed.
    pub fn apply(&mut self, result: Result<T, FetchError>) -> bool {
        if self.state != HydrationState::Hydrating || !self.would_change(&result) {
            return false;
        }
        match result {
            Ok(data) => {
                self.state = HydrationState::Success;
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => {
                self.state = HydrationState::Error;
                self.data = None;
                self.error = Some(e);
            }
        }
        true
    }
}
