//! Aggregate screen state, derived from the four slot states.

use super::slot::HydrationState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenState {
    /// No slot asked yet.
    Init,
    /// Asked, none finished.
    InProgress,
    /// Some, not all, finished.
    OneFinished,
    AllOkay,
    /// All finished with at least one error; error panel shown.
    PartialErrors,
    /// As PartialErrors, with the error panel dismissed. Data is still partial.
    ErrorsDismissed,
}

impl ScreenState {
    /// Pure function of the slot states and the dismissed flag.
    pub fn derive(states: &[HydrationState; 4], dismissed: bool) -> ScreenState {
        let finished = states.iter().filter(|s| s.is_finished()).count();

        if states.iter().all(|s| *s == HydrationState::NotAsked) {
            ScreenState::Init
        } else if finished == states.len() {
            if states.iter().all(|s| *s == HydrationState::Success) {
                ScreenState::AllOkay
            } else if dismissed {
                ScreenState::ErrorsDismissed
            } else {
                ScreenState::PartialErrors
            }
        } else if finished > 0 {
            ScreenState::OneFinished
        } else {
            ScreenState::InProgress
        }
    }

    /// Every slot has finished.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            ScreenState::AllOkay | ScreenState::PartialErrors | ScreenState::ErrorsDismissed
        )
    }

    /// Hydration still running (or not started); leaving must cancel.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            ScreenState::Init | ScreenState::InProgress | ScreenState::OneFinished
        )
    }

    /// Data is incomplete, whether or not the error panel is visible.
    pub fn is_partial(&self) -> bool {
        matches!(self, ScreenState::PartialErrors | ScreenState::ErrorsDismissed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenState::Init => "init",
            ScreenState::InProgress => "in_progress",
            ScreenState::OneFinished => "one_finished",
            ScreenState::AllOkay => "all_okay",
            ScreenState::PartialErrors => "partial_errors",
            ScreenState::ErrorsDismissed => "errors_dismissed",
        }
    }
}

impl std::fmt::Display for ScreenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HydrationState::*;

    #[test]
    fn test_derive_table() {
        let cases = [
            ([NotAsked; 4], false, ScreenState::Init),
            ([Hydrating; 4], false, ScreenState::InProgress),
            ([Success, Hydrating, Hydrating, Hydrating], false, ScreenState::OneFinished),
            ([Success, Error, Success, Hydrating], false, ScreenState::OneFinished),
            ([Success; 4], false, ScreenState::AllOkay),
            ([Success; 4], true, ScreenState::AllOkay),
            ([Success, Error, Error, Success], false, ScreenState::PartialErrors),
            ([Success, Error, Error, Success], true, ScreenState::ErrorsDismissed),
            ([Error; 4], false, ScreenState::PartialErrors),
        ];
        for (states, dismissed, expected) in cases {
            assert_eq!(
                ScreenState::derive(&states, dismissed),
                expected,
                "{:?} dismissed={}",
                states,
                dismissed
            );
        }
    }

    #[test]
    fn test_predicates() {
        assert!(ScreenState::Init.is_incomplete());
        assert!(ScreenState::OneFinished.is_incomplete());
        assert!(!ScreenState::PartialErrors.is_incomplete());
        assert!(ScreenState::ErrorsDismissed.is_partial());
        assert!(ScreenState::ErrorsDismissed.is_finished());
        assert!(!ScreenState::AllOkay.is_partial());
    }
}
