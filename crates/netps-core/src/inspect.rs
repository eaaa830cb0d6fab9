//! One-shot detail visit: the non-interactive form of opening the detail
//! view, waiting for it to settle and retrying failed categories.

use crate::exit_codes::ExitCode;
use crate::hydration::{DetailRuntime, DetailView, FetchErrorKind, ScreenState, Settled};
use crate::process::Sources;
use netps_common::{Error, ProcessId, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Overall deadline across the visit and every retry.
    pub timeout: Option<Duration>,
    /// Retry cycles allowed while the view is partial.
    pub max_retries: u32,
}

impl Default for InspectOptions {
    fn default() -> Self {
        InspectOptions {
            timeout: Some(Duration::from_secs(5)),
            max_retries: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InspectOutcome {
    pub view: DetailView,
    pub interrupted: bool,
    pub retries: u32,
}

impl InspectOutcome {
    /// Every category failed because the process is gone.
    pub fn process_vanished(&self) -> bool {
        self.view.errors.len() == 4
            && self.view.errors.iter().all(|e| e.kind == FetchErrorKind::Vanished)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.interrupted {
            ExitCode::Interrupted
        } else if self.process_vanished() {
            ExitCode::NotFound
        } else if self.view.screen == ScreenState::AllOkay {
            ExitCode::Clean
        } else {
            ExitCode::Partial
        }
    }
}

/// Visit `pid` and wait for hydration to settle.
///
/// The list name is read first; a process that is already gone is reported
/// as [`Error::ProcessNotFound`] without starting a cycle.
pub fn inspect(sources: Sources, pid: ProcessId, options: &InspectOptions) -> Result<InspectOutcome> {
    let name = match sources.identity.process_name(pid) {
        Ok(name) => name,
        Err(e) if e.is_not_found() => return Err(Error::ProcessNotFound { pid: pid.0 }),
        Err(e) => {
            debug!(pid = pid.0, error = %e, "name unreadable, inspecting anyway");
            String::new()
        }
    };

    let deadline = options.timeout.map(|t| Instant::now() + t);
    let mut runtime = DetailRuntime::new(sources);
    runtime.visit(pid, name);

    let mut retries = 0;
    loop {
        match runtime.run_until_settled(deadline) {
            Settled::Finished(view) if view.is_partial() && retries < options.max_retries => {
                retries += 1;
                info!(
                    pid = pid.0,
                    attempt = retries,
                    failed = view.failed_slots(),
                    "retrying failed categories"
                );
                runtime.retry();
            }
            Settled::Finished(view) => {
                return Ok(InspectOutcome {
                    view,
                    interrupted: false,
                    retries,
                })
            }
            Settled::Interrupted(view) => {
                return Ok(InspectOutcome {
                    view,
                    interrupted: true,
                    retries,
                })
            }
            Settled::Left | Settled::Quit => return Err(Error::HydrationCancelled { pid: pid.0 }),
        }
    }
}
