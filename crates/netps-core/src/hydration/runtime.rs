//! Event loop that runs hydration fetches on worker threads.
//!
//! Workers never touch coordinator state: they read through the shared
//! sources and send one `Msg::Hydrated` back over the channel. The loop
//! applies messages one at a time.

use super::cancel::CancelToken;
use super::coordinator::HydrationCoordinator;
use super::msg::{Cmd, FetchResult, FetchTask, Msg};
use super::slot::{FetchError, FetchErrorKind, SlotKind};
use super::view::DetailView;
use crate::process::ownership::fetch_ownership;
use crate::process::resource::fetch_resource;
use crate::process::{
    sockets_for_pid, IdentitySource, OwnershipSource, ProcessIdentity, ResourceCounters,
    ResourceSource, SocketSource, Sources, UptimeSource,
};
use crate::procfs::net::SocketTable;
use crate::procfs::ProcError;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use netps_common::{ProcessId, SocketInode};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// How [`DetailRuntime::run_until_settled`] returned.
#[derive(Debug, Clone)]
pub enum Settled {
    /// Every slot finished (successfully or not).
    Finished(DetailView),
    /// The deadline passed first; the cycle was cancelled. Carries what had
    /// arrived by then.
    Interrupted(DetailView),
    /// The view was left (or never entered).
    Left,
    Quit,
}

/// Detail view driver: coordinator, message bus and data sources.
pub struct DetailRuntime {
    coordinator: HydrationCoordinator,
    sources: Sources,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
    left: bool,
    quit: bool,
}

impl DetailRuntime {
    pub fn new(sources: Sources) -> Self {
        let (tx, rx) = unbounded();
        DetailRuntime {
            coordinator: HydrationCoordinator::new(),
            sources,
            tx,
            rx,
            left: false,
            quit: false,
        }
    }

    pub fn coordinator(&self) -> &HydrationCoordinator {
        &self.coordinator
    }

    pub fn view(&self) -> DetailView {
        self.coordinator.view()
    }

    /// Enter the detail view for `pid` and launch all fetches.
    pub fn visit(&mut self, pid: ProcessId, name: impl Into<String>) {
        self.left = false;
        self.send(Msg::Visit {
            pid,
            name: name.into(),
        });
    }

    /// Feed one message through the coordinator and carry out its command.
    pub fn send(&mut self, msg: Msg) {
        let cmd = self.coordinator.update(msg);
        self.dispatch(cmd);
    }

    pub fn dispatch(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.dispatch(cmd);
                }
            }
            Cmd::Fetch(task) => self.spawn(task),
            Cmd::GoBack => self.left = true,
            Cmd::Quit => self.quit = true,
        }
    }

    fn spawn(&mut self, task: FetchTask) {
        let slot = task.slot;
        let generation = task.generation;
        let sources = self.sources.clone();
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("netps-{}", slot))
            .spawn(move || run_fetch(task, &sources, &tx));

        if let Err(e) = spawned {
            warn!(slot = %slot, error = %e, "failed to spawn fetch worker");
            let err = FetchError::new(
                FetchErrorKind::Io,
                format!("could not start {} fetch: {}", slot, e),
            );
            self.send(Msg::Hydrated {
                generation,
                result: FetchResult::failed(slot, err),
            });
        }
    }

    /// Drive the loop until every slot has finished, the view is left, or
    /// `deadline` passes. A passed deadline is handled like leaving the view.
    pub fn run_until_settled(&mut self, deadline: Option<Instant>) -> Settled {
        loop {
            if self.quit {
                return Settled::Quit;
            }
            if self.left || self.coordinator.pid().is_none() {
                return Settled::Left;
            }
            if self.coordinator.screen().is_finished() {
                return Settled::Finished(self.coordinator.view());
            }

            let received = match deadline {
                Some(deadline) => self.rx.recv_deadline(deadline),
                None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(msg) => self.send(msg),
                Err(RecvTimeoutError::Timeout) => {
                    let view = self.coordinator.view();
                    debug!(screen = %view.screen, "hydration deadline reached");
                    self.send(Msg::Leave);
                    return Settled::Interrupted(view);
                }
                // The runtime holds a sender, so this only happens on teardown.
                Err(RecvTimeoutError::Disconnected) => return Settled::Left,
            }
        }
    }

    pub fn retry(&mut self) {
        self.send(Msg::Retry);
    }

    pub fn dismiss_errors(&mut self) {
        self.send(Msg::DismissErrors);
    }

    pub fn leave(&mut self) {
        self.send(Msg::Leave);
    }

    pub fn quit(&mut self) {
        self.send(Msg::Quit);
    }
}

/// Body of one fetch worker.
///
/// Every source call checks the cycle token first, so a cancelled cycle
/// starts no further reads. The token is checked once more before
/// reporting; the coordinator's generation check covers the remaining race.
pub fn run_fetch(task: FetchTask, sources: &Sources, tx: &Sender<Msg>) {
    if task.token.is_cancelled() {
        debug!(slot = %task.slot, "cycle cancelled before fetch");
        return;
    }

    let pid = task.pid;
    let checked = Checked {
        sources,
        token: &task.token,
    };
    let result = match task.slot {
        SlotKind::Identity => {
            FetchResult::Identity(checked.identity(pid).map_err(FetchError::from))
        }
        SlotKind::Resource => FetchResult::Resource(
            fetch_resource(&checked, &checked, &*sources.host, pid).map_err(FetchError::from),
        ),
        SlotKind::Ownership => FetchResult::Ownership(
            fetch_ownership(&checked, &*sources.users, pid).map_err(FetchError::from),
        ),
        SlotKind::Sockets => FetchResult::Sockets(
            sockets_for_pid(&checked, pid, &sources.socket_states).map_err(FetchError::from),
        ),
    };

    if task.token.is_cancelled() {
        debug!(slot = %task.slot, "cycle cancelled during fetch, dropping result");
        return;
    }
    if tx
        .send(Msg::Hydrated {
            generation: task.generation,
            result,
        })
        .is_err()
    {
        debug!(slot = %task.slot, "detail view closed before result arrived");
    }
}

/// Sources seen through one cycle's token: no read starts after cancel.
struct Checked<'a> {
    sources: &'a Sources,
    token: &'a CancelToken,
}

impl Checked<'_> {
    fn proceed(&self) -> Result<(), ProcError> {
        if self.token.is_cancelled() {
            Err(ProcError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl SocketSource for Checked<'_> {
    fn socket_tables(&self) -> SocketTable {
        if self.token.is_cancelled() {
            return SocketTable::new();
        }
        self.sources.sockets.socket_tables()
    }

    fn socket_inodes(&self, pid: ProcessId) -> Result<Vec<SocketInode>, ProcError> {
        self.proceed()?;
        self.sources.sockets.socket_inodes(pid)
    }
}

impl IdentitySource for Checked<'_> {
    fn process_name(&self, pid: ProcessId) -> Result<String, ProcError> {
        self.proceed()?;
        self.sources.identity.process_name(pid)
    }

    fn identity(&self, pid: ProcessId) -> Result<ProcessIdentity, ProcError> {
        self.proceed()?;
        self.sources.identity.identity(pid)
    }
}

impl ResourceSource for Checked<'_> {
    fn resource_counters(&self, pid: ProcessId) -> Result<ResourceCounters, ProcError> {
        self.proceed()?;
        self.sources.resource.resource_counters(pid)
    }
}

impl UptimeSource for Checked<'_> {
    fn uptime(&self) -> Result<f64, ProcError> {
        self.proceed()?;
        self.sources.uptime.uptime()
    }
}

impl OwnershipSource for Checked<'_> {
    fn uid_pair(&self, pid: ProcessId) -> Result<(u32, u32), ProcError> {
        self.proceed()?;
        self.sources.ownership.uid_pair(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydration::{CancelToken, HydrationState, ScreenState};
    use crate::mock_sources::{MockFailure, MockHost, MockProcess};
    use crate::procfs::net::SocketState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn postgres_host() -> MockHost {
        MockHost::new()
            .with_process(
                MockProcess::new(1234, "postgres")
                    .ppid(1)
                    .uids(109, 109)
                    .socket(100, 5432, SocketState::Listen)
                    .socket(101, 5432, SocketState::Established)
                    .socket(102, 40000, SocketState::TimeWait),
            )
            .with_user(109, "postgres")
    }

    fn settle(runtime: &mut DetailRuntime) -> Settled {
        runtime.run_until_settled(Some(Instant::now() + Duration::from_secs(10)))
    }

    #[test]
    fn test_visit_hydrates_all_slots() {
        let host = Arc::new(postgres_host());
        let mut runtime = DetailRuntime::new(host.sources());
        runtime.visit(ProcessId(1234), "postgres");

        let Settled::Finished(view) = settle(&mut runtime) else {
            panic!("expected Finished");
        };
        assert_eq!(view.screen, ScreenState::AllOkay);
        assert!(!view.partial);
        assert_eq!(view.identity.unwrap().parent_name, "init");
        assert_eq!(view.ownership.unwrap().username, "postgres");
        // TIME_WAIT is outside the default detail filter.
        assert_eq!(view.sockets.unwrap().len(), 2);
        assert_eq!(view.resource.unwrap().resident_bytes, 256 * 4096);
    }

    #[test]
    fn test_partial_then_retry_refetches_only_failures() {
        let host = Arc::new(
            postgres_host()
                .fail(SlotKind::Resource, MockFailure::Vanished, 1)
                .fail(SlotKind::Ownership, MockFailure::PermissionDenied, 1),
        );
        let mut runtime = DetailRuntime::new(host.sources());
        runtime.visit(ProcessId(1234), "postgres");

        let Settled::Finished(view) = settle(&mut runtime) else {
            panic!("expected Finished");
        };
        assert_eq!(view.screen, ScreenState::PartialErrors);
        assert_eq!(view.failed_slots(), 2);

        runtime.retry();
        let Settled::Finished(view) = settle(&mut runtime) else {
            panic!("expected Finished");
        };
        assert_eq!(view.screen, ScreenState::AllOkay);
        assert_eq!(host.calls(SlotKind::Identity), 1);
        assert_eq!(host.calls(SlotKind::Sockets), 1);
        assert_eq!(host.calls(SlotKind::Resource), 2);
        assert_eq!(host.calls(SlotKind::Ownership), 2);
    }

    #[test]
    fn test_deadline_interrupts_and_cancels() {
        let host = Arc::new(postgres_host().delay(SlotKind::Sockets, Duration::from_millis(400)));
        let mut runtime = DetailRuntime::new(host.sources());
        runtime.visit(ProcessId(1234), "postgres");
        let token = runtime.coordinator().token().cloned().unwrap();

        let settled = runtime.run_until_settled(Some(Instant::now() + Duration::from_millis(100)));
        let Settled::Interrupted(view) = settled else {
            panic!("expected Interrupted, got {:?}", settled);
        };
        assert!(view.screen.is_incomplete());
        assert!(token.is_cancelled());
        assert_eq!(runtime.coordinator().slot_states(), [HydrationState::NotAsked; 4]);
    }

    #[test]
    fn test_vanished_process_is_partial() {
        let host = Arc::new(MockHost::new());
        let mut runtime = DetailRuntime::new(host.sources());
        runtime.visit(ProcessId(4242), "ghost");

        let Settled::Finished(view) = settle(&mut runtime) else {
            panic!("expected Finished");
        };
        assert_eq!(view.screen, ScreenState::PartialErrors);
        assert_eq!(view.failed_slots(), 4);
        assert!(view.errors.iter().all(|e| e.kind == FetchErrorKind::Vanished));
    }

    #[test]
    fn test_worker_skips_cancelled_cycle() {
        let host = Arc::new(postgres_host());
        let sources = host.sources();
        let (tx, rx) = unbounded();
        let token = CancelToken::new();
        token.cancel();

        run_fetch(
            FetchTask {
                slot: SlotKind::Identity,
                pid: ProcessId(1234),
                generation: 1,
                token,
            },
            &sources,
            &tx,
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(host.calls(SlotKind::Identity), 0);
    }

    struct CountingUptime(AtomicUsize);

    impl UptimeSource for CountingUptime {
        fn uptime(&self) -> Result<f64, ProcError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(120.0)
        }
    }

    #[test]
    fn test_cancel_mid_fetch_skips_remaining_reads() {
        let host = Arc::new(postgres_host().delay(SlotKind::Resource, Duration::from_millis(200)));
        let uptime = Arc::new(CountingUptime(AtomicUsize::new(0)));
        let mut sources = host.sources();
        sources.uptime = uptime.clone() as Arc<dyn UptimeSource>;

        let (tx, rx) = unbounded();
        let token = CancelToken::new();
        let task = FetchTask {
            slot: SlotKind::Resource,
            pid: ProcessId(1234),
            generation: 1,
            token: token.clone(),
        };
        let worker = thread::spawn(move || run_fetch(task, &sources, &tx));

        // Cancel while the counters read is still sleeping.
        thread::sleep(Duration::from_millis(50));
        token.cancel();
        worker.join().unwrap();

        assert_eq!(host.calls(SlotKind::Resource), 1);
        assert_eq!(uptime.0.load(Ordering::SeqCst), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_checked_sources_refuse_after_cancel() {
        let host = Arc::new(postgres_host());
        let sources = host.sources();
        let token = CancelToken::new();
        let checked = Checked {
            sources: &sources,
            token: &token,
        };
        assert_eq!(checked.uid_pair(ProcessId(1234)).unwrap(), (109, 109));
        assert_eq!(checked.socket_tables().len(), 3);

        token.cancel();
        assert!(matches!(checked.uid_pair(ProcessId(1234)), Err(ProcError::Cancelled)));
        assert!(matches!(checked.identity(ProcessId(1234)), Err(ProcError::Cancelled)));
        assert!(checked.socket_tables().is_empty());
        assert_eq!(host.calls(SlotKind::Ownership), 1);
        assert_eq!(
            FetchError::from(ProcError::Cancelled).kind,
            FetchErrorKind::Cancelled
        );
    }

    #[test]
    fn test_leave_and_quit() {
        let host = Arc::new(postgres_host());
        let mut runtime = DetailRuntime::new(host.sources());
        assert!(matches!(runtime.run_until_settled(None), Settled::Left));

        runtime.visit(ProcessId(1234), "postgres");
        runtime.leave();
        assert!(matches!(runtime.run_until_settled(None), Settled::Left));

        runtime.visit(ProcessId(1234), "postgres");
        runtime.quit();
        assert!(matches!(runtime.run_until_settled(None), Settled::Quit));
    }
}
