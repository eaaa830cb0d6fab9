//! The detail-view state machine.
//!
//! `update` is the only mutation path. It is driven from a single loop, so
//! applying a result and recomputing the screen state is atomic with respect
//! to every other message.

use super::cancel::CancelToken;
use super::msg::{Cmd, FetchResult, FetchTask, Msg};
use super::screen::ScreenState;
use super::slot::{FetchError, Hydration, HydrationState, SlotKind};
use super::view::{DetailView, ErrorLine};
use crate::procfs::net::SocketRecord;
use crate::process::{ProcessIdentity, ProcessOwnership, ProcessResource};
use netps_common::ProcessId;
use tracing::{debug, info};

/// Hydration state for the inspected process.
#[derive(Debug, Default)]
pub struct HydrationCoordinator {
    pid: Option<ProcessId>,
    name: String,
    identity: Hydration<ProcessIdentity>,
    resource: Hydration<ProcessResource>,
    ownership: Hydration<ProcessOwnership>,
    sockets: Hydration<Vec<SocketRecord>>,
    /// Generation of the active cycle; bumped on every visit and retry.
    generation: u64,
    /// Token of the active cycle. `None` outside the detail view.
    token: Option<CancelToken>,
    /// Error panel hidden. Presentation only; never clears slot errors.
    dismissed: bool,
    needs_redraw: bool,
}

impl HydrationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pid(&self) -> Option<ProcessId> {
        self.pid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token of the active cycle, if any.
    pub fn token(&self) -> Option<&CancelToken> {
        self.token.as_ref()
    }

    pub fn identity(&self) -> &Hydration<ProcessIdentity> {
        &self.identity
    }

    pub fn resource(&self) -> &Hydration<ProcessResource> {
        &self.resource
    }

    pub fn ownership(&self) -> &Hydration<ProcessOwnership> {
        &self.ownership
    }

    pub fn sockets(&self) -> &Hydration<Vec<SocketRecord>> {
        &self.sockets
    }

    pub fn slot_state(&self, slot: SlotKind) -> HydrationState {
        match slot {
            SlotKind::Identity => self.identity.state(),
            SlotKind::Resource => self.resource.state(),
            SlotKind::Ownership => self.ownership.state(),
            SlotKind::Sockets => self.sockets.state(),
        }
    }

    pub fn slot_states(&self) -> [HydrationState; 4] {
        SlotKind::ALL.map(|slot| self.slot_state(slot))
    }

    /// Derived; never stored.
    pub fn screen(&self) -> ScreenState {
        ScreenState::derive(&self.slot_states(), self.dismissed)
    }

    /// Whether a message changed what is displayed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        let needed = self.needs_redraw;
        self.needs_redraw = false;
        needed
    }

    pub fn update(&mut self, msg: Msg) -> Cmd {
        match msg {
            Msg::Visit { pid, name } => self.visit(pid, name),
            Msg::Hydrated { generation, result } => {
                self.apply(generation, result);
                Cmd::None
            }
            Msg::Retry => self.retry(),
            Msg::DismissErrors => {
                if self.screen() == ScreenState::PartialErrors {
                    self.dismissed = true;
                    self.needs_redraw = true;
                }
                Cmd::None
            }
            Msg::Leave => {
                self.cancel_if_incomplete();
                self.pid = None;
                self.name.clear();
                self.token = None;
                self.dismissed = false;
                self.for_each_slot_reset();
                self.needs_redraw = true;
                Cmd::GoBack
            }
            Msg::Quit => {
                self.cancel_if_incomplete();
                Cmd::Quit
            }
        }
    }

    fn visit(&mut self, pid: ProcessId, name: String) -> Cmd {
        if let Some(old) = self.token.take() {
            old.cancel();
        }

        self.pid = Some(pid);
        self.name = name;
        self.dismissed = false;
        self.identity.start();
        self.resource.start();
        self.ownership.start();
        self.sockets.start();
        let token = self.begin_cycle();
        self.needs_redraw = true;

        info!(pid = pid.0, generation = self.generation, "hydration cycle started");
        Cmd::batch(
            SlotKind::ALL
                .into_iter()
                .map(|slot| self.fetch(slot, pid, &token))
                .collect(),
        )
    }

    /// Re-fetch only the slots in Error, under a brand-new cycle.
    fn retry(&mut self) -> Cmd {
        let Some(pid) = self.pid else {
            return Cmd::None;
        };
        if !self.screen().is_partial() {
            return Cmd::None;
        }

        if let Some(old) = self.token.take() {
            old.cancel();
        }
        let token = self.begin_cycle();

        let failed: Vec<SlotKind> = SlotKind::ALL
            .into_iter()
            .filter(|slot| self.slot_state(*slot) == HydrationState::Error)
            .collect();
        for slot in &failed {
            match slot {
                SlotKind::Identity => self.identity.start(),
                SlotKind::Resource => self.resource.start(),
                SlotKind::Ownership => self.ownership.start(),
                SlotKind::Sockets => self.sockets.start(),
            }
        }
        self.dismissed = false;
        self.needs_redraw = true;

        info!(
            pid = pid.0,
            generation = self.generation,
            slots = ?failed,
            "retrying failed slots"
        );
        Cmd::batch(
            failed
                .into_iter()
                .map(|slot| self.fetch(slot, pid, &token))
                .collect(),
        )
    }

    fn apply(&mut self, generation: u64, result: FetchResult) {
        let slot = result.slot();
        let live = match &self.token {
            Some(token) => !token.is_cancelled() && generation == self.generation,
            None => false,
        };
        if !live {
            debug!(
                slot = %slot,
                generation,
                active = self.generation,
                "discarding result from cancelled or stale cycle"
            );
            return;
        }

        let changed = match result {
            FetchResult::Identity(r) => self.identity.apply(r),
            FetchResult::Resource(r) => self.resource.apply(r),
            FetchResult::Ownership(r) => self.ownership.apply(r),
            FetchResult::Sockets(r) => self.sockets.apply(r),
        };
        if !changed {
            debug!(slot = %slot, "result does not change slot, ignoring");
            return;
        }

        self.needs_redraw = true;
        let screen = self.screen();
        debug!(slot = %slot, state = ?self.slot_state(slot), screen = %screen, "slot hydrated");
        if screen.is_finished() {
            info!(
                pid = self.pid.map(|p| p.0),
                generation,
                screen = %screen,
                "hydration cycle finished"
            );
        }
    }

    fn begin_cycle(&mut self) -> CancelToken {
        let token = CancelToken::new();
        self.generation += 1;
        self.token = Some(token.clone());
        token
    }

    fn fetch(&self, slot: SlotKind, pid: ProcessId, token: &CancelToken) -> Cmd {
        Cmd::Fetch(FetchTask {
            slot,
            pid,
            generation: self.generation,
            token: token.clone(),
        })
    }

    fn cancel_if_incomplete(&mut self) {
        if !self.screen().is_incomplete() {
            return;
        }
        if let Some(token) = &self.token {
            token.cancel();
            debug!(generation = self.generation, "cancelled incomplete hydration cycle");
        }
    }

    fn for_each_slot_reset(&mut self) {
        self.identity.reset();
        self.resource.reset();
        self.ownership.reset();
        self.sockets.reset();
    }

    /// Snapshot for presentation.
    pub fn view(&self) -> DetailView {
        let mut errors = Vec::new();
        let mut push = |slot: SlotKind, err: Option<&FetchError>| {
            if let Some(err) = err {
                errors.push(ErrorLine::new(slot, err));
            }
        };
        push(SlotKind::Identity, self.identity.error());
        push(SlotKind::Resource, self.resource.error());
        push(SlotKind::Ownership, self.ownership.error());
        push(SlotKind::Sockets, self.sockets.error());

        let screen = self.screen();
        DetailView {
            pid: self.pid,
            name: self.name.clone(),
            screen,
            partial: screen.is_partial(),
            errors_visible: screen == ScreenState::PartialErrors,
            slots: SlotKind::ALL.map(|slot| (slot, self.slot_state(slot))).to_vec(),
            identity: self.identity.data().cloned(),
            resource: self.resource.data().cloned(),
            ownership: self.ownership.data().cloned(),
            sockets: self.sockets.data().cloned(),
            errors,
        }
    }
}
