//! Property-based tests for hydration and discovery invariants.

use netps_common::{ProcessId, SocketInode};
use netps_core::hydration::{
    FetchError, FetchErrorKind, FetchResult, HydrationCoordinator, HydrationState, Msg,
    ScreenState, SlotKind,
};
use netps_core::process::{summarize, ProcessOwnership};
use netps_core::procfs::cmdline::parse_cmdline_content;
use netps_core::procfs::net::{parse_socket_table_content, Protocol, SocketRecord, SocketState};
use netps_core::procfs::stat::parse_stat_content;
use netps_core::procfs::status::parse_uid_line;
use netps_core::procfs::uptime::parse_uptime_content;
use proptest::prelude::*;

fn hydration_state() -> impl Strategy<Value = HydrationState> {
    prop_oneof![
        Just(HydrationState::NotAsked),
        Just(HydrationState::Hydrating),
        Just(HydrationState::Success),
        Just(HydrationState::Error),
    ]
}

fn slot() -> impl Strategy<Value = SlotKind> {
    prop_oneof![
        Just(SlotKind::Identity),
        Just(SlotKind::Resource),
        Just(SlotKind::Ownership),
        Just(SlotKind::Sockets),
    ]
}

fn socket_state() -> impl Strategy<Value = SocketState> {
    (0u8..=0x0F).prop_map(SocketState::from_hex)
}

/// A successful result that needs no fixture data.
fn ok_result(slot: SlotKind) -> Option<FetchResult> {
    match slot {
        SlotKind::Ownership => Some(FetchResult::Ownership(Ok(ProcessOwnership {
            real_uid: 0,
            effective_uid: 0,
            username: "root".to_string(),
            username_resolved: true,
            privileged: true,
        }))),
        SlotKind::Sockets => Some(FetchResult::Sockets(Ok(Vec::new()))),
        SlotKind::Identity | SlotKind::Resource => None,
    }
}

#[derive(Debug, Clone)]
enum Op {
    Visit(u32),
    /// Result for `slot`, `age` generations old.
    Result { slot: SlotKind, ok: bool, age: u64 },
    Retry,
    Dismiss,
    Leave,
    Quit,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (1u32..5).prop_map(Op::Visit),
        6 => (slot(), any::<bool>(), 0u64..3).prop_map(|(slot, ok, age)| Op::Result { slot, ok, age }),
        1 => Just(Op::Retry),
        1 => Just(Op::Dismiss),
        1 => Just(Op::Leave),
        1 => Just(Op::Quit),
    ]
}

fn result_for(slot: SlotKind, ok: bool) -> FetchResult {
    if ok {
        if let Some(result) = ok_result(slot) {
            return result;
        }
    }
    FetchResult::failed(slot, FetchError::new(FetchErrorKind::Io, "injected"))
}

proptest! {
    #[test]
    fn screen_derivation_is_total(states in prop::array::uniform4(hydration_state()), dismissed in any::<bool>()) {
        let screen = ScreenState::derive(&states, dismissed);
        let finished = states.iter().filter(|s| s.is_finished()).count();

        prop_assert_eq!(screen.is_finished(), finished == 4);
        prop_assert_eq!(screen.is_incomplete(), !screen.is_finished());
        if screen == ScreenState::AllOkay {
            prop_assert!(states.iter().all(|s| *s == HydrationState::Success));
        }
        if screen.is_partial() {
            prop_assert!(states.iter().any(|s| *s == HydrationState::Error));
        }
    }

    #[test]
    fn summary_buckets_sum_to_socket_count(states in prop::collection::vec(socket_state(), 0..64)) {
        let sockets: Vec<SocketRecord> = states
            .iter()
            .enumerate()
            .map(|(i, state)| SocketRecord {
                protocol: Protocol::Tcp,
                local_addr: "0.0.0.0".to_string(),
                local_port: i as u16,
                state: *state,
                inode: SocketInode(i as u64),
            })
            .collect();
        let summary = summarize(ProcessId(1), "p", &sockets);
        prop_assert_eq!(summary.counts.total(), sockets.len());
        let listening = states.iter().filter(|s| **s == SocketState::Listen).count();
        prop_assert_eq!(summary.counts.listening, listening);
    }

    #[test]
    fn coordinator_invariants_hold(ops in prop::collection::vec(op(), 0..40)) {
        let mut coord = HydrationCoordinator::new();

        for op in ops {
            let before = coord.slot_states();
            let generation = coord.generation();
            let token_live = coord.token().map(|t| !t.is_cancelled()).unwrap_or(false);

            match op {
                Op::Visit(pid) => {
                    let cmd = coord.update(Msg::Visit { pid: ProcessId(pid), name: "p".to_string() });
                    prop_assert_eq!(cmd.fetches().len(), 4);
                    prop_assert_eq!(coord.slot_states(), [HydrationState::Hydrating; 4]);
                }
                Op::Result { slot, ok, age } => {
                    coord.update(Msg::Hydrated {
                        generation: generation.saturating_sub(age),
                        result: result_for(slot, ok),
                    });
                    let stale = age > 0 && generation > 0;
                    if stale || !token_live {
                        // Results outside the live cycle never change anything.
                        prop_assert_eq!(coord.slot_states(), before);
                    }
                }
                Op::Retry => {
                    let cmd = coord.update(Msg::Retry);
                    let failed = before.iter().filter(|s| **s == HydrationState::Error).count();
                    if cmd.is_none() {
                        prop_assert_eq!(coord.slot_states(), before);
                    } else {
                        prop_assert_eq!(cmd.fetches().len(), failed);
                        prop_assert_eq!(coord.generation(), generation + 1);
                    }
                }
                Op::Dismiss => {
                    coord.update(Msg::DismissErrors);
                    // Dismissal is presentation only.
                    prop_assert_eq!(coord.slot_states(), before);
                }
                Op::Leave => {
                    coord.update(Msg::Leave);
                    prop_assert_eq!(coord.screen(), ScreenState::Init);
                    prop_assert!(coord.token().is_none());
                }
                Op::Quit => {
                    coord.update(Msg::Quit);
                }
            }

            let view = coord.view();
            let errors = coord.slot_states().iter().filter(|s| **s == HydrationState::Error).count();
            prop_assert_eq!(view.errors.len(), errors);
            prop_assert_eq!(view.screen, coord.screen());
            prop_assert_eq!(view.partial, coord.screen().is_partial());
        }
    }

    #[test]
    fn socket_table_parser_never_panics(content in ".{0,400}") {
        let _ = parse_socket_table_content(&content, Protocol::Tcp);
        let _ = parse_socket_table_content(&content, Protocol::Udp6);
    }

    #[test]
    fn record_parsers_never_panic(content in ".{0,300}", raw in prop::collection::vec(any::<u8>(), 0..128)) {
        let _ = parse_stat_content(&content);
        let _ = parse_uid_line(&content);
        let _ = parse_uptime_content(&content);
        let _ = parse_cmdline_content(&raw);
    }
}
