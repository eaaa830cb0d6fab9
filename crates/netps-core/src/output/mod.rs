//! Command payload rendering.
//!
//! Reports are plain serde structs stamped with the schema version, the run
//! ID and a capture timestamp. Renderers return strings; printing is the
//! binary's job.

use crate::format::{duration_hhmmss, human_bytes};
use crate::hydration::{DetailView, HydrationState, SlotKind};
use crate::process::ProcessSummary;
use crate::procfs::net::SocketRecord;
use chrono::{SecondsFormat, Utc};
use netps_common::{OutputFormat, SCHEMA_VERSION};
use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;

fn captured_at() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Result of one list refresh.
#[derive(Debug, Clone, Serialize)]
pub struct ListReport {
    pub schema_version: &'static str,
    pub run_id: String,
    pub captured_at: String,
    pub processes: Vec<ProcessSummary>,
}

impl ListReport {
    pub fn new(run_id: impl Into<String>, processes: Vec<ProcessSummary>) -> Self {
        ListReport {
            schema_version: SCHEMA_VERSION,
            run_id: run_id.into(),
            captured_at: captured_at(),
            processes,
        }
    }
}

/// Result of one detail visit.
#[derive(Debug, Clone, Serialize)]
pub struct DetailReport {
    pub schema_version: &'static str,
    pub run_id: String,
    pub captured_at: String,
    /// Hydration was cut short by the deadline.
    pub interrupted: bool,
    /// Retry cycles run after the first visit.
    pub retries: u32,
    pub view: DetailView,
}

impl DetailReport {
    pub fn new(run_id: impl Into<String>, view: DetailView, interrupted: bool, retries: u32) -> Self {
        DetailReport {
            schema_version: SCHEMA_VERSION,
            run_id: run_id.into(),
            captured_at: captured_at(),
            interrupted,
            retries,
            view,
        }
    }
}

pub fn render_list(report: &ListReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Jsonl => {
            let mut out = String::new();
            for process in &report.processes {
                out.push_str(&serde_json::to_string(process)?);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Md => Ok(list_markdown(report)),
        OutputFormat::Summary => Ok(list_summary(report)),
    }
}

fn list_summary(report: &ListReport) -> String {
    let listening: usize = report.processes.iter().map(|p| p.counts.listening).sum();
    let established: usize = report.processes.iter().map(|p| p.counts.established).sum();
    format!(
        "{} processes with sockets ({} listening, {} established)\n",
        report.processes.len(),
        listening,
        established
    )
}

fn list_markdown(report: &ListReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Processes with sockets");
    let _ = writeln!(out);
    let _ = writeln!(out, "Captured {} ({})", report.captured_at, report.run_id);
    let _ = writeln!(out);
    let _ = writeln!(out, "| PID | NAME | LISTEN | ESTAB | CLOSED | OTHER | PORTS |");
    let _ = writeln!(out, "|----:|------|-------:|------:|-------:|------:|-------|");
    for p in &report.processes {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} |",
            p.pid,
            p.name,
            p.counts.listening,
            p.counts.established,
            p.counts.closed,
            p.counts.other,
            p.listen_ports
        );
    }
    out
}

pub fn render_detail(report: &DetailReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Jsonl => detail_jsonl(report),
        OutputFormat::Md => Ok(detail_markdown(report)),
        OutputFormat::Summary => Ok(detail_summary(report)),
    }
}

/// One line per slot: its state plus either its data or its error.
fn detail_jsonl(report: &DetailReport) -> serde_json::Result<String> {
    let view = &report.view;
    let mut out = String::new();
    for (slot, state) in &view.slots {
        let data = match slot {
            SlotKind::Identity => serde_json::to_value(&view.identity)?,
            SlotKind::Resource => serde_json::to_value(&view.resource)?,
            SlotKind::Ownership => serde_json::to_value(&view.ownership)?,
            SlotKind::Sockets => serde_json::to_value(&view.sockets)?,
        };
        let error = view.errors.iter().find(|e| e.slot == *slot);
        let line = json!({
            "run_id": report.run_id,
            "pid": view.pid,
            "slot": slot,
            "state": state,
            "data": data,
            "error": error,
        });
        out.push_str(&serde_json::to_string(&line)?);
        out.push('\n');
    }
    Ok(out)
}

fn detail_summary(report: &DetailReport) -> String {
    let view = &report.view;
    let pid = view.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
    let mut line = format!("pid {} ({}): {}", pid, view.name, view.screen);
    if report.interrupted {
        line.push_str(", interrupted");
    }
    if !view.errors.is_empty() {
        let failed: Vec<&str> = view.errors.iter().map(|e| e.slot.as_str()).collect();
        let _ = write!(line, ", failed: {}", failed.join(","));
    }
    line.push('\n');
    line
}

fn state_marker(state: HydrationState) -> &'static str {
    match state {
        HydrationState::NotAsked => "not asked",
        HydrationState::Hydrating => "loading",
        HydrationState::Success => "ok",
        HydrationState::Error => "error",
    }
}

fn detail_markdown(report: &DetailReport) -> String {
    let view = &report.view;
    let mut out = String::new();
    let pid = view.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "# {} ({})", view.name, pid);
    let _ = writeln!(out);
    let _ = writeln!(out, "State: {}", view.screen);
    if report.interrupted {
        let _ = writeln!(out, "Hydration interrupted by deadline.");
    }
    let _ = writeln!(out);

    let marker = |slot: SlotKind| {
        view.slots
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, state)| state_marker(*state))
            .unwrap_or("not asked")
    };

    let _ = writeln!(out, "## Identity ({})", marker(SlotKind::Identity));
    if let Some(identity) = &view.identity {
        let _ = writeln!(out, "- parent: {} ({})", identity.parent_name, identity.ppid);
        let _ = writeln!(out, "- exe: {}", identity.exe);
        let _ = writeln!(out, "- cmdline: {}", identity.cmdline);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Resource ({})", marker(SlotKind::Resource));
    if let Some(resource) = &view.resource {
        let _ = writeln!(out, "- state: {}", resource.state_label);
        let _ = writeln!(out, "- resident: {}", human_bytes(resource.resident_bytes));
        let _ = writeln!(out, "- virtual: {}", human_bytes(resource.counters.vsize_bytes));
        let _ = writeln!(out, "- elapsed: {}", duration_hhmmss(resource.elapsed));
        let _ = writeln!(
            out,
            "- cpu: user {} / system {}",
            duration_hhmmss(resource.user_cpu),
            duration_hhmmss(resource.system_cpu)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Ownership ({})", marker(SlotKind::Ownership));
    if let Some(owner) = &view.ownership {
        let _ = writeln!(
            out,
            "- user: {} (uid {}, euid {})",
            owner.username, owner.real_uid, owner.effective_uid
        );
        let _ = writeln!(out, "- {}", owner.privilege_label());
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Sockets ({})", marker(SlotKind::Sockets));
    if let Some(sockets) = &view.sockets {
        socket_table(&mut out, sockets);
    }

    if view.errors_visible {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Errors");
        for error in &view.errors {
            let _ = writeln!(out, "- {}: {}", error.slot, error);
        }
    }
    out
}

fn socket_table(out: &mut String, sockets: &[SocketRecord]) {
    if sockets.is_empty() {
        let _ = writeln!(out, "(none)");
        return;
    }
    let _ = writeln!(out, "| PROTO | LOCAL | STATE | INODE |");
    let _ = writeln!(out, "|-------|-------|-------|------:|");
    for s in sockets {
        let local = if s.protocol.is_ipv6() {
            format!("[{}]:{}", s.local_addr, s.local_port)
        } else {
            format!("{}:{}", s.local_addr, s.local_port)
        };
        let _ = writeln!(out, "| {} | {} | {} | {} |", s.protocol, local, s.state, s.inode);
    }
}
