//! Monitor lifecycle: start once, tick daily.
//!
//! Ticks are idempotent per UTC date. The state file is only advanced
//! after every evidence artifact of the tick has been persisted, so a
//! failed tick can be retried the same day without losing a day index.

use serde::Serialize;

use optwatch_capture::capture;
use optwatch_core::change::VerificationUpdate;
use optwatch_core::diff::{compare, Delta};
use optwatch_core::monitor::{MonitorState, MONITOR_SCHEMA};
use optwatch_core::{timefmt, Policy};
use optwatch_store::{changes, logbook, monitor, reports, snapshots, StateDir, StoreError};

use crate::error::EngineError;

/// Result of one tick attempt. Serialized as-is for `--output json`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Already ticked today (and `force` was not given).
    Skipped {
        reason: String,
        today_utc: String,
        runs_completed: u32,
        total_days: u32,
    },
    Completed {
        today_utc: String,
        day_index: u32,
        snapshot_path: String,
        report_path: String,
        runs_completed: u32,
        total_days: u32,
    },
}

/// Begin monitoring a change for `days` daily ticks. The baseline is the
/// explicit `baseline` path when given, otherwise the latest captured
/// snapshot. Fails without touching the state file when the change does
/// not exist or no baseline is available. Any previous monitor is
/// replaced.
pub fn start_monitor(
    dirs: &StateDir,
    change_id: &str,
    baseline: Option<&str>,
    days: u32,
) -> Result<MonitorState, EngineError> {
    if change_id.trim().is_empty() {
        return Err(EngineError::MissingChangeId);
    }
    let change = changes::load_change(dirs, change_id)?;

    let baseline = match baseline {
        Some(explicit) => explicit.to_string(),
        None => snapshots::latest_snapshot(dirs)
            .ok_or(EngineError::NoBaselineSnapshot)?
            .display()
            .to_string(),
    };

    let state = MonitorState {
        schema: MONITOR_SCHEMA.to_string(),
        change_id: change.change_id,
        baseline_snapshot_path: baseline,
        total_days: days.max(1),
        started_at: timefmt::iso_now(),
        last_run_utc_date: String::new(),
        runs_completed: 0,
    };
    monitor::save_monitor(dirs, &state)?;
    Ok(state)
}

/// Run one daily tick: capture, diff against the baseline, persist the
/// report, and append the evidence pointer to the change record and
/// logbook. A second call on the same UTC date is a no-op unless `force`.
pub fn tick_monitor(
    dirs: &StateDir,
    policy: &Policy,
    force: bool,
) -> Result<TickOutcome, EngineError> {
    let mut state = monitor::load_monitor(dirs)?.ok_or(EngineError::NoActiveMonitor)?;

    let today = timefmt::utc_date_now();
    if state.last_run_utc_date == today && !force {
        return Ok(TickOutcome::Skipped {
            reason: format!("already ran on {}", today),
            today_utc: today,
            runs_completed: state.runs_completed,
            total_days: state.total_days,
        });
    }

    let day_index = state.runs_completed;
    let snapshot = capture(policy, &format!("day{}", day_index), dirs.project_root());
    let snapshot_path = snapshots::save_snapshot(dirs, &snapshot)?;

    let baseline = snapshots::load_snapshot(&dirs.resolve(&state.baseline_snapshot_path))?;
    let delta = compare(&baseline, &snapshot);
    let report_path = reports::write_report(
        dirs,
        &today,
        day_index,
        &state.change_id,
        &delta.to_markdown(),
    )?;

    let snapshot_stored = snapshot_path.display().to_string();
    let report_stored = report_path.display().to_string();
    let summary = size_summary(&delta);

    logbook::append_verification_update(
        dirs,
        &state.change_id,
        day_index,
        &report_stored,
        &summary,
    )?;
    match changes::update_change(dirs, &state.change_id, |ch| {
        ch.push_verification_update(VerificationUpdate {
            timestamp: timefmt::iso_now(),
            utc_date: today.clone(),
            day_index,
            snapshot_path: snapshot_stored.clone(),
            report_path: report_stored.clone(),
        });
    }) {
        Ok(_) => {}
        // The monitor outlives a hand-deleted record; evidence still lands
        // in the report and logbook.
        Err(StoreError::ChangeNotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    state.last_run_utc_date = today.clone();
    state.runs_completed += 1;
    monitor::save_monitor(dirs, &state)?;

    Ok(TickOutcome::Completed {
        today_utc: today,
        day_index,
        snapshot_path: snapshot_stored,
        report_path: report_stored,
        runs_completed: state.runs_completed,
        total_days: state.total_days,
    })
}

/// One-line size headline for logbook entries, preferring the whole-project
/// key when the policy tracks it.
fn size_summary(delta: &Delta) -> String {
    let entry = delta
        .sizes
        .get(".")
        .or_else(|| delta.sizes.values().next());
    match entry {
        Some(size) => format!("sizes delta={:+} bytes", size.delta_bytes),
        None => String::new(),
    }
}
