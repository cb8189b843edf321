//! The human logbook: an append-only markdown companion to the structured
//! change records. Operators may edit it freely; the store only appends.

use optwatch_core::timefmt;
use optwatch_core::ChangeRecord;

use crate::error::StoreError;
use crate::fsio::{append_block, write_text_atomic};
use crate::layout::StateDir;

pub const LOGBOOK_TEMPLATE: &str = "# Optimization Log

This file is a living validation playbook.

## Rules
- One optimization per commit (easy revert).
- Prefer flags/knobs. Make risky changes opt-in.
- Always capture **before/after** snapshots.
- Monitor for a few days before marking verified.

## Optimization log
";

/// Create the logbook from the template if it does not exist yet.
pub fn ensure_logbook(dirs: &StateDir) -> Result<(), StoreError> {
    let path = dirs.logbook_file();
    if path.exists() {
        return Ok(());
    }
    write_text_atomic(&path, LOGBOOK_TEMPLATE)
}

/// Append the section describing a freshly created change record.
pub fn append_change_block(dirs: &StateDir, record: &ChangeRecord) -> Result<(), StoreError> {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("\n### {} — {}\n", record.change_id, record.title));
    lines.push(format!(
        "- Status: **{}**",
        format!("{:?}", record.status).to_uppercase()
    ));
    lines.push(format!("- Started: `{}`", record.started_at));
    lines.push(format!("- Commit: `{}`", record.commit_id));
    lines.push(format!("- Baseline snapshot: `{}`", record.snapshot_before));
    lines.push(format!("- After snapshot: `{}`\n", record.snapshot_after));

    let mut field = |heading: &str, value: &str| {
        lines.push(format!("**{}:**", heading));
        lines.push(if value.is_empty() {
            "- ".to_string()
        } else {
            value.to_string()
        });
        lines.push(String::new());
    };
    field("Hypothesis", &record.hypothesis);
    field("Risk", &record.risk);
    field("Rollback plan", &record.rollback_plan);
    field("Validation (today)", &record.validation_plan_today);
    field("Validation (next days)", &record.validation_plan_future);

    lines.push("**Verification log:**".to_string());
    for day in 0..4 {
        lines.push(format!("- Day {}: ", day));
    }
    lines.push(String::new());
    lines.push("- Mark verified: [ ]".to_string());

    append_block(&dirs.logbook_file(), &lines.join("\n"))
}

/// Append one monitor tick's evidence pointer.
pub fn append_verification_update(
    dirs: &StateDir,
    change_id: &str,
    day_index: u32,
    report_path: &str,
    summary: &str,
) -> Result<(), StoreError> {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(
        "\n#### Verification update: {} Day {}",
        change_id, day_index
    ));
    lines.push(format!("- Date (UTC): `{}`", timefmt::utc_date_now()));
    lines.push(format!("- Report: `{}`", report_path));
    if !summary.trim().is_empty() {
        lines.push(format!("- Summary: {}", summary.trim()));
    }
    append_block(&dirs.logbook_file(), &lines.join("\n"))
}

/// Append the block marking a change as verified.
pub fn append_verified_block(
    dirs: &StateDir,
    change_id: &str,
    summary: &str,
) -> Result<(), StoreError> {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("\n#### VERIFIED: {}", change_id));
    lines.push(format!("- Date (UTC): `{}`", timefmt::utc_date_now()));
    if !summary.trim().is_empty() {
        lines.push(format!("- Summary: {}", summary.trim()));
    }
    append_block(&dirs.logbook_file(), &lines.join("\n"))
}
