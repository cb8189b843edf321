//! Gate evaluation against live state, and the verified transition.

use serde::Serialize;

use optwatch_capture::collect_vcs;
use optwatch_core::gate::{evaluate, AttestationFacts, GateContext, GateReport};
use optwatch_core::text::truncate_chars;
use optwatch_core::{timefmt, ChangeStatus, Policy};
use optwatch_store::{attest, changes, logbook, StateDir, StoreError};

use crate::error::EngineError;

const SUMMARY_CAP: usize = 2000;

/// Gate outcome plus what `--apply` did with it.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutcome {
    pub change_id: String,
    pub ok: bool,
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
    pub applied: bool,
    pub change_path: String,
}

/// Evaluate the verification gate for one change. Gathers the live facts
/// (change record, working-tree state, attestation) and hands them to the
/// pure rule evaluation. A missing record is a gate failure; a malformed
/// one is an error.
pub fn verify_change(
    dirs: &StateDir,
    change_id: &str,
    policy: &Policy,
) -> Result<GateReport, EngineError> {
    if change_id.trim().is_empty() {
        return Ok(GateReport::failure("missing change_id"));
    }

    let change = match changes::load_change(dirs, change_id) {
        Ok(record) => Some(record),
        Err(StoreError::ChangeNotFound { .. }) => None,
        Err(e) => return Err(e.into()),
    };

    let vcs = collect_vcs(dirs.project_root());
    let attestation = attest::load_attestation(dirs, change_id)?.map(|att| AttestationFacts {
        tool: att.tool,
        reasoning_mode: att.reasoning_mode,
    });
    let ctx = GateContext {
        tree_dirty: vcs.dirty,
        attestation,
    };

    Ok(evaluate(
        change.as_ref(),
        &ctx,
        &policy.review,
        policy.verification.min_monitor_days,
        policy.verification.require_clean_git,
    ))
}

/// Evaluate the gate and, only when it passes, mark the change verified
/// and append the verified block to the logbook. A failing gate mutates
/// nothing.
pub fn apply_verified(
    dirs: &StateDir,
    change_id: &str,
    policy: &Policy,
    summary: &str,
) -> Result<ApplyOutcome, EngineError> {
    let report = verify_change(dirs, change_id, policy)?;

    let mut outcome = ApplyOutcome {
        change_id: change_id.to_string(),
        ok: report.ok,
        failures: report.failures,
        warnings: report.warnings,
        applied: false,
        change_path: String::new(),
    };
    if !outcome.ok {
        return Ok(outcome);
    }

    let trimmed = truncate_chars(summary.trim(), SUMMARY_CAP);
    changes::update_change(dirs, change_id, |ch| {
        ch.status = ChangeStatus::Verified;
        ch.verified_at = timefmt::iso_now();
        ch.verified_summary = trimmed.clone();
    })?;
    logbook::append_verified_block(dirs, change_id, &trimmed)?;

    outcome.applied = true;
    outcome.change_path = dirs.change_file(change_id).display().to_string();
    Ok(outcome)
}
