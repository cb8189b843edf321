//! The verification gate.
//!
//! A pure evaluation of change-record evidence against policy thresholds.
//! Business-rule failures are always data (`ok=false` plus itemized
//! failure strings), never errors; only malformed persisted inputs are
//! surfaced as errors, and that happens upstream of this module.

use serde::Serialize;

use crate::change::ChangeRecord;
use crate::policy::ReviewPolicy;

/// Outcome of one gate evaluation. `ok` iff `failures` is empty.
#[derive(Debug, Clone, Serialize)]
pub struct GateReport {
    pub ok: bool,
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
}

impl GateReport {
    /// A report with a single failure.
    pub fn failure(message: impl Into<String>) -> Self {
        GateReport {
            ok: false,
            failures: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    /// True when every failure is an insufficient-monitor-ticks failure,
    /// i.e. the change is merely pending more evidence. Used by unattended
    /// callers that opt in to treating "pending" as success.
    pub fn pending_only(&self) -> bool {
        !self.ok
            && self
                .failures
                .iter()
                .all(|f| f.starts_with("insufficient monitor ticks"))
    }
}

/// Facts from the review attestation relevant to the gate.
#[derive(Debug, Clone)]
pub struct AttestationFacts {
    pub tool: String,
    pub reasoning_mode: String,
}

/// Ambient facts the gate needs besides the change record itself.
#[derive(Debug, Clone, Default)]
pub struct GateContext {
    pub tree_dirty: bool,
    pub attestation: Option<AttestationFacts>,
}

/// Evaluate a change record against policy. `change == None` means the
/// record could not be found and short-circuits to a single failure.
pub fn evaluate(
    change: Option<&ChangeRecord>,
    ctx: &GateContext,
    review: &ReviewPolicy,
    min_monitor_days: u32,
    require_clean_git: bool,
) -> GateReport {
    let Some(change) = change else {
        return GateReport::failure("change record not found");
    };

    let mut failures: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if ctx.tree_dirty {
        if require_clean_git {
            failures.push("git working tree is dirty (require_clean_git=true)".to_string());
        } else {
            warnings.push("git working tree is dirty".to_string());
        }
    }

    match &ctx.attestation {
        None => {
            if review.require_attestation {
                failures.push(
                    "review attestation missing (review.require_attestation=true)".to_string(),
                );
            } else {
                warnings.push("review attestation missing (recommended)".to_string());
            }
        }
        Some(att) if review.enforce_recommended_modes => {
            let tool = att.tool.trim().to_lowercase();
            let mode = att.reasoning_mode.trim().to_lowercase();
            if let Some(allowed) = review.allowed_modes.get(&tool) {
                let permitted = allowed.iter().any(|m| m.trim().to_lowercase() == mode);
                if !allowed.is_empty() && !permitted {
                    warnings.push(format!(
                        "review mode '{}' is not an allowed mode for tool '{}'",
                        att.reasoning_mode, att.tool
                    ));
                }
            }
        }
        Some(_) => {}
    }

    let have = change.verification_updates.len();
    if min_monitor_days > 0 && have < min_monitor_days as usize {
        failures.push(format!(
            "insufficient monitor ticks: have {} need {}",
            have, min_monitor_days
        ));
    }

    if change.snapshot_before.is_empty() {
        warnings.push("snapshot_before not recorded in change record".to_string());
    }
    if change.snapshot_after.is_empty() {
        warnings.push("snapshot_after not recorded in change record".to_string());
    }
    if change.commit_id.is_empty() {
        warnings.push("commit sha not recorded in change record".to_string());
    }

    GateReport {
        ok: failures.is_empty(),
        failures,
        warnings,
    }
}
