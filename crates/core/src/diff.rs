//! Snapshot diffing.
//!
//! [`compare`] is a pure function from two snapshots to a [`Delta`]: no
//! I/O, deterministic output (sorted key unions, `BTreeMap` storage), so a
//! fixed input pair always serializes byte-identically. The delta is a
//! report artifact, never authoritative state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::snapshot::{Snapshot, VcsInfo};

pub const COMPARE_SCHEMA: &str = "optwatch.compare.v1";

/// Identifying facts of one side of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub label: String,
    pub generated_at: String,
    pub vcs: VcsInfo,
}

/// Byte delta for one size key. A side missing the key contributes zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeDelta {
    pub before_bytes: u64,
    pub after_bytes: u64,
    pub delta_bytes: i64,
}

/// Timing delta for one command name. A side missing the name contributes
/// `None` for its values and zero to the signed differences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingDelta {
    pub name: String,
    pub before_mean_seconds: Option<f64>,
    pub after_mean_seconds: Option<f64>,
    pub delta_mean_seconds: f64,
    pub before_p95_seconds: Option<f64>,
    pub after_p95_seconds: Option<f64>,
    pub delta_p95_seconds: f64,
    pub before_last_exit_code: Option<i32>,
    pub after_last_exit_code: Option<i32>,
}

/// Probe transition for one URL. A side missing the URL reads as
/// `ok=false` with no status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeDelta {
    pub url: String,
    pub before_ok: bool,
    pub after_ok: bool,
    pub before_status: Option<u16>,
    pub after_status: Option<u16>,
    pub after_error: String,
}

/// Structured before/after comparison of two snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delta {
    pub schema: String,
    pub before: SnapshotHeader,
    pub after: SnapshotHeader,
    pub sizes: BTreeMap<String, SizeDelta>,
    pub timings: Vec<TimingDelta>,
    pub http_probes: Vec<ProbeDelta>,
}

/// Diff two snapshots. Every key present in either side appears in the
/// output; keys are emitted in sorted order.
pub fn compare(before: &Snapshot, after: &Snapshot) -> Delta {
    let mut sizes = BTreeMap::new();
    let size_keys: BTreeSet<&String> = before.sizes.keys().chain(after.sizes.keys()).collect();
    for key in size_keys {
        let b = before.sizes.get(key).map(|e| e.bytes).unwrap_or(0);
        let a = after.sizes.get(key).map(|e| e.bytes).unwrap_or(0);
        sizes.insert(
            key.clone(),
            SizeDelta {
                before_bytes: b,
                after_bytes: a,
                delta_bytes: a as i64 - b as i64,
            },
        );
    }

    let before_timings: BTreeMap<&str, &crate::snapshot::TimingRecord> =
        before.timings.iter().map(|t| (t.name.as_str(), t)).collect();
    let after_timings: BTreeMap<&str, &crate::snapshot::TimingRecord> =
        after.timings.iter().map(|t| (t.name.as_str(), t)).collect();
    let timing_names: BTreeSet<&str> = before_timings
        .keys()
        .chain(after_timings.keys())
        .copied()
        .collect();
    let timings = timing_names
        .into_iter()
        .map(|name| {
            let b = before_timings.get(name);
            let a = after_timings.get(name);
            let b_mean = b.map(|t| t.mean_seconds);
            let a_mean = a.map(|t| t.mean_seconds);
            let b_p95 = b.map(|t| t.p95_seconds);
            let a_p95 = a.map(|t| t.p95_seconds);
            TimingDelta {
                name: name.to_string(),
                before_mean_seconds: b_mean,
                after_mean_seconds: a_mean,
                delta_mean_seconds: a_mean.unwrap_or(0.0) - b_mean.unwrap_or(0.0),
                before_p95_seconds: b_p95,
                after_p95_seconds: a_p95,
                delta_p95_seconds: a_p95.unwrap_or(0.0) - b_p95.unwrap_or(0.0),
                before_last_exit_code: b.map(|t| t.last_exit_code),
                after_last_exit_code: a.map(|t| t.last_exit_code),
            }
        })
        .collect();

    let before_probes: BTreeMap<&str, &crate::snapshot::HttpProbeResult> =
        before.http_probes.iter().map(|p| (p.url.as_str(), p)).collect();
    let after_probes: BTreeMap<&str, &crate::snapshot::HttpProbeResult> =
        after.http_probes.iter().map(|p| (p.url.as_str(), p)).collect();
    let probe_urls: BTreeSet<&str> = before_probes
        .keys()
        .chain(after_probes.keys())
        .copied()
        .collect();
    let http_probes = probe_urls
        .into_iter()
        .map(|url| {
            let b = before_probes.get(url);
            let a = after_probes.get(url);
            ProbeDelta {
                url: url.to_string(),
                before_ok: b.map(|p| p.ok).unwrap_or(false),
                after_ok: a.map(|p| p.ok).unwrap_or(false),
                before_status: b.and_then(|p| p.status_code),
                after_status: a.and_then(|p| p.status_code),
                after_error: a.map(|p| p.error.clone()).unwrap_or_default(),
            }
        })
        .collect();

    Delta {
        schema: COMPARE_SCHEMA.to_string(),
        before: header(before),
        after: header(after),
        sizes,
        timings,
        http_probes,
    }
}

fn header(snap: &Snapshot) -> SnapshotHeader {
    SnapshotHeader {
        label: snap.label.clone(),
        generated_at: snap.generated_at.clone(),
        vcs: snap.vcs.clone(),
    }
}

impl Delta {
    /// Human-facing markdown rendering. Regenerable from the structured
    /// data at any time.
    pub fn to_markdown(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push("# Optimization Compare Report".to_string());
        lines.push(String::new());
        lines.push(format!(
            "Before: `{}` @ {}",
            self.before.label, self.before.generated_at
        ));
        lines.push(format!(
            "After: `{}` @ {}",
            self.after.label, self.after.generated_at
        ));
        lines.push(String::new());

        if self.before.vcs.is_tracked || self.after.vcs.is_tracked {
            lines.push("## Git".to_string());
            lines.push(String::new());
            lines.push(format!(
                "- before: `{}` (dirty={})",
                describe_or_commit(&self.before.vcs),
                self.before.vcs.dirty
            ));
            lines.push(format!(
                "- after: `{}` (dirty={})",
                describe_or_commit(&self.after.vcs),
                self.after.vcs.dirty
            ));
            lines.push(String::new());
        }

        lines.push("## Size deltas".to_string());
        lines.push(String::new());
        if self.sizes.is_empty() {
            lines.push("- (none)".to_string());
        } else {
            for (key, row) in &self.sizes {
                lines.push(format!(
                    "- `{}`: {} -> {} bytes (delta {:+})",
                    key, row.before_bytes, row.after_bytes, row.delta_bytes
                ));
            }
        }
        lines.push(String::new());

        lines.push("## Timing deltas".to_string());
        lines.push(String::new());
        if self.timings.is_empty() {
            lines.push("- (none)".to_string());
        } else {
            for row in &self.timings {
                lines.push(format!(
                    "- **{}**: mean {}s -> {}s (delta {:+.4}s), p95 {}s -> {}s (delta {:+.4}s) rc {} -> {}",
                    row.name,
                    opt_f64(row.before_mean_seconds),
                    opt_f64(row.after_mean_seconds),
                    row.delta_mean_seconds,
                    opt_f64(row.before_p95_seconds),
                    opt_f64(row.after_p95_seconds),
                    row.delta_p95_seconds,
                    opt_i32(row.before_last_exit_code),
                    opt_i32(row.after_last_exit_code),
                ));
            }
        }
        lines.push(String::new());

        lines.push("## HTTP probes".to_string());
        lines.push(String::new());
        if self.http_probes.is_empty() {
            lines.push("- (none)".to_string());
        } else {
            for row in &self.http_probes {
                lines.push(format!(
                    "- `{}`: ok {} -> {} status {} -> {} err={}",
                    row.url,
                    row.before_ok,
                    row.after_ok,
                    opt_u16(row.before_status),
                    opt_u16(row.after_status),
                    row.after_error,
                ));
            }
        }

        let mut text = lines.join("\n");
        while text.ends_with('\n') {
            text.pop();
        }
        text.push('\n');
        text
    }
}

fn describe_or_commit(vcs: &VcsInfo) -> String {
    if vcs.describe.is_empty() {
        vcs.commit_id.clone()
    } else {
        vcs.describe.clone()
    }
}

fn opt_f64(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "null".to_string())
}

fn opt_i32(v: Option<i32>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "null".to_string())
}

fn opt_u16(v: Option<u16>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "null".to_string())
}
