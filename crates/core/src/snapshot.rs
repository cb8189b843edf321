//! Snapshot document types.
//!
//! A snapshot is an immutable record of a project's measurable state at a
//! point in time: disk footprint per configured path, wall-clock timings of
//! configured commands, and HTTP probe results. Once written it is never
//! mutated, only superseded by a newer snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SNAPSHOT_SCHEMA: &str = "optwatch.snapshot.v1";

/// One captured measurement of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub generated_at: String,
    /// Host descriptors. Informational only — never used in comparisons.
    #[serde(default)]
    pub system: SystemInfo,
    #[serde(default)]
    pub vcs: VcsInfo,
    #[serde(default)]
    pub sizes: BTreeMap<String, SizeEntry>,
    #[serde(default)]
    pub timings: Vec<TimingRecord>,
    #[serde(default)]
    pub http_probes: Vec<HttpProbeResult>,
}

/// Host/platform descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub cwd: String,
}

/// Version-control facts. `is_tracked == false` means every other field is
/// empty/false; individual command failures also leave fields empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VcsInfo {
    #[serde(default)]
    pub is_tracked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub commit_id: String,
    #[serde(default)]
    pub describe: String,
    #[serde(default)]
    pub dirty: bool,
    #[serde(default)]
    pub dirty_count: usize,
    #[serde(default)]
    pub diff_stat: String,
}

/// Byte footprint of one configured path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SizeEntry {
    #[serde(default)]
    pub resolved_path: String,
    #[serde(default)]
    pub bytes: u64,
}

/// Result of timing one configured command over `runs` sequential runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingRecord {
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub last_exit_code: i32,
    #[serde(default)]
    pub last_error_excerpt: String,
    #[serde(default)]
    pub mean_seconds: f64,
    #[serde(default)]
    pub p95_seconds: f64,
    /// Sorted sample of every run's elapsed seconds.
    #[serde(default)]
    pub all_run_seconds: Vec<f64>,
}

/// Result of one HTTP health probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpProbeResult {
    pub url: String,
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub error: String,
}

/// Nearest-rank 95th percentile over an already sorted sample:
/// `sorted[(0.95 * (n - 1))]` with the index truncated toward zero. For a
/// single-element sample this is the sample itself. Downstream comparisons
/// assume this exact definition; do not substitute another method.
pub fn p95_nearest_rank(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (0.95 * (sorted.len() - 1) as f64) as usize;
    sorted[idx]
}

/// Round to 4 decimal places, matching the precision stored in timing
/// records.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
