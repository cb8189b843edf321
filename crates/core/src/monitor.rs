//! Monitor state: the single per-project document driving daily ticks.

use serde::{Deserialize, Serialize};

pub const MONITOR_SCHEMA: &str = "optwatch.monitor.v1";

/// At most one monitor is active per project; "no monitor" is represented
/// by the absence of the state file, not by a sentinel value.
///
/// `runs_completed` only increases and `last_run_utc_date` only advances;
/// the day index handed to each tick is `runs_completed` at tick time, so
/// day numbering stays dense even when calendar days are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorState {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub change_id: String,
    #[serde(default)]
    pub baseline_snapshot_path: String,
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub started_at: String,
    /// Empty until the first tick.
    #[serde(default)]
    pub last_run_utc_date: String,
    #[serde(default)]
    pub runs_completed: u32,
}
