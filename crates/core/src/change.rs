//! Change records: one durable document per tracked optimization attempt.

use serde::{Deserialize, Serialize};

use crate::text::slug;
use crate::timefmt;

pub const CHANGE_SCHEMA: &str = "optwatch.change.v1";

/// Bound on the retained verification-update history; older entries are
/// trimmed from the front.
pub const MAX_VERIFICATION_UPDATES: usize = 30;

const SLUG_LEN: usize = 36;

/// A change moves `planned -> verified` and never back; "un-verifying" is
/// out of scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    #[default]
    Planned,
    Verified,
}

/// One monitor tick's evidence pointer, appended by the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationUpdate {
    pub timestamp: String,
    pub utc_date: String,
    pub day_index: u32,
    pub snapshot_path: String,
    pub report_path: String,
}

/// Operator-supplied fields for a new change record.
#[derive(Debug, Clone, Default)]
pub struct ChangeDraft {
    pub title: String,
    pub hypothesis: String,
    pub risk: String,
    pub rollback_plan: String,
    pub validation_plan_today: String,
    pub validation_plan_future: String,
}

/// Durable document tracking one optimization attempt's evidence and
/// status. Mutated only through the store's read-modify-atomic-write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub change_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: ChangeStatus,
    #[serde(default)]
    pub started_at: String,
    #[serde(default)]
    pub commit_id: String,
    #[serde(default)]
    pub snapshot_before: String,
    #[serde(default)]
    pub snapshot_after: String,
    #[serde(default)]
    pub hypothesis: String,
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub rollback_plan: String,
    #[serde(default)]
    pub validation_plan_today: String,
    #[serde(default)]
    pub validation_plan_future: String,
    /// Path of the review attestation document, once recorded.
    #[serde(default)]
    pub review_attestation: String,
    #[serde(default)]
    pub verification_updates: Vec<VerificationUpdate>,
    #[serde(default)]
    pub verified_at: String,
    #[serde(default)]
    pub verified_summary: String,
}

impl ChangeRecord {
    /// Build a fresh record in `planned` state. The id is derived from the
    /// creation time and a slug of the title, so ids sort in creation
    /// order.
    pub fn new(draft: ChangeDraft) -> Self {
        ChangeRecord {
            schema: CHANGE_SCHEMA.to_string(),
            change_id: new_change_id(&draft.title),
            title: draft.title.trim().to_string(),
            status: ChangeStatus::Planned,
            started_at: timefmt::iso_now(),
            commit_id: String::new(),
            snapshot_before: String::new(),
            snapshot_after: String::new(),
            hypothesis: draft.hypothesis.trim().to_string(),
            risk: draft.risk.trim().to_string(),
            rollback_plan: draft.rollback_plan.trim().to_string(),
            validation_plan_today: draft.validation_plan_today.trim().to_string(),
            validation_plan_future: draft.validation_plan_future.trim().to_string(),
            review_attestation: String::new(),
            verification_updates: Vec::new(),
            verified_at: String::new(),
            verified_summary: String::new(),
        }
    }

    /// Append a verification update, trimming the history to the most
    /// recent [`MAX_VERIFICATION_UPDATES`] entries.
    pub fn push_verification_update(&mut self, update: VerificationUpdate) {
        self.verification_updates.push(update);
        if self.verification_updates.len() > MAX_VERIFICATION_UPDATES {
            let excess = self.verification_updates.len() - MAX_VERIFICATION_UPDATES;
            self.verification_updates.drain(..excess);
        }
    }
}

/// `chg-<YYYYMMDD-HHMMSS>-<slug>` — stable for the record's lifetime.
pub fn new_change_id(title: &str) -> String {
    format!("chg-{}-{}", timefmt::change_stamp_now(), slug(title, SLUG_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_planned_with_slugged_id() {
        let record = ChangeRecord::new(ChangeDraft {
            title: "Cache the Build".to_string(),
            ..ChangeDraft::default()
        });
        assert_eq!(record.status, ChangeStatus::Planned);
        assert!(record.change_id.starts_with("chg-"));
        assert!(record.change_id.ends_with("cache-the-build"));
        assert!(record.verification_updates.is_empty());
    }

    #[test]
    fn update_history_is_bounded() {
        let mut record = ChangeRecord::new(ChangeDraft {
            title: "t".to_string(),
            ..ChangeDraft::default()
        });
        for day in 0..40u32 {
            record.push_verification_update(VerificationUpdate {
                timestamp: String::new(),
                utc_date: String::new(),
                day_index: day,
                snapshot_path: String::new(),
                report_path: String::new(),
            });
        }
        assert_eq!(record.verification_updates.len(), MAX_VERIFICATION_UPDATES);
        // Oldest entries are the ones trimmed.
        assert_eq!(record.verification_updates[0].day_index, 10);
        assert_eq!(record.verification_updates.last().unwrap().day_index, 39);
    }

    #[test]
    fn status_round_trips_lowercase() {
        assert_eq!(serde_json::to_string(&ChangeStatus::Verified).unwrap(), "\"verified\"");
        let s: ChangeStatus = serde_json::from_str("\"planned\"").unwrap();
        assert_eq!(s, ChangeStatus::Planned);
    }
}
