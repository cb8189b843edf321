//! Review attestations: who reviewed a change, with which model and
//! reasoning mode.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use optwatch_core::text::truncate_chars;
use optwatch_core::timefmt;

use crate::changes;
use crate::error::StoreError;
use crate::fsio::{read_document, write_json_atomic};
use crate::layout::StateDir;

pub const ATTESTATION_SCHEMA: &str = "optwatch.attestation.v1";

const NOTES_CAP: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAttestation {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub change_id: String,
    #[serde(default)]
    pub reviewer: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub reasoning_mode: String,
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub notes: String,
}

impl ReviewAttestation {
    pub fn new(
        change_id: &str,
        reviewer: &str,
        model: &str,
        reasoning_mode: &str,
        tool: &str,
        notes: &str,
    ) -> Self {
        let or = |value: &str, fallback: &str| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.trim().to_string()
            }
        };
        ReviewAttestation {
            schema: ATTESTATION_SCHEMA.to_string(),
            change_id: change_id.to_string(),
            reviewer: or(reviewer, "unknown"),
            model: or(model, "unknown"),
            reasoning_mode: or(reasoning_mode, "default"),
            tool: or(tool, "other"),
            created_at: timefmt::iso_now(),
            notes: truncate_chars(notes, NOTES_CAP),
        }
    }
}

/// Persist an attestation and record its path on the change record when
/// the record exists (a missing record does not block attesting).
pub fn write_attestation(
    dirs: &StateDir,
    attestation: &ReviewAttestation,
) -> Result<PathBuf, StoreError> {
    let path = dirs.attestation_file(&attestation.change_id);
    write_json_atomic(&path, attestation)?;

    let stored = path.display().to_string();
    match changes::update_change(dirs, &attestation.change_id, |ch| {
        ch.review_attestation = stored;
    }) {
        Ok(_) | Err(StoreError::ChangeNotFound { .. }) => {}
        Err(e) => return Err(e),
    }
    Ok(path)
}

/// `None` when no attestation exists; malformed documents are errors.
pub fn load_attestation(
    dirs: &StateDir,
    change_id: &str,
) -> Result<Option<ReviewAttestation>, StoreError> {
    let path = dirs.attestation_file(change_id);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(read_document(&path)?))
}
