//! Change record persistence: create, load, list, update.
//!
//! Mutation is always whole-document read-modify-atomic-write; `update`
//! fails when the record does not exist and never silently creates one.

use optwatch_core::{ChangeDraft, ChangeRecord};
use std::path::PathBuf;

use crate::error::StoreError;
use crate::fsio::{read_document, write_json_atomic};
use crate::layout::StateDir;
use crate::logbook;

/// Create a new change record in `planned` state, persist it, and append
/// a block to the human logbook. Returns the record and its path.
pub fn create_change(
    dirs: &StateDir,
    draft: ChangeDraft,
) -> Result<(ChangeRecord, PathBuf), StoreError> {
    let record = ChangeRecord::new(draft);
    let path = dirs.change_file(&record.change_id);
    write_json_atomic(&path, &record)?;
    logbook::append_change_block(dirs, &record)?;
    Ok((record, path))
}

/// Strict load by id. Missing file, malformed JSON, and an embedded id
/// that disagrees with `change_id` are all distinct errors.
pub fn load_change(dirs: &StateDir, change_id: &str) -> Result<ChangeRecord, StoreError> {
    let path = dirs.change_file(change_id);
    if !path.exists() {
        return Err(StoreError::ChangeNotFound {
            change_id: change_id.to_string(),
        });
    }
    let record: ChangeRecord = read_document(&path)?;
    if record.change_id != change_id {
        return Err(StoreError::ChangeIdMismatch {
            path,
            expected: change_id.to_string(),
            found: record.change_id,
        });
    }
    Ok(record)
}

/// All change records, sorted by id. Ids embed the creation stamp, so this
/// is creation order.
pub fn list_changes(dirs: &StateDir) -> Result<Vec<ChangeRecord>, StoreError> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(dirs.changes_dir()) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.extension().and_then(|e| e.to_str()) == Some("json")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("chg-"))
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    paths.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        records.push(read_document(&path)?);
    }
    Ok(records)
}

/// Read-modify-atomic-write. The mutation closure sees the freshly loaded
/// record; the result is persisted and returned.
pub fn update_change(
    dirs: &StateDir,
    change_id: &str,
    mutate: impl FnOnce(&mut ChangeRecord),
) -> Result<ChangeRecord, StoreError> {
    let mut record = load_change(dirs, change_id)?;
    mutate(&mut record);
    write_json_atomic(&dirs.change_file(change_id), &record)?;
    Ok(record)
}
