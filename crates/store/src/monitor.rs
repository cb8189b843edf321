//! Monitor state persistence. File absence means "no monitor"; a present
//! but malformed file is an integrity error, never an implicit reset.

use std::path::PathBuf;

use optwatch_core::MonitorState;

use crate::error::StoreError;
use crate::fsio::{read_document, write_json_atomic};
use crate::layout::StateDir;

pub fn load_monitor(dirs: &StateDir) -> Result<Option<MonitorState>, StoreError> {
    let path = dirs.monitor_file();
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(read_document(&path)?))
}

pub fn save_monitor(dirs: &StateDir, state: &MonitorState) -> Result<PathBuf, StoreError> {
    let path = dirs.monitor_file();
    write_json_atomic(&path, state)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DEFAULT_STATE_DIR;
    use optwatch_core::monitor::MONITOR_SCHEMA;
    use tempfile::TempDir;

    #[test]
    fn absence_is_none() {
        let tmp = TempDir::new().unwrap();
        let dirs = StateDir::new(tmp.path(), DEFAULT_STATE_DIR);
        assert!(load_monitor(&dirs).unwrap().is_none());
    }

    #[test]
    fn round_trip() {
        let tmp = TempDir::new().unwrap();
        let dirs = StateDir::new(tmp.path(), DEFAULT_STATE_DIR);
        let state = MonitorState {
            schema: MONITOR_SCHEMA.to_string(),
            change_id: "chg-x".to_string(),
            baseline_snapshot_path: "snap.json".to_string(),
            total_days: 3,
            started_at: "2026-08-25T00:00:00Z".to_string(),
            last_run_utc_date: String::new(),
            runs_completed: 0,
        };
        save_monitor(&dirs, &state).unwrap();
        let loaded = load_monitor(&dirs).unwrap().unwrap();
        assert_eq!(loaded.change_id, "chg-x");
        assert_eq!(loaded.runs_completed, 0);
    }

    #[test]
    fn malformed_state_is_an_error_not_none() {
        let tmp = TempDir::new().unwrap();
        let dirs = StateDir::new(tmp.path(), DEFAULT_STATE_DIR);
        std::fs::create_dir_all(dirs.root()).unwrap();
        std::fs::write(dirs.monitor_file(), "[1, 2]").unwrap();
        assert!(load_monitor(&dirs).is_err());
    }
}
