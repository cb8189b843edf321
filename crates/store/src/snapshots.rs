//! Snapshot persistence: timestamped immutable files.

use std::path::{Path, PathBuf};

use optwatch_core::text::sanitize_label;
use optwatch_core::timefmt;
use optwatch_core::Snapshot;

use crate::error::StoreError;
use crate::fsio::{read_document, write_json_atomic};
use crate::layout::StateDir;

/// Persist a snapshot as `<YYYYMMDDTHHMMSS>_<label>.json`. The compact UTC
/// stamp makes filenames lexically sortable; the label is sanitized for
/// filesystem safety. Returns the written path.
pub fn save_snapshot(dirs: &StateDir, snapshot: &Snapshot) -> Result<PathBuf, StoreError> {
    let name = format!(
        "{}_{}.json",
        timefmt::compact_now(),
        sanitize_label(&snapshot.label)
    );
    let path = dirs.snapshots_dir().join(name);
    write_json_atomic(&path, snapshot)?;
    Ok(path)
}

/// Strict load; malformed snapshot files are integrity errors.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
    read_document(path)
}

/// All snapshot files, sorted by filename (and therefore by capture time).
pub fn list_snapshots(dirs: &StateDir) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(dirs.snapshots_dir()) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect(),
        Err(_) => Vec::new(),
    };
    paths.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    paths
}

/// The most recently captured snapshot, i.e. the lexically greatest
/// filename. `None` when no snapshots exist yet.
pub fn latest_snapshot(dirs: &StateDir) -> Option<PathBuf> {
    list_snapshots(dirs).into_iter().next_back()
}
