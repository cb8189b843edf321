//! State directory layout.
//!
//! One [`StateDir`] value is resolved at startup and threaded as a
//! parameter through the call chain; nothing scans candidate directories
//! at use sites.

use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_DIR: &str = ".optwatch";

/// The human-facing logbook lives at the project root, next to the code it
/// documents.
pub const LOGBOOK_FILE: &str = "OPTIMIZATION_LOG.md";

/// Resolved filesystem layout for one project's optwatch state.
#[derive(Debug, Clone)]
pub struct StateDir {
    project_root: PathBuf,
    root: PathBuf,
}

impl StateDir {
    /// `state_dir_name` is interpreted relative to the project root unless
    /// absolute.
    pub fn new(project_root: impl Into<PathBuf>, state_dir_name: &str) -> Self {
        let project_root = project_root.into();
        let root = project_root.join(state_dir_name);
        StateDir { project_root, root }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.root.join("snapshots")
    }

    pub fn changes_dir(&self) -> PathBuf {
        self.root.join("changes")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn attestations_dir(&self) -> PathBuf {
        self.root.join("attestations")
    }

    pub fn monitor_file(&self) -> PathBuf {
        self.root.join("monitor.json")
    }

    pub fn config_json(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn config_toml(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn logbook_file(&self) -> PathBuf {
        self.project_root.join(LOGBOOK_FILE)
    }

    pub fn change_file(&self, change_id: &str) -> PathBuf {
        self.changes_dir().join(format!("{}.json", change_id))
    }

    pub fn attestation_file(&self, change_id: &str) -> PathBuf {
        self.attestations_dir()
            .join(format!("review_{}.json", change_id))
    }

    /// Interpret a stored path: absolute paths pass through, relative ones
    /// resolve against the project root.
    pub fn resolve(&self, stored: &str) -> PathBuf {
        let path = Path::new(stored);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}
