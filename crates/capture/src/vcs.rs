//! Version-control fact collection via read-only git commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use optwatch_core::VcsInfo;

use crate::runner::run_command;

const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// Bound on the parent walk when locating the repository root.
const MAX_PARENT_DEPTH: usize = 25;

/// Walk parent directories (bounded) looking for a `.git` marker.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    for _ in 0..MAX_PARENT_DEPTH {
        if current.join(".git").exists() {
            return Some(current);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
    None
}

/// Collect git facts for the project. Not a repository is not an error:
/// the result is `is_tracked=false` with empty fields. An individual
/// command failure yields an empty string for that field only.
pub fn collect_vcs(project_root: &Path) -> VcsInfo {
    let Some(root) = find_repo_root(project_root) else {
        return VcsInfo::default();
    };

    let inspect = |command: &str| -> String {
        let out = run_command(command, &root, GIT_COMMAND_TIMEOUT);
        if out.exit_code == 0 {
            out.stdout.trim().to_string()
        } else {
            String::new()
        }
    };

    let status = inspect("git status --porcelain=v1");
    let dirty_count = status.lines().filter(|line| !line.trim().is_empty()).count();

    VcsInfo {
        is_tracked: true,
        root: Some(root.display().to_string()),
        branch: inspect("git rev-parse --abbrev-ref HEAD"),
        commit_id: inspect("git rev-parse HEAD"),
        describe: inspect("git describe --always --dirty"),
        dirty: dirty_count > 0,
        dirty_count,
        diff_stat: inspect("git diff --stat"),
    }
}
