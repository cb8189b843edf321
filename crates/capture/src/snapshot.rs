//! Snapshot capture: orchestrates the fact collectors and command timings
//! into one immutable record. Persistence is the store's concern.

use std::collections::BTreeMap;
use std::path::Path;

use optwatch_core::snapshot::SNAPSHOT_SCHEMA;
use optwatch_core::timefmt;
use optwatch_core::{Policy, SizeEntry, Snapshot, SystemInfo};

use crate::http::probe;
use crate::sizes::path_size_bytes;
use crate::timing::time_command;
use crate::vcs::collect_vcs;

/// Capture one snapshot of the project under `policy`. Timing entries with
/// an empty command and probes with an empty URL are skipped; everything
/// else runs sequentially in policy order.
pub fn capture(policy: &Policy, label: &str, project_root: &Path) -> Snapshot {
    let mut sizes = BTreeMap::new();
    for key in &policy.size_paths {
        if key.trim().is_empty() {
            continue;
        }
        let resolved = project_root.join(key);
        sizes.insert(
            key.clone(),
            SizeEntry {
                resolved_path: resolved.display().to_string(),
                bytes: path_size_bytes(&resolved),
            },
        );
    }

    let timings = policy
        .timings
        .iter()
        .filter(|spec| !spec.command.trim().is_empty())
        .map(|spec| time_command(spec, project_root))
        .collect();

    let http_probes = policy
        .http_probes
        .iter()
        .filter(|spec| !spec.url.trim().is_empty())
        .map(probe)
        .collect();

    Snapshot {
        schema: SNAPSHOT_SCHEMA.to_string(),
        label: label.to_string(),
        generated_at: timefmt::iso_now(),
        system: system_info(project_root),
        vcs: collect_vcs(project_root),
        sizes,
        timings,
        http_probes,
    }
}

fn system_info(project_root: &Path) -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cwd: project_root.display().to_string(),
    }
}
