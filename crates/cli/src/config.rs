//! Policy loading for the CLI.
//!
//! Configuration is an overlay over the built-in defaults. The first file
//! found wins: `optwatch.toml` at the project root, then `config.toml`,
//! then `config.json` inside the state directory. A file that exists but
//! does not parse is an error, never a silent fallback to defaults.

use std::path::PathBuf;

use optwatch_core::{Policy, PolicyOverlay};
use optwatch_store::StateDir;

pub fn candidates(dirs: &StateDir) -> Vec<PathBuf> {
    vec![
        dirs.project_root().join("optwatch.toml"),
        dirs.config_toml(),
        dirs.config_json(),
    ]
}

pub fn load_policy(dirs: &StateDir) -> Result<Policy, String> {
    for path in candidates(dirs) {
        if !path.exists() {
            continue;
        }
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| format!("error reading config '{}': {}", path.display(), e))?;
        let overlay: PolicyOverlay =
            if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                toml::from_str(&raw)
                    .map_err(|e| format!("error parsing config '{}': {}", path.display(), e))?
            } else {
                serde_json::from_str(&raw)
                    .map_err(|e| format!("error parsing config '{}': {}", path.display(), e))?
            };
        return Ok(Policy::merged(overlay));
    }
    Ok(Policy::default())
}
