//! Resolved measurement/verification policy and its overlay.
//!
//! The policy is an explicit typed structure; configuration files
//! deserialize into [`PolicyOverlay`] (every field optional) and are merged
//! over [`Policy::default()`] with overlay-wins-per-field semantics,
//! recursing only into the nested `verification` and `review` structures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_runs() -> u32 {
    1
}

fn default_command_timeout() -> u64 {
    900
}

fn default_probe_timeout() -> u64 {
    5
}

/// One named command to time during snapshot capture. Entries with an
/// empty command are inert placeholders and skipped at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSpec {
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default = "default_runs")]
    pub runs: u32,
    #[serde(default = "default_command_timeout")]
    pub timeout_seconds: u64,
}

/// One HTTP health probe. Success is "body contains `expect_contains`"
/// when set, otherwise a status in [200, 400).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpProbeSpec {
    pub url: String,
    #[serde(default)]
    pub expect_contains: String,
    #[serde(default = "default_probe_timeout")]
    pub timeout_seconds: u64,
}

/// Thresholds consumed by the verification gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationPolicy {
    pub min_monitor_days: u32,
    pub require_clean_git: bool,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        VerificationPolicy {
            min_monitor_days: 3,
            require_clean_git: false,
        }
    }
}

/// Review-evidence requirements consumed by the verification gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPolicy {
    pub require_attestation: bool,
    pub enforce_recommended_modes: bool,
    /// Lowercase tool name -> allowed reasoning modes. An empty or missing
    /// list for a tool disables the mode check for that tool.
    pub allowed_modes: BTreeMap<String, Vec<String>>,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        let mut allowed_modes = BTreeMap::new();
        allowed_modes.insert(
            "codex".to_string(),
            vec!["xhigh".to_string(), "high".to_string()],
        );
        allowed_modes.insert("claude".to_string(), vec!["plan".to_string()]);
        ReviewPolicy {
            require_attestation: true,
            enforce_recommended_modes: true,
            allowed_modes,
        }
    }
}

/// The fully resolved policy threaded through capture and verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub size_paths: Vec<String>,
    pub timings: Vec<TimingSpec>,
    pub http_probes: Vec<HttpProbeSpec>,
    pub verification: VerificationPolicy,
    pub review: ReviewPolicy,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            size_paths: vec![".".to_string()],
            timings: vec![TimingSpec {
                name: "tests".to_string(),
                command: String::new(),
                runs: 1,
                timeout_seconds: 900,
            }],
            http_probes: Vec::new(),
            verification: VerificationPolicy::default(),
            review: ReviewPolicy::default(),
        }
    }
}

impl Policy {
    /// Defaults with `overlay` applied on top.
    pub fn merged(overlay: PolicyOverlay) -> Policy {
        let mut policy = Policy::default();
        policy.apply(overlay);
        policy
    }

    /// Overlay wins per field; `verification` and `review` merge
    /// field-by-field rather than wholesale.
    pub fn apply(&mut self, overlay: PolicyOverlay) {
        if let Some(size_paths) = overlay.size_paths {
            self.size_paths = size_paths;
        }
        if let Some(timings) = overlay.timings {
            self.timings = timings;
        }
        if let Some(http_probes) = overlay.http_probes {
            self.http_probes = http_probes;
        }
        if let Some(v) = overlay.verification {
            if let Some(min) = v.min_monitor_days {
                self.verification.min_monitor_days = min;
            }
            if let Some(clean) = v.require_clean_git {
                self.verification.require_clean_git = clean;
            }
        }
        if let Some(r) = overlay.review {
            if let Some(require) = r.require_attestation {
                self.review.require_attestation = require;
            }
            if let Some(enforce) = r.enforce_recommended_modes {
                self.review.enforce_recommended_modes = enforce;
            }
            if let Some(modes) = r.allowed_modes {
                self.review.allowed_modes = modes;
            }
        }
    }
}

/// Mirror of [`Policy`] with every field optional, as read from
/// configuration files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyOverlay {
    /// Accepted and ignored; kept so config files may carry a version tag.
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub size_paths: Option<Vec<String>>,
    #[serde(default)]
    pub timings: Option<Vec<TimingSpec>>,
    #[serde(default)]
    pub http_probes: Option<Vec<HttpProbeSpec>>,
    #[serde(default)]
    pub verification: Option<VerificationOverlay>,
    #[serde(default)]
    pub review: Option<ReviewOverlay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationOverlay {
    #[serde(default)]
    pub min_monitor_days: Option<u32>,
    #[serde(default)]
    pub require_clean_git: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewOverlay {
    #[serde(default)]
    pub require_attestation: Option<bool>,
    #[serde(default)]
    pub enforce_recommended_modes: Option<bool>,
    #[serde(default)]
    pub allowed_modes: Option<BTreeMap<String, Vec<String>>>,
}
