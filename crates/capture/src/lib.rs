//! Measurement surfaces: the command runner, the fact collectors (sizes,
//! version control, HTTP probes), command timing, and the snapshot
//! capturer that assembles them into one immutable record.
//!
//! Everything here treats measurement failure as data — a timed-out
//! command, a missing path, or a refused connection lands in the captured
//! record, never in an `Err`. Execution is strictly sequential; timing
//! runs must not contend with each other.

pub mod http;
pub mod runner;
pub mod sizes;
pub mod snapshot;
pub mod timing;
pub mod vcs;

pub use http::probe;
pub use runner::{run_command, RunOutcome, TIMEOUT_EXIT_CODE};
pub use sizes::path_size_bytes;
pub use snapshot::capture;
pub use timing::time_command;
pub use vcs::{collect_vcs, find_repo_root};
