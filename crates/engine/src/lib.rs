//! Workflow engine: ties capture, store, and the pure core rules together
//! into the monitor lifecycle and the verification gate.

pub mod error;
pub mod monitor;
pub mod verify;

pub use error::EngineError;
pub use monitor::{start_monitor, tick_monitor, TickOutcome};
pub use verify::{apply_verified, verify_change, ApplyOutcome};
