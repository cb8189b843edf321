//! Core data model for optwatch.
//!
//! Everything in this crate is a plain value: snapshot documents, the
//! snapshot diff, change records, monitor state, the resolved policy, and
//! the verification gate. No I/O happens here — capture and persistence
//! live in `optwatch-capture` and `optwatch-store`.

pub mod change;
pub mod diff;
pub mod gate;
pub mod monitor;
pub mod policy;
pub mod snapshot;
pub mod text;
pub mod timefmt;

pub use change::{ChangeDraft, ChangeRecord, ChangeStatus, VerificationUpdate};
pub use diff::{compare, Delta, ProbeDelta, SizeDelta, TimingDelta};
pub use gate::{AttestationFacts, GateContext, GateReport};
pub use monitor::MonitorState;
pub use policy::{HttpProbeSpec, Policy, PolicyOverlay, TimingSpec};
pub use snapshot::{HttpProbeResult, SizeEntry, Snapshot, SystemInfo, TimingRecord, VcsInfo};
