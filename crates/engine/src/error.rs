use optwatch_store::StoreError;
use thiserror::Error;

/// Precondition and persistence failures of the engine operations.
/// Business-rule outcomes (a gate that says "no") are data, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("missing change_id")]
    MissingChangeId,

    #[error("no active monitor; start one with `optwatch monitor start`")]
    NoActiveMonitor,

    #[error("no baseline snapshot available; capture one with `optwatch snapshot` first")]
    NoBaselineSnapshot,

    #[error(transparent)]
    Store(#[from] StoreError),
}
