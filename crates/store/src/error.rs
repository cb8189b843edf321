use std::path::PathBuf;

/// All errors the store can return. Absence of optional state (no monitor
/// file, no snapshots yet) is modeled in the operation signatures, not
/// here; these are real failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but its content is not valid JSON, or does not
    /// deserialize into the expected document shape.
    #[error("invalid JSON in {path}: {message}")]
    InvalidJson { path: PathBuf, message: String },

    /// The file parsed, but the root is not a JSON object.
    #[error("expected JSON object in {path}, got {found}")]
    NotAnObject { path: PathBuf, found: &'static str },

    /// The requested change record does not exist. `update` never creates.
    #[error("change record not found: {change_id}")]
    ChangeNotFound { change_id: String },

    /// The document's embedded id disagrees with the id it was loaded by.
    #[error("change record id mismatch in {path}: expected {expected}, found {found}")]
    ChangeIdMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}
