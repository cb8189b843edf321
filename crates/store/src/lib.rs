//! Durable state for optwatch.
//!
//! Every persisted document is JSON written via atomic temp-file-then-
//! rename replacement, so a reader never observes a half-written file.
//! Reads are strict: a document that is unreadable, not valid JSON, or not
//! a JSON object is an error — the store never substitutes silent defaults
//! for structurally invalid persisted state.
//!
//! Cross-process safety is not provided; at most one optwatch instance
//! should mutate a given state directory at a time.

pub mod attest;
pub mod changes;
pub mod error;
pub mod fsio;
pub mod layout;
pub mod logbook;
pub mod monitor;
pub mod reports;
pub mod snapshots;

pub use attest::ReviewAttestation;
pub use error::StoreError;
pub use layout::StateDir;
