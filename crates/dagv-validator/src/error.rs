use std::time::Duration;

use dagv_types::{DecodeDefect, StoreError};

use crate::walker::WalkReport;

/// Errors that fail a [`Validator::validate`](crate::Validator::validate)
/// call outright. Only caller-contract violations and early cancellation
/// land here; every other problem is a finding recorded in the
/// [`ValidationResult`](crate::ValidationResult).
///
/// ```text
/// ┌───────────────────┬─────────────────────────────────────────────┐
/// │ Variant           │ Cause                                       │
/// ├───────────────────┼─────────────────────────────────────────────┤
/// │ EmptyRoot         │ root identifier string is ""                │
/// │ MissingCandidates │ candidate list absent (not merely empty)    │
/// │ InvalidRoot       │ root string does not decode                 │
/// │ Cancelled         │ cancelled before candidate checks finished  │
/// └───────────────────┴─────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("root identifier is empty")]
    EmptyRoot,

    #[error("candidate identifier list is absent")]
    MissingCandidates,

    #[error("root identifier does not decode: {0}")]
    InvalidRoot(#[from] DecodeDefect),

    #[error("validation cancelled before candidate checks completed")]
    Cancelled,
}

/// A single store round trip that did not produce an answer.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("store lookup cancelled")]
    Cancelled,

    #[error("store {op} for {cid} timed out after {after:?}")]
    Timeout {
        op: &'static str,
        cid: String,
        after: Duration,
    },

    #[error("store {op} for {cid} failed: {source}")]
    Store {
        op: &'static str,
        cid: String,
        source: StoreError,
    },
}

/// Reasons a DAG walk could not complete.
#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("walk cancelled")]
    Cancelled,

    #[error("root block {root} is not in the store")]
    RootUnavailable { root: String },

    #[error("root block could not be read: {0}")]
    Root(ProbeError),

    #[error("walk task failed: {0}")]
    Worker(String),
}

/// A failed walk together with whatever it had discovered so far.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct WalkFailure {
    #[source]
    pub error: WalkError,
    pub partial: WalkReport,
}
