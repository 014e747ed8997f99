use dagv_types::{NodeError, StoreError};

/// Errors raised while importing data into a store.
///
/// ```text
///   BuildError
///   ├── InvalidConfig   ← chunk_size == 0 or max_links < 2
///   └── Store           ← backend rejected a put
/// ```
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid builder configuration: {0}")]
    InvalidConfig(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while reassembling data from a DAG.
///
/// Unlike the validator, the reader needs every byte, so any missing or
/// undecodable block is fatal.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("block {cid} is not in the store")]
    Missing { cid: String },

    #[error("block {cid} is not a valid dag node: {source}")]
    Node { cid: String, source: NodeError },

    #[error(transparent)]
    Store(#[from] StoreError),
}
