use dagv_wire::WireError;

/// Reasons a content identifier failed to decode.
///
/// ```text
/// ┌──────────────────────────────────────────────────────┐
/// │ CidError                                             │
/// │   ├── Empty / UnsupportedMultibase  ← string layer   │
/// │   ├── InvalidBase16 / UppercaseBase16                │
/// │   ├── UnsupportedVersion / UnknownCodec              │
/// │   ├── UnsupportedHash / DigestLength ← binary layer  │
/// │   ├── TrailingBytes                                  │
/// │   └── wraps WireError for varint failures            │
/// └──────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CidError {
    #[error("identifier is empty")]
    Empty,

    /// The first character is not a supported multibase prefix.
    ///
    /// Only `'f'` (base16, lowercase) is accepted.
    #[error("unsupported multibase prefix {prefix:?}")]
    UnsupportedMultibase { prefix: char },

    #[error("invalid base16 body: {0}")]
    InvalidBase16(String),

    /// Uppercase hex would give the same bytes two spellings.
    #[error("base16 body must be lowercase")]
    UppercaseBase16,

    #[error("unsupported identifier version {version}")]
    UnsupportedVersion { version: u64 },

    #[error("unknown codec {code:#x}")]
    UnknownCodec { code: u64 },

    #[error("unsupported hash function {code:#x}")]
    UnsupportedHash { code: u64 },

    #[error("digest length {found} does not match expected {expected}")]
    DigestLength { expected: usize, found: u64 },

    #[error("{extra} trailing bytes after digest")]
    TrailingBytes { extra: usize },

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// A string that could not be decoded as a content identifier.
///
/// Carries the caller's original input verbatim so it can be reported
/// back in `invalid_blocks` exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content identifier {input:?}: {source}")]
pub struct DecodeDefect {
    pub input: String,
    pub source: CidError,
}

/// Errors raised while decoding a dag-node block body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("node declares {count} links, limit is {limit}")]
    TooManyLinks { count: u64, limit: u64 },

    /// A link's binary identifier failed to decode.
    #[error("link {index} is not a valid identifier: {source}")]
    Link { index: usize, source: CidError },

    #[error("{extra} trailing bytes after node data")]
    TrailingBytes { extra: usize },

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Failures reported by a [`BlockStore`](crate::BlockStore) backend.
///
/// These are always treated as non-fatal store defects by the validator:
/// they are recorded as diagnostics and the affected block counts as
/// unresolved.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Stored bytes no longer hash to the identifier they are filed under.
    #[error("block {cid} is corrupt: content digest does not match")]
    Corrupt { cid: String },

    /// A backend-specific failure with no better classification.
    #[error("store backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
