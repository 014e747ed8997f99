/// Low-level framing errors shared by the identifier and node codecs.
///
/// Every variant carries the byte offset at which parsing stopped so a
/// caller decoding a nested structure (a link inside a node inside a
/// block) can point at the exact position that went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Varint kept its continuation bit set past the 10-byte limit.
    #[error("varint too long at offset {offset}: exceeded 10-byte limit")]
    VarintTooLong { offset: usize },

    /// Varint used more bytes than its value needs.
    ///
    /// Identifiers must have exactly one binary form, so a padded
    /// encoding such as `[0x81, 0x00]` for `1` is rejected.
    #[error("non-minimal varint encoding at offset {offset}")]
    NonMinimalVarint { offset: usize },

    /// Input ended before a complete varint or length-prefixed field.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// A length prefix exceeded what the caller is willing to allocate.
    #[error("length {len} at offset {offset} exceeds limit {limit}")]
    LengthTooLarge { offset: usize, len: u64, limit: u64 },
}
