use crate::error::CidError;

/// Content codec carried inside every [`ContentId`](crate::ContentId).
///
/// The codec tells the walker how to read a block: raw blocks are opaque
/// leaves, dag-node blocks carry links to children.
///
/// ```text
/// ┌──────────┬───────┬───────────────────────────────────────┐
/// │ Codec    │ Code  │ Body                                  │
/// ├──────────┼───────┼───────────────────────────────────────┤
/// │ Raw      │ 0x55  │ arbitrary bytes, never has children   │
/// │ DagNode  │ 0x71  │ DagNode wire format (links + data)    │
/// └──────────┴───────┴───────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Codec {
    Raw,
    DagNode,
}

impl Codec {
    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            Self::Raw => 0x55,
            Self::DagNode => 0x71,
        }
    }

    /// Map a wire code back to a codec.
    ///
    /// # Errors
    ///
    /// Returns [`CidError::UnknownCodec`] for any unassigned code.
    pub fn from_code(code: u64) -> Result<Self, CidError> {
        match code {
            0x55 => Ok(Self::Raw),
            0x71 => Ok(Self::DagNode),
            other => Err(CidError::UnknownCodec { code: other }),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::DagNode => "dag-node",
        }
    }
}

/// Hash function used to compute identifier digests.
///
/// Only BLAKE3-256 is supported; the code is still carried on the wire so
/// identifiers stay self-describing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashCode {
    Blake3,
}

impl HashCode {
    pub const BLAKE3_DIGEST_LEN: usize = 32;

    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            Self::Blake3 => 0x1e,
        }
    }

    /// # Errors
    ///
    /// Returns [`CidError::UnsupportedHash`] for anything other than BLAKE3.
    pub fn from_code(code: u64) -> Result<Self, CidError> {
        match code {
            0x1e => Ok(Self::Blake3),
            other => Err(CidError::UnsupportedHash { code: other }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_codes_roundtrip() {
        for codec in [Codec::Raw, Codec::DagNode] {
            assert_eq!(Codec::from_code(codec.code()).unwrap(), codec);
        }
    }

    #[test]
    fn unknown_codec_rejected() {
        assert_eq!(
            Codec::from_code(0x70),
            Err(CidError::UnknownCodec { code: 0x70 })
        );
    }

    #[test]
    fn only_blake3_supported() {
        assert_eq!(HashCode::from_code(0x1e).unwrap(), HashCode::Blake3);
        assert!(matches!(
            HashCode::from_code(0x12),
            Err(CidError::UnsupportedHash { code: 0x12 })
        ));
    }
}
