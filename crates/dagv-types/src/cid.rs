use std::fmt;
use std::str::FromStr;

use dagv_wire::varint::{decode_uvarint, encode_uvarint};
use dagv_wire::WireError;

use crate::codec::{Codec, HashCode};
use crate::error::{CidError, DecodeDefect};

/// The only identifier version this crate produces or accepts.
pub const CID_VERSION: u64 = 1;

/// Multibase prefix for lowercase base16.
pub const MULTIBASE_BASE16: char = 'f';

/// Self-describing name of a block: codec plus BLAKE3 digest of its bytes.
///
/// # Binary form
///
/// ```text
/// ┌─────────────────────────────────────────┐
/// │ version      (varint, always 1)         │
/// │ codec        (varint, 0x55 | 0x71)      │
/// │ hash code    (varint, 0x1e = BLAKE3)    │
/// │ digest len   (varint, always 32)        │
/// │ digest       [32 bytes]                 │
/// └─────────────────────────────────────────┘
/// ```
///
/// # String form
///
/// `'f'` followed by the lowercase hex of the binary form. Decoding only
/// accepts the canonical spelling (minimal varints, lowercase hex, no
/// trailing bytes), so two identifiers compare equal exactly when their
/// strings do.
///
/// ```rust
/// use dagv_types::{Codec, ContentId};
///
/// let cid = ContentId::for_block(Codec::Raw, b"hello");
/// let text = cid.to_string();
/// assert!(text.starts_with("f01551e20"));
/// assert_eq!(ContentId::decode(&text).unwrap(), cid);
/// assert!(ContentId::decode("not-a-valid-id").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId {
    codec: Codec,
    digest: [u8; HashCode::BLAKE3_DIGEST_LEN],
}

impl ContentId {
    /// Build an identifier from an already computed digest.
    #[must_use]
    pub fn new(codec: Codec, digest: [u8; HashCode::BLAKE3_DIGEST_LEN]) -> Self {
        Self { codec, digest }
    }

    /// Hash `bytes` with BLAKE3 and name them under `codec`.
    #[must_use]
    pub fn for_block(codec: Codec, bytes: &[u8]) -> Self {
        Self::new(codec, blake3::hash(bytes).into())
    }

    #[must_use]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    #[must_use]
    pub fn digest(&self) -> &[u8; HashCode::BLAKE3_DIGEST_LEN] {
        &self.digest
    }

    /// Whether `bytes` hash to this identifier's digest.
    #[must_use]
    pub fn matches(&self, bytes: &[u8]) -> bool {
        blake3::hash(bytes).as_bytes() == &self.digest
    }

    /// Decode the canonical string form.
    ///
    /// Total over all inputs: empty strings, whitespace and arbitrary text
    /// produce a [`DecodeDefect`] carrying the original string, never a panic.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeDefect`] wrapping the specific [`CidError`].
    pub fn decode(input: &str) -> Result<Self, DecodeDefect> {
        Self::parse_str(input).map_err(|source| DecodeDefect {
            input: input.to_string(),
            source,
        })
    }

    fn parse_str(input: &str) -> Result<Self, CidError> {
        let mut chars = input.chars();
        let prefix = chars.next().ok_or(CidError::Empty)?;
        if prefix != MULTIBASE_BASE16 {
            return Err(CidError::UnsupportedMultibase { prefix });
        }

        let body = chars.as_str();
        if body.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(CidError::UppercaseBase16);
        }
        let bytes = hex::decode(body).map_err(|e| CidError::InvalidBase16(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Decode the binary form. The slice must contain exactly one identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`CidError`] describing the first structural problem.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CidError> {
        let mut offset = 0;
        let next_varint = |offset: &mut usize| -> Result<u64, CidError> {
            let (value, used) =
                decode_uvarint(&bytes[*offset..]).map_err(|e| shift_offset(e, *offset))?;
            *offset += used;
            Ok(value)
        };

        let version = next_varint(&mut offset)?;
        if version != CID_VERSION {
            return Err(CidError::UnsupportedVersion { version });
        }
        let codec = Codec::from_code(next_varint(&mut offset)?)?;
        HashCode::from_code(next_varint(&mut offset)?)?;

        let digest_len = next_varint(&mut offset)?;
        if digest_len != HashCode::BLAKE3_DIGEST_LEN as u64 {
            return Err(CidError::DigestLength {
                expected: HashCode::BLAKE3_DIGEST_LEN,
                found: digest_len,
            });
        }

        let rest = &bytes[offset..];
        if rest.len() < HashCode::BLAKE3_DIGEST_LEN {
            return Err(CidError::Wire(WireError::UnexpectedEof { offset: bytes.len() }));
        }
        if rest.len() > HashCode::BLAKE3_DIGEST_LEN {
            return Err(CidError::TrailingBytes {
                extra: rest.len() - HashCode::BLAKE3_DIGEST_LEN,
            });
        }

        let mut digest = [0u8; HashCode::BLAKE3_DIGEST_LEN];
        digest.copy_from_slice(rest);
        Ok(Self { codec, digest })
    }

    /// Encode the binary form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + HashCode::BLAKE3_DIGEST_LEN);
        encode_uvarint(CID_VERSION, &mut out);
        encode_uvarint(self.codec.code(), &mut out);
        encode_uvarint(HashCode::Blake3.code(), &mut out);
        encode_uvarint(HashCode::BLAKE3_DIGEST_LEN as u64, &mut out);
        out.extend_from_slice(&self.digest);
        out
    }
}

fn shift_offset(err: WireError, base: usize) -> WireError {
    match err {
        WireError::VarintTooLong { offset } => WireError::VarintTooLong { offset: base + offset },
        WireError::NonMinimalVarint { offset } => WireError::NonMinimalVarint {
            offset: base + offset,
        },
        WireError::UnexpectedEof { offset } => WireError::UnexpectedEof { offset: base + offset },
        WireError::LengthTooLarge { offset, len, limit } => WireError::LengthTooLarge {
            offset: base + offset,
            len,
            limit,
        },
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MULTIBASE_BASE16}{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({self})")
    }
}

impl FromStr for ContentId {
    type Err = DecodeDefect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl serde::Serialize for ContentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ContentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::decode(&text).map_err(serde::de::Error::custom)
    }
}
