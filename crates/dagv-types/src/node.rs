use dagv_wire::varint::{decode_uvarint, encode_uvarint};
use dagv_wire::WireError;

use crate::cid::ContentId;
use crate::error::NodeError;

/// Upper bound on links in a single node. Guards the decoder against
/// allocating from a hostile count prefix.
pub const MAX_LINKS: u64 = 65_536;

/// Upper bound on one encoded link. Identifiers are 36 bytes today.
pub const MAX_LINK_LEN: u64 = 64;

/// Body of a `dag-node` block: ordered child links plus inline data.
///
/// ```text
/// ┌──────────────────────────────────────────┐
/// │ link_count (varint)                      │
/// │ ┌ repeated link_count times ───────────┐ │
/// │ │ cid_len (varint)                     │ │
/// │ │ cid     [cid_len bytes, binary form] │ │
/// │ └──────────────────────────────────────┘ │
/// │ data_len   (varint)                      │
/// │ data       [data_len bytes]              │
/// └──────────────────────────────────────────┘
/// ```
///
/// The body must end exactly after `data`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DagNode {
    pub links: Vec<ContentId>,
    pub data: Vec<u8>,
}

impl DagNode {
    #[must_use]
    pub fn new(links: Vec<ContentId>, data: Vec<u8>) -> Self {
        Self { links, data }
    }

    /// Serialize the node body.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.links.len() * 40 + self.data.len());
        encode_uvarint(self.links.len() as u64, &mut out);
        for link in &self.links {
            let bytes = link.to_bytes();
            encode_uvarint(bytes.len() as u64, &mut out);
            out.extend_from_slice(&bytes);
        }
        encode_uvarint(self.data.len() as u64, &mut out);
        out.extend_from_slice(&self.data);
        out
    }

    /// Parse a node body.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError`] for truncated input, oversized counts,
    /// undecodable links, or trailing bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, NodeError> {
        let mut cursor = Cursor { buf, pos: 0 };

        let count = cursor.varint()?;
        if count > MAX_LINKS {
            return Err(NodeError::TooManyLinks { count, limit: MAX_LINKS });
        }

        // Each link takes at least one byte, so the input length bounds the
        // allocation whatever the prefix claims.
        #[allow(clippy::cast_possible_truncation)]
        let mut links = Vec::with_capacity((count as usize).min(buf.len()));
        for index in 0..count {
            let raw = cursor.length_prefixed(MAX_LINK_LEN)?;
            #[allow(clippy::cast_possible_truncation)]
            let cid = ContentId::from_bytes(raw).map_err(|source| NodeError::Link {
                index: index as usize,
                source,
            })?;
            links.push(cid);
        }

        let data = cursor.length_prefixed(buf.len() as u64)?.to_vec();

        let extra = buf.len() - cursor.pos;
        if extra > 0 {
            return Err(NodeError::TrailingBytes { extra });
        }

        Ok(Self { links, data })
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn varint(&mut self) -> Result<u64, WireError> {
        let (value, used) = decode_uvarint(&self.buf[self.pos..]).map_err(|e| match e {
            WireError::UnexpectedEof { .. } => WireError::UnexpectedEof { offset: self.buf.len() },
            WireError::VarintTooLong { offset } => WireError::VarintTooLong {
                offset: self.pos + offset,
            },
            WireError::NonMinimalVarint { offset } => WireError::NonMinimalVarint {
                offset: self.pos + offset,
            },
            other @ WireError::LengthTooLarge { .. } => other,
        })?;
        self.pos += used;
        Ok(value)
    }

    fn length_prefixed(&mut self, limit: u64) -> Result<&'a [u8], WireError> {
        let start = self.pos;
        let len = self.varint()?;
        if len > limit {
            return Err(WireError::LengthTooLarge { offset: start, len, limit });
        }
        #[allow(clippy::cast_possible_truncation)]
        let len = len as usize;
        let remaining = self.buf.len() - self.pos;
        if len > remaining {
            return Err(WireError::UnexpectedEof { offset: self.buf.len() });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}
