use crate::error::WireError;

/// Maximum number of bytes a u64 varint can occupy.
/// ceil(64 / 7) = 10 bytes.
pub const MAX_VARINT_BYTES: usize = 10;

/// Append `value` to `out` as an unsigned LEB128 varint.
///
/// Always produces the minimal encoding, which is the only form
/// [`decode_uvarint`] accepts back.
///
/// | Value   | Encoded bytes        |
/// |---------|----------------------|
/// | 0       | `[0x00]`             |
/// | 0x1e    | `[0x1E]`             |
/// | 0x55    | `[0x55]`             |
/// | 0x71    | `[0x71]`             |
/// | 128     | `[0x80, 0x01]`       |
/// | 16384   | `[0x80, 0x80, 0x01]` |
pub fn encode_uvarint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    #[allow(clippy::cast_possible_truncation)]
    out.push(value as u8);
}

/// Number of bytes [`encode_uvarint`] writes for `value`.
#[must_use]
pub fn uvarint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decode an unsigned LEB128 varint from the front of `buf`.
///
/// Returns `(value, bytes_consumed)`. Trailing bytes after the varint are
/// left untouched for the caller.
///
/// # Errors
///
/// - [`WireError::UnexpectedEof`] if `buf` ends with the continuation bit set.
/// - [`WireError::VarintTooLong`] past 10 bytes, or when the 10th byte
///   carries bits that do not fit in a `u64`.
/// - [`WireError::NonMinimalVarint`] when the final byte is a redundant zero.
pub fn decode_uvarint(buf: &[u8]) -> Result<(u64, usize), WireError> {
    let mut value: u64 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_BYTES - 1 && byte > 0x01 {
            return Err(WireError::VarintTooLong { offset: i });
        }

        value |= u64::from(byte & 0x7F) << (7 * i);

        if byte & 0x80 == 0 {
            if i > 0 && byte == 0 {
                return Err(WireError::NonMinimalVarint { offset: i });
            }
            return Ok((value, i + 1));
        }
    }

    Err(WireError::UnexpectedEof { offset: buf.len() })
}
