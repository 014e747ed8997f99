#![warn(clippy::pedantic)]

pub mod error;
pub mod varint;

pub use error::WireError;
pub use varint::{MAX_VARINT_BYTES, decode_uvarint, encode_uvarint, uvarint_len};
