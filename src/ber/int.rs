//! Integer codecs for BER content octets.

use crate::error::{Error, ParseErrorKind, Result};

/// Decode a big-endian two's-complement signed integer.
///
/// `offset` is the position of the content octets in the enclosing buffer,
/// used only for error reporting. An empty slice decodes to 0; more than
/// 8 bytes is an error.
pub fn decode_signed(data: &[u8], offset: usize) -> Result<i64> {
    let len = data.len();
    if len > 8 {
        tracing::debug!(target: "sync_snmp::ber", offset, len, "integer too large");
        return Err(Error::parse(
            offset,
            ParseErrorKind::IntegerTooLarge { length: len },
        ));
    }
    if len == 0 {
        return Ok(0);
    }
    let mut value: i64 = 0;
    for &byte in data {
        value = (value << 8) | i64::from(byte);
    }
    // Sign-extend from the top bit of the encoded width.
    let shift = 64 - 8 * len as u32;
    Ok((value << shift) >> shift)
}

/// Decode a big-endian unsigned integer, using at most the first 8 bytes.
///
/// Bytes past the 8th are silently ignored. That truncation matches the
/// historical behavior of this codec for Counter64 values wider than 8
/// content octets; callers that need strictness should length-check first.
pub fn decode_unsigned_truncated(data: &[u8]) -> u64 {
    let mut value: u64 = 0;
    for &byte in data.iter().take(8) {
        value = (value << 8) | u64::from(byte);
    }
    value
}
