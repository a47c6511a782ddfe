//! Cursor-style BER TLV reader.
//!
//! [`Decoder`] walks a received datagram with a single forward cursor.
//! Every read re-validates against the actual buffer length, so truncated
//! or hostile input fails with a parse error instead of panicking.

use bytes::Bytes;

use crate::error::{Error, ParseErrorKind, Result};
use crate::ber::int;

/// One raw TLV field: tag byte, header length, and a zero-copy slice of the
/// content octets.
#[derive(Debug, Clone)]
pub struct Field {
    pub tag: u8,
    pub header_len: usize,
    pub data: Bytes,
}

/// Forward-only reader over a received packet.
#[derive(Debug)]
pub struct Decoder {
    data: Bytes,
    offset: usize,
}

impl Decoder {
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Current cursor position, for error reporting.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_remaining(&self) -> bool {
        self.offset < self.data.len()
    }

    /// Parse the TLV header at the cursor without consuming anything.
    ///
    /// Returns `(tag, header_len, data_len)` with `data_len` already checked
    /// against the remaining buffer.
    fn peek_header(&self) -> Result<(u8, usize, usize)> {
        let rest = &self.data[self.offset..];
        if rest.is_empty() {
            tracing::debug!(target: "sync_snmp::ber", offset = self.offset, "zero-length field");
            return Err(Error::parse(self.offset, ParseErrorKind::ZeroLength));
        }
        if rest.len() < 2 {
            return Err(Error::parse(self.offset, ParseErrorKind::TruncatedLength));
        }
        let tag = rest[0];
        let length_byte = rest[1];
        let (header_len, data_len) = if length_byte > 0x80 {
            // Long form: low bits give the count of length octets.
            let octets = (length_byte - 0x80) as usize;
            if rest.len() < 2 + octets {
                tracing::debug!(
                    target: "sync_snmp::ber",
                    offset = self.offset,
                    octets,
                    "length octets extend past buffer"
                );
                return Err(Error::parse(self.offset, ParseErrorKind::TruncatedLength));
            }
            let data_len = int::decode_unsigned_truncated(&rest[2..2 + octets]) as usize;
            (2 + octets, data_len)
        } else {
            (2, length_byte as usize)
        };
        let available = rest.len() - header_len;
        if data_len > available {
            tracing::debug!(
                target: "sync_snmp::ber",
                offset = self.offset,
                tag,
                data_len,
                available,
                "declared length exceeds buffer"
            );
            return Err(Error::parse(
                self.offset,
                ParseErrorKind::DataLengthExceedsBuffer {
                    declared: data_len,
                    available,
                },
            ));
        }
        Ok((tag, header_len, data_len))
    }

    /// Read the complete TLV at the cursor and advance past it.
    pub fn read_field(&mut self) -> Result<Field> {
        let (tag, header_len, data_len) = self.peek_header()?;
        let start = self.offset + header_len;
        let data = self.data.slice(start..start + data_len);
        self.offset = start + data_len;
        Ok(Field {
            tag,
            header_len,
            data,
        })
    }

    /// Read the TLV at the cursor but advance past the header only, leaving
    /// the cursor at the first content octet. Used for constructed fields
    /// whose children are read in place.
    pub fn enter_field(&mut self) -> Result<Field> {
        let (tag, header_len, data_len) = self.peek_header()?;
        let start = self.offset + header_len;
        let data = self.data.slice(start..start + data_len);
        self.offset = start;
        Ok(Field {
            tag,
            header_len,
            data,
        })
    }

    /// Read a complete TLV, requiring a specific tag.
    pub fn expect_field(&mut self, expected: u8) -> Result<Field> {
        let at = self.offset;
        let field = self.read_field()?;
        if field.tag != expected {
            tracing::debug!(
                target: "sync_snmp::ber",
                offset = at,
                expected,
                actual = field.tag,
                "unexpected tag"
            );
            return Err(Error::parse(
                at,
                ParseErrorKind::UnexpectedTag {
                    expected,
                    actual: field.tag,
                },
            ));
        }
        Ok(field)
    }

    /// Read an INTEGER field and decode its signed value.
    pub fn read_integer(&mut self) -> Result<i64> {
        let at = self.offset;
        let field = self.expect_field(crate::ber::tag::INTEGER)?;
        int::decode_signed(&field.data, at + field.header_len)
    }
}
