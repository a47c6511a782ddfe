//! Object identifier type and its BER encoding.
//!
//! Arcs are stored inline for typical OID lengths via `SmallVec`. The wire
//! form packs the first two arcs into a single byte (`arc0 * 40 + arc1`) and
//! encodes the rest as base-128 varints with a continuation bit.

use smallvec::SmallVec;

use crate::error::{Error, MarshalErrorKind, ParseErrorKind, Result};

/// An SNMP object identifier.
///
/// ```
/// use sync_snmp::{oid, Oid};
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// assert!(sys_descr.starts_with(&oid!(1, 3, 6, 1, 2, 1, 1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an OID from a slice of arcs.
    pub fn from_arcs(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse dotted notation. A single leading dot is accepted and ignored.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.strip_prefix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(Error::invalid_oid(s));
        }
        let mut arcs = SmallVec::new();
        for part in trimmed.split('.') {
            let arc: u32 = part.parse().map_err(|_| Error::invalid_oid(s))?;
            arcs.push(arc);
        }
        Ok(Self { arcs })
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Whether `self` lies within the subtree rooted at `prefix`.
    ///
    /// Comparison is per arc, so `1.3.6.1.2.1.11` is not under
    /// `1.3.6.1.2.1.1`.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.len() >= prefix.arcs.len() && self.arcs[..prefix.arcs.len()] == prefix.arcs[..]
    }

    /// Append an arc, returning a new OID.
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Self { arcs }
    }

    /// Encode to BER content octets.
    ///
    /// The composite first byte requires at least two arcs, `arc0 <= 6`,
    /// and `arc1 < 40`; anything else is a marshal error.
    pub fn to_ber(&self) -> Result<SmallVec<[u8; 32]>> {
        if self.arcs.len() < 2 {
            return Err(Error::marshal(MarshalErrorKind::OidTooShort {
                arcs: self.arcs.len(),
            }));
        }
        if self.arcs[0] > 6 {
            return Err(Error::marshal(MarshalErrorKind::InvalidFirstArc(
                self.arcs[0],
            )));
        }
        if self.arcs[1] >= 40 {
            return Err(Error::marshal(MarshalErrorKind::InvalidSecondArc(
                self.arcs[1],
            )));
        }
        let mut out = SmallVec::new();
        out.push((self.arcs[0] * 40 + self.arcs[1]) as u8);
        for &arc in &self.arcs[2..] {
            encode_subidentifier(&mut out, arc);
        }
        Ok(out)
    }

    /// Decode from BER content octets. `offset` is the buffer position of
    /// the content, used for error reporting.
    pub fn from_ber(data: &[u8], offset: usize) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::parse(offset, ParseErrorKind::OidTooShort));
        }
        let mut arcs = SmallVec::new();
        arcs.push(u32::from(data[0]) / 40);
        arcs.push(u32::from(data[0]) % 40);
        let mut pos = 1;
        while pos < data.len() {
            let (arc, next) = decode_subidentifier(data, pos, offset)?;
            arcs.push(arc);
            pos = next;
        }
        Ok(Self { arcs })
    }
}

/// Append one arc as a base-128 varint. Zero encodes as a single 0x00.
pub(crate) fn encode_subidentifier(out: &mut SmallVec<[u8; 32]>, value: u32) {
    if value == 0 {
        out.push(0);
        return;
    }
    let mut groups = 0;
    let mut v = value;
    while v != 0 {
        v >>= 7;
        groups += 1;
    }
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

/// Decode one base-128 varint starting at `pos`, returning the arc and the
/// position after it. Fails after 5 groups or if the buffer ends before a
/// terminating byte.
pub(crate) fn decode_subidentifier(
    data: &[u8],
    mut pos: usize,
    base_offset: usize,
) -> Result<(u32, usize)> {
    let mut value: u64 = 0;
    let mut groups = 0;
    while pos < data.len() {
        if groups > 4 {
            tracing::debug!(
                target: "sync_snmp::ber",
                offset = base_offset + pos,
                "base-128 subidentifier too long"
            );
            return Err(Error::parse(
                base_offset + pos,
                ParseErrorKind::SubidentifierOverflow,
            ));
        }
        let byte = data[pos];
        value = (value << 7) | u64::from(byte & 0x7F);
        pos += 1;
        groups += 1;
        if byte & 0x80 == 0 {
            if value > u64::from(u32::MAX) {
                return Err(Error::parse(
                    base_offset + pos,
                    ParseErrorKind::SubidentifierOverflow,
                ));
            }
            return Ok((value as u32, pos));
        }
    }
    Err(Error::parse(
        base_offset + pos,
        ParseErrorKind::TruncatedSubidentifier,
    ))
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_arcs(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::from_arcs(&arcs)
    }
}

/// Construct an [`Oid`] from literal arcs: `oid!(1, 3, 6, 1, 2, 1)`.
#[macro_export]
macro_rules! oid {
    ($($arc:expr),+ $(,)?) => {
        $crate::Oid::from_arcs(&[$($arc),+])
    };
}
