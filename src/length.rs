//! The length octets.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use crate::error::{DecodeError, ErrorKind};
use crate::source::SliceSource;


//------------ Length --------------------------------------------------------

/// The decoded length octets of a value.
///
/// A length can either be definite, meaning it provides the actual number
/// of content octets in the value, or indefinite, in which case the content
/// is delimited by a special end-of-contents marker.
///
/// # BER Encoding
///
/// The length can be encoded in one of two basic ways. Which one is used is
/// determined by the most significant bit of the first octet. If it is not
/// set, the remaining bits of this first octet provide the definite length
/// directly. If it is set, the remaining bits specify the number of octets
/// that follow to encode the actual length in big-endian order. If they
/// specify that there are zero more octets, the length is indefinite. The
/// value 127 is reserved.
///
/// Leading zero octets in the long form are accepted; requiring the
/// shortest encoding is a property of the canonical rules only.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Length(Option<usize>);

impl Length {
    /// The indefinite length.
    pub const INDEFINITE: Self = Length(None);

    /// Creates a new length from the given optional length.
    ///
    /// If the length is `None`, creates an indefinite length value.
    pub const fn new(length: Option<usize>) -> Self {
        Length(length)
    }

    /// Returns the length if it is definite.
    pub fn definite(self) -> Option<usize> {
        self.0
    }

    /// Returns whether the length is indefinite.
    pub fn is_indefinite(self) -> bool {
        self.0.is_none()
    }

    /// Returns whether the length is definite and zero.
    pub fn is_zero(self) -> bool {
        self.0 == Some(0)
    }

    /// Takes length octets from the beginning of a source.
    pub fn take_from(
        source: &mut SliceSource
    ) -> Result<Self, DecodeError> {
        let first = source.take_u8()?;
        if first & 0x80 == 0 {
            return Ok(Length(Some(usize::from(first))))
        }
        let count = usize::from(first & 0x7f);
        if count == 0 {
            return Ok(Length(None))
        }
        if count == 0x7f {
            return Err(source.err(ErrorKind::ReservedLengthForm))
        }
        let mut res = 0usize;
        for _ in 0..count {
            let octet = source.take_u8()?;
            if res > usize::MAX >> 8 {
                return Err(source.err(ErrorKind::LengthOverflow))
            }
            res = (res << 8) | usize::from(octet);
        }
        Ok(Length(Some(res)))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(len) => len.fmt(f),
            None => f.write_str("INDEFINITE"),
        }
    }
}


//============ Tests =========================================================
