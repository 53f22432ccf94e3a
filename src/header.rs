//! The header of an encoded value.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use crate::error::DecodeError;
use crate::ident::Ident;
use crate::length::Length;
use crate::source::SliceSource;


//------------ Header --------------------------------------------------------

/// The decoded header of a single encoded value.
///
/// The header combines the identifier octets and the length octets of a
/// value and remembers how many octets each of the two parts consumed.
/// The counts allow slicing the raw octets of either part back out of the
/// input data.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Header {
    /// The decoded identifier octets.
    ident: Ident,

    /// The decoded length octets.
    length: Length,

    /// The number of octets of the encoded identifier.
    ident_len: usize,

    /// The number of octets of the encoded length.
    length_len: usize,
}

impl Header {
    /// Takes a header from the beginning of a source.
    pub fn take_from(
        source: &mut SliceSource
    ) -> Result<Self, DecodeError> {
        let start = source.pos();
        let ident = Ident::take_from(source)?;
        let ident_len = source.pos() - start;
        let length = Length::take_from(source)?;
        let length_len = source.pos() - start - ident_len;
        Ok(Header { ident, length, ident_len, length_len })
    }

    /// Returns the identifier octets of the value.
    pub fn ident(self) -> Ident {
        self.ident
    }

    /// Returns the length of the value.
    pub fn length(self) -> Length {
        self.length
    }

    /// Returns the number of octets the identifier was encoded in.
    pub fn ident_len(self) -> usize {
        self.ident_len
    }

    /// Returns the number of octets the length was encoded in.
    pub fn length_len(self) -> usize {
        self.length_len
    }

    /// Returns the number of octets of the complete header.
    pub fn header_len(self) -> usize {
        self.ident_len + self.length_len
    }

    /// Returns whether this is the header of an end-of-contents marker.
    ///
    /// The marker is the universal, primitive tag 0 with a definite length
    /// of zero.
    pub fn is_end_of_contents(self) -> bool {
        self.ident == Ident::END_OF_CONTENTS && self.length.is_zero()
    }
}


//============ Tests =========================================================
