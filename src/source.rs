//! The source of octets to decode.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{fmt, ops};
use crate::error::{DecodeError, ErrorKind};


//------------ SliceSource ---------------------------------------------------

/// A source reading from a byte slice.
///
/// The source borrows the complete input for the duration of the decode and
/// keeps a read position into it. All reads are bounds checked; running out
/// of data produces a [`DecodeError`] of kind
/// [`TruncatedInput`][ErrorKind::TruncatedInput] at the current position.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'s> {
    /// The complete data being decoded.
    data: &'s [u8],

    /// The current read position.
    pos: usize,
}

impl<'s> SliceSource<'s> {
    /// Creates a new source for the given data.
    pub fn new(data: &'s [u8]) -> Self {
        SliceSource { data, pos: 0 }
    }

    /// Returns the complete underlying data.
    ///
    /// The returned slice always covers the full input, independently of
    /// how far the source has advanced.
    pub fn data(&self) -> &'s [u8] {
        self.data
    }

    /// Returns the current read position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of octets not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns whether all octets have been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Takes a single octet from the source.
    pub fn take_u8(&mut self) -> Result<u8, DecodeError> {
        match self.data.get(self.pos) {
            Some(&octet) => {
                self.pos += 1;
                Ok(octet)
            }
            None => Err(self.err(ErrorKind::TruncatedInput))
        }
    }

    /// Advances the read position by `count` octets.
    pub fn advance(&mut self, count: usize) -> Result<(), DecodeError> {
        if self.remaining() < count {
            return Err(self.err(ErrorKind::TruncatedInput))
        }
        self.pos += count;
        Ok(())
    }

    /// Produces a decode error of the given kind at the current position.
    pub fn err(&self, kind: ErrorKind) -> DecodeError {
        DecodeError::new(kind, self.pos)
    }
}


//------------ Pos -----------------------------------------------------------

/// The position of an error within a decoded buffer.
///
/// Values of this type are only used for diagnostics, which is why this is
/// a newtype.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Pos(usize);

impl From<usize> for Pos {
    fn from(pos: usize) -> Pos {
        Pos(pos)
    }
}

impl ops::Add for Pos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Pos(self.0 + rhs.0)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//============ Tests =========================================================
