//! The identifier octets of an encoded value.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use crate::error::{DecodeError, ErrorKind};
use crate::source::SliceSource;


//------------ Ident ---------------------------------------------------------

/// The decoded identifier octets of a value.
///
/// Each encoded value starts with a sequence of one or more octets called
/// the _identifier octets._ They combine the tag of the value – its class
/// and its number – with a bit stating whether the value uses primitive or
/// constructed encoding.
///
/// Tag numbers between 0 and 30 are encoded in the five low bits of the
/// first octet. For larger numbers, those five bits are all set and the
/// number follows in base 128, most significant seven bits first, with
/// bit 8 of each octet except the last set to 1.
///
/// # Limitations
///
/// Only tag numbers that fit into a `u32` are supported. Longer encodings
/// fail with [`TagOverflow`][crate::ErrorKind::TagOverflow]. This should
/// be more than enough in practice.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Ident {
    /// The class of the tag.
    class: Class,

    /// Whether the value is primitive or constructed.
    form: Form,

    /// The number of the tag.
    number: u32,
}

impl Ident {
    /// The identifier of the end-of-contents marker.
    ///
    /// This is the universal, primitive tag 0.
    pub const END_OF_CONTENTS: Self = Ident {
        class: Class::Universal,
        form: Form::Primitive,
        number: 0,
    };

    /// Creates an identifier from its components.
    pub const fn new(class: Class, form: Form, number: u32) -> Self {
        Ident { class, form, number }
    }

    /// Takes identifier octets from the beginning of a source.
    pub fn take_from(
        source: &mut SliceSource
    ) -> Result<Self, DecodeError> {
        let first = source.take_u8()?;
        let class = Class::from_octet(first);
        let form = Form::from_octet(first);
        let mut number = u32::from(first & 0x1f);
        if number == 0x1f {
            number = 0;
            loop {
                let octet = source.take_u8()?;
                if number > u32::MAX >> 7 {
                    return Err(source.err(ErrorKind::TagOverflow))
                }
                number = (number << 7) | u32::from(octet & 0x7f);
                if octet & 0x80 == 0 {
                    break
                }
            }
        }
        Ok(Ident { class, form, number })
    }

    /// Returns the class of the tag.
    pub fn class(self) -> Class {
        self.class
    }

    /// Returns the encoding form of the value.
    pub fn form(self) -> Form {
        self.form
    }

    /// Returns the number of the tag.
    pub fn number(self) -> u32 {
        self.number
    }

    /// Returns whether the value is constructed.
    pub fn is_constructed(self) -> bool {
        matches!(self.form, Form::Constructed)
    }
}


//------------ Class ---------------------------------------------------------

/// The class of a tag.
///
/// The class is encoded in the two high bits of the first identifier octet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    /// Returns the class encoded in the first identifier octet.
    fn from_octet(octet: u8) -> Self {
        match octet & 0xC0 {
            0x00 => Class::Universal,
            0x40 => Class::Application,
            0x80 => Class::Context,
            _ => Class::Private,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Class::Universal => f.write_str("U"),
            Class::Application => f.write_str("A"),
            Class::Context => f.write_str("C"),
            Class::Private => f.write_str("P"),
        }
    }
}


//------------ Form ----------------------------------------------------------

/// The encoding form of a value.
///
/// A primitive value carries its content as raw octets while the content of
/// a constructed value is a sequence of further encoded values. The form is
/// encoded in bit 6 of the first identifier octet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Form {
    Primitive,
    Constructed,
}

impl Form {
    /// Returns the form encoded in the first identifier octet.
    fn from_octet(octet: u8) -> Self {
        if octet & 0x20 != 0 {
            Form::Constructed
        }
        else {
            Form::Primitive
        }
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Form::Primitive => f.write_str("P"),
            Form::Constructed => f.write_str("C"),
        }
    }
}


//============ Tests =========================================================
