//! Tracing the structure of data encoded in Basic Encoding Rules.
//!
//! BER is a family of nested tag-length-value encodings defined for ASN.1,
//! permitting both definite lengths and indefinite length values that run
//! until an end-of-contents marker. This crate decodes such data without
//! interpreting it against a schema and reports the structure of every
//! encoded value it finds: the class, form, and number of its tag, its
//! declared length, and, for primitive values, its content octets.
//!
//! Decoding is driven by [`walk`] which reports each value in strict
//! depth-first, left-to-right order to an implementation of the [`Render`]
//! trait. [`TextRenderer`] writes an indented text dump while
//! [`TreeBuilder`] collects the values into a tree of [`Node`]s. Input in
//! hexadecimal text form is loaded through the [`hex`] module.

pub use self::error::{DecodeError, ErrorKind, TraceError};
pub use self::header::Header;
pub use self::ident::{Class, Form, Ident};
pub use self::length::Length;
pub use self::render::{Node, Render, TextRenderer, TreeBuilder};
pub use self::source::{Pos, SliceSource};
pub use self::walk::walk;

pub mod hex;

mod error;
mod header;
mod ident;
mod length;
mod render;
mod source;
mod walk;
