//! Rendering the decoded structure.
//!
//! The walker reports every decoded value to an implementation of the
//! [`Render`] trait in strict traversal order. Two implementations are
//! provided: [`TextRenderer`] writes the indented text dump and
//! [`TreeBuilder`] materializes the values as a tree of [`Node`]s.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::io;
use std::convert::Infallible;
use bytes::Bytes;
use crate::ident::Ident;
use crate::length::Length;


//------------ Render --------------------------------------------------------

/// A sink receiving the values decoded from a buffer.
///
/// For every value, the walker first invokes
/// [`value_start`][Self::value_start], then [`ident`][Self::ident] with the
/// decoded tag and the raw identifier octets, then
/// [`length`][Self::length] with the declared length and the raw length
/// octets, and finally, for primitive values only,
/// [`primitive`][Self::primitive] with the content octets.
///
/// The `depth` passed with each event is the nesting depth of the value,
/// starting at 0 for top-level values. It is purely presentational and
/// carries no decoding semantics.
pub trait Render {
    /// The error type returned by the renderer.
    type Error;

    /// A new value starts as the `count`-th value of its parent.
    ///
    /// Counting starts at 1.
    fn value_start(
        &mut self, count: usize, depth: usize
    ) -> Result<(), Self::Error>;

    /// The tag of the current value.
    ///
    /// `raw` contains the identifier octets.
    fn ident(
        &mut self, ident: Ident, raw: &[u8], depth: usize
    ) -> Result<(), Self::Error>;

    /// The declared length of the current value.
    ///
    /// `raw` contains the length octets.
    fn length(
        &mut self, length: Length, raw: &[u8], depth: usize
    ) -> Result<(), Self::Error>;

    /// The content octets of a primitive value.
    fn primitive(
        &mut self, value: &[u8], depth: usize
    ) -> Result<(), Self::Error>;
}


//------------ TextRenderer --------------------------------------------------

/// A renderer writing the structure as indented text.
///
/// Every value produces a `TLV #n` line at its depth followed by one line
/// each for the tag, the length, and, for primitive values, the content
/// octets, indented one further level. Raw octets appear in lowercase hex
/// wrapped in brackets. Two spaces per indent level.
pub struct TextRenderer<W> {
    /// Where the text goes.
    target: W,
}

impl<W> TextRenderer<W> {
    /// Creates a new renderer writing to `target`.
    pub fn new(target: W) -> Self {
        TextRenderer { target }
    }

    /// Returns the target the renderer has written to.
    pub fn into_inner(self) -> W {
        self.target
    }
}

impl<W: io::Write> TextRenderer<W> {
    fn indent(&mut self, depth: usize) -> Result<(), io::Error> {
        for _ in 0..depth {
            self.target.write_all(b"  ")?;
        }
        Ok(())
    }

    fn hex(&mut self, octets: &[u8]) -> Result<(), io::Error> {
        self.target.write_all(b"[")?;
        for octet in octets {
            write!(self.target, "{:02x}", octet)?;
        }
        self.target.write_all(b"]")
    }
}

impl<W: io::Write> Render for TextRenderer<W> {
    type Error = io::Error;

    fn value_start(
        &mut self, count: usize, depth: usize
    ) -> Result<(), Self::Error> {
        self.indent(depth)?;
        writeln!(self.target, "TLV #{}", count)
    }

    fn ident(
        &mut self, ident: Ident, raw: &[u8], depth: usize
    ) -> Result<(), Self::Error> {
        self.indent(depth + 1)?;
        write!(
            self.target,
            "Tag (class: {}, kind: {}, id: {}) ",
            ident.class(), ident.form(), ident.number()
        )?;
        self.hex(raw)?;
        writeln!(self.target)
    }

    fn length(
        &mut self, length: Length, raw: &[u8], depth: usize
    ) -> Result<(), Self::Error> {
        self.indent(depth + 1)?;
        write!(self.target, "Length: {} ", length)?;
        self.hex(raw)?;
        writeln!(self.target)
    }

    fn primitive(
        &mut self, value: &[u8], depth: usize
    ) -> Result<(), Self::Error> {
        self.indent(depth + 1)?;
        write!(self.target, "Value: ")?;
        self.hex(value)?;
        writeln!(self.target)
    }
}


//------------ TreeBuilder ---------------------------------------------------

/// A renderer materializing the decoded values as a tree.
///
/// Since the renderer only ever sees borrowed octets, the tree holds copies
/// of the raw identifier, length, and content octets of each value.
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    /// The finished top-level nodes.
    roots: Vec<Node>,

    /// The values whose content is still being delivered, outermost first.
    stack: Vec<Node>,
}

impl TreeBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finishes building and returns the top-level nodes.
    pub fn finish(mut self) -> Vec<Node> {
        self.close_to(0);
        self.roots
    }

    /// Closes all values deeper than `depth`.
    fn close_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            let node = match self.stack.pop() {
                Some(node) => node,
                None => break,
            };
            self.attach(node);
        }
    }

    /// Attaches a finished node to its parent or the top level.
    fn attach(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }
}

impl Render for TreeBuilder {
    type Error = Infallible;

    fn value_start(
        &mut self, _count: usize, depth: usize
    ) -> Result<(), Self::Error> {
        self.close_to(depth);
        self.stack.push(Node::blank());
        Ok(())
    }

    fn ident(
        &mut self, ident: Ident, raw: &[u8], _depth: usize
    ) -> Result<(), Self::Error> {
        if let Some(node) = self.stack.last_mut() {
            node.ident = ident;
            node.ident_octets = Bytes::copy_from_slice(raw);
        }
        Ok(())
    }

    fn length(
        &mut self, length: Length, raw: &[u8], _depth: usize
    ) -> Result<(), Self::Error> {
        if let Some(node) = self.stack.last_mut() {
            node.length = length;
            node.length_octets = Bytes::copy_from_slice(raw);
        }
        Ok(())
    }

    fn primitive(
        &mut self, value: &[u8], _depth: usize
    ) -> Result<(), Self::Error> {
        if let Some(node) = self.stack.last_mut() {
            node.value = Some(Bytes::copy_from_slice(value));
        }
        Ok(())
    }
}


//------------ Node ----------------------------------------------------------

/// A single decoded value within a built tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    /// The identifier octets of the value.
    ident: Ident,

    /// The declared length of the value.
    length: Length,

    /// A copy of the raw identifier octets.
    ident_octets: Bytes,

    /// A copy of the raw length octets.
    length_octets: Bytes,

    /// A copy of the content octets of a primitive value.
    value: Option<Bytes>,

    /// The values nested in a constructed value, in encounter order.
    children: Vec<Node>,
}

impl Node {
    /// Creates a node with all parts still to be delivered.
    fn blank() -> Self {
        Node {
            ident: Ident::END_OF_CONTENTS,
            length: Length::new(Some(0)),
            ident_octets: Bytes::new(),
            length_octets: Bytes::new(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Returns the identifier octets of the value.
    pub fn ident(&self) -> Ident {
        self.ident
    }

    /// Returns the declared length of the value.
    pub fn length(&self) -> Length {
        self.length
    }

    /// Returns the raw identifier octets.
    pub fn ident_octets(&self) -> &Bytes {
        &self.ident_octets
    }

    /// Returns the raw length octets.
    pub fn length_octets(&self) -> &Bytes {
        &self.length_octets
    }

    /// Returns the content octets if the value is primitive.
    pub fn value(&self) -> Option<&Bytes> {
        self.value.as_ref()
    }

    /// Returns the nested values.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the number of octets of the complete encoded value.
    ///
    /// This covers the identifier and length octets as well as the content,
    /// including the end-of-contents marker of indefinite length values.
    pub fn span_len(&self) -> usize {
        let content = match self.length.definite() {
            Some(len) => len,
            None => {
                self.children.iter().map(Node::span_len).sum::<usize>() + 2
            }
        };
        self.ident_octets.len() + self.length_octets.len() + content
    }
}


//============ Tests =========================================================
