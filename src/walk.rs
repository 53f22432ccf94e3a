//! Walking the structure of encoded data.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use log::{debug, trace};
use smallvec::SmallVec;
use crate::error::{DecodeError, ErrorKind, TraceError};
use crate::header::Header;
use crate::render::Render;
use crate::source::SliceSource;


//------------ walk ----------------------------------------------------------

/// Walks encoded data, reporting every value to a renderer.
///
/// The data must consist of a sequence of complete encoded values. Each
/// value is reported through the renderer in strict depth-first,
/// left-to-right order matching the octet layout. Decoding stops at the
/// first structural violation; events already delivered stand, giving a
/// best-effort trace up to the failure.
pub fn walk<R: Render>(
    data: &[u8], renderer: &mut R
) -> Result<(), TraceError<R::Error>> {
    debug!("tracing {} octets of data", data.len());
    Walker::new(data, renderer).walk()
}


//------------ Walker --------------------------------------------------------

/// The engine turning one buffer into renderer events.
///
/// Constructed values do not translate into native recursion. Instead the
/// walker keeps the limits of all currently open constructed values on an
/// explicit stack, so the nesting depth of the input is bounded by
/// available heap only.
struct Walker<'a, 'r, R> {
    /// The source holding the data.
    source: SliceSource<'a>,

    /// The renderer receiving the events.
    renderer: &'r mut R,

    /// The open constructed values, innermost last.
    frames: SmallVec<[Frame; 8]>,

    /// The number of values decoded at the top level.
    count: usize,
}

impl<'a, 'r, R: Render> Walker<'a, 'r, R> {
    /// Creates a walker over the given data.
    fn new(data: &'a [u8], renderer: &'r mut R) -> Self {
        Walker {
            source: SliceSource::new(data),
            renderer,
            frames: SmallVec::new(),
            count: 0,
        }
    }

    /// Walks the complete data.
    ///
    /// The top level decodes one value and then keeps going while the
    /// octets consumed differ from the total length. An empty buffer
    /// consequently attempts a decode and fails.
    fn walk(mut self) -> Result<(), TraceError<R::Error>> {
        self.step()?;
        while !(self.frames.is_empty() && self.source.is_exhausted()) {
            self.step()?;
        }
        Ok(())
    }

    /// Performs one step.
    ///
    /// Either closes the innermost open constructed value or decodes the
    /// next value at the current position.
    fn step(&mut self) -> Result<(), TraceError<R::Error>> {
        if let Some(frame) = self.frames.last().copied() {
            match frame.limit {
                Limit::Definite { end } => {
                    if self.source.pos() == end {
                        self.frames.pop();
                        return Ok(())
                    }
                }
                Limit::Indefinite { ancestor_end } => {
                    let bound = ancestor_end.unwrap_or_else(|| {
                        self.source.data().len()
                    });
                    if self.source.pos() >= bound {
                        return Err(DecodeError::new(
                            ErrorKind::UnterminatedIndefiniteLength,
                            self.source.pos(),
                        ).into())
                    }
                }
            }
        }
        self.next_value()
    }

    /// Decodes the next value at the current position.
    ///
    /// Reports the value to the renderer unless it is the end-of-contents
    /// marker of the innermost open value, which is consumed silently.
    fn next_value(&mut self) -> Result<(), TraceError<R::Error>> {
        let start = self.source.pos();
        let header = Header::take_from(&mut self.source)?;
        trace!("value at {}: {:?}", start, header);

        // The end-of-contents marker closes the innermost value if that is
        // of indefinite length. Anywhere else, an identically shaped value
        // is ordinary content.
        if header.is_end_of_contents() {
            if let Some(
                &Frame { limit: Limit::Indefinite { ancestor_end }, .. }
            ) = self.frames.last() {
                let end = self.source.pos();
                if let Some(bound) = ancestor_end {
                    if end > bound {
                        return Err(DecodeError::new(
                            ErrorKind::ChildOverrunsParent { bound, end },
                            start,
                        ).into())
                    }
                }
                self.frames.pop();
                return Ok(())
            }
        }

        let ident_end = start + header.ident_len();
        let header_end = start + header.header_len();
        let depth = self.frames.len();
        let count = match self.frames.last_mut() {
            Some(frame) => {
                frame.count += 1;
                frame.count
            }
            None => {
                self.count += 1;
                self.count
            }
        };

        self.renderer.value_start(count, depth)
            .map_err(TraceError::Render)?;
        self.renderer.ident(
            header.ident(),
            &self.source.data()[start..ident_end],
            depth,
        ).map_err(TraceError::Render)?;
        self.renderer.length(
            header.length(),
            &self.source.data()[ident_end..header_end],
            depth,
        ).map_err(TraceError::Render)?;

        if header.ident().is_constructed() {
            match header.length().definite() {
                Some(length) => {
                    let end = self.content_end(start, header_end, length)?;
                    self.frames.push(Frame {
                        limit: Limit::Definite { end },
                        count: 0,
                    });
                }
                None => {
                    let ancestor_end = self.enclosing_end();
                    if let Some(bound) = ancestor_end {
                        if header_end > bound {
                            return Err(DecodeError::new(
                                ErrorKind::ChildOverrunsParent {
                                    bound, end: header_end
                                },
                                start,
                            ).into())
                        }
                    }
                    self.frames.push(Frame {
                        limit: Limit::Indefinite { ancestor_end },
                        count: 0,
                    });
                }
            }
        }
        else {
            let length = match header.length().definite() {
                Some(length) => length,
                None => {
                    return Err(DecodeError::new(
                        ErrorKind::IndefiniteInPrimitive, start
                    ).into())
                }
            };
            let end = self.content_end(start, header_end, length)?;
            self.renderer.primitive(
                &self.source.data()[header_end..end],
                depth,
            ).map_err(TraceError::Render)?;
            self.source.advance(length)?;
        }
        Ok(())
    }

    /// Checks that content of `length` octets fits at `header_end`.
    ///
    /// The content must fit both the nearest enclosing definite length
    /// value and the data itself. Returns the content end.
    fn content_end(
        &self, start: usize, header_end: usize, length: usize,
    ) -> Result<usize, DecodeError> {
        let end = header_end.saturating_add(length);
        if let Some(bound) = self.enclosing_end() {
            if end > bound {
                return Err(DecodeError::new(
                    ErrorKind::ChildOverrunsParent { bound, end }, start,
                ))
            }
        }
        if end > self.source.data().len() {
            return Err(DecodeError::new(ErrorKind::TruncatedInput, start))
        }
        Ok(end)
    }

    /// Returns the content end of the nearest enclosing definite value.
    ///
    /// Returns `None` if the current value is only bounded by the data
    /// itself.
    fn enclosing_end(&self) -> Option<usize> {
        match self.frames.last().map(|frame| frame.limit) {
            Some(Limit::Definite { end }) => Some(end),
            Some(Limit::Indefinite { ancestor_end }) => ancestor_end,
            None => None,
        }
    }
}


//------------ Frame ---------------------------------------------------------

/// The decoding state of one open constructed value.
#[derive(Clone, Copy, Debug)]
struct Frame {
    /// The limit of the value’s content.
    limit: Limit,

    /// The number of values decoded within this value so far.
    count: usize,
}


//------------ Limit ---------------------------------------------------------

/// The limit of an open constructed value’s content.
#[derive(Clone, Copy, Debug)]
enum Limit {
    /// The content of a definite length value ends exactly here.
    Definite { end: usize },

    /// Indefinite content, ended by an end-of-contents marker.
    ///
    /// The marker must appear before the content end of the nearest
    /// enclosing definite length value, if there is one.
    Indefinite { ancestor_end: Option<usize> },
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::convert::Infallible;
    use crate::ident::{Class, Form, Ident};
    use crate::length::Length;
    use crate::render::{Node, TreeBuilder};
    use crate::source::Pos;
    use super::*;

    fn tree(data: &[u8]) -> Result<Vec<Node>, DecodeError> {
        let mut builder = TreeBuilder::new();
        match walk(data, &mut builder) {
            Ok(()) => Ok(builder.finish()),
            Err(TraceError::Decode(err)) => Err(err),
            Err(TraceError::Render(err)) => match err { }
        }
    }

    /// A renderer recording one string per event.
    #[derive(Default)]
    struct EventLog(Vec<String>);

    impl Render for EventLog {
        type Error = Infallible;

        fn value_start(
            &mut self, count: usize, depth: usize
        ) -> Result<(), Self::Error> {
            self.0.push(format!("start {} at {}", count, depth));
            Ok(())
        }

        fn ident(
            &mut self, ident: Ident, _raw: &[u8], depth: usize
        ) -> Result<(), Self::Error> {
            self.0.push(format!("ident {} at {}", ident.number(), depth));
            Ok(())
        }

        fn length(
            &mut self, length: Length, _raw: &[u8], depth: usize
        ) -> Result<(), Self::Error> {
            self.0.push(format!("length {} at {}", length, depth));
            Ok(())
        }

        fn primitive(
            &mut self, value: &[u8], depth: usize
        ) -> Result<(), Self::Error> {
            self.0.push(format!("value {:02x?} at {}", value, depth));
            Ok(())
        }
    }

    #[test]
    fn primitive_value() {
        let nodes = tree(b"\x02\x01\x05").unwrap();
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(
            node.ident(),
            Ident::new(Class::Universal, Form::Primitive, 2)
        );
        assert_eq!(node.length().definite(), Some(1));
        assert_eq!(node.value().unwrap().as_ref(), b"\x05");
        assert!(node.children().is_empty());
        assert_eq!(node.span_len(), 3);
    }

    #[test]
    fn definite_constructed() {
        let nodes = tree(b"\x30\x03\x02\x01\x05").unwrap();
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert_eq!(
            node.ident(),
            Ident::new(Class::Universal, Form::Constructed, 16)
        );
        assert_eq!(node.length().definite(), Some(3));
        assert_eq!(node.value(), None);
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.span_len(), 5);

        let child = &node.children()[0];
        assert_eq!(child.ident().number(), 2);
        assert_eq!(child.value().unwrap().as_ref(), b"\x05");
        assert_eq!(child.span_len(), 3);
    }

    #[test]
    fn indefinite_constructed() {
        let nodes = tree(b"\x30\x80\x02\x01\x05\x00\x00").unwrap();
        assert_eq!(nodes.len(), 1);
        let node = &nodes[0];
        assert!(node.length().is_indefinite());
        // The end-of-contents marker is not a child.
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.span_len(), 7);
    }

    #[test]
    fn top_level_spans() {
        let data = b"\x02\x01\x05\x30\x03\x02\x01\x05";
        let nodes = tree(data).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            nodes.iter().map(Node::span_len).sum::<usize>(),
            data.len()
        );
    }

    #[test]
    fn children_spans_match_declared() {
        let nodes = tree(b"\x30\x08\x02\x01\x05\x04\x03abc").unwrap();
        let node = &nodes[0];
        assert_eq!(node.children().len(), 2);
        assert_eq!(
            node.children().iter().map(Node::span_len).sum::<usize>(),
            node.length().definite().unwrap()
        );
    }

    #[test]
    fn long_forms() {
        let nodes = tree(
            b"\x5f\x87\x68\x81\x03\x01\x02\x03"
        ).unwrap();
        let node = &nodes[0];
        assert_eq!(node.ident().class(), Class::Application);
        assert_eq!(node.ident().number(), 1000);
        assert_eq!(node.length().definite(), Some(3));
        assert_eq!(node.value().unwrap().as_ref(), b"\x01\x02\x03");
        assert_eq!(node.span_len(), 8);
    }

    #[test]
    fn nested_indefinite() {
        let nodes = tree(
            b"\x30\x07\x31\x80\x02\x01\x05\x00\x00"
        ).unwrap();
        let node = &nodes[0];
        assert_eq!(node.children().len(), 1);
        let inner = &node.children()[0];
        assert!(inner.length().is_indefinite());
        assert_eq!(inner.children().len(), 1);
        assert_eq!(inner.span_len(), 7);
        assert_eq!(node.span_len(), 9);
    }

    #[test]
    fn empty_values() {
        let nodes = tree(b"\x30\x00").unwrap();
        assert!(nodes[0].children().is_empty());
        assert_eq!(nodes[0].span_len(), 2);

        let nodes = tree(b"\x30\x80\x00\x00").unwrap();
        assert!(nodes[0].children().is_empty());
        assert_eq!(nodes[0].span_len(), 4);

        let nodes = tree(b"\x05\x00").unwrap();
        assert_eq!(nodes[0].value().unwrap().as_ref(), b"");
    }

    #[test]
    fn end_of_contents_shape_outside_indefinite() {
        // At the top level and in definite content, a marker-shaped value
        // is an ordinary empty primitive.
        let nodes = tree(b"\x00\x00").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].ident(), Ident::END_OF_CONTENTS);
        assert_eq!(nodes[0].value().unwrap().as_ref(), b"");

        let nodes = tree(b"\x30\x02\x00\x00").unwrap();
        assert_eq!(nodes[0].children().len(), 1);
    }

    #[test]
    fn event_order() {
        let mut log = EventLog::default();
        walk(b"\x30\x03\x02\x01\x05", &mut log).unwrap();
        assert_eq!(log.0, [
            "start 1 at 0",
            "ident 16 at 0",
            "length 3 at 0",
            "start 1 at 1",
            "ident 2 at 1",
            "length 1 at 1",
            "value [05] at 1",
        ]);
    }

    #[test]
    fn sibling_counts() {
        let mut log = EventLog::default();
        walk(
            b"\x02\x01\x05\x30\x06\x02\x01\x05\x02\x01\x07", &mut log
        ).unwrap();
        let starts = log.0.iter()
            .filter(|item| item.starts_with("start"))
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(starts, [
            "start 1 at 0",
            "start 2 at 0",
            "start 1 at 1",
            "start 2 at 1",
        ]);
    }

    #[test]
    fn marker_not_rendered() {
        let mut log = EventLog::default();
        walk(b"\x30\x80\x02\x01\x05\x00\x00", &mut log).unwrap();
        assert_eq!(
            log.0.iter().filter(|item| item.starts_with("start")).count(),
            2
        );
        assert!(!log.0.contains(&"ident 0 at 1".to_string()));
    }

    #[test]
    fn indefinite_in_primitive() {
        let err = tree(b"\x02\x80\x00\x00").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndefiniteInPrimitive);
        assert_eq!(err.pos(), Pos::from(0));
    }

    #[test]
    fn child_overruns_parent() {
        let err = tree(b"\x30\x02\x02\x01\x05").unwrap_err();
        assert_eq!(
            err.kind(), ErrorKind::ChildOverrunsParent { bound: 4, end: 5 }
        );
        assert_eq!(err.pos(), Pos::from(2));
    }

    #[test]
    fn overrun_stops_before_second_child() {
        let mut log = EventLog::default();
        let err = walk(b"\x30\x02\x02\x01\x05", &mut log).unwrap_err();
        assert!(matches!(err, TraceError::Decode(_)));
        // The parent and the offending child have been started, nothing
        // else.
        assert_eq!(
            log.0.iter().filter(|item| item.starts_with("start")).count(),
            2
        );
        assert!(!log.0.iter().any(|item| item.starts_with("value")));
    }

    #[test]
    fn unterminated_indefinite() {
        assert_eq!(
            tree(b"\x30\x80\x02\x01\x05").unwrap_err().kind(),
            ErrorKind::UnterminatedIndefiniteLength
        );
        assert_eq!(
            tree(b"\x30\x80").unwrap_err().kind(),
            ErrorKind::UnterminatedIndefiniteLength
        );
    }

    #[test]
    fn marker_crossing_parent_end() {
        let err = tree(b"\x30\x03\x31\x80\x00\x00").unwrap_err();
        assert_eq!(
            err.kind(), ErrorKind::ChildOverrunsParent { bound: 5, end: 6 }
        );
    }

    #[test]
    fn truncated_input() {
        assert_eq!(
            tree(b"").unwrap_err().kind(), ErrorKind::TruncatedInput
        );
        assert_eq!(
            tree(b"\x02").unwrap_err().kind(), ErrorKind::TruncatedInput
        );
        assert_eq!(
            tree(b"\x02\x05\x01").unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
        // Trailing data restarts the top-level loop and fails there.
        assert_eq!(
            tree(b"\x02\x01\x05\xff").unwrap_err().kind(),
            ErrorKind::TruncatedInput
        );
    }

    #[test]
    fn deep_nesting() {
        let mut data = Vec::new();
        for _ in 0..1000 {
            data.extend_from_slice(b"\x30\x80");
        }
        for _ in 0..1000 {
            data.extend_from_slice(b"\x00\x00");
        }
        let nodes = tree(&data).unwrap();
        assert_eq!(nodes.len(), 1);
        let mut node = &nodes[0];
        let mut depth = 1;
        while let Some(child) = node.children().first() {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, 1000);
    }
}
