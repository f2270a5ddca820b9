//! The structural parser's machinery: an event cursor over one tokenized
//! fragment, root-element detection, and the helpers entity grammars use to
//! enforce required fields and report positioned errors.

use crate::error::SyntaxError;
use crate::lexer::DocBlock;
use crate::position::{Position, Range};
use crate::token::{Attr, EndElement, Event, StartElement, Str, Tokenizer};
use miette::NamedSource;
use std::collections::VecDeque;

/// Returns the first element's tag name without parsing the fragment body.
///
/// Leading whitespace and `<!-- -->` preambles are skipped. When no opening
/// tag appears before the end of input (a lone closing tag, plain text, and
/// an unterminated leading comment all count as EOF-equivalent), the
/// distinguished [`SyntaxError::NoDocFormat`] is returned so callers can skip
/// the block silently.
pub fn find_root_element_name(fragment: &str) -> Result<String, SyntaxError> {
    let mut rest = fragment.trim_start();
    while let Some(after) = rest.strip_prefix("<!--") {
        match after.find("-->") {
            Some(i) => rest = after[i + 3..].trim_start(),
            None => return Err(SyntaxError::NoDocFormat),
        }
    }
    if rest.is_empty() || rest.starts_with("</") || !rest.starts_with('<') {
        return Err(SyntaxError::NoDocFormat);
    }
    let name: String = rest[1..]
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
        .collect();
    if name.is_empty() {
        Err(SyntaxError::NoDocFormat)
    } else {
        Ok(name)
    }
}

/// A direct child of an element, handed to grammar callbacks in order.
#[derive(Debug)]
pub enum Child {
    Element(StartElement),
    Text(Str),
    CData(Str),
}

/// Cursor over one fragment's event stream.
pub struct NodeParser {
    uri: String,
    fragment: String,
    events: VecDeque<Event>,
}

impl NodeParser {
    pub fn from_block(block: &DocBlock) -> Result<Self, SyntaxError> {
        Self::from_fragment(
            &block.fragment,
            block.location.range.start,
            &block.location.uri,
        )
    }

    pub fn from_fragment(fragment: &str, base: Position, uri: &str) -> Result<Self, SyntaxError> {
        let events = Tokenizer::new(fragment, base, uri).tokenize()?;
        Ok(Self {
            uri: uri.to_string(),
            fragment: fragment.to_string(),
            events: events.into(),
        })
    }

    pub fn next(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// The uri of the file the fragment came from.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Consumes up to the first start element, skipping comment preambles and
    /// blank text. Anything else before it means the fragment holds no
    /// recognizable document.
    pub fn root_element(&mut self) -> Result<StartElement, SyntaxError> {
        loop {
            match self.next() {
                None => return Err(SyntaxError::NoDocFormat),
                Some(Event::Comment(_)) => {}
                Some(Event::Text(t)) if t.v().trim().is_empty() => {}
                Some(Event::Start(el)) => return Ok(el),
                Some(_) => return Err(SyntaxError::NoDocFormat),
            }
        }
    }

    /// Walks the direct children of `start`, invoking `f` for each one, and
    /// returns the element's full range (through its end tag). Callbacks
    /// parsing a child element must consume that child's whole subtree.
    pub fn element_children(
        &mut self,
        start: &StartElement,
        mut f: impl FnMut(&mut NodeParser, Child) -> Result<(), SyntaxError>,
    ) -> Result<Range, SyntaxError> {
        if start.self_close {
            return Ok(start.range);
        }
        loop {
            match self.next() {
                None => return Err(self.eof_error(start)),
                Some(Event::Comment(_)) => {}
                Some(Event::Text(t)) => f(self, Child::Text(t))?,
                Some(Event::CData(t)) => f(self, Child::CData(t))?,
                Some(Event::Start(el)) => f(self, Child::Element(el))?,
                Some(Event::End(el)) => {
                    if el.name.value == start.name.value {
                        return Ok(Range::new(start.range.start, el.range.end));
                    }
                    return Err(self.unexpected_end(&el, &start.name.value));
                }
            }
        }
    }

    /// Consumes an element's whole subtree without interpreting it. Used for
    /// unknown child elements, which the grammars ignore for forward
    /// compatibility.
    pub fn skip_element(&mut self, start: &StartElement) -> Result<(), SyntaxError> {
        if start.self_close {
            return Ok(());
        }
        let mut depth = 0usize;
        loop {
            match self.next() {
                None => return Err(self.eof_error(start)),
                Some(Event::Start(el)) if !el.self_close => depth += 1,
                Some(Event::End(el)) => {
                    if depth == 0 {
                        return if el.name.value == start.name.value {
                            Ok(())
                        } else {
                            Err(self.unexpected_end(&el, &start.name.value))
                        };
                    }
                    depth -= 1;
                }
                Some(_) => {}
            }
        }
    }

    /// Consumes through `start`'s end tag and returns the verbatim inner text
    /// plus the element's full range. Used for rich-text content that may
    /// itself contain markup which must survive untouched.
    pub fn raw_inner(&mut self, start: &StartElement) -> Result<(Str, Range), SyntaxError> {
        if start.self_close {
            let empty = Str::new(Range::new(start.range.end, start.range.end), "");
            return Ok((empty, start.range));
        }
        let mut depth = 0usize;
        loop {
            match self.next() {
                None => return Err(self.eof_error(start)),
                Some(Event::Start(el)) if !el.self_close => depth += 1,
                Some(Event::End(el)) => {
                    if depth == 0 {
                        if el.name.value != start.name.value {
                            return Err(self.unexpected_end(&el, &start.name.value));
                        }
                        let inner = Str::new(
                            Range::new(start.range.end, el.range.start),
                            &self.fragment[start.span.1..el.span.0],
                        );
                        return Ok((inner, Range::new(start.range.start, el.range.end)));
                    }
                    depth -= 1;
                }
                Some(_) => {}
            }
        }
    }

    fn src(&self) -> NamedSource<String> {
        NamedSource::new(self.uri.clone(), self.fragment.clone())
    }

    /// A required field was absent; the error's range is the container
    /// element's own range, since the missing field has no position.
    pub fn missing_field(
        &self,
        elem_span: (usize, usize),
        elem_range: Range,
        field: &str,
    ) -> SyntaxError {
        SyntaxError::MissingField {
            src: self.src(),
            span: (elem_span.0, elem_span.1 - elem_span.0).into(),
            range: elem_range,
            field: field.to_string(),
        }
    }

    /// An attribute value failed validation; the error carries the value's
    /// own range, not the container's.
    pub fn invalid_value(&self, attr: &Attr, field: &str) -> SyntaxError {
        SyntaxError::InvalidValue {
            src: self.src(),
            span: (attr.span.0, attr.span.1 - attr.span.0).into(),
            range: attr.value.range,
            field: field.to_string(),
        }
    }

    pub fn duplicate_doc(&self, start: &StartElement) -> SyntaxError {
        SyntaxError::DuplicateDoc {
            src: self.src(),
            span: (start.span.0, start.span.1 - start.span.0).into(),
            range: start.range,
            field: start.name.value.clone(),
        }
    }

    fn eof_error(&self, start: &StartElement) -> SyntaxError {
        SyntaxError::UnexpectedEof {
            src: self.src(),
            span: (start.span.0, start.span.1 - start.span.0).into(),
            range: start.range,
            field: start.name.value.clone(),
        }
    }

    fn unexpected_end(&self, el: &EndElement, expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            src: self.src(),
            span: (el.span.0, el.span.1 - el.span.0).into(),
            expected: format!("</{expected}>"),
            range: el.range,
            field: el.name.value.clone(),
        }
    }
}
