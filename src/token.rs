//! Tokenizer for normalized pseudo-XML fragments.
//!
//! Because normalization preserves every character's offset, walking a
//! fragment with the cursor initialized to the block's start position yields
//! absolute source coordinates directly. Each event also carries its byte span
//! within the fragment for diagnostic rendering.

use crate::error::SyntaxError;
use crate::position::{Position, Range};
use miette::NamedSource;
use serde::Serialize;

/// A string with the range it occupies in original source coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Str {
    pub range: Range,
    pub value: String,
}

impl Str {
    pub fn new(range: Range, value: impl Into<String>) -> Self {
        Self {
            range,
            value: value.into(),
        }
    }

    pub fn v(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// One `name="value"` attribute. `range` spans the whole attribute from the
/// first character of the name through the closing quote; name and value each
/// carry their own range as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: Str,
    pub value: Str,
    pub range: Range,
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    pub name: Str,
    pub attrs: Vec<Attr>,
    pub self_close: bool,
    /// From `<` through `>`, exclusive end.
    pub range: Range,
    pub span: (usize, usize),
}

impl StartElement {
    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.name.value == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndElement {
    pub name: Str,
    pub range: Range,
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(StartElement),
    End(EndElement),
    Text(Str),
    CData(Str),
    Comment(Str),
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    position: Position,
}

/// Walks one fragment and produces its event sequence.
pub struct Tokenizer<'a> {
    fragment: &'a str,
    uri: &'a str,
    offset: usize,
    position: Position,
}

impl<'a> Tokenizer<'a> {
    /// `base` is the position of the fragment's first character in the
    /// original file, i.e. the owning block's start position.
    pub fn new(fragment: &'a str, base: Position, uri: &'a str) -> Self {
        Self {
            fragment,
            uri,
            offset: 0,
            position: base,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Event>, SyntaxError> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(events)
    }

    fn next_event(&mut self) -> Result<Option<Event>, SyntaxError> {
        if self.at_eof() {
            return Ok(None);
        }

        if self.rest().starts_with("<!--") {
            return self.comment().map(Some);
        }
        if self.rest().starts_with("<![CDATA[") {
            return self.cdata().map(Some);
        }
        if self.rest().starts_with("</") {
            return self.end_element().map(Some);
        }
        if self.rest().starts_with('<') {
            return self.start_element().map(Some);
        }
        self.text().map(Some)
    }

    fn text(&mut self) -> Result<Event, SyntaxError> {
        let start = self.cursor();
        while let Some(c) = self.peek_char() {
            if c == '<' {
                break;
            }
            self.advance_char();
        }
        Ok(Event::Text(self.str_between(start)))
    }

    fn comment(&mut self) -> Result<Event, SyntaxError> {
        let open = self.cursor();
        self.match_str("<!--");
        let body = self.cursor();
        loop {
            if self.at_eof() {
                return Err(self.err_eof(open));
            }
            if self.rest().starts_with("-->") {
                let value = self.str_between(body);
                self.match_str("-->");
                return Ok(Event::Comment(value));
            }
            self.advance_char();
        }
    }

    fn cdata(&mut self) -> Result<Event, SyntaxError> {
        let open = self.cursor();
        self.match_str("<![CDATA[");
        let body = self.cursor();
        loop {
            if self.at_eof() {
                return Err(self.err_eof(open));
            }
            if self.rest().starts_with("]]>") {
                let value = self.str_between(body);
                self.match_str("]]>");
                return Ok(Event::CData(value));
            }
            self.advance_char();
        }
    }

    fn end_element(&mut self) -> Result<Event, SyntaxError> {
        let open = self.cursor();
        self.match_str("</");
        let name_start = self.cursor();
        while let Some(c) = self.peek_char() {
            if c == '>' || c.is_whitespace() {
                break;
            }
            self.advance_char();
        }
        let name = self.str_between(name_start);
        if name.is_empty() {
            return Err(self.err_unexpected(open, "an element name"));
        }
        self.skip_space();
        if !self.match_str(">") {
            return Err(if self.at_eof() {
                self.err_eof(open)
            } else {
                self.err_unexpected(open, "'>'")
            });
        }
        Ok(Event::End(EndElement {
            name,
            range: Range::new(open.position, self.position),
            span: (open.offset, self.offset),
        }))
    }

    fn start_element(&mut self) -> Result<Event, SyntaxError> {
        let open = self.cursor();
        self.match_str("<");
        let name_start = self.cursor();
        while let Some(c) = self.peek_char() {
            if c == '>' || c == '/' || c.is_whitespace() {
                break;
            }
            self.advance_char();
        }
        let name = self.str_between(name_start);
        if name.is_empty() {
            return Err(self.err_unexpected(open, "an element name"));
        }

        let mut attrs = Vec::new();
        let self_close;
        loop {
            self.skip_space();
            if self.at_eof() {
                return Err(self.err_eof(open));
            }
            if self.match_str("/>") {
                self_close = true;
                break;
            }
            if self.match_str(">") {
                self_close = false;
                break;
            }
            attrs.push(self.attribute()?);
        }

        Ok(Event::Start(StartElement {
            name,
            attrs,
            self_close,
            range: Range::new(open.position, self.position),
            span: (open.offset, self.offset),
        }))
    }

    fn attribute(&mut self) -> Result<Attr, SyntaxError> {
        let start = self.cursor();
        while let Some(c) = self.peek_char() {
            if c == '=' || c == '>' || c == '/' || c.is_whitespace() {
                break;
            }
            self.advance_char();
        }
        let name = self.str_between(start);
        if name.is_empty() {
            return Err(self.err_unexpected(start, "an attribute name"));
        }
        self.skip_space();
        if !self.match_str("=") {
            return Err(self.err_unexpected(start, "'=' after the attribute name"));
        }
        self.skip_space();
        if !self.match_str("\"") {
            return Err(self.err_unexpected(start, "a quoted attribute value"));
        }
        let value_start = self.cursor();
        while let Some(c) = self.peek_char() {
            if c == '"' {
                break;
            }
            self.advance_char();
        }
        let value = self.str_between(value_start);
        if !self.match_str("\"") {
            return Err(self.err_eof(start));
        }
        Ok(Attr {
            name,
            value,
            range: Range::new(start.position, self.position),
            span: (start.offset, self.offset),
        })
    }

    fn str_between(&self, start: Cursor) -> Str {
        Str::new(
            Range::new(start.position, self.position),
            &self.fragment[start.offset..self.offset],
        )
    }

    fn rest(&self) -> &str {
        &self.fragment[self.offset..]
    }

    fn at_eof(&self) -> bool {
        self.offset >= self.fragment.len()
    }

    fn cursor(&self) -> Cursor {
        Cursor {
            offset: self.offset,
            position: self.position,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.position.line += 1;
            self.position.character = 0;
        } else {
            self.position.character += 1;
        }
        Some(c)
    }

    fn match_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            for _ in s.chars() {
                self.advance_char();
            }
            true
        } else {
            false
        }
    }

    fn skip_space(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn src(&self) -> NamedSource<String> {
        NamedSource::new(self.uri, self.fragment.to_string())
    }

    fn err_eof(&self, start: Cursor) -> SyntaxError {
        SyntaxError::UnexpectedEof {
            src: self.src(),
            span: (start.offset, self.offset - start.offset).into(),
            range: Range::new(start.position, self.position),
            field: String::new(),
        }
    }

    fn err_unexpected(&self, start: Cursor, expected: &str) -> SyntaxError {
        let len = (self.offset - start.offset).max(1).min(
            self.fragment
                .len()
                .saturating_sub(start.offset),
        );
        SyntaxError::UnexpectedToken {
            src: self.src(),
            span: (start.offset, len).into(),
            expected: expected.to_string(),
            range: Range::new(start.position, self.position),
            field: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(fragment: &str) -> Vec<Event> {
        Tokenizer::new(fragment, Position::default(), "test")
            .tokenize()
            .unwrap()
    }

    #[test]
    fn test_empty_fragment() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_self_closing_element_with_attrs() {
        let events = tokenize(r#"<tag name="tag1" title="tag description" />"#);
        assert_eq!(events.len(), 1);
        let Event::Start(el) = &events[0] else {
            panic!("expected a start element");
        };
        assert!(el.self_close);
        assert_eq!(el.name.v(), "tag");
        assert_eq!(el.name.range, Range::new(Position::new(0, 1), Position::new(0, 4)));
        assert_eq!(el.range, Range::new(Position::new(0, 0), Position::new(0, 43)));

        let name = el.attr("name").unwrap();
        assert_eq!(name.value.v(), "tag1");
        assert_eq!(name.name.range, Range::new(Position::new(0, 5), Position::new(0, 9)));
        assert_eq!(name.value.range, Range::new(Position::new(0, 11), Position::new(0, 15)));
        assert_eq!(name.range, Range::new(Position::new(0, 5), Position::new(0, 16)));

        let title = el.attr("title").unwrap();
        assert_eq!(title.value.v(), "tag description");
    }

    #[test]
    fn test_open_close_with_text() {
        let events = tokenize("<title>The API</title>");
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], Event::Start(el) if !el.self_close));
        let Event::Text(text) = &events[1] else {
            panic!("expected text");
        };
        assert_eq!(text.v(), "The API");
        assert_eq!(text.range, Range::new(Position::new(0, 7), Position::new(0, 14)));
        assert!(matches!(&events[2], Event::End(el) if el.name.v() == "title"));
    }

    #[test]
    fn test_positions_offset_by_base() {
        // A fragment starting mid-file reports absolute coordinates.
        let events = Tokenizer::new("<x attr=\"1\"/>", Position::new(4, 3), "test")
            .tokenize()
            .unwrap();
        let Event::Start(el) = &events[0] else {
            panic!();
        };
        assert_eq!(el.range.start, Position::new(4, 3));
        assert_eq!(el.name.range, Range::new(Position::new(4, 4), Position::new(4, 5)));
        assert_eq!(el.attr("attr").unwrap().value.range.start, Position::new(4, 12));
    }

    #[test]
    fn test_multiline_positions() {
        let events = tokenize("<a>\n  <b/>\n</a>");
        let Event::Start(b) = &events[2] else {
            panic!("expected <b/>: {events:?}");
        };
        assert_eq!(b.name.v(), "b");
        assert_eq!(b.range, Range::new(Position::new(1, 2), Position::new(1, 6)));
    }

    #[test]
    fn test_comment_and_cdata() {
        let events = tokenize("<!-- note --><![CDATA[{\"x\":1}]]>");
        assert!(matches!(&events[0], Event::Comment(c) if c.v() == " note "));
        assert!(matches!(&events[1], Event::CData(c) if c.v() == "{\"x\":1}"));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Tokenizer::new("<!-- open", Position::default(), "test")
            .tokenize()
            .unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_unterminated_element() {
        let err = Tokenizer::new("<tag name=\"x\"", Position::default(), "test")
            .tokenize()
            .unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_malformed_attribute() {
        let err = Tokenizer::new("<tag name>", Position::default(), "test")
            .tokenize()
            .unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let fragment = r#"<api method="GET"><path path="/users" /></api>"#;
        assert_eq!(tokenize(fragment), tokenize(fragment));
    }
}
