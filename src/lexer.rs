//! The block scanner: walks raw source text with a language's [`BlockRule`]
//! set and extracts documentation comment blocks, each paired with a
//! normalized pseudo-XML fragment.
//!
//! Normalization never deletes or shifts a character. Comment markers and
//! per-line continuation prefixes are overwritten with spaces character for
//! character, so every character of a fragment still sits at its original
//! position in the source file. The structural parser relies on this to report
//! exact coordinates without an offset-mapping table.

use crate::lang::BlockRule;
use crate::position::{Location, Position, Range};
use log::{debug, warn};

/// Which kind of rule produced a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Str,
    SingleComment,
    MultiComment,
}

/// One matched documentation comment: the untouched source span plus its
/// normalized fragment. `raw` and `fragment` always contain the same number
/// of characters.
#[derive(Debug, Clone, PartialEq)]
pub struct DocBlock {
    pub location: Location,
    pub kind: BlockKind,
    pub raw: String,
    pub fragment: String,
}

/// Everything one scan pass found. An empty `blocks` list is the normal
/// "no documentation here" state, not an error. `unterminated` is set when a
/// multi-line comment begin marker was never closed; the blocks found before
/// it are still returned and the caller decides how to report the failure.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub blocks: Vec<DocBlock>,
    pub unterminated: Option<Location>,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    position: Position,
}

/// A single-pass scanner over one file's source text.
pub struct Lexer<'a> {
    input: &'a str,
    rules: &'a [BlockRule],
    uri: &'a str,
    offset: usize,
    position: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, rules: &'a [BlockRule], uri: &'a str) -> Self {
        Self {
            input,
            rules,
            uri,
            offset: 0,
            position: Position::default(),
        }
    }

    /// Scans the whole buffer, returning blocks in source order.
    pub fn scan(mut self) -> ScanOutput {
        let mut blocks = Vec::new();
        let rules = self.rules;

        while !self.at_eof() {
            let mut matched = false;
            for rule in rules {
                let start = self.cursor();
                match rule {
                    BlockRule::Str { begin, end, escape } => {
                        if self.match_str(begin) {
                            self.skip_string(end, escape);
                            matched = true;
                            break;
                        }
                    }
                    BlockRule::SingleComment { begin } => {
                        if self.match_str(begin) {
                            blocks.push(self.scan_single(start, begin));
                            matched = true;
                            break;
                        }
                    }
                    BlockRule::MultiComment { begin, end, prefix } => {
                        if self.match_str(begin) {
                            match self.scan_multi(start, begin, end, prefix) {
                                Some(block) => blocks.push(block),
                                None => {
                                    let loc = Location::new(
                                        self.uri,
                                        Range::new(start.position, self.position),
                                    );
                                    warn!("unterminated block comment at {loc}");
                                    return ScanOutput {
                                        blocks,
                                        unterminated: Some(loc),
                                    };
                                }
                            }
                            matched = true;
                            break;
                        }
                    }
                }
            }
            if !matched {
                self.advance_char();
            }
        }

        debug!("scanned {}: {} block(s)", self.uri, blocks.len());
        ScanOutput {
            blocks,
            unterminated: None,
        }
    }

    /// Consumes a string literal after its begin marker has been matched.
    /// Reaching the end of the buffer is a non-fatal miss: the rest of the
    /// buffer is treated as consumed and no block is produced.
    fn skip_string(&mut self, end: &str, escape: &str) {
        loop {
            if self.at_eof() {
                warn!(
                    "unterminated string literal in {}, skipping the remainder",
                    self.uri
                );
                return;
            }
            if !escape.is_empty() && self.match_str(escape) {
                self.advance_char();
            } else if self.match_str(end) {
                return;
            } else {
                self.advance_char();
            }
        }
    }

    /// Consumes a maximal run of consecutive lines carrying the same
    /// single-line comment marker. `start` is the cursor before the marker;
    /// the marker itself has already been consumed.
    fn scan_single(&mut self, start: Cursor, begin: &str) -> DocBlock {
        loop {
            self.take_line();
            let save = self.cursor();
            if self.at_eof() {
                break;
            }
            self.advance_char(); // the newline
            self.skip_line_space();
            if !self.match_str(begin) {
                // Not a continuation; unread everything past the last line.
                self.restore(save);
                break;
            }
        }

        let raw = &self.input[start.offset..self.offset];
        DocBlock {
            location: Location::new(self.uri, Range::new(start.position, self.position)),
            kind: BlockKind::SingleComment,
            raw: raw.to_string(),
            fragment: normalize_single(raw, begin),
        }
    }

    /// Consumes a block comment through its end marker. Returns `None` when
    /// the end of the buffer is reached first: a silently truncated block
    /// would be misleading, so the failed match is reported instead.
    fn scan_multi(
        &mut self,
        start: Cursor,
        begin: &str,
        end: &str,
        prefix: &str,
    ) -> Option<DocBlock> {
        loop {
            if self.at_eof() {
                return None;
            }
            if self.match_str(end) {
                break;
            }
            self.advance_char();
        }

        let raw = &self.input[start.offset..self.offset];
        Some(DocBlock {
            location: Location::new(self.uri, Range::new(start.position, self.position)),
            kind: BlockKind::MultiComment,
            raw: raw.to_string(),
            fragment: normalize_multi(raw, begin, end, prefix),
        })
    }

    fn at_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    fn cursor(&self) -> Cursor {
        Cursor {
            offset: self.offset,
            position: self.position,
        }
    }

    fn restore(&mut self, cursor: Cursor) {
        self.offset = cursor.offset;
        self.position = cursor.position;
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.offset..].chars().next()
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

    /// Consumes `s` if the input starts with it here.
    fn match_str(&mut self, s: &str) -> bool {
        if self.input[self.offset..].starts_with(s) {
            for _ in s.chars() {
                self.advance_char();
            }
            true
        } else {
            false
        }
    }

    /// Consumes up to, but not including, the next newline.
    fn take_line(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance_char();
        }
    }

    /// Consumes spaces and tabs, but never a newline.
    fn skip_line_space(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == ' ' || c == '\t' {
                self.advance_char();
            } else {
                break;
            }
        }
    }
}

/// Blanks the line-comment markers out of a merged run of comment lines.
/// A run of marker characters at the start of each line (after leading
/// whitespace) becomes an equal-length run of spaces; everything else is
/// preserved verbatim.
fn normalize_single(raw: &str, begin: &str) -> String {
    let is_marker = |c: char| begin.contains(c);
    let mut out = String::with_capacity(raw.len());
    let mut newline = true;
    let mut run = 0usize;

    for c in raw.chars() {
        if c == '\n' {
            out.extend(std::iter::repeat(' ').take(run));
            run = 0;
            out.push(c);
            newline = true;
        } else if newline {
            if is_marker(c) {
                run += 1;
            } else if c.is_whitespace() && run == 0 {
                out.push(c);
            } else {
                out.extend(std::iter::repeat(' ').take(run));
                run = 0;
                out.push(c);
                newline = false;
            }
        } else {
            out.push(c);
        }
    }
    out.extend(std::iter::repeat(' ').take(run));
    out
}

/// Blanks the begin/end markers of a block comment, then the per-line
/// continuation prefix. A prefix run directly followed by non-whitespace is
/// kept verbatim: it is content (`*emphasis*`), not decoration.
fn normalize_multi(raw: &str, begin: &str, end: &str, prefix: &str) -> String {
    let mut chars: Vec<char> = raw.chars().collect();

    for slot in chars.iter_mut().take(begin.chars().count()) {
        *slot = ' ';
    }
    let end_len = end.chars().count();
    let total = chars.len();
    for slot in chars.iter_mut().skip(total.saturating_sub(end_len)) {
        *slot = ' ';
    }

    if prefix.is_empty() {
        return chars.into_iter().collect();
    }

    let is_marker = |c: char| prefix.contains(c);
    let mut out = String::with_capacity(raw.len());
    let mut newline = true;
    let mut run: Vec<char> = Vec::new();

    for c in chars {
        if c == '\n' {
            out.extend(std::iter::repeat(' ').take(run.len()));
            run.clear();
            out.push(c);
            newline = true;
        } else if newline {
            if is_marker(c) {
                run.push(c);
            } else if c.is_whitespace() {
                if !run.is_empty() {
                    out.extend(std::iter::repeat(' ').take(run.len()));
                    run.clear();
                    newline = false;
                }
                out.push(c);
            } else {
                if !run.is_empty() {
                    out.extend(run.drain(..));
                }
                out.push(c);
                newline = false;
            }
        } else {
            out.push(c);
        }
    }
    out.extend(std::iter::repeat(' ').take(run.len()));
    out
}
