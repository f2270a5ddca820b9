use serde::Serialize;
use std::fmt::Display;

/// A zero-based position within a source file, compatible with the LSP
/// `Position` shape.
///
/// `character` counts Unicode scalar values (codepoints) from the start of the
/// line, not bytes and not UTF-16 code units. Consumers speaking a UTF-16
/// protocol must convert at their boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range within a source file: `start` is inclusive, `end` is
/// exclusive. `start <= end` always holds for ranges produced by this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A range is empty when it spans no characters at all.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Whether `other` lies entirely within this range.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A range within a named source file. Used for cross-file references and for
/// anchoring every reported error to its origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

impl Location {
    pub fn new(uri: impl Into<String>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.range.start;
        let e = self.range.end;
        write!(
            f,
            "{}[{}:{},{}:{}]",
            self.uri, s.line, s.character, e.line, e.character
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(Position::new(1, 1), Position::new(1, 1));
    }

    #[test]
    fn test_range_is_empty() {
        let p = Position::new(3, 7);
        assert!(Range::new(p, p).is_empty());
        assert!(!Range::new(p, Position::new(3, 8)).is_empty());
    }

    #[test]
    fn test_range_contains() {
        let r = Range::new(Position::new(1, 2), Position::new(3, 0));
        assert!(r.contains(Position::new(1, 2)));
        assert!(r.contains(Position::new(2, 99)));
        assert!(!r.contains(Position::new(3, 0))); // end is exclusive
        assert!(!r.contains(Position::new(0, 9)));
    }

    #[test]
    fn test_range_contains_range() {
        let outer = Range::new(Position::new(0, 0), Position::new(10, 0));
        let inner = Range::new(Position::new(2, 1), Position::new(2, 9));
        assert!(outer.contains_range(&inner));
        assert!(!inner.contains_range(&outer));
        assert!(outer.contains_range(&outer));
    }

    #[test]
    fn test_location_display() {
        let loc = Location::new(
            "src/main.rs",
            Range::new(Position::new(1, 2), Position::new(3, 4)),
        );
        assert_eq!(loc.to_string(), "src/main.rs[1:2,3:4]");
    }
}
