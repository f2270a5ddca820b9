//! Declarative comment-syntax descriptions for the supported source languages.
//!
//! A language is just an ordered list of [`BlockRule`]s. The scanner probes the
//! rules in declaration order at every position, so rules whose markers share a
//! prefix must be declared longest first (`"""` before `"`), and string rules
//! come before comment rules so a comment marker inside a string literal is
//! never misidentified.

/// How one kind of block begins and ends in a particular language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRule {
    /// A string literal. While inside one, only `end` and `escape` are
    /// recognized; no documentation is ever extracted from a string.
    Str {
        begin: &'static str,
        end: &'static str,
        /// Escape marker, empty for raw strings such as Go backtick strings.
        escape: &'static str,
    },
    /// A line comment. Consecutive lines carrying the same marker merge into
    /// one logical block.
    SingleComment { begin: &'static str },
    /// A block comment. `prefix` is the per-line continuation marker (for
    /// example a leading `*`) blanked during normalization; may be empty.
    MultiComment {
        begin: &'static str,
        end: &'static str,
        prefix: &'static str,
    },
}

/// One supported source language: its identifier, the file extensions it
/// claims, and its comment grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub rules: &'static [BlockRule],
}

const C_STRINGS: [BlockRule; 2] = [
    BlockRule::Str {
        begin: "\"",
        end: "\"",
        escape: "\\",
    },
    BlockRule::Str {
        begin: "'",
        end: "'",
        escape: "\\",
    },
];

const C_COMMENTS: [BlockRule; 2] = [
    BlockRule::SingleComment { begin: "//" },
    BlockRule::MultiComment {
        begin: "/*",
        end: "*/",
        prefix: "*",
    },
];

const C_STYLE: &[BlockRule] = &[C_STRINGS[0], C_STRINGS[1], C_COMMENTS[0], C_COMMENTS[1]];

const GO: &[BlockRule] = &[
    C_STRINGS[0],
    C_STRINGS[1],
    BlockRule::Str {
        begin: "`",
        end: "`",
        escape: "",
    },
    C_COMMENTS[0],
    C_COMMENTS[1],
];

const PYTHON: &[BlockRule] = &[
    BlockRule::MultiComment {
        begin: "\"\"\"",
        end: "\"\"\"",
        prefix: "",
    },
    BlockRule::MultiComment {
        begin: "'''",
        end: "'''",
        prefix: "",
    },
    C_STRINGS[0],
    C_STRINGS[1],
    BlockRule::SingleComment { begin: "#" },
];

const RUBY: &[BlockRule] = &[
    C_STRINGS[0],
    C_STRINGS[1],
    BlockRule::MultiComment {
        begin: "=begin",
        end: "=end",
        prefix: "",
    },
    BlockRule::SingleComment { begin: "#" },
];

const PHP: &[BlockRule] = &[
    C_STRINGS[0],
    C_STRINGS[1],
    C_COMMENTS[0],
    BlockRule::SingleComment { begin: "#" },
    C_COMMENTS[1],
];

/// All built-in languages, in lookup order.
pub const LANGUAGES: &[Language] = &[
    Language {
        name: "c",
        extensions: &["c", "h"],
        rules: C_STYLE,
    },
    Language {
        name: "c++",
        extensions: &["cpp", "cxx", "cc", "hpp", "hxx"],
        rules: C_STYLE,
    },
    Language {
        name: "c#",
        extensions: &["cs"],
        rules: C_STYLE,
    },
    Language {
        name: "go",
        extensions: &["go"],
        rules: GO,
    },
    Language {
        name: "java",
        extensions: &["java"],
        rules: C_STYLE,
    },
    Language {
        name: "javascript",
        extensions: &["js", "mjs", "jsx"],
        rules: C_STYLE,
    },
    Language {
        name: "kotlin",
        extensions: &["kt", "kts"],
        rules: C_STYLE,
    },
    Language {
        name: "php",
        extensions: &["php"],
        rules: PHP,
    },
    Language {
        name: "python",
        extensions: &["py"],
        rules: PYTHON,
    },
    Language {
        name: "ruby",
        extensions: &["rb"],
        rules: RUBY,
    },
    Language {
        name: "rust",
        extensions: &["rs"],
        rules: C_STYLE,
    },
    Language {
        name: "swift",
        extensions: &["swift"],
        rules: C_STYLE,
    },
    Language {
        name: "typescript",
        extensions: &["ts", "tsx"],
        rules: C_STYLE,
    },
];

impl Language {
    /// Looks a language up by its identifier, case-insensitively.
    pub fn find(name: &str) -> Option<&'static Language> {
        LANGUAGES.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Looks a language up by file extension, with or without a leading dot.
    pub fn by_extension(ext: &str) -> Option<&'static Language> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        LANGUAGES
            .iter()
            .find(|l| l.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}
