use crate::position::Range;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum DocError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),
}

impl DocError {
    /// The dotted field path of the offending construct, empty for errors that
    /// have no field (such as [`SyntaxError::NoDocFormat`]).
    pub fn field(&self) -> &str {
        match self {
            DocError::Syntax(e) => e.field(),
        }
    }

    /// The range of the offending construct in original source coordinates.
    pub fn range(&self) -> Option<Range> {
        match self {
            DocError::Syntax(e) => e.range(),
        }
    }
}

/// A structural error raised while parsing one normalized fragment.
///
/// Every variant except `NoDocFormat` carries the fragment it was found in,
/// a span within that fragment for rendering, the absolute `range` in original
/// source coordinates, and the dotted `field` path assembled as the error
/// propagates out of nested elements.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SyntaxError {
    /// Distinguished "this comment is not a documentation block" condition.
    /// Callers usually skip the block silently rather than report it.
    #[error("no recognizable documentation block")]
    #[diagnostic(
        code(docblock::no_doc_format),
        help("A documentation block must start with an element such as <apidoc> or <api>.")
    )]
    NoDocFormat,

    #[error("unexpected token at {field}")]
    #[diagnostic(
        code(docblock::unexpected_token),
        help("The parser found markup it did not expect in this position.")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected {expected}, but found this")]
        span: SourceSpan,
        expected: String,
        range: Range,
        field: String,
    },

    #[error("unexpected end of block at {field}")]
    #[diagnostic(
        code(docblock::unexpected_eof),
        help("The documentation block ended before the element was closed.")
    )]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("Block ended unexpectedly here")]
        span: SourceSpan,
        range: Range,
        field: String,
    },

    #[error("missing required field {field}")]
    #[diagnostic(
        code(docblock::missing_field),
        help("The grammar requires this attribute or child element to be present.")
    )]
    MissingField {
        #[source_code]
        src: NamedSource<String>,
        #[label("This element is missing a required field")]
        span: SourceSpan,
        range: Range,
        field: String,
    },

    #[error("invalid value for {field}")]
    #[diagnostic(
        code(docblock::invalid_value),
        help("The value does not match the format the grammar requires here.")
    )]
    InvalidValue {
        #[source_code]
        src: NamedSource<String>,
        #[label("This value is not valid for the field")]
        span: SourceSpan,
        range: Range,
        field: String,
    },

    #[error("duplicate document declaration")]
    #[diagnostic(
        code(docblock::duplicate_doc),
        help("Only one <apidoc> block may appear across all scanned files.")
    )]
    DuplicateDoc {
        #[source_code]
        src: NamedSource<String>,
        #[label("A document declaration was already parsed elsewhere")]
        span: SourceSpan,
        range: Range,
        field: String,
    },
}

impl SyntaxError {
    pub fn field(&self) -> &str {
        match self {
            SyntaxError::NoDocFormat => "",
            SyntaxError::UnexpectedToken { field, .. }
            | SyntaxError::UnexpectedEof { field, .. }
            | SyntaxError::MissingField { field, .. }
            | SyntaxError::InvalidValue { field, .. }
            | SyntaxError::DuplicateDoc { field, .. } => field,
        }
    }

    pub fn range(&self) -> Option<Range> {
        match self {
            SyntaxError::NoDocFormat => None,
            SyntaxError::UnexpectedToken { range, .. }
            | SyntaxError::UnexpectedEof { range, .. }
            | SyntaxError::MissingField { range, .. }
            | SyntaxError::InvalidValue { range, .. }
            | SyntaxError::DuplicateDoc { range, .. } => Some(*range),
        }
    }

    /// Prepends an ancestor field name to the error's field path as it
    /// propagates out of a nested element.
    pub fn with_field_prefix(mut self, prefix: &str) -> Self {
        match &mut self {
            SyntaxError::NoDocFormat => {}
            SyntaxError::UnexpectedToken { field, .. }
            | SyntaxError::UnexpectedEof { field, .. }
            | SyntaxError::MissingField { field, .. }
            | SyntaxError::InvalidValue { field, .. }
            | SyntaxError::DuplicateDoc { field, .. } => {
                *field = if field.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{prefix}.{field}")
                };
            }
        }
        self
    }
}
