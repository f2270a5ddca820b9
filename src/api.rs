//! The crate's primary entry points: single-source extraction, the
//! thread-safe batch accumulator, serialization of the finished tree, and the
//! usage sheet that maps AST nodes to help text.

use crate::ast::ApiDoc;
use crate::error::{DocError, SyntaxError};
use crate::lang::Language;
use crate::lexer::{Lexer, ScanOutput};
use crate::position::Position;
use log::{debug, warn};
use miette::NamedSource;
use std::collections::HashMap;
use std::sync::Mutex;

/// Scans one source file and returns its documentation blocks, already
/// normalized into pseudo-XML fragments. The blocks are not parsed; feed them
/// to a [`Batch`] or to [`ApiDoc::parse_block`] for that.
pub fn extract(source: &str, lang: &Language, uri: &str) -> ScanOutput {
    debug!("extracting doc blocks from {uri} as {}", lang.name);
    Lexer::new(source, lang.rules, uri).scan()
}

struct BatchState {
    doc: ApiDoc,
    errors: Vec<DocError>,
}

/// Accumulates documentation from many files into a single [`ApiDoc`].
///
/// Files may be added from multiple threads; a mutex around the accumulator
/// keeps the merged tree and the error list consistent. Errors never abort
/// the batch: each failing block is recorded and the remaining blocks of the
/// same file still contribute.
pub struct Batch {
    state: Mutex<BatchState>,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

impl Batch {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BatchState {
                doc: ApiDoc::new(),
                errors: Vec::new(),
            }),
        }
    }

    /// Scans `source` and folds every documentation block it contains into
    /// the accumulated tree. Returns the number of errors recorded for this
    /// file.
    ///
    /// The scan and the structural parse run entirely outside the lock, so
    /// files added from different threads parse in parallel; the mutex guards
    /// only the merge into the shared tree. A root block that a different
    /// file already contributed is detected at merge time.
    pub fn add_file(&self, source: &str, lang: &Language, uri: &str) -> usize {
        let output = extract(source, lang, uri);
        let mut local = ApiDoc::new();
        let mut errors: Vec<DocError> = Vec::new();

        if let Some(loc) = &output.unterminated {
            warn!("unterminated comment block in {uri}");
            let offset = byte_offset(source, loc.range.start);
            errors.push(DocError::Syntax(SyntaxError::UnexpectedEof {
                src: NamedSource::new(uri, source.to_string()),
                span: (offset, source.len().saturating_sub(offset)).into(),
                range: loc.range,
                field: String::new(),
            }));
        }

        for block in &output.blocks {
            if let Err(e) = local.parse_block(block) {
                errors.push(e.into());
            }
        }

        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(base) = state.doc.merge(local) {
            let start = byte_offset(source, base.range.start);
            let end = byte_offset(source, base.range.end);
            errors.push(DocError::Syntax(SyntaxError::DuplicateDoc {
                src: NamedSource::new(uri, source.to_string()),
                span: (start, end.saturating_sub(start)).into(),
                range: base.range,
                field: base.name.value,
            }));
        }
        let recorded = errors.len();
        state.errors.append(&mut errors);
        recorded
    }

    /// Consumes the batch, yielding the merged tree and every error recorded
    /// along the way. The tree holds whatever parsed successfully even when
    /// errors are present.
    pub fn finish(self) -> (ApiDoc, Vec<DocError>) {
        let state = match self.state.into_inner() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        (state.doc, state.errors)
    }
}

/// Byte offset of a position within `source`. Positions count codepoints, so
/// the character column is re-measured against the line's bytes.
fn byte_offset(source: &str, pos: Position) -> usize {
    let mut offset = 0;
    for (i, line) in source.split('\n').enumerate() {
        if i as u32 == pos.line {
            return offset
                + line
                    .char_indices()
                    .nth(pos.character as usize)
                    .map_or(line.len(), |(b, _)| b);
        }
        offset += line.len() + 1;
    }
    source.len()
}

impl ApiDoc {
    /// Serializes the tree into pretty-printed JSON.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the tree into YAML.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Help text for AST constructs, keyed by [`crate::ast::NodeBase::usage_key`].
///
/// The sheet is plain data so hosts can replace or localize entries before
/// handing it to an editor integration.
#[derive(Debug, Clone, Default)]
pub struct UsageSheet {
    entries: HashMap<&'static str, String>,
}

impl UsageSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in English sheet covering every construct the grammars emit.
    pub fn builtin() -> Self {
        let mut sheet = Self::new();
        for (key, text) in [
            ("usage-apidoc", "The root metadata block for the documented service."),
            ("usage-apidoc-version", "The documented service's version, in semver form."),
            ("usage-apidoc-title", "The human-readable title of the service."),
            ("usage-apidoc-description", "A rich-text description of the service."),
            ("usage-apidoc-contact", "Contact information for the service's maintainers."),
            ("usage-apidoc-license", "The license the documentation is published under."),
            ("usage-apidoc-tags", "A tag that API entries can reference by name."),
            ("usage-apidoc-servers", "A server the documented APIs are hosted on."),
            ("usage-apidoc-mimetypes", "A mimetype the service accepts or produces."),
            ("usage-apidoc-apis", "One documented API entry."),
            ("usage-tag-name", "The tag's unique name, referenced from API entries."),
            ("usage-tag-title", "The tag's display title."),
            ("usage-tag-deprecated", "The version at which this tag was deprecated."),
            ("usage-server-name", "The server's unique name, referenced from API entries."),
            ("usage-server-url", "The server's base URL."),
            ("usage-server-summary", "A one-line summary of the server."),
            ("usage-server-deprecated", "The version at which this server was deprecated."),
            ("usage-server-description", "A rich-text description of the server."),
            ("usage-contact-name", "The contact's name."),
            ("usage-contact-url", "The contact's web page."),
            ("usage-contact-email", "The contact's email address."),
            ("usage-license-text", "The license's display name."),
            ("usage-license-url", "A link to the license's full text."),
            ("usage-api-method", "The HTTP method this entry documents."),
            ("usage-api-version", "The version this entry first appeared in."),
            ("usage-api-deprecated", "The version at which this entry was deprecated."),
            ("usage-api-summary", "A one-line summary of the entry."),
            ("usage-api-description", "A rich-text description of the entry."),
            ("usage-api-path", "The path the entry is served on."),
            ("usage-api-tags", "A reference to a tag declared in the root block."),
            ("usage-api-servers", "A reference to a server declared in the root block."),
            ("usage-api-headers", "A request header the entry expects."),
            ("usage-api-requests", "A request body the entry accepts."),
            ("usage-api-responses", "A response the entry can produce."),
            ("usage-api-callback", "A callback the entry makes to the caller."),
            ("usage-path-path", "The path template, with {placeholders} for params."),
            ("usage-path-params", "A parameter interpolated into the path."),
            ("usage-path-queries", "A query-string value the path accepts."),
            ("usage-param-name", "The parameter's name."),
            ("usage-param-type", "The parameter's type: string, number, bool, object or none."),
            ("usage-param-deprecated", "The version at which this parameter was deprecated."),
            ("usage-param-default", "The value used when the parameter is omitted."),
            ("usage-param-optional", "Whether the parameter may be omitted."),
            ("usage-param-array", "Whether the parameter holds multiple values."),
            ("usage-param-summary", "A one-line summary of the parameter."),
            ("usage-param-description", "A rich-text description of the parameter."),
            ("usage-param-enums", "One allowed value of an enumerated parameter."),
            ("usage-enum-value", "The literal value this enum entry allows."),
            ("usage-body-mimetype", "The mimetype of the body."),
            ("usage-body-type", "The type of the body's top-level value."),
            ("usage-body-headers", "A header attached to the body."),
            ("usage-body-params", "A member of the body's top-level object."),
            ("usage-example", "An example payload."),
            ("usage-example-mimetype", "The mimetype of the example payload."),
            ("usage-example-summary", "A one-line summary of the example."),
            ("usage-response-status", "The HTTP status code of the response."),
            ("usage-callback-method", "The HTTP method of the callback."),
        ] {
            sheet.insert(key, text);
        }
        sheet
    }

    pub fn insert(&mut self, key: &'static str, text: impl Into<String>) {
        self.entries.insert(key, text.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}
