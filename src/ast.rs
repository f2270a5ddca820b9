//! The documentation entity schema and its grammars.
//!
//! Every node carries a [`NodeBase`] (its usage key, its full range in
//! original source coordinates, and its positioned element name), and every
//! attribute is wrapped in a typed carrier with the value's own range, so any
//! field can be reported on or rewritten independently of its container.
//!
//! Parsing is fail-fast per entity: the first structural error aborts the
//! entity being built and propagates to the batch layer, which records it and
//! moves on to the next block. Unknown attributes and child elements are
//! ignored uniformly, for forward compatibility.

use crate::error::SyntaxError;
use crate::lexer::DocBlock;
use crate::parser::{find_root_element_name, Child, NodeParser};
use crate::position::Range;
use crate::token::{Attr, StartElement, Str};
use crate::utils::is_valid_semver;
use serde::Serialize;

/// Common head of every AST node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeBase {
    /// Opaque key used to look up help text for this construct in an injected
    /// [`crate::api::UsageSheet`].
    pub usage_key: &'static str,
    pub range: Range,
    pub name: Str,
}

impl NodeBase {
    fn new(usage_key: &'static str, range: Range, name: Str) -> Self {
        Self {
            usage_key,
            range,
            name,
        }
    }
}

/// A plain string attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub base: NodeBase,
    pub value: Str,
}

impl Attribute {
    fn from_attr(attr: &Attr, usage_key: &'static str) -> Self {
        Self {
            base: NodeBase::new(usage_key, attr.range, attr.name.clone()),
            value: attr.value.clone(),
        }
    }

    pub fn v(&self) -> &str {
        self.value.v()
    }
}

/// An attribute validated against the semantic-version grammar at parse time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionAttribute {
    pub base: NodeBase,
    pub value: Str,
}

impl VersionAttribute {
    fn parse(p: &NodeParser, attr: &Attr, usage_key: &'static str) -> Result<Self, SyntaxError> {
        if !is_valid_semver(attr.value.v()) {
            return Err(p.invalid_value(attr, &attr.name.value));
        }
        Ok(Self {
            base: NodeBase::new(usage_key, attr.range, attr.name.clone()),
            value: attr.value.clone(),
        })
    }

    pub fn v(&self) -> &str {
        self.value.v()
    }
}

/// An integer attribute, such as a response status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberAttribute {
    pub base: NodeBase,
    pub value: Str,
    pub number: i64,
}

impl NumberAttribute {
    fn parse(p: &NodeParser, attr: &Attr, usage_key: &'static str) -> Result<Self, SyntaxError> {
        let number: i64 = attr
            .value
            .v()
            .parse()
            .map_err(|_| p.invalid_value(attr, &attr.name.value))?;
        Ok(Self {
            base: NodeBase::new(usage_key, attr.range, attr.name.clone()),
            value: attr.value.clone(),
            number,
        })
    }

    pub fn v(&self) -> i64 {
        self.number
    }
}

/// A `true`/`false` attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolAttribute {
    pub base: NodeBase,
    pub value: Str,
    pub flag: bool,
}

impl BoolAttribute {
    fn parse(p: &NodeParser, attr: &Attr, usage_key: &'static str) -> Result<Self, SyntaxError> {
        let flag = match attr.value.v() {
            "true" => true,
            "false" => false,
            _ => return Err(p.invalid_value(attr, &attr.name.value)),
        };
        Ok(Self {
            base: NodeBase::new(usage_key, attr.range, attr.name.clone()),
            value: attr.value.clone(),
            flag,
        })
    }

    pub fn v(&self) -> bool {
        self.flag
    }
}

/// The value domain a parameter or body can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Bool,
    Object,
    None,
}

impl ParamType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ParamType::String),
            "number" => Some(ParamType::Number),
            "bool" => Some(ParamType::Bool),
            "object" => Some(ParamType::Object),
            "none" => Some(ParamType::None),
            _ => Option::None,
        }
    }
}

/// An attribute restricted to the [`ParamType`] value set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAttribute {
    pub base: NodeBase,
    pub value: Str,
    pub kind: ParamType,
}

impl TypeAttribute {
    fn parse(p: &NodeParser, attr: &Attr, usage_key: &'static str) -> Result<Self, SyntaxError> {
        let kind = ParamType::from_str(attr.value.v())
            .ok_or_else(|| p.invalid_value(attr, &attr.name.value))?;
        Ok(Self {
            base: NodeBase::new(usage_key, attr.range, attr.name.clone()),
            value: attr.value.clone(),
            kind,
        })
    }

    pub fn v(&self) -> ParamType {
        self.kind
    }
}

/// An element whose only payload is plain text content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextElement {
    pub base: NodeBase,
    pub content: Str,
}

impl TextElement {
    fn parse(
        p: &mut NodeParser,
        start: StartElement,
        usage_key: &'static str,
    ) -> Result<Self, SyntaxError> {
        let (content, range) = p.raw_inner(&start)?;
        Ok(Self {
            base: NodeBase::new(usage_key, range, start.name),
            content,
        })
    }

    pub fn v(&self) -> &str {
        self.content.v()
    }
}

/// Rich-text content: the inner markup is preserved verbatim so downstream
/// renderers can pass it through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Richtext {
    pub base: NodeBase,
    pub text: Str,
}

impl Richtext {
    fn parse(
        p: &mut NodeParser,
        start: StartElement,
        usage_key: &'static str,
    ) -> Result<Self, SyntaxError> {
        let (text, range) = p.raw_inner(&start)?;
        Ok(Self {
            base: NodeBase::new(usage_key, range, start.name),
            text,
        })
    }

    pub fn v(&self) -> &str {
        self.text.v()
    }
}

/// A tag declaration: `<tag name="t1" title="..." />`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub base: NodeBase,
    pub name: Attribute,
    pub title: Attribute,
    pub deprecated: Option<VersionAttribute>,
}

impl Tag {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut name = None;
        let mut title = None;
        let mut deprecated = None;
        for attr in &start.attrs {
            match attr.name.v() {
                "name" => name = Some(Attribute::from_attr(attr, "usage-tag-name")),
                "title" => title = Some(Attribute::from_attr(attr, "usage-tag-title")),
                "deprecated" => {
                    deprecated = Some(VersionAttribute::parse(p, attr, "usage-tag-deprecated")?)
                }
                _ => {}
            }
        }
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => p.skip_element(&el),
            _ => Ok(()),
        })?;
        let name = name.ok_or_else(|| p.missing_field(start.span, range, "name"))?;
        let title = title.ok_or_else(|| p.missing_field(start.span, range, "title"))?;
        Ok(Self {
            base: NodeBase::new("usage-apidoc-tags", range, start.name),
            name,
            title,
            deprecated,
        })
    }
}

/// A server declaration: name, url, and optional descriptive content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub base: NodeBase,
    pub name: Attribute,
    pub url: Attribute,
    pub deprecated: Option<VersionAttribute>,
    pub summary: Option<Attribute>,
    pub description: Option<Richtext>,
}

impl Server {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut name = None;
        let mut url = None;
        let mut deprecated = None;
        let mut summary = None;
        let mut description = None;
        for attr in &start.attrs {
            match attr.name.v() {
                "name" => name = Some(Attribute::from_attr(attr, "usage-server-name")),
                "url" => url = Some(Attribute::from_attr(attr, "usage-server-url")),
                "summary" => summary = Some(Attribute::from_attr(attr, "usage-server-summary")),
                "deprecated" => {
                    deprecated = Some(VersionAttribute::parse(p, attr, "usage-server-deprecated")?)
                }
                _ => {}
            }
        }
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => match el.name.v() {
                "description" => {
                    description = Some(
                        Richtext::parse(p, el, "usage-server-description")
                            .map_err(|e| e.with_field_prefix("description"))?,
                    );
                    Ok(())
                }
                _ => p.skip_element(&el),
            },
            _ => Ok(()),
        })?;
        let name = name.ok_or_else(|| p.missing_field(start.span, range, "name"))?;
        let url = url.ok_or_else(|| p.missing_field(start.span, range, "url"))?;
        Ok(Self {
            base: NodeBase::new("usage-apidoc-servers", range, start.name),
            name,
            url,
            deprecated,
            summary,
            description,
        })
    }
}

/// Contact metadata for the documented service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    pub base: NodeBase,
    pub name: Attribute,
    pub url: Option<TextElement>,
    pub email: Option<TextElement>,
}

impl Contact {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut name = None;
        for attr in &start.attrs {
            if attr.name.v() == "name" {
                name = Some(Attribute::from_attr(attr, "usage-contact-name"));
            }
        }
        let mut url = None;
        let mut email = None;
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => match el.name.v() {
                "url" => {
                    url = Some(TextElement::parse(p, el, "usage-contact-url")?);
                    Ok(())
                }
                "email" => {
                    email = Some(TextElement::parse(p, el, "usage-contact-email")?);
                    Ok(())
                }
                _ => p.skip_element(&el),
            },
            _ => Ok(()),
        })?;
        let name = name.ok_or_else(|| p.missing_field(start.span, range, "name"))?;
        Ok(Self {
            base: NodeBase::new("usage-apidoc-contact", range, start.name),
            name,
            url,
            email,
        })
    }
}

/// License metadata: `<license text="MIT" url="..." />`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct License {
    pub base: NodeBase,
    pub text: Attribute,
    pub url: Attribute,
}

impl License {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut text = None;
        let mut url = None;
        for attr in &start.attrs {
            match attr.name.v() {
                "text" => text = Some(Attribute::from_attr(attr, "usage-license-text")),
                "url" => url = Some(Attribute::from_attr(attr, "usage-license-url")),
                _ => {}
            }
        }
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => p.skip_element(&el),
            _ => Ok(()),
        })?;
        let text = text.ok_or_else(|| p.missing_field(start.span, range, "text"))?;
        let url = url.ok_or_else(|| p.missing_field(start.span, range, "url"))?;
        Ok(Self {
            base: NodeBase::new("usage-apidoc-license", range, start.name),
            text,
            url,
        })
    }
}

/// A mimetype the service accepts or produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mimetype {
    pub base: NodeBase,
    pub content: Str,
}

impl Mimetype {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let (content, range) = p.raw_inner(&start)?;
        if content.v().trim().is_empty() {
            return Err(p.missing_field(start.span, range, "content"));
        }
        Ok(Self {
            base: NodeBase::new("usage-apidoc-mimetypes", range, start.name),
            content,
        })
    }
}

/// One allowed value of an enumerated parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub base: NodeBase,
    pub value: Attribute,
    pub summary: Str,
}

impl EnumValue {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut value = None;
        for attr in &start.attrs {
            if attr.name.v() == "value" {
                value = Some(Attribute::from_attr(attr, "usage-enum-value"));
            }
        }
        let (summary, range) = p.raw_inner(&start)?;
        let value = value.ok_or_else(|| p.missing_field(start.span, range, "value"))?;
        Ok(Self {
            base: NodeBase::new("usage-param-enums", range, start.name),
            value,
            summary,
        })
    }
}

/// A parameter, query value, header, or object member. Object-typed params
/// nest their members as `items`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub base: NodeBase,
    pub name: Attribute,
    pub kind: TypeAttribute,
    pub deprecated: Option<VersionAttribute>,
    pub default: Option<Attribute>,
    pub optional: Option<BoolAttribute>,
    pub array: Option<BoolAttribute>,
    pub summary: Option<Attribute>,
    pub description: Option<Richtext>,
    pub enums: Vec<EnumValue>,
    pub items: Vec<Param>,
}

impl Param {
    fn parse(
        p: &mut NodeParser,
        start: StartElement,
        usage_key: &'static str,
    ) -> Result<Self, SyntaxError> {
        let mut name = None;
        let mut kind = None;
        let mut deprecated = None;
        let mut default = None;
        let mut optional = None;
        let mut array = None;
        let mut summary = None;
        for attr in &start.attrs {
            match attr.name.v() {
                "name" => name = Some(Attribute::from_attr(attr, "usage-param-name")),
                "type" => kind = Some(TypeAttribute::parse(p, attr, "usage-param-type")?),
                "deprecated" => {
                    deprecated = Some(VersionAttribute::parse(p, attr, "usage-param-deprecated")?)
                }
                "default" => default = Some(Attribute::from_attr(attr, "usage-param-default")),
                "optional" => {
                    optional = Some(BoolAttribute::parse(p, attr, "usage-param-optional")?)
                }
                "array" => array = Some(BoolAttribute::parse(p, attr, "usage-param-array")?),
                "summary" => summary = Some(Attribute::from_attr(attr, "usage-param-summary")),
                _ => {}
            }
        }

        let mut description = None;
        let mut enums = Vec::new();
        let mut items = Vec::new();
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => match el.name.v() {
                "description" => {
                    description = Some(
                        Richtext::parse(p, el, "usage-param-description")
                            .map_err(|e| e.with_field_prefix("description"))?,
                    );
                    Ok(())
                }
                "enum" => {
                    enums.push(
                        EnumValue::parse(p, el).map_err(|e| e.with_field_prefix("enum"))?,
                    );
                    Ok(())
                }
                "param" => {
                    items.push(
                        Param::parse(p, el, usage_key)
                            .map_err(|e| e.with_field_prefix("param"))?,
                    );
                    Ok(())
                }
                _ => p.skip_element(&el),
            },
            _ => Ok(()),
        })?;
        let name = name.ok_or_else(|| p.missing_field(start.span, range, "name"))?;
        let kind = kind.ok_or_else(|| p.missing_field(start.span, range, "type"))?;
        Ok(Self {
            base: NodeBase::new(usage_key, range, start.name),
            name,
            kind,
            deprecated,
            default,
            optional,
            array,
            summary,
            description,
            enums,
            items,
        })
    }
}

/// The path an API entry is served on, with its path params and query values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub base: NodeBase,
    pub path: Attribute,
    pub params: Vec<Param>,
    pub queries: Vec<Param>,
}

impl Path {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut path = None;
        for attr in &start.attrs {
            if attr.name.v() == "path" {
                path = Some(Attribute::from_attr(attr, "usage-path-path"));
            }
        }
        let mut params = Vec::new();
        let mut queries = Vec::new();
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => match el.name.v() {
                "param" => {
                    params.push(
                        Param::parse(p, el, "usage-path-params")
                            .map_err(|e| e.with_field_prefix("param"))?,
                    );
                    Ok(())
                }
                "query" => {
                    queries.push(
                        Param::parse(p, el, "usage-path-queries")
                            .map_err(|e| e.with_field_prefix("query"))?,
                    );
                    Ok(())
                }
                _ => p.skip_element(&el),
            },
            _ => Ok(()),
        })?;
        let path = path.ok_or_else(|| p.missing_field(start.span, range, "path"))?;
        Ok(Self {
            base: NodeBase::new("usage-api-path", range, start.name),
            path,
            params,
            queries,
        })
    }
}

/// An example payload attached to a request or response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Example {
    pub base: NodeBase,
    pub mimetype: Attribute,
    pub summary: Option<Attribute>,
    pub content: Str,
}

impl Example {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut mimetype = None;
        let mut summary = None;
        for attr in &start.attrs {
            match attr.name.v() {
                "mimetype" => {
                    mimetype = Some(Attribute::from_attr(attr, "usage-example-mimetype"))
                }
                "summary" => summary = Some(Attribute::from_attr(attr, "usage-example-summary")),
                _ => {}
            }
        }
        let mut content: Option<Str> = None;
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => p.skip_element(&el),
            Child::CData(t) => {
                content = Some(t);
                Ok(())
            }
            Child::Text(t) => {
                if content.is_none() && !t.v().trim().is_empty() {
                    content = Some(t);
                }
                Ok(())
            }
        })?;
        let mimetype = mimetype.ok_or_else(|| p.missing_field(start.span, range, "mimetype"))?;
        let content = content.ok_or_else(|| p.missing_field(start.span, range, "content"))?;
        Ok(Self {
            base: NodeBase::new("usage-example", range, start.name),
            mimetype,
            summary,
            content,
        })
    }
}

/// The shape shared by requests and responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Body {
    pub mimetype: Option<Attribute>,
    pub kind: Option<TypeAttribute>,
    pub headers: Vec<Param>,
    pub examples: Vec<Example>,
    pub items: Vec<Param>,
}

fn parse_body(p: &mut NodeParser, start: &StartElement) -> Result<(Body, Range), SyntaxError> {
    let mut body = Body::default();
    for attr in &start.attrs {
        match attr.name.v() {
            "mimetype" => {
                body.mimetype = Some(Attribute::from_attr(attr, "usage-body-mimetype"))
            }
            "type" => body.kind = Some(TypeAttribute::parse(p, attr, "usage-body-type")?),
            _ => {}
        }
    }
    let range = p.element_children(start, |p, child| match child {
        Child::Element(el) => match el.name.v() {
            "header" => {
                body.headers.push(
                    Param::parse(p, el, "usage-body-headers")
                        .map_err(|e| e.with_field_prefix("header"))?,
                );
                Ok(())
            }
            "example" => {
                body.examples.push(
                    Example::parse(p, el).map_err(|e| e.with_field_prefix("example"))?,
                );
                Ok(())
            }
            "param" => {
                body.items.push(
                    Param::parse(p, el, "usage-body-params")
                        .map_err(|e| e.with_field_prefix("param"))?,
                );
                Ok(())
            }
            _ => p.skip_element(&el),
        },
        _ => Ok(()),
    })?;
    Ok((body, range))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub base: NodeBase,
    #[serde(flatten)]
    pub body: Body,
}

impl Request {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let (body, range) = parse_body(p, &start)?;
        Ok(Self {
            base: NodeBase::new("usage-api-requests", range, start.name),
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub base: NodeBase,
    pub status: NumberAttribute,
    #[serde(flatten)]
    pub body: Body,
}

impl Response {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut status = None;
        for attr in &start.attrs {
            if attr.name.v() == "status" {
                status = Some(NumberAttribute::parse(p, attr, "usage-response-status")?);
            }
        }
        let (body, range) = parse_body(p, &start)?;
        let status = status.ok_or_else(|| p.missing_field(start.span, range, "status"))?;
        Ok(Self {
            base: NodeBase::new("usage-api-responses", range, start.name),
            status,
            body,
        })
    }
}

/// A callback the documented endpoint makes to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Callback {
    pub base: NodeBase,
    pub method: Attribute,
    pub requests: Vec<Request>,
    pub responses: Vec<Response>,
}

impl Callback {
    fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut method = None;
        for attr in &start.attrs {
            if attr.name.v() == "method" {
                method = Some(Attribute::from_attr(attr, "usage-callback-method"));
            }
        }
        let mut requests = Vec::new();
        let mut responses = Vec::new();
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => match el.name.v() {
                "request" => {
                    requests.push(
                        Request::parse(p, el).map_err(|e| e.with_field_prefix("request"))?,
                    );
                    Ok(())
                }
                "response" => {
                    responses.push(
                        Response::parse(p, el).map_err(|e| e.with_field_prefix("response"))?,
                    );
                    Ok(())
                }
                _ => p.skip_element(&el),
            },
            _ => Ok(()),
        })?;
        let method = method.ok_or_else(|| p.missing_field(start.span, range, "method"))?;
        Ok(Self {
            base: NodeBase::new("usage-api-callback", range, start.name),
            method,
            requests,
            responses,
        })
    }
}

/// One documented API entry. `uri` names the file the entry's comment block
/// came from; ranges from different files overlap numerically, so position
/// lookups must pair a range with its uri.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Api {
    pub uri: String,
    pub base: NodeBase,
    pub method: Attribute,
    pub version: Option<VersionAttribute>,
    pub deprecated: Option<VersionAttribute>,
    pub summary: Option<Attribute>,
    pub path: Option<Path>,
    pub description: Option<Richtext>,
    pub tags: Vec<TextElement>,
    pub servers: Vec<TextElement>,
    pub headers: Vec<Param>,
    pub requests: Vec<Request>,
    pub responses: Vec<Response>,
    pub callback: Option<Callback>,
}

impl Api {
    pub(crate) fn parse(p: &mut NodeParser, start: StartElement) -> Result<Self, SyntaxError> {
        let mut method = None;
        let mut version = None;
        let mut deprecated = None;
        let mut summary = None;
        for attr in &start.attrs {
            match attr.name.v() {
                "method" => method = Some(Attribute::from_attr(attr, "usage-api-method")),
                "version" => {
                    version = Some(VersionAttribute::parse(p, attr, "usage-api-version")?)
                }
                "deprecated" => {
                    deprecated = Some(VersionAttribute::parse(p, attr, "usage-api-deprecated")?)
                }
                "summary" => summary = Some(Attribute::from_attr(attr, "usage-api-summary")),
                _ => {}
            }
        }

        let mut path = None;
        let mut description = None;
        let mut tags = Vec::new();
        let mut servers = Vec::new();
        let mut headers = Vec::new();
        let mut requests = Vec::new();
        let mut responses = Vec::new();
        let mut callback = None;
        let range = p.element_children(&start, |p, child| match child {
            Child::Element(el) => match el.name.v() {
                "path" => {
                    path = Some(Path::parse(p, el).map_err(|e| e.with_field_prefix("path"))?);
                    Ok(())
                }
                "description" => {
                    description = Some(
                        Richtext::parse(p, el, "usage-api-description")
                            .map_err(|e| e.with_field_prefix("description"))?,
                    );
                    Ok(())
                }
                "tag" => {
                    tags.push(TextElement::parse(p, el, "usage-api-tags")?);
                    Ok(())
                }
                "server" => {
                    servers.push(TextElement::parse(p, el, "usage-api-servers")?);
                    Ok(())
                }
                "header" => {
                    headers.push(
                        Param::parse(p, el, "usage-api-headers")
                            .map_err(|e| e.with_field_prefix("header"))?,
                    );
                    Ok(())
                }
                "request" => {
                    requests.push(
                        Request::parse(p, el).map_err(|e| e.with_field_prefix("request"))?,
                    );
                    Ok(())
                }
                "response" => {
                    responses.push(
                        Response::parse(p, el).map_err(|e| e.with_field_prefix("response"))?,
                    );
                    Ok(())
                }
                "callback" => {
                    callback = Some(
                        Callback::parse(p, el).map_err(|e| e.with_field_prefix("callback"))?,
                    );
                    Ok(())
                }
                _ => p.skip_element(&el),
            },
            _ => Ok(()),
        })?;
        let method = method.ok_or_else(|| p.missing_field(start.span, range, "method"))?;
        Ok(Self {
            uri: p.uri().to_string(),
            base: NodeBase::new("usage-apidoc-apis", range, start.name),
            method,
            version,
            deprecated,
            summary,
            path,
            description,
            tags,
            servers,
            headers,
            requests,
            responses,
            callback,
        })
    }
}

/// The combined documentation tree for a whole scan: the `<apidoc>` metadata
/// plus every `<api>` entry, accumulated across files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiDoc {
    /// The file the `<apidoc>` block was found in, once one has been parsed.
    pub uri: Option<String>,
    pub base: Option<NodeBase>,
    pub version: Option<VersionAttribute>,
    pub title: Option<TextElement>,
    pub description: Option<Richtext>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    pub tags: Vec<Tag>,
    pub servers: Vec<Server>,
    pub mimetypes: Vec<Mimetype>,
    pub apis: Vec<Api>,
}

impl ApiDoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one scanned block into the tree. Blocks that are not
    /// documentation (no recognizable root, unknown root element) are skipped
    /// silently; structural errors abort only the block being parsed.
    pub fn parse_block(&mut self, block: &DocBlock) -> Result<(), SyntaxError> {
        let root = match find_root_element_name(&block.fragment) {
            Ok(root) => root,
            Err(SyntaxError::NoDocFormat) => return Ok(()),
            Err(e) => return Err(e),
        };
        match root.as_str() {
            "apidoc" => self.parse_doc(block),
            "api" => {
                let mut p = NodeParser::from_block(block)?;
                let start = p.root_element()?;
                let api = Api::parse(&mut p, start).map_err(|e| e.with_field_prefix("api"))?;
                self.apis.push(api);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn parse_doc(&mut self, block: &DocBlock) -> Result<(), SyntaxError> {
        let mut p = NodeParser::from_block(block)?;
        let start = p.root_element()?;
        if self.base.is_some() {
            return Err(p.duplicate_doc(&start));
        }

        let mut version = None;
        for attr in &start.attrs {
            if attr.name.v() == "version" {
                version = Some(
                    VersionAttribute::parse(&p, attr, "usage-apidoc-version")
                        .map_err(|e| e.with_field_prefix("apidoc"))?,
                );
            }
        }

        let mut title = None;
        let mut description = None;
        let mut contact = None;
        let mut license = None;
        let mut tags = Vec::new();
        let mut servers = Vec::new();
        let mut mimetypes = Vec::new();
        let range = p
            .element_children(&start, |p, child| match child {
                Child::Element(el) => match el.name.v() {
                    "title" => {
                        title = Some(TextElement::parse(p, el, "usage-apidoc-title")?);
                        Ok(())
                    }
                    "description" => {
                        description = Some(
                            Richtext::parse(p, el, "usage-apidoc-description")
                                .map_err(|e| e.with_field_prefix("description"))?,
                        );
                        Ok(())
                    }
                    "contact" => {
                        contact = Some(
                            Contact::parse(p, el).map_err(|e| e.with_field_prefix("contact"))?,
                        );
                        Ok(())
                    }
                    "license" => {
                        license = Some(
                            License::parse(p, el).map_err(|e| e.with_field_prefix("license"))?,
                        );
                        Ok(())
                    }
                    "tag" => {
                        tags.push(Tag::parse(p, el).map_err(|e| e.with_field_prefix("tag"))?);
                        Ok(())
                    }
                    "server" => {
                        servers.push(
                            Server::parse(p, el).map_err(|e| e.with_field_prefix("server"))?,
                        );
                        Ok(())
                    }
                    "mimetype" => {
                        mimetypes.push(
                            Mimetype::parse(p, el)
                                .map_err(|e| e.with_field_prefix("mimetype"))?,
                        );
                        Ok(())
                    }
                    _ => p.skip_element(&el),
                },
                _ => Ok(()),
            })
            .map_err(|e| e.with_field_prefix("apidoc"))?;

        let version = version
            .ok_or_else(|| p.missing_field(start.span, range, "apidoc.version"))?;
        let title = title.ok_or_else(|| p.missing_field(start.span, range, "apidoc.title"))?;

        self.uri = Some(p.uri().to_string());
        self.base = Some(NodeBase::new("usage-apidoc", range, start.name));
        self.version = Some(version);
        self.title = Some(title);
        self.description = description;
        self.contact = contact;
        self.license = license;
        self.tags = tags;
        self.servers = servers;
        self.mimetypes = mimetypes;
        Ok(())
    }

    /// Folds another tree into this one: API entries are appended, and the
    /// other tree's root metadata is adopted if this tree has none yet. When
    /// both trees declare a root, the other's root base is returned so the
    /// caller can report the duplicate; its API entries are still kept.
    pub fn merge(&mut self, mut other: ApiDoc) -> Option<NodeBase> {
        let conflict = if other.base.is_some() && self.base.is_some() {
            other.base.take()
        } else {
            if other.base.is_some() {
                self.uri = other.uri.take();
                self.base = other.base.take();
                self.version = other.version.take();
                self.title = other.title.take();
                self.description = other.description.take();
                self.contact = other.contact.take();
                self.license = other.license.take();
                self.tags = std::mem::take(&mut other.tags);
                self.servers = std::mem::take(&mut other.servers);
                self.mimetypes = std::mem::take(&mut other.mimetypes);
            }
            None
        };
        self.apis.append(&mut other.apis);
        conflict
    }

    pub fn tag_exists(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name.v() == name)
    }

    pub fn server_exists(&self, name: &str) -> bool {
        self.servers.iter().any(|s| s.name.v() == name)
    }
}
