//! Position-based queries over a parsed tree, for editor integrations.
//!
//! Every node records its range in original source coordinates, so "what is
//! under the cursor" is a containment walk from the root down to the most
//! specific node. The returned reference pairs with a
//! [`crate::api::UsageSheet`] to produce hover help.

use crate::api::UsageSheet;
use crate::ast::{
    Api, ApiDoc, Body, Callback, Contact, License, NodeBase, Param, Path, Request, Response,
    Server, Tag,
};
use crate::position::Position;

/// The most specific node found under a position.
#[derive(Debug, Clone, Copy)]
pub enum FoundNode<'a> {
    Doc(&'a ApiDoc),
    Api(&'a Api),
    Tag(&'a Tag),
    Server(&'a Server),
    Contact(&'a Contact),
    License(&'a License),
    Path(&'a Path),
    Param(&'a Param),
    Request(&'a Request),
    Response(&'a Response),
    Callback(&'a Callback),
    /// An attribute or leaf element; the base carries its usage key.
    Attribute(&'a NodeBase),
}

impl<'a> FoundNode<'a> {
    /// The usage key of the found node, for help-text lookup.
    pub fn usage_key(&self) -> Option<&'static str> {
        match self {
            FoundNode::Doc(d) => d.base.as_ref().map(|b| b.usage_key),
            FoundNode::Api(n) => Some(n.base.usage_key),
            FoundNode::Tag(n) => Some(n.base.usage_key),
            FoundNode::Server(n) => Some(n.base.usage_key),
            FoundNode::Contact(n) => Some(n.base.usage_key),
            FoundNode::License(n) => Some(n.base.usage_key),
            FoundNode::Path(n) => Some(n.base.usage_key),
            FoundNode::Param(n) => Some(n.base.usage_key),
            FoundNode::Request(n) => Some(n.base.usage_key),
            FoundNode::Response(n) => Some(n.base.usage_key),
            FoundNode::Callback(n) => Some(n.base.usage_key),
            FoundNode::Attribute(b) => Some(b.usage_key),
        }
    }
}

/// Finds the most specific node containing `pos` in the file named `uri`.
///
/// A merged tree holds blocks from many files whose ranges overlap
/// numerically, so a bare position is ambiguous; only nodes from `uri` are
/// considered. API entries are checked before the root block, since they come
/// from separate comment blocks and never nest inside it.
pub fn find_node_at<'a>(doc: &'a ApiDoc, uri: &str, pos: Position) -> Option<FoundNode<'a>> {
    for api in &doc.apis {
        if api.uri == uri && api.base.range.contains(pos) {
            return Some(find_in_api(api, pos));
        }
    }

    if doc.uri.as_deref() != Some(uri) {
        return None;
    }
    let base = doc.base.as_ref()?;
    if !base.range.contains(pos) {
        return None;
    }
    if let Some(v) = &doc.version {
        if let Some(hit) = attr_hit(&v.base, pos) {
            return Some(hit);
        }
    }
    if let Some(t) = &doc.title {
        if let Some(hit) = attr_hit(&t.base, pos) {
            return Some(hit);
        }
    }
    if let Some(d) = &doc.description {
        if let Some(hit) = attr_hit(&d.base, pos) {
            return Some(hit);
        }
    }
    if let Some(c) = &doc.contact {
        if c.base.range.contains(pos) {
            return Some(find_in_contact(c, pos));
        }
    }
    if let Some(l) = &doc.license {
        if l.base.range.contains(pos) {
            return Some(
                attr_hit(&l.text.base, pos)
                    .or_else(|| attr_hit(&l.url.base, pos))
                    .unwrap_or(FoundNode::License(l)),
            );
        }
    }
    for tag in &doc.tags {
        if tag.base.range.contains(pos) {
            return Some(find_in_tag(tag, pos));
        }
    }
    for server in &doc.servers {
        if server.base.range.contains(pos) {
            return Some(find_in_server(server, pos));
        }
    }
    for mimetype in &doc.mimetypes {
        if let Some(hit) = attr_hit(&mimetype.base, pos) {
            return Some(hit);
        }
    }
    Some(FoundNode::Doc(doc))
}

/// Help text for whatever sits under `pos` in the file named `uri`.
pub fn hover_text<'a>(
    doc: &ApiDoc,
    uri: &str,
    pos: Position,
    sheet: &'a UsageSheet,
) -> Option<&'a str> {
    sheet.get(find_node_at(doc, uri, pos)?.usage_key()?)
}

fn attr_hit<'a>(base: &'a NodeBase, pos: Position) -> Option<FoundNode<'a>> {
    base.range.contains(pos).then_some(FoundNode::Attribute(base))
}

fn find_in_tag<'a>(tag: &'a Tag, pos: Position) -> FoundNode<'a> {
    attr_hit(&tag.name.base, pos)
        .or_else(|| attr_hit(&tag.title.base, pos))
        .or_else(|| tag.deprecated.as_ref().and_then(|d| attr_hit(&d.base, pos)))
        .unwrap_or(FoundNode::Tag(tag))
}

fn find_in_server<'a>(server: &'a Server, pos: Position) -> FoundNode<'a> {
    attr_hit(&server.name.base, pos)
        .or_else(|| attr_hit(&server.url.base, pos))
        .or_else(|| server.summary.as_ref().and_then(|a| attr_hit(&a.base, pos)))
        .or_else(|| {
            server
                .deprecated
                .as_ref()
                .and_then(|d| attr_hit(&d.base, pos))
        })
        .or_else(|| {
            server
                .description
                .as_ref()
                .and_then(|d| attr_hit(&d.base, pos))
        })
        .unwrap_or(FoundNode::Server(server))
}

fn find_in_contact<'a>(contact: &'a Contact, pos: Position) -> FoundNode<'a> {
    attr_hit(&contact.name.base, pos)
        .or_else(|| contact.url.as_ref().and_then(|u| attr_hit(&u.base, pos)))
        .or_else(|| contact.email.as_ref().and_then(|e| attr_hit(&e.base, pos)))
        .unwrap_or(FoundNode::Contact(contact))
}

fn find_in_api<'a>(api: &'a Api, pos: Position) -> FoundNode<'a> {
    if let Some(hit) = attr_hit(&api.method.base, pos) {
        return hit;
    }
    for attr in [
        api.version.as_ref().map(|a| &a.base),
        api.deprecated.as_ref().map(|a| &a.base),
        api.summary.as_ref().map(|a| &a.base),
        api.description.as_ref().map(|d| &d.base),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(hit) = attr_hit(attr, pos) {
            return hit;
        }
    }
    if let Some(path) = &api.path {
        if path.base.range.contains(pos) {
            return find_in_path(path, pos);
        }
    }
    for leaf in api.tags.iter().chain(&api.servers) {
        if let Some(hit) = attr_hit(&leaf.base, pos) {
            return hit;
        }
    }
    for header in &api.headers {
        if header.base.range.contains(pos) {
            return find_in_param(header, pos);
        }
    }
    for req in &api.requests {
        if req.base.range.contains(pos) {
            return find_in_body(&req.body, pos).unwrap_or(FoundNode::Request(req));
        }
    }
    for resp in &api.responses {
        if resp.base.range.contains(pos) {
            return attr_hit(&resp.status.base, pos)
                .or_else(|| find_in_body(&resp.body, pos))
                .unwrap_or(FoundNode::Response(resp));
        }
    }
    if let Some(cb) = &api.callback {
        if cb.base.range.contains(pos) {
            return find_in_callback(cb, pos);
        }
    }
    FoundNode::Api(api)
}

fn find_in_path<'a>(path: &'a Path, pos: Position) -> FoundNode<'a> {
    if let Some(hit) = attr_hit(&path.path.base, pos) {
        return hit;
    }
    for param in path.params.iter().chain(&path.queries) {
        if param.base.range.contains(pos) {
            return find_in_param(param, pos);
        }
    }
    FoundNode::Path(path)
}

fn find_in_param<'a>(param: &'a Param, pos: Position) -> FoundNode<'a> {
    for attr in [
        Some(&param.name.base),
        Some(&param.kind.base),
        param.deprecated.as_ref().map(|a| &a.base),
        param.default.as_ref().map(|a| &a.base),
        param.optional.as_ref().map(|a| &a.base),
        param.array.as_ref().map(|a| &a.base),
        param.summary.as_ref().map(|a| &a.base),
        param.description.as_ref().map(|d| &d.base),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(hit) = attr_hit(attr, pos) {
            return hit;
        }
    }
    for value in &param.enums {
        if let Some(hit) = attr_hit(&value.base, pos) {
            return hit;
        }
    }
    for item in &param.items {
        if item.base.range.contains(pos) {
            return find_in_param(item, pos);
        }
    }
    FoundNode::Param(param)
}

fn find_in_body<'a>(body: &'a Body, pos: Position) -> Option<FoundNode<'a>> {
    for attr in [
        body.mimetype.as_ref().map(|a| &a.base),
        body.kind.as_ref().map(|a| &a.base),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(hit) = attr_hit(attr, pos) {
            return Some(hit);
        }
    }
    for header in &body.headers {
        if header.base.range.contains(pos) {
            return Some(find_in_param(header, pos));
        }
    }
    for example in &body.examples {
        if example.base.range.contains(pos) {
            return Some(
                attr_hit(&example.mimetype.base, pos)
                    .unwrap_or(FoundNode::Attribute(&example.base)),
            );
        }
    }
    for item in &body.items {
        if item.base.range.contains(pos) {
            return Some(find_in_param(item, pos));
        }
    }
    None
}

fn find_in_callback<'a>(cb: &'a Callback, pos: Position) -> FoundNode<'a> {
    if let Some(hit) = attr_hit(&cb.method.base, pos) {
        return hit;
    }
    for req in &cb.requests {
        if req.base.range.contains(pos) {
            return find_in_body(&req.body, pos).unwrap_or(FoundNode::Request(req));
        }
    }
    for resp in &cb.responses {
        if resp.base.range.contains(pos) {
            return attr_hit(&resp.status.base, pos)
                .or_else(|| find_in_body(&resp.body, pos))
                .unwrap_or(FoundNode::Response(resp));
        }
    }
    FoundNode::Callback(cb)
}
