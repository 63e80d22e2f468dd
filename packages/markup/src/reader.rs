//! Markup to document.
//!
//! The reader is the forgiving half of the pair: whatever string comes
//! in, a legal [`Document`] comes out. Unknown tags are coerced to a
//! position-appropriate variant or dropped, unclosed elements close
//! themselves at the next ancestor boundary, junk between tags is
//! ignored. Dropped input is reported through `tracing` at debug level
//! and nowhere else.
//!
//! Identity is never read back from markup: every node the reader
//! builds gets a fresh id, and `node-*` tokens found in `css-class`
//! are stripped so stale identities cannot leak in.

use std::collections::BTreeMap;

use mailcraft_document::{
    Document, FontDecl, HeadAttributes, Node, NodeType, DOCUMENT_VERSION, MAX_SECTION_COLUMNS,
};

use crate::tokenizer::{MarkupEvent, MarkupLexer};

/// Parses markup into a document. Total: never fails, never panics,
/// any input produces some legal document.
pub fn markup_to_document(source: &str) -> Document {
    MarkupReader::new(source).read_document()
}

struct MarkupReader<'src> {
    lexer: MarkupLexer<'src>,
    pending: Option<MarkupEvent<'src>>,
    open_tags: Vec<String>,
    head: HeadAttributes,
    body: Option<Node>,
}

impl<'src> MarkupReader<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            lexer: MarkupLexer::new(source),
            pending: None,
            open_tags: Vec::new(),
            head: HeadAttributes::default(),
            body: None,
        }
    }

    fn read_document(mut self) -> Document {
        while let Some(event) = self.next_event() {
            match event {
                MarkupEvent::Open {
                    tag,
                    attributes,
                    self_closing,
                } => {
                    let tag = tag.to_ascii_lowercase();
                    match tag.as_str() {
                        // Transparent wrappers around the real content.
                        "mjml" | "html" | "body" => {}
                        "head" => {
                            if !self_closing {
                                self.skip_subtree(&tag);
                            }
                        }
                        "mj-head" => {
                            if !self_closing {
                                self.read_head();
                            }
                        }
                        "mj-body" => {
                            let node = build_node(NodeType::Body, &attributes);
                            let node = if self_closing {
                                node
                            } else {
                                self.read_children(node, &tag)
                            };
                            self.merge_body(node);
                        }
                        _ => self.read_top_level(&tag, &attributes, self_closing),
                    }
                }
                MarkupEvent::Close { .. } | MarkupEvent::Text(_) => {}
            }
        }
        Document {
            version: DOCUMENT_VERSION,
            head_attributes: self.head,
            body: self.body.unwrap_or_else(|| Node::new(NodeType::Body)),
        }
    }

    /// Body-level content that shows up without an `mj-body` wrapper.
    fn read_top_level(
        &mut self,
        tag: &str,
        attributes: &[(&'src str, &'src str)],
        self_closing: bool,
    ) {
        let Some(node_type) = resolve_tag(NodeType::Body, tag) else {
            tracing::debug!(tag = %tag, "skipping unknown top-level element");
            if !self_closing {
                self.skip_subtree(tag);
            }
            return;
        };
        let node = self.read_element(node_type, attributes, tag, self_closing);
        let body = self.body.get_or_insert_with(|| Node::new(NodeType::Body));
        attach(body, node);
    }

    fn read_element(
        &mut self,
        node_type: NodeType,
        attributes: &[(&'src str, &'src str)],
        source_tag: &str,
        self_closing: bool,
    ) -> Node {
        let mut node = build_node(node_type, attributes);
        if node_type.is_content() {
            let raw = if self_closing {
                ""
            } else {
                self.lexer.raw_until_close(source_tag)
            };
            node.html_content = Some(raw.trim().to_string());
            return node;
        }
        if self_closing || node_type.is_self_closing() {
            return node;
        }
        self.read_children(node, source_tag)
    }

    fn read_children(&mut self, mut node: Node, source_tag: &str) -> Node {
        self.open_tags.push(source_tag.to_string());
        while let Some(event) = self.next_event() {
            match event {
                MarkupEvent::Open {
                    tag,
                    attributes,
                    self_closing,
                } => {
                    let tag = tag.to_ascii_lowercase();
                    match resolve_tag(node.node_type, &tag) {
                        Some(child_type) => {
                            let child =
                                self.read_element(child_type, &attributes, &tag, self_closing);
                            attach(&mut node, child);
                        }
                        None => {
                            tracing::debug!(tag = %tag, parent = %node.node_type, "skipping unknown element");
                            if !self_closing {
                                self.skip_subtree(&tag);
                            }
                        }
                    }
                }
                MarkupEvent::Close { tag } => {
                    if tag.eq_ignore_ascii_case(source_tag) {
                        break;
                    }
                    if self.matches_ancestor(tag) {
                        // This element was never closed; hand the close
                        // back to whoever it belongs to.
                        self.pending = Some(MarkupEvent::Close { tag });
                        break;
                    }
                    // Stray close with no open anywhere, drop it.
                }
                MarkupEvent::Text(text) => {
                    if !text.trim().is_empty() {
                        tracing::debug!(parent = %node.node_type, "dropping bare text between elements");
                    }
                }
            }
        }
        self.open_tags.pop();
        node
    }

    fn read_head(&mut self) {
        self.open_tags.push("mj-head".to_string());
        while let Some(event) = self.next_event() {
            match event {
                MarkupEvent::Open {
                    tag,
                    attributes,
                    self_closing,
                } => {
                    let tag = tag.to_ascii_lowercase();
                    match tag.as_str() {
                        "mj-font" => {
                            let attrs = attribute_map(&attributes);
                            match (attrs.get("name"), attrs.get("href")) {
                                (Some(name), Some(href)) => self.head.fonts.push(FontDecl {
                                    name: name.clone(),
                                    href: href.clone(),
                                }),
                                _ => tracing::debug!("skipping mj-font without name and href"),
                            }
                            if !self_closing {
                                self.skip_subtree(&tag);
                            }
                        }
                        "mj-preview" => {
                            if !self_closing {
                                let raw = self.lexer.raw_until_close(&tag);
                                self.head.preview_text = unescape(raw.trim());
                            }
                        }
                        "mj-attributes" => {
                            if !self_closing {
                                self.read_attribute_defaults();
                            }
                        }
                        _ => {
                            tracing::debug!(tag = %tag, "skipping unsupported head element");
                            if !self_closing {
                                self.skip_subtree(&tag);
                            }
                        }
                    }
                }
                MarkupEvent::Close { tag } => {
                    if tag.eq_ignore_ascii_case("mj-head") {
                        break;
                    }
                    if self.matches_ancestor(tag) {
                        self.pending = Some(MarkupEvent::Close { tag });
                        break;
                    }
                }
                MarkupEvent::Text(_) => {}
            }
        }
        self.open_tags.pop();
    }

    /// `<mj-attributes>` children: each tag inside declares defaults
    /// for that tag.
    fn read_attribute_defaults(&mut self) {
        self.open_tags.push("mj-attributes".to_string());
        while let Some(event) = self.next_event() {
            match event {
                MarkupEvent::Open {
                    tag,
                    attributes,
                    self_closing,
                } => {
                    let tag = tag.to_ascii_lowercase();
                    let defaults = attribute_map(&attributes);
                    if !defaults.is_empty() {
                        self.head
                            .default_styles
                            .entry(tag.clone())
                            .or_default()
                            .extend(defaults);
                    }
                    if !self_closing {
                        self.skip_subtree(&tag);
                    }
                }
                MarkupEvent::Close { tag } => {
                    if tag.eq_ignore_ascii_case("mj-attributes") {
                        break;
                    }
                    if self.matches_ancestor(tag) {
                        self.pending = Some(MarkupEvent::Close { tag });
                        break;
                    }
                }
                MarkupEvent::Text(_) => {}
            }
        }
        self.open_tags.pop();
    }

    /// Consumes a subtree that is being dropped, through its close tag.
    /// Stops early when a close belonging to an open ancestor shows up.
    fn skip_subtree(&mut self, tag: &str) {
        let mut depth = 0usize;
        while let Some(event) = self.next_event() {
            match event {
                MarkupEvent::Open {
                    tag: inner,
                    self_closing,
                    ..
                } => {
                    if !self_closing && inner.eq_ignore_ascii_case(tag) {
                        depth += 1;
                    }
                }
                MarkupEvent::Close { tag: inner } => {
                    if inner.eq_ignore_ascii_case(tag) {
                        if depth == 0 {
                            return;
                        }
                        depth -= 1;
                    } else if self.matches_open(inner) {
                        self.pending = Some(MarkupEvent::Close { tag: inner });
                        return;
                    }
                }
                MarkupEvent::Text(_) => {}
            }
        }
    }

    fn merge_body(&mut self, node: Node) {
        match &mut self.body {
            None => self.body = Some(node),
            Some(existing) => {
                tracing::debug!("folding a second mj-body into the first");
                for child in node.children {
                    attach(existing, child);
                }
            }
        }
    }

    fn next_event(&mut self) -> Option<MarkupEvent<'src>> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        self.lexer.next_event()
    }

    /// Whether `tag` matches an element open above the current one.
    fn matches_ancestor(&self, tag: &str) -> bool {
        let end = self.open_tags.len().saturating_sub(1);
        self.open_tags[..end]
            .iter()
            .any(|open| open.eq_ignore_ascii_case(tag))
    }

    /// Whether `tag` matches any open element at all.
    fn matches_open(&self, tag: &str) -> bool {
        self.open_tags
            .iter()
            .any(|open| open.eq_ignore_ascii_case(tag))
    }
}

/// Maps a tag to a variant. Unknown tags are guessed from position:
/// foreign markup directly under the body reads as a section, foreign
/// markup inside a section reads as a column, anywhere else it is
/// dropped.
fn resolve_tag(parent: NodeType, tag: &str) -> Option<NodeType> {
    if let Some(node_type) = NodeType::from_tag(tag) {
        return Some(node_type);
    }
    match parent {
        NodeType::Body => Some(NodeType::Section),
        NodeType::Section => Some(NodeType::Column),
        _ => None,
    }
}

fn build_node(node_type: NodeType, attributes: &[(&str, &str)]) -> Node {
    let mut node = Node::new(node_type);
    for (name, value) in attributes {
        let name = name.to_ascii_lowercase();
        let value = unescape(value);
        if name == "css-class" {
            let kept = strip_identity_classes(&value);
            if !kept.is_empty() {
                node.attributes.insert(name, kept);
            }
        } else {
            node.attributes.insert(name, value);
        }
    }
    node
}

/// Attaches a child if the structure tables allow it, otherwise drops
/// it. The reader coerces rather than rejects, so this is the only
/// enforcement point on the way in.
fn attach(parent: &mut Node, child: Node) {
    if !parent.node_type.accepts_child(child.node_type) {
        tracing::debug!(
            parent = %parent.node_type,
            child = %child.node_type,
            "dropping illegally nested element"
        );
        return;
    }
    if parent.node_type == NodeType::Section
        && child.node_type == NodeType::Column
        && parent.children.len() >= MAX_SECTION_COLUMNS
    {
        tracing::debug!("dropping columns past the section limit");
        return;
    }
    parent.children.push(child);
}

fn attribute_map(attributes: &[(&str, &str)]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for (name, value) in attributes {
        map.insert(name.to_ascii_lowercase(), unescape(value));
    }
    map
}

fn strip_identity_classes(value: &str) -> String {
    value
        .split_whitespace()
        .filter(|class| !class.starts_with("node-"))
        .collect::<Vec<_>>()
        .join(" ")
}

const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&apos;", '\''),
];

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let mut matched = false;
        for &(entity, ch) in ENTITIES {
            if let Some(after) = rest.strip_prefix(entity) {
                out.push(ch);
                rest = after;
                matched = true;
                break;
            }
        }
        if !matched {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}
