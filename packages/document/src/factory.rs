//! Constructors for well-formed elements.
//!
//! The tree types accept any attribute map; these helpers build nodes
//! the way the editor inserts them, with the small set of defaults a
//! fresh element should carry.

use crate::document::Document;
use crate::node::{Node, NodeType, MAX_SECTION_COLUMNS};

/// Width string for one column out of `count` equal columns.
fn column_width(count: usize) -> String {
    match count {
        1 => "100%".to_string(),
        2 => "50%".to_string(),
        3 => "33.33%".to_string(),
        4 => "25%".to_string(),
        n => format!("{:.2}%", 100.0 / n as f64),
    }
}

/// A section pre-filled with `columns` equal-width columns. The count
/// is clamped to the 1..=4 range sections support.
pub fn section(columns: usize) -> Node {
    let count = columns.clamp(1, MAX_SECTION_COLUMNS);
    let mut node = Node::new(NodeType::Section);
    for _ in 0..count {
        node.children.push(column_with_width(&column_width(count)));
    }
    node
}

pub fn column() -> Node {
    Node::new(NodeType::Column)
}

pub fn column_with_width(width: &str) -> Node {
    Node::with_attributes(NodeType::Column, [("width", width)])
}

pub fn wrapper() -> Node {
    Node::new(NodeType::Wrapper)
}

pub fn hero() -> Node {
    Node::with_attributes(NodeType::Hero, [("padding", "40px 0")])
}

pub fn text(html: &str) -> Node {
    let mut node = Node::new(NodeType::Text);
    node.html_content = Some(html.to_string());
    node
}

pub fn button(label: &str) -> Node {
    let mut node = Node::new(NodeType::Button);
    node.attributes.insert("href".to_string(), "#".to_string());
    node.html_content = Some(label.to_string());
    node
}

pub fn raw(html: &str) -> Node {
    let mut node = Node::new(NodeType::Raw);
    node.html_content = Some(html.to_string());
    node
}

pub fn image(src: &str) -> Node {
    Node::with_attributes(NodeType::Image, [("src", src), ("alt", "")])
}

pub fn divider() -> Node {
    Node::with_attributes(NodeType::Divider, [("border-color", "#e0e0e0")])
}

pub fn spacer() -> Node {
    Node::with_attributes(NodeType::Spacer, [("height", "20px")])
}

pub fn social() -> Node {
    Node::new(NodeType::Social)
}

pub fn social_element(name: &str, href: &str) -> Node {
    Node::with_attributes(NodeType::SocialElement, [("name", name), ("href", href)])
}

/// The canonical empty state: one section, one column, one editable
/// text block. Every new document starts here.
pub fn default_document() -> Document {
    let mut body = Node::new(NodeType::Body);
    let mut first_section = section(1);
    if let Some(first_column) = first_section.children.first_mut() {
        first_column.children.push(text("<p>Hello world</p>"));
    }
    body.children.push(first_section);
    Document::with_body(body)
}
