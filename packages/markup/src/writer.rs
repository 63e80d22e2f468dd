//! Document to markup.
//!
//! The writer is total: every well-formed [`Document`] serializes, no
//! error path exists. Output is byte-stable for a given document so
//! diffs and caches can trust it: attributes emit in sorted order and
//! every node carries its identity class.

use std::collections::BTreeMap;

use mailcraft_document::{Condition, Document, HeadAttributes, Node};

/// Serializes a document tree into markup text.
///
/// An optional condition evaluator decides whether conditional nodes
/// appear at all; without one, every node is written.
pub struct MarkupWriter<'a> {
    indent_level: usize,
    indent_string: String,
    condition_eval: Option<&'a dyn Fn(&Condition) -> bool>,
}

impl<'a> MarkupWriter<'a> {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(),
            condition_eval: None,
        }
    }

    /// Writer that consults `eval` for nodes carrying a condition and
    /// omits the whole subtree when the rule comes back false.
    pub fn with_condition_eval(eval: &'a dyn Fn(&Condition) -> bool) -> Self {
        Self {
            condition_eval: Some(eval),
            ..Self::new()
        }
    }

    pub fn write(&mut self, document: &Document) -> String {
        let mut out = String::new();
        self.line(&mut out, "<mjml>");
        self.indent_level += 1;
        self.write_head(&document.head_attributes, &mut out);
        self.write_node(&document.body, &mut out);
        self.indent_level -= 1;
        self.line(&mut out, "</mjml>");
        out
    }

    fn write_head(&mut self, head: &HeadAttributes, out: &mut String) {
        if head.is_empty() {
            return;
        }
        self.line(out, "<mj-head>");
        self.indent_level += 1;
        if !head.preview_text.is_empty() {
            self.line(
                out,
                &format!(
                    "<mj-preview>{}</mj-preview>",
                    escape_text(&head.preview_text)
                ),
            );
        }
        for font in &head.fonts {
            self.line(
                out,
                &format!(
                    r#"<mj-font name="{}" href="{}" />"#,
                    escape_attr(&font.name),
                    escape_attr(&font.href)
                ),
            );
        }
        if !head.default_styles.is_empty() {
            self.line(out, "<mj-attributes>");
            self.indent_level += 1;
            for (tag, styles) in &head.default_styles {
                let mut line = format!("<{tag}");
                for (name, value) in styles {
                    line.push_str(&format!(r#" {}="{}""#, name, escape_attr(value)));
                }
                line.push_str(" />");
                self.line(out, &line);
            }
            self.indent_level -= 1;
            self.line(out, "</mj-attributes>");
        }
        self.indent_level -= 1;
        self.line(out, "</mj-head>");
    }

    fn write_node(&mut self, node: &Node, out: &mut String) {
        if let (Some(condition), Some(eval)) = (&node.condition, self.condition_eval) {
            if !eval(condition) {
                return;
            }
        }
        let tag = node.node_type.tag_name();
        let mut open = format!("<{tag}");
        open.push_str(&self.attribute_string(node));

        if node.node_type.is_self_closing() {
            open.push_str(" />");
            self.line(out, &open);
            return;
        }
        if node.node_type.is_content() {
            // Inner HTML goes out verbatim on one line, so reading it
            // back recovers the exact payload.
            open.push('>');
            open.push_str(node.html_content.as_deref().unwrap_or(""));
            open.push_str(&format!("</{tag}>"));
            self.line(out, &open);
            return;
        }
        if node.children.is_empty() {
            open.push_str(&format!("></{tag}>"));
            self.line(out, &open);
            return;
        }
        open.push('>');
        self.line(out, &open);
        self.indent_level += 1;
        for child in &node.children {
            self.write_node(child, out);
        }
        self.indent_level -= 1;
        self.line(out, &format!("</{tag}>"));
    }

    /// Attributes in sorted order, with the identity class `node-<id>`
    /// merged into `css-class`.
    fn attribute_string(&self, node: &Node) -> String {
        let mut merged: BTreeMap<&str, String> = BTreeMap::new();
        for (name, value) in &node.attributes {
            merged.insert(name, value.clone());
        }
        let identity = format!("node-{}", node.id);
        merged
            .entry("css-class")
            .and_modify(|classes| {
                classes.push(' ');
                classes.push_str(&identity);
            })
            .or_insert(identity);

        let mut out = String::new();
        for (name, value) in &merged {
            out.push_str(&format!(r#" {}="{}""#, name, escape_attr(value)));
        }
        out
    }

    fn line(&self, out: &mut String, text: &str) {
        for _ in 0..self.indent_level {
            out.push_str(&self.indent_string);
        }
        out.push_str(text);
        out.push('\n');
    }
}

impl Default for MarkupWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes with default settings and no condition evaluator.
pub fn document_to_markup(document: &Document) -> String {
    MarkupWriter::new().write(document)
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
