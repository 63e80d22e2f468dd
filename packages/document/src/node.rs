//! The document tree.
//!
//! Every piece of an email is a [`Node`]: a stable id, a closed set of
//! variants ([`NodeType`]), a flat attribute map, and (for container
//! variants) an ordered list of children. The tree is plain owned data,
//! cheap to clone, and serializes to the camelCase JSON shape the
//! editor persists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::id::fresh_id;

/// Hard ceiling on columns per section. Email clients render four
/// columns at most before layouts fall apart on mobile.
pub const MAX_SECTION_COLUMNS: usize = 4;

/// The closed set of element variants a document may contain.
///
/// Variants serialize as their markup tag names, so JSON payloads and
/// markup agree on what each element is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "mj-body")]
    Body,
    #[serde(rename = "mj-section")]
    Section,
    #[serde(rename = "mj-column")]
    Column,
    #[serde(rename = "mj-wrapper")]
    Wrapper,
    #[serde(rename = "mj-hero")]
    Hero,
    #[serde(rename = "mj-social")]
    Social,
    #[serde(rename = "mj-text")]
    Text,
    #[serde(rename = "mj-button")]
    Button,
    #[serde(rename = "mj-raw")]
    Raw,
    #[serde(rename = "mj-image")]
    Image,
    #[serde(rename = "mj-divider")]
    Divider,
    #[serde(rename = "mj-spacer")]
    Spacer,
    #[serde(rename = "mj-social-element")]
    SocialElement,
}

impl NodeType {
    /// Every variant, in document order (containers first).
    pub const ALL: [NodeType; 13] = [
        NodeType::Body,
        NodeType::Section,
        NodeType::Column,
        NodeType::Wrapper,
        NodeType::Hero,
        NodeType::Social,
        NodeType::Text,
        NodeType::Button,
        NodeType::Raw,
        NodeType::Image,
        NodeType::Divider,
        NodeType::Spacer,
        NodeType::SocialElement,
    ];

    /// The markup tag this variant is written as.
    pub fn tag_name(&self) -> &'static str {
        match self {
            NodeType::Body => "mj-body",
            NodeType::Section => "mj-section",
            NodeType::Column => "mj-column",
            NodeType::Wrapper => "mj-wrapper",
            NodeType::Hero => "mj-hero",
            NodeType::Social => "mj-social",
            NodeType::Text => "mj-text",
            NodeType::Button => "mj-button",
            NodeType::Raw => "mj-raw",
            NodeType::Image => "mj-image",
            NodeType::Divider => "mj-divider",
            NodeType::Spacer => "mj-spacer",
            NodeType::SocialElement => "mj-social-element",
        }
    }

    /// Looks a variant up by its markup tag name.
    pub fn from_tag(tag: &str) -> Option<NodeType> {
        NodeType::ALL.iter().copied().find(|t| t.tag_name() == tag)
    }

    /// Whether `child` may be nested directly under this variant.
    ///
    /// This is the single structural legality table. The mutation
    /// engine rejects violations, the markup reader silently drops
    /// them; both consult this method.
    pub fn accepts_child(&self, child: NodeType) -> bool {
        match self {
            NodeType::Body => matches!(
                child,
                NodeType::Section | NodeType::Wrapper | NodeType::Hero
            ),
            NodeType::Section => child == NodeType::Column,
            NodeType::Wrapper => child == NodeType::Section,
            NodeType::Column | NodeType::Hero => matches!(
                child,
                NodeType::Text
                    | NodeType::Button
                    | NodeType::Raw
                    | NodeType::Image
                    | NodeType::Divider
                    | NodeType::Spacer
                    | NodeType::Social
            ),
            NodeType::Social => child == NodeType::SocialElement,
            _ => false,
        }
    }

    /// Whether this variant has child slots at all.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeType::Body
                | NodeType::Section
                | NodeType::Column
                | NodeType::Wrapper
                | NodeType::Hero
                | NodeType::Social
        )
    }

    /// Whether this variant carries an editable HTML payload.
    pub fn is_content(&self) -> bool {
        matches!(self, NodeType::Text | NodeType::Button | NodeType::Raw)
    }

    /// Whether this variant is written as a self-closing tag.
    pub fn is_self_closing(&self) -> bool {
        matches!(
            self,
            NodeType::Image | NodeType::Divider | NodeType::Spacer | NodeType::SocialElement
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Exists,
    NotExists,
}

/// A display rule attached to a node.
///
/// Conditions live only in the JSON representation; the markup writer
/// consults an evaluator to decide whether a conditional node is
/// emitted at all. `value` is absent for the existence operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub variable: String,
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable identity. Survives attribute and content edits, never
    /// survives duplication.
    #[serde(default = "fresh_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Presentation attributes as raw strings. A missing key means
    /// "use the client default"; nothing is materialized eagerly.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Inner HTML for content variants, stored verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Node {
    /// Creates an empty node of the given variant with a fresh id.
    pub fn new(node_type: NodeType) -> Self {
        Self {
            id: fresh_id(),
            node_type,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            html_content: None,
            condition: None,
        }
    }

    /// Like [`Node::new`], with an initial attribute set.
    pub fn with_attributes<K, V>(
        node_type: NodeType,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut node = Self::new(node_type);
        node.attributes = attributes
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        node
    }

    /// Depth-first search for a node by id, including this node.
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_node(id))
    }

    /// Mutable variant of [`Node::find_node`].
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_node_mut(id))
    }

    /// Finds the node whose child list contains `id`. Returns `None`
    /// when `id` is this node itself or not in the subtree.
    pub fn find_parent(&self, id: &str) -> Option<&Node> {
        if self.children.iter().any(|child| child.id == id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_parent(id))
    }

    /// Mutable variant of [`Node::find_parent`].
    pub fn find_parent_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.children.iter().any(|child| child.id == id) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_parent_mut(id))
    }

    /// Detaches the node with `id` from wherever it sits in this
    /// subtree and returns it with its descendants intact. Cannot
    /// detach `self`.
    pub fn detach(&mut self, id: &str) -> Option<Node> {
        if let Some(index) = self.children.iter().position(|child| child.id == id) {
            return Some(self.children.remove(index));
        }
        self.children.iter_mut().find_map(|child| child.detach(id))
    }

    /// Deep copy with fresh ids throughout, so the copy can live next
    /// to the original without identity collisions.
    pub fn clone_subtree(&self) -> Node {
        let mut copy = self.clone();
        copy.regenerate_ids();
        copy
    }

    /// Replaces every id in this subtree with a fresh one.
    pub fn regenerate_ids(&mut self) {
        self.id = fresh_id();
        for child in &mut self.children {
            child.regenerate_ids();
        }
    }

    /// Number of nodes in this subtree, including this node.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Calls `f` for every node in the subtree, depth first, parents
    /// before children.
    pub fn walk<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// How many nodes of each variant the subtree holds. Round-trip
    /// checks compare this instead of ids.
    pub fn census(&self) -> BTreeMap<NodeType, usize> {
        let mut counts = BTreeMap::new();
        self.walk(&mut |node| {
            *counts.entry(node.node_type).or_insert(0) += 1;
        });
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Node {
        let mut body = Node::new(NodeType::Body);
        let mut section = Node::new(NodeType::Section);
        let mut column = Node::new(NodeType::Column);
        let mut text = Node::new(NodeType::Text);
        text.html_content = Some("<p>hi</p>".to_string());
        column.children.push(text);
        section.children.push(column);
        body.children.push(section);
        body
    }

    #[test]
    fn tag_names_round_trip() {
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::from_tag(node_type.tag_name()), Some(node_type));
        }
        assert_eq!(NodeType::from_tag("mj-carousel"), None);
    }

    #[test]
    fn legality_table() {
        assert!(NodeType::Body.accepts_child(NodeType::Section));
        assert!(NodeType::Body.accepts_child(NodeType::Wrapper));
        assert!(NodeType::Body.accepts_child(NodeType::Hero));
        assert!(!NodeType::Body.accepts_child(NodeType::Column));
        assert!(NodeType::Section.accepts_child(NodeType::Column));
        assert!(!NodeType::Section.accepts_child(NodeType::Text));
        assert!(NodeType::Wrapper.accepts_child(NodeType::Section));
        assert!(!NodeType::Wrapper.accepts_child(NodeType::Wrapper));
        assert!(NodeType::Column.accepts_child(NodeType::Text));
        assert!(NodeType::Column.accepts_child(NodeType::Social));
        assert!(NodeType::Hero.accepts_child(NodeType::Button));
        assert!(NodeType::Social.accepts_child(NodeType::SocialElement));
        assert!(!NodeType::Social.accepts_child(NodeType::Text));
        assert!(!NodeType::Text.accepts_child(NodeType::Text));
        assert!(!NodeType::Image.accepts_child(NodeType::Text));
    }

    #[test]
    fn variant_partitions() {
        for node_type in NodeType::ALL {
            let roles = [
                node_type.is_container(),
                node_type.is_content(),
                node_type.is_self_closing(),
            ];
            assert_eq!(
                roles.iter().filter(|r| **r).count(),
                1,
                "{node_type} must fill exactly one role"
            );
        }
    }

    #[test]
    fn find_and_parent() {
        let body = sample_tree();
        let section_id = body.children[0].id.clone();
        let text_id = body.children[0].children[0].children[0].id.clone();

        assert_eq!(body.find_node(&text_id).map(|n| n.node_type), Some(NodeType::Text));
        assert_eq!(
            body.find_parent(&section_id).map(|n| n.node_type),
            Some(NodeType::Body)
        );
        assert!(body.find_parent(&body.id).is_none());
        assert!(body.find_node("missing").is_none());
    }

    #[test]
    fn detach_removes_subtree() {
        let mut body = sample_tree();
        let column_id = body.children[0].children[0].id.clone();

        let detached = body.detach(&column_id).unwrap();
        assert_eq!(detached.node_type, NodeType::Column);
        assert_eq!(detached.count(), 2);
        assert_eq!(body.count(), 2);
        assert!(body.detach(&column_id).is_none());
    }

    #[test]
    fn clone_subtree_regenerates_every_id() {
        let body = sample_tree();
        let copy = body.clone_subtree();

        let mut original_ids = Vec::new();
        body.walk(&mut |n| original_ids.push(n.id.clone()));
        let mut copy_ids = Vec::new();
        copy.walk(&mut |n| copy_ids.push(n.id.clone()));

        assert_eq!(original_ids.len(), copy_ids.len());
        for id in &copy_ids {
            assert!(!original_ids.contains(id));
        }
        assert_eq!(body.census(), copy.census());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let mut text = Node::new(NodeType::Text);
        text.html_content = Some("<p>hi</p>".to_string());
        text.attributes.insert("font-size".to_string(), "14px".to_string());

        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["type"], "mj-text");
        assert_eq!(json["htmlContent"], "<p>hi</p>");
        assert_eq!(json["attributes"]["font-size"], "14px");
        assert!(json.get("children").is_none());
    }

    #[test]
    fn missing_id_gets_a_fresh_one() {
        let node: Node = serde_json::from_str(r#"{"type": "mj-divider"}"#).unwrap();
        assert_eq!(node.node_type, NodeType::Divider);
        assert!(!node.id.is_empty());
    }

    #[test]
    fn condition_serializes_snake_case_operator() {
        let condition = Condition {
            variable: "user.plan".to_string(),
            operator: ConditionOperator::NotEquals,
            value: Some("free".to_string()),
        };
        let json = serde_json::to_value(&condition).unwrap();
        assert_eq!(json["operator"], "not_equals");
        assert_eq!(json["variable"], "user.plan");
    }
}
