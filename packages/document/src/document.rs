use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::node::{Node, NodeType};

/// Version of the document schema itself. Bumped only when the JSON
/// shape changes incompatibly.
pub const DOCUMENT_VERSION: u32 = 1;

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

/// A font the email pulls in by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDecl {
    pub name: String,
    pub href: String,
}

/// Document-wide settings that live outside the body tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadAttributes {
    /// Per-tag attribute defaults, keyed by tag name. The special key
    /// `mj-all` applies to every tag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_styles: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<FontDecl>,
    /// Inbox preview line. Shown by clients next to the subject.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preview_text: String,
}

impl HeadAttributes {
    pub fn is_empty(&self) -> bool {
        self.default_styles.is_empty() && self.fonts.is_empty() && self.preview_text.is_empty()
    }
}

/// A complete email document: head settings plus the body tree.
///
/// The body node is the tree root. It always has [`NodeType::Body`]
/// and can never be removed or moved, only its children change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub head_attributes: HeadAttributes,
    pub body: Node,
}

impl Document {
    /// Wraps an existing body node into a document with empty head
    /// settings.
    pub fn with_body(body: Node) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            head_attributes: HeadAttributes::default(),
            body,
        }
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.body.find_node(id)
    }

    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.body.find_node_mut(id)
    }

    /// Finds the parent of the node with `id`. The body itself has no
    /// parent.
    pub fn find_parent(&self, id: &str) -> Option<&Node> {
        self.body.find_parent(id)
    }

    pub fn find_parent_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.body.find_parent_mut(id)
    }

    /// Total node count, body included.
    pub fn node_count(&self) -> usize {
        self.body.count()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::with_body(Node::new(NodeType::Body))
    }
}
