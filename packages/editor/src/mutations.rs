//! The mutation engine.
//!
//! Every edit the UI can make is a [`Mutation`] value. Applying one
//! either changes the document and reports what happened, or returns a
//! [`MutationError`] and leaves the document exactly as it was. There
//! is no partial application: multi-step operations validate everything
//! up front.
//!
//! Mutations that target a node which no longer exists are not errors.
//! Stale ids arrive constantly from debounced UI events and queued
//! model commands; the engine reports [`MutationOutcome::not_found`]
//! and the caller moves on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mailcraft_document::{Document, Node, NodeType, MAX_SECTION_COLUMNS};

/// A single edit against a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Insert `node` under `parent_id`. The index is clamped into the
    /// child list, so "append" is any large index.
    InsertNode {
        parent_id: String,
        index: usize,
        node: Node,
    },
    /// Detach the node and its whole subtree.
    RemoveNode { node_id: String },
    /// Detach the node and re-insert it under a new parent, as one
    /// atomic step.
    MoveNode {
        node_id: String,
        new_parent_id: String,
        index: usize,
    },
    /// Clone the node subtree and insert the copy right after the
    /// original.
    DuplicateNode { node_id: String },
    /// Set one attribute. No legality checking; unknown names are the
    /// renderer's problem.
    SetAttribute {
        node_id: String,
        name: String,
        value: String,
    },
    /// Replace the inner HTML of a content node. Stored verbatim.
    SetContent { node_id: String, html: String },
}

/// Why a mutation was refused. The document is untouched in every
/// case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("a {child} element cannot be placed inside {parent}")]
    IllegalChild { parent: NodeType, child: NodeType },
    #[error("sections hold at most {MAX_SECTION_COLUMNS} columns")]
    SectionFull,
    #[error("an element cannot be moved into its own subtree")]
    WouldCreateCycle,
    #[error("the document body cannot be detached")]
    CannotDetachRoot,
    #[error("the document body cannot be duplicated")]
    CannotDuplicateRoot,
}

/// What applying a mutation did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MutationOutcome {
    /// False when the target id was not in the document.
    pub applied: bool,
    /// The removed subtree, for removals.
    pub detached: Option<Node>,
    /// Id of the copy, for duplications.
    pub created_id: Option<String>,
}

impl MutationOutcome {
    pub fn applied() -> Self {
        Self {
            applied: true,
            ..Self::default()
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn detached(node: Node) -> Self {
        Self {
            applied: true,
            detached: Some(node),
            ..Self::default()
        }
    }

    pub fn created(id: String) -> Self {
        Self {
            applied: true,
            created_id: Some(id),
            ..Self::default()
        }
    }
}

impl Mutation {
    /// Checks whether this mutation would be refused, without touching
    /// the document. Missing targets validate fine; they make the
    /// mutation a no-op, not an error.
    pub fn validate(&self, document: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::InsertNode { parent_id, node, .. } => {
                if let Some(parent) = document.find_node(parent_id) {
                    check_slot(parent, node.node_type, false)?;
                }
                Ok(())
            }
            Mutation::RemoveNode { node_id } => {
                if document.body.id == *node_id {
                    return Err(MutationError::CannotDetachRoot);
                }
                Ok(())
            }
            Mutation::MoveNode {
                node_id,
                new_parent_id,
                ..
            } => check_move(document, node_id, new_parent_id).map(|_| ()),
            Mutation::DuplicateNode { node_id } => {
                if document.body.id == *node_id {
                    return Err(MutationError::CannotDuplicateRoot);
                }
                if let Some(parent) = document.find_parent(node_id) {
                    if parent.node_type == NodeType::Section
                        && parent.children.len() >= MAX_SECTION_COLUMNS
                    {
                        return Err(MutationError::SectionFull);
                    }
                }
                Ok(())
            }
            Mutation::SetAttribute { .. } | Mutation::SetContent { .. } => Ok(()),
        }
    }

    /// Applies this mutation. On `Ok` the outcome says whether anything
    /// changed; on `Err` the document is guaranteed unchanged.
    pub fn apply(&self, document: &mut Document) -> Result<MutationOutcome, MutationError> {
        match self {
            Mutation::InsertNode {
                parent_id,
                index,
                node,
            } => apply_insert(document, parent_id, *index, node),
            Mutation::RemoveNode { node_id } => apply_remove(document, node_id),
            Mutation::MoveNode {
                node_id,
                new_parent_id,
                index,
            } => apply_move(document, node_id, new_parent_id, *index),
            Mutation::DuplicateNode { node_id } => apply_duplicate(document, node_id),
            Mutation::SetAttribute {
                node_id,
                name,
                value,
            } => apply_set_attribute(document, node_id, name, value),
            Mutation::SetContent { node_id, html } => apply_set_content(document, node_id, html),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::InsertNode { .. } => "insert_node",
            Mutation::RemoveNode { .. } => "remove_node",
            Mutation::MoveNode { .. } => "move_node",
            Mutation::DuplicateNode { .. } => "duplicate_node",
            Mutation::SetAttribute { .. } => "set_attribute",
            Mutation::SetContent { .. } => "set_content",
        }
    }
}

/// Legality of putting a `child_type` node under `parent`. The column
/// cap only applies when the insert grows the section, which a move
/// within the same section does not.
fn check_slot(parent: &Node, child_type: NodeType, skip_cap: bool) -> Result<(), MutationError> {
    if !parent.node_type.accepts_child(child_type) {
        return Err(MutationError::IllegalChild {
            parent: parent.node_type,
            child: child_type,
        });
    }
    if !skip_cap
        && parent.node_type == NodeType::Section
        && parent.children.len() >= MAX_SECTION_COLUMNS
    {
        return Err(MutationError::SectionFull);
    }
    Ok(())
}

/// All the checks a move needs, in one place so `validate` and `apply`
/// cannot drift. Returns the moved node's type when the move is legal
/// and both ids resolve.
fn check_move(
    document: &Document,
    node_id: &str,
    new_parent_id: &str,
) -> Result<Option<NodeType>, MutationError> {
    if document.body.id == node_id {
        return Err(MutationError::CannotDetachRoot);
    }
    let Some(node) = document.find_node(node_id) else {
        return Ok(None);
    };
    if node_id == new_parent_id || node.find_node(new_parent_id).is_some() {
        return Err(MutationError::WouldCreateCycle);
    }
    let Some(parent) = document.find_node(new_parent_id) else {
        return Ok(None);
    };
    let same_parent = document
        .find_parent(node_id)
        .is_some_and(|current| current.id == new_parent_id);
    check_slot(parent, node.node_type, same_parent)?;
    Ok(Some(node.node_type))
}

fn apply_insert(
    document: &mut Document,
    parent_id: &str,
    index: usize,
    node: &Node,
) -> Result<MutationOutcome, MutationError> {
    let Some(parent) = document.find_node_mut(parent_id) else {
        return Ok(MutationOutcome::not_found());
    };
    if !parent.node_type.accepts_child(node.node_type) {
        return Err(MutationError::IllegalChild {
            parent: parent.node_type,
            child: node.node_type,
        });
    }
    if parent.node_type == NodeType::Section && parent.children.len() >= MAX_SECTION_COLUMNS {
        return Err(MutationError::SectionFull);
    }
    let at = index.min(parent.children.len());
    parent.children.insert(at, node.clone());
    Ok(MutationOutcome::applied())
}

fn apply_remove(document: &mut Document, node_id: &str) -> Result<MutationOutcome, MutationError> {
    if document.body.id == node_id {
        return Err(MutationError::CannotDetachRoot);
    }
    match document.body.detach(node_id) {
        Some(node) => Ok(MutationOutcome::detached(node)),
        None => Ok(MutationOutcome::not_found()),
    }
}

fn apply_move(
    document: &mut Document,
    node_id: &str,
    new_parent_id: &str,
    index: usize,
) -> Result<MutationOutcome, MutationError> {
    if check_move(document, node_id, new_parent_id)?.is_none() {
        return Ok(MutationOutcome::not_found());
    }

    // Remember where the node came from so a failed re-insert puts it
    // back instead of dropping the subtree.
    let origin = document.find_parent(node_id).map(|parent| {
        let at = parent
            .children
            .iter()
            .position(|child| child.id == node_id)
            .unwrap_or(0);
        (parent.id.clone(), at)
    });

    let Some(node) = document.body.detach(node_id) else {
        return Ok(MutationOutcome::not_found());
    };
    match document.find_node_mut(new_parent_id) {
        Some(parent) => {
            let at = index.min(parent.children.len());
            parent.children.insert(at, node);
            Ok(MutationOutcome::applied())
        }
        None => {
            if let Some((origin_id, at)) = origin {
                if let Some(origin_parent) = document.find_node_mut(&origin_id) {
                    let at = at.min(origin_parent.children.len());
                    origin_parent.children.insert(at, node);
                }
            }
            Ok(MutationOutcome::not_found())
        }
    }
}

fn apply_duplicate(
    document: &mut Document,
    node_id: &str,
) -> Result<MutationOutcome, MutationError> {
    if document.body.id == node_id {
        return Err(MutationError::CannotDuplicateRoot);
    }
    let Some(parent) = document.find_parent_mut(node_id) else {
        return Ok(MutationOutcome::not_found());
    };
    if parent.node_type == NodeType::Section && parent.children.len() >= MAX_SECTION_COLUMNS {
        return Err(MutationError::SectionFull);
    }
    let Some(position) = parent.children.iter().position(|child| child.id == node_id) else {
        return Ok(MutationOutcome::not_found());
    };
    let copy = parent.children[position].clone_subtree();
    let copy_id = copy.id.clone();
    parent.children.insert(position + 1, copy);
    Ok(MutationOutcome::created(copy_id))
}

fn apply_set_attribute(
    document: &mut Document,
    node_id: &str,
    name: &str,
    value: &str,
) -> Result<MutationOutcome, MutationError> {
    let Some(node) = document.find_node_mut(node_id) else {
        return Ok(MutationOutcome::not_found());
    };
    node.attributes.insert(name.to_string(), value.to_string());
    Ok(MutationOutcome::applied())
}

fn apply_set_content(
    document: &mut Document,
    node_id: &str,
    html: &str,
) -> Result<MutationOutcome, MutationError> {
    let Some(node) = document.find_node_mut(node_id) else {
        return Ok(MutationOutcome::not_found());
    };
    node.html_content = Some(html.to_string());
    Ok(MutationOutcome::applied())
}
