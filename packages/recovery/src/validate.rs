//! From loose JSON to a typed document.
//!
//! Everything a model might plausibly get slightly wrong is defaulted
//! or coerced: a missing version, head settings of the wrong shape,
//! numeric attribute values, a malformed condition. Everything that
//! would silently change the meaning of the email is a hard failure:
//! a wrong version, a missing or non-body root, an element type
//! outside the closed set.

use serde_json::Value;
use thiserror::Error;

use mailcraft_document::{
    Document, FontDecl, HeadAttributes, Node, NodeType, DOCUMENT_VERSION,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidateError {
    #[error("the payload is not a JSON object")]
    NotAnObject,
    #[error("unsupported document version {found} (this editor reads version {DOCUMENT_VERSION})")]
    WrongVersion { found: String },
    #[error("the document has no body")]
    MissingBody,
    #[error("the document root is <{found}>, not <mj-body>")]
    WrongRootElement { found: String },
    #[error("an element is missing its type")]
    MissingNodeType,
    #[error("unrecognized element type {found:?}")]
    UnknownNodeType { found: String },
    #[error("an element is not a JSON object")]
    MalformedNode,
}

/// Cheap shape check that separates document candidates from the decoy
/// JSON that models routinely emit around them. A candidate either has
/// a body whose type is the body tag, or carries both the `version`
/// and `headAttributes` keys.
pub fn looks_like_document(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let body_is_root = object
        .get("body")
        .and_then(Value::as_object)
        .and_then(|body| body.get("type"))
        .and_then(Value::as_str)
        .map(|tag| tag == NodeType::Body.tag_name())
        .unwrap_or(false);
    body_is_root || (object.contains_key("version") && object.contains_key("headAttributes"))
}

/// Builds a typed document out of a parsed JSON value, defaulting the
/// benign gaps and rejecting the meaning-changing ones.
pub fn document_from_value(value: &Value) -> Result<Document, ValidateError> {
    let object = value.as_object().ok_or(ValidateError::NotAnObject)?;

    let version = match object.get("version") {
        None | Some(Value::Null) => DOCUMENT_VERSION,
        Some(found) => match found.as_u64() {
            Some(n) if n == u64::from(DOCUMENT_VERSION) => DOCUMENT_VERSION,
            _ => {
                return Err(ValidateError::WrongVersion {
                    found: found.to_string(),
                })
            }
        },
    };

    let head_attributes = object
        .get("headAttributes")
        .map(head_from_value)
        .unwrap_or_default();

    let body_value = object.get("body").ok_or(ValidateError::MissingBody)?;
    let body = node_from_value(body_value)?;
    if body.node_type != NodeType::Body {
        return Err(ValidateError::WrongRootElement {
            found: body.node_type.tag_name().to_string(),
        });
    }

    Ok(Document {
        version,
        head_attributes,
        body,
    })
}

/// Head settings never fail: each of the three fields is taken when it
/// has the right shape and defaulted otherwise, entry by entry.
fn head_from_value(value: &Value) -> HeadAttributes {
    let mut head = HeadAttributes::default();
    let Some(object) = value.as_object() else {
        return head;
    };
    if let Some(styles) = object.get("defaultStyles").and_then(Value::as_object) {
        for (tag, decls) in styles {
            let Some(decls) = decls.as_object() else {
                continue;
            };
            let entry = head.default_styles.entry(tag.clone()).or_default();
            for (name, decl) in decls {
                if let Some(text) = scalar_to_string(decl) {
                    entry.insert(name.clone(), text);
                }
            }
        }
    }
    if let Some(fonts) = object.get("fonts").and_then(Value::as_array) {
        for font in fonts {
            let name = font.get("name").and_then(Value::as_str);
            let href = font.get("href").and_then(Value::as_str);
            if let (Some(name), Some(href)) = (name, href) {
                head.fonts.push(FontDecl {
                    name: name.to_string(),
                    href: href.to_string(),
                });
            }
        }
    }
    if let Some(preview) = object.get("previewText").and_then(Value::as_str) {
        head.preview_text = preview.to_string();
    }
    head
}

fn node_from_value(value: &Value) -> Result<Node, ValidateError> {
    let object = value.as_object().ok_or(ValidateError::MalformedNode)?;
    let tag = object
        .get("type")
        .ok_or(ValidateError::MissingNodeType)?
        .as_str()
        .ok_or(ValidateError::MissingNodeType)?;
    let node_type = NodeType::from_tag(tag).ok_or_else(|| ValidateError::UnknownNodeType {
        found: tag.to_string(),
    })?;

    let mut node = Node::new(node_type);
    if let Some(id) = object.get("id").and_then(Value::as_str) {
        node.id = id.to_string();
    }
    if let Some(attributes) = object.get("attributes").and_then(Value::as_object) {
        for (name, attr) in attributes {
            if let Some(text) = scalar_to_string(attr) {
                node.attributes.insert(name.clone(), text);
            }
        }
    }
    if let Some(html) = object.get("htmlContent").and_then(Value::as_str) {
        node.html_content = Some(html.to_string());
    }
    if let Some(condition) = object.get("condition") {
        node.condition = serde_json::from_value(condition.clone()).ok();
    }
    if let Some(children) = object.get("children").and_then(Value::as_array) {
        for child in children {
            node.children.push(node_from_value(child)?);
        }
    }
    Ok(node)
}

/// Models write `"padding": 10` as often as `"padding": "10"`. Strings
/// pass through, numbers and booleans are stringified, anything nested
/// is dropped.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
