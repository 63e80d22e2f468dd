//! The persisted payload shape.
//!
//! Saved documents travel as JSON wrapped in a small envelope that
//! marks the payload as ours. Host applications store older, unrelated
//! JSON blobs in the same columns, so the loader must be able to tell
//! the two apart from the envelope alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::document::Document;

/// Discriminator every saved payload carries in `_editor`.
pub const EDITOR_DISCRIMINATOR: &str = "mailcraft";

/// Version of the envelope, independent of the document schema.
pub const PAYLOAD_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum InterchangeError {
    /// The JSON parsed fine but is not one of our payloads. Callers
    /// route these blobs to whatever legacy handling they have.
    #[error("payload was not produced by this editor")]
    NotEditorPayload,
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Envelope written to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDocument {
    #[serde(rename = "_editor")]
    pub editor: String,
    #[serde(rename = "_version")]
    pub payload_version: u32,
    pub document: Document,
}

impl SavedDocument {
    pub fn new(document: Document) -> Self {
        Self {
            editor: EDITOR_DISCRIMINATOR.to_string(),
            payload_version: PAYLOAD_VERSION,
            document,
        }
    }
}

/// Whether `value` is one of our saved payloads.
///
/// Only the discriminator is consulted. Legacy blobs may coincidentally
/// share other field names, so nothing else is trusted for detection.
pub fn is_editor_payload(value: &Value) -> bool {
    value
        .get("_editor")
        .and_then(Value::as_str)
        .is_some_and(|editor| editor == EDITOR_DISCRIMINATOR)
}

/// Serializes a document into the envelope, pretty-printed for
/// storage diffs.
pub fn to_saved_json(document: &Document) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(&SavedDocument::new(
        document.clone(),
    ))?)
}

/// Parses a saved payload back into a document.
///
/// Fails with [`InterchangeError::NotEditorPayload`] when the JSON is
/// not marked with our discriminator, before any shape checking.
pub fn from_saved_json(json: &str) -> Result<Document, InterchangeError> {
    let value: Value = serde_json::from_str(json)?;
    if !is_editor_payload(&value) {
        return Err(InterchangeError::NotEditorPayload);
    }
    let saved: SavedDocument = serde_json::from_value(value)?;
    Ok(saved.document)
}
