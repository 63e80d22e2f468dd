//! # mailcraft-recovery
//!
//! Recovers a document from the raw text of a model response. Models
//! are asked for document JSON and deliver it wrapped in prose,
//! markdown fences, decoy status objects, trailing commas, or cut off
//! mid-string; this crate digs the document out anyway.
//!
//! [`recover_document`] runs three strategies in order of trust, each
//! over progressively rougher material:
//!
//! 1. the whole trimmed response as JSON,
//! 2. the inside of every markdown code fence,
//! 3. every balanced `{...}` span in the text, then the truncated
//!    tails only a repair pass can finish.
//!
//! Every candidate gets one mechanical [`repair`] retry if it does not
//! parse as-is. Candidates that parse but do not look like a document
//! are skipped silently and the search keeps going. A candidate that
//! looked right but failed validation supplies the error reason when
//! nothing better turns up, so a wrong version is reported as a wrong
//! version and not as "no document found".
//!
//! Recovered documents never keep the ids the model echoed back: every
//! node is re-identified before the document is returned.
//!
//! ```
//! use mailcraft_recovery::recover_document;
//!
//! let reply = "Sure! Here is the updated email: {\"version\": 1, \
//!              \"headAttributes\": {}, \"body\": {\"type\": \"mj-body\"}} \
//!              Let me know if you want further changes.";
//! let document = recover_document(reply).unwrap();
//! assert!(document.body.children.is_empty());
//! ```

pub mod error;
pub mod extract;
pub mod repair;
pub mod validate;

pub use error::RecoveryError;
pub use repair::repair;
pub use validate::{document_from_value, looks_like_document, ValidateError};

use mailcraft_document::Document;
use serde_json::Value;

use crate::extract::{fenced_blocks, object_candidates};

/// Bracket-scan spans shorter than this cannot hold a document and are
/// skipped without parsing.
const MIN_CANDIDATE_LEN: usize = 20;

/// Extracts a document from raw response text, or explains why none
/// could be had.
pub fn recover_document(raw: &str) -> Result<Document, RecoveryError> {
    let mut near_miss: Option<String> = None;

    if let Some(document) = try_candidate(raw.trim(), &mut near_miss) {
        return Ok(finalize(document));
    }
    tracing::debug!("response is not document JSON, trying fenced blocks");

    for block in fenced_blocks(raw) {
        if let Some(document) = try_candidate(block.trim(), &mut near_miss) {
            return Ok(finalize(document));
        }
    }
    tracing::debug!("no fenced block held a document, scanning for objects");

    let candidates = object_candidates(raw);
    for span in candidates
        .balanced
        .iter()
        .chain(&candidates.truncated_tails)
    {
        if span.len() < MIN_CANDIDATE_LEN {
            continue;
        }
        if let Some(document) = try_candidate(span, &mut near_miss) {
            return Ok(finalize(document));
        }
    }

    Err(RecoveryError::new(
        near_miss.unwrap_or_else(|| "no document found in the response".to_string()),
        raw,
    ))
}

/// One candidate through the parse, repair, shape-check, validate
/// pipeline. Validation failures of plausible candidates are recorded
/// as the near miss to surface on exhaustion; everything else fails
/// quietly.
fn try_candidate(text: &str, near_miss: &mut Option<String>) -> Option<Document> {
    let value = parse_json(text)?;
    if !looks_like_document(&value) {
        return None;
    }
    match document_from_value(&value) {
        Ok(document) => Some(document),
        Err(reason) => {
            tracing::debug!(%reason, "candidate looked like a document but failed validation");
            near_miss.get_or_insert_with(|| reason.to_string());
            None
        }
    }
}

fn parse_json(text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(_) => serde_json::from_str(&repair(text)).ok(),
    }
}

fn finalize(mut document: Document) -> Document {
    document.body.regenerate_ids();
    document
}
