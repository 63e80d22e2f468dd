use thiserror::Error;

/// Terminal failure of the whole recovery attempt.
///
/// Carries the most specific reason the strategies produced and the
/// untouched input, so callers can log both or hand the raw text back
/// upstream for a retry.
#[derive(Debug, Error)]
#[error("could not recover a document: {reason}")]
pub struct RecoveryError {
    pub reason: String,
    pub raw_input: String,
}

impl RecoveryError {
    pub fn new(reason: impl Into<String>, raw_input: &str) -> Self {
        Self {
            reason: reason.into(),
            raw_input: raw_input.to_string(),
        }
    }
}
