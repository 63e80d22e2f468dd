use thiserror::Error;

use crate::mutations::MutationError;
use mailcraft_document::InterchangeError;

/// Errors surfaced by an [`crate::EditorSession`].
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("mutation refused: {0}")]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Interchange(#[from] InterchangeError),
}
