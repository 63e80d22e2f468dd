//! # mailcraft-editor
//!
//! The editing engine for Mailcraft documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               EditorSession                 │
//! │                                             │
//! │  Mutation ──▶ clone ──▶ apply ──▶ commit    │
//! │                           │          │      │
//! │                      MutationError   ▼      │
//! │                      (doc unchanged) History│
//! │                                      │      │
//! │                                      ▼      │
//! │                              ChangeNotifier │
//! │                            (coalesced fan-  │
//! │                             out to hosts)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Edits are data ([`Mutation`]) applied against an owned [`Document`]
//! snapshot. A successful apply becomes a history entry; a refused one
//! leaves no trace. Undo and redo are cursor moves over snapshots, so
//! every commit is individually reversible even though listener
//! notifications are debounced into bursts.
//!
//! Rendering to final HTML is delegated through [`MarkupCompiler`],
//! which hosts implement against whatever engine they ship.

pub mod compiler;
pub mod errors;
pub mod history;
pub mod mutations;
pub mod notify;
pub mod session;

pub use compiler::{CompiledEmail, MarkupCompiler, PassthroughCompiler};
pub use errors::EditorError;
pub use history::{History, DEFAULT_HISTORY_LIMIT};
pub use mutations::{Mutation, MutationError, MutationOutcome};
pub use notify::{ChangeNotifier, DEFAULT_QUIET_WINDOW};
pub use session::EditorSession;

pub use mailcraft_document::Document;
