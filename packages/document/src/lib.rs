//! # mailcraft-document
//!
//! The data model of the Mailcraft email editor: a typed tree of email
//! elements plus the JSON envelope documents are persisted in.
//!
//! Everything here is plain owned data with no behavior beyond tree
//! navigation. Editing lives in `mailcraft-editor`, markup conversion
//! in `mailcraft-markup`; both build on the types in this crate.
//!
//! ```
//! use mailcraft_document::{factory, NodeType};
//!
//! let document = factory::default_document();
//! assert_eq!(document.body.node_type, NodeType::Body);
//! assert_eq!(document.node_count(), 4);
//! ```

pub mod document;
pub mod factory;
pub mod id;
pub mod interchange;
pub mod node;
pub mod starter;

pub use document::{Document, FontDecl, HeadAttributes, DOCUMENT_VERSION};
pub use id::fresh_id;
pub use interchange::{
    from_saved_json, is_editor_payload, to_saved_json, InterchangeError, SavedDocument,
    EDITOR_DISCRIMINATOR, PAYLOAD_VERSION,
};
pub use node::{Condition, ConditionOperator, Node, NodeType, MAX_SECTION_COLUMNS};
pub use starter::StarterTemplate;
